//! Where `print` and `println` output goes.
//!
//! Hosts pick a destination when building an engine:
//! - stdout (default)
//! - an in-memory buffer (tests, flag-equivalence checks, embedding UIs)
//! - nowhere
//!
//! Enum dispatch keeps the hot `print` path free of vtable calls.

use std::sync::Arc;

use parking_lot::Mutex;

/// Output destination for script printing.
pub enum PrintHandler {
    /// Writes to the process stdout.
    Stdout,
    /// Appends to an in-memory buffer.
    Buffer(Mutex<String>),
    /// Discards everything.
    Silent,
}

impl PrintHandler {
    /// Write `text` without a trailing newline.
    pub fn print(&self, text: &str) {
        match self {
            PrintHandler::Stdout => print!("{text}"),
            PrintHandler::Buffer(buffer) => buffer.lock().push_str(text),
            PrintHandler::Silent => {}
        }
    }

    /// Write `text` followed by a newline.
    pub fn println(&self, text: &str) {
        match self {
            PrintHandler::Stdout => println!("{text}"),
            PrintHandler::Buffer(buffer) => {
                let mut buffer = buffer.lock();
                buffer.push_str(text);
                buffer.push('\n');
            }
            PrintHandler::Silent => {}
        }
    }

    /// Everything captured so far; empty for stdout and silent handlers.
    pub fn output(&self) -> String {
        match self {
            PrintHandler::Buffer(buffer) => buffer.lock().clone(),
            PrintHandler::Stdout | PrintHandler::Silent => String::new(),
        }
    }

    /// Drop captured output.
    pub fn clear(&self) {
        if let PrintHandler::Buffer(buffer) = self {
            buffer.lock().clear();
        }
    }
}

/// Print handler shared by every context of one engine.
pub type SharedPrintHandler = Arc<PrintHandler>;

/// Handler writing to stdout.
pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Stdout)
}

/// Handler capturing into a buffer.
pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Buffer(Mutex::new(String::new())))
}

/// Handler discarding all output.
pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Silent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn buffer_collects_print_and_println() {
        let handler = buffer_handler();
        handler.print("a");
        handler.println("b");
        handler.print("c");
        assert_eq!(handler.output(), "ab\nc");
    }

    #[test]
    fn buffer_clear_empties() {
        let handler = buffer_handler();
        handler.println("x");
        handler.clear();
        assert_eq!(handler.output(), "");
    }

    #[test]
    fn silent_and_stdout_capture_nothing() {
        let silent = silent_handler();
        silent.println("gone");
        assert_eq!(silent.output(), "");
        assert_eq!(stdout_handler().output(), "");
    }
}
