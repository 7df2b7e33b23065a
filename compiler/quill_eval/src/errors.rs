//! Centralized runtime error constructors.
//!
//! Code that has no execution context (operators, value helpers, class
//! tables) reports failures as a [`RuntimeError`]: an exception class kind
//! plus a message. The executing node turns it into a thrown error object of
//! the engine's matching builtin class, positioned at the node.

use std::fmt;

use quill_ir::Name;

/// Builtin exception classes, all deriving from `Exception`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Exception,
    NullPointer,
    AssertionFailed,
    IndexOutOfBounds,
    IllegalArgument,
    IllegalAssignment,
    IllegalState,
    SymbolNotDefined,
    NotImplemented,
    Arithmetic,
    ClassCast,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 11] = [
        ErrorKind::Exception,
        ErrorKind::NullPointer,
        ErrorKind::AssertionFailed,
        ErrorKind::IndexOutOfBounds,
        ErrorKind::IllegalArgument,
        ErrorKind::IllegalAssignment,
        ErrorKind::IllegalState,
        ErrorKind::SymbolNotDefined,
        ErrorKind::NotImplemented,
        ErrorKind::Arithmetic,
        ErrorKind::ClassCast,
    ];

    /// Script-visible class name.
    pub fn class_name(self) -> &'static str {
        match self {
            ErrorKind::Exception => "Exception",
            ErrorKind::NullPointer => "NullPointerException",
            ErrorKind::AssertionFailed => "AssertionFailedException",
            ErrorKind::IndexOutOfBounds => "IndexOutOfBoundsException",
            ErrorKind::IllegalArgument => "IllegalArgumentException",
            ErrorKind::IllegalAssignment => "IllegalAssignmentException",
            ErrorKind::IllegalState => "IllegalStateException",
            ErrorKind::SymbolNotDefined => "SymbolNotDefinedException",
            ErrorKind::NotImplemented => "NotImplementedException",
            ErrorKind::Arithmetic => "ArithmeticException",
            ErrorKind::ClassCast => "ClassCastException",
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// A failure not yet attached to a position or an error object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        RuntimeError {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.class_name(), self.message)
    }
}

impl std::error::Error for RuntimeError {}

// Symbol errors

pub fn symbol_not_defined(name: Name) -> RuntimeError {
    RuntimeError::new(ErrorKind::SymbolNotDefined, format!("symbol not defined: {name}"))
}

pub fn no_such_member(name: Name, class: Name) -> RuntimeError {
    RuntimeError::new(
        ErrorKind::SymbolNotDefined,
        format!("symbol doesn't exist: {name} (in {class})"),
    )
}

pub fn already_defined(name: Name) -> RuntimeError {
    RuntimeError::new(ErrorKind::IllegalState, format!("symbol already defined: {name}"))
}

pub fn member_already_defined(name: Name, class: Name) -> RuntimeError {
    RuntimeError::new(
        ErrorKind::IllegalState,
        format!("member {name} is already defined or inherited in {class}"),
    )
}

// Assignment errors

pub fn frozen_mutation() -> RuntimeError {
    RuntimeError::new(ErrorKind::IllegalAssignment, "attempt to mutate frozen object")
}

pub fn read_only(name: Name) -> RuntimeError {
    RuntimeError::new(
        ErrorKind::IllegalAssignment,
        format!("can't assign to read-only {name}"),
    )
}

pub fn read_only_member(name: Name) -> RuntimeError {
    RuntimeError::new(
        ErrorKind::IllegalAssignment,
        format!("can't assign to read-only member {name}"),
    )
}

// Arithmetic errors

pub fn division_by_zero() -> RuntimeError {
    RuntimeError::new(ErrorKind::Arithmetic, "division by zero")
}

pub fn modulo_by_zero() -> RuntimeError {
    RuntimeError::new(ErrorKind::Arithmetic, "modulo by zero")
}

pub fn integer_overflow(op: &str) -> RuntimeError {
    RuntimeError::new(ErrorKind::Arithmetic, format!("integer overflow in {op}"))
}

pub fn not_implemented(op: &str, type_name: &str) -> RuntimeError {
    RuntimeError::new(
        ErrorKind::NotImplemented,
        format!("operation '{op}' not implemented for {type_name}"),
    )
}

// Call errors

pub fn missing_argument(ordinal: usize, name: Name) -> RuntimeError {
    RuntimeError::new(
        ErrorKind::IllegalArgument,
        format!("missing required argument #{ordinal}: {name}"),
    )
}

pub fn too_many_arguments(callee: Name, expected: usize, got: usize) -> RuntimeError {
    RuntimeError::new(
        ErrorKind::IllegalArgument,
        format!("too many arguments for {callee}: expected {expected}, got {got}"),
    )
}

pub fn wrong_arg_count(callee: &str, expected: &str, got: usize) -> RuntimeError {
    RuntimeError::new(
        ErrorKind::IllegalArgument,
        format!("{callee} expects {expected} argument(s), got {got}"),
    )
}

pub fn wrong_arg_type(callee: &str, expected: &str, got: &str) -> RuntimeError {
    RuntimeError::new(
        ErrorKind::IllegalArgument,
        format!("{callee} expects {expected}, got {got}"),
    )
}

pub fn not_callable(type_name: &str) -> RuntimeError {
    RuntimeError::new(ErrorKind::IllegalArgument, format!("{type_name} is not callable"))
}

pub fn stack_overflow(depth: usize) -> RuntimeError {
    RuntimeError::new(
        ErrorKind::IllegalState,
        format!("stack overflow: call depth exceeded {depth}"),
    )
}

// Index errors

pub fn index_out_of_bounds(index: i64, len: usize) -> RuntimeError {
    RuntimeError::new(
        ErrorKind::IndexOutOfBounds,
        format!("index {index} out of bounds for length {len}"),
    )
}

pub fn cannot_index(container: &str, index: &str) -> RuntimeError {
    RuntimeError::new(
        ErrorKind::IllegalArgument,
        format!("{container} cannot be indexed by {index}"),
    )
}

pub fn null_receiver(name: Name) -> RuntimeError {
    RuntimeError::new(
        ErrorKind::NullPointer,
        format!("cannot access {name} on null"),
    )
}

// Control errors

pub fn condition_not_bool(type_name: &str) -> RuntimeError {
    RuntimeError::new(
        ErrorKind::ClassCast,
        format!("condition must be Bool, got {type_name}"),
    )
}

pub fn not_iterable(type_name: &str) -> RuntimeError {
    RuntimeError::new(ErrorKind::IllegalArgument, format!("{type_name} is not iterable"))
}

pub fn not_throwable(type_name: &str) -> RuntimeError {
    RuntimeError::new(
        ErrorKind::IllegalArgument,
        format!("can only throw exceptions, got {type_name}"),
    )
}

pub fn not_a_class(type_name: &str) -> RuntimeError {
    RuntimeError::new(ErrorKind::IllegalArgument, format!("{type_name} is not a class"))
}
