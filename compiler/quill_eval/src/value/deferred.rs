use std::future::Future;

use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::errors::{ErrorKind, RuntimeError};
use crate::exec::Thrown;

use super::Obj;

enum State {
    Running(JoinHandle<Result<Obj, Thrown>>),
    Done(Result<Obj, Thrown>),
}

/// The handle `launch` returns: a coroutine running on the host runtime.
///
/// Awaiting it suspends the caller until the coroutine finishes; awaiting a
/// finished one returns the stored result again.
pub struct Deferred {
    state: Mutex<State>,
}

impl Deferred {
    /// Spawn `task` on the runtime behind `handle`.
    pub fn spawn<F>(handle: &Handle, task: F) -> Self
    where
        F: Future<Output = Result<Obj, Thrown>> + Send + 'static,
    {
        Deferred {
            state: Mutex::new(State::Running(handle.spawn(task))),
        }
    }

    /// Wait for the result. A panicked or aborted task reports
    /// `IllegalStateException` through the outer `Err`.
    pub async fn wait(&self) -> Result<Result<Obj, Thrown>, RuntimeError> {
        let mut state = self.state.lock().await;
        if let State::Running(handle) = &mut *state {
            let outcome = handle.await.map_err(|join| {
                RuntimeError::new(ErrorKind::IllegalState, format!("launched task failed: {join}"))
            })?;
            *state = State::Done(outcome);
        }
        match &*state {
            State::Done(outcome) => Ok(outcome.clone()),
            State::Running(_) => Err(RuntimeError::new(
                ErrorKind::IllegalState,
                "launched task did not complete",
            )),
        }
    }

    /// Whether the coroutine is still running.
    pub fn is_active(&self) -> bool {
        match self.state.try_lock() {
            Ok(state) => match &*state {
                State::Running(handle) => !handle.is_finished(),
                State::Done(_) => false,
            },
            // Someone is awaiting it right now.
            Err(_) => true,
        }
    }
}
