//! Named tasks whose result is handed back over a oneshot channel.

use std::fmt;
use std::thread;

use tracing::{debug, warn};

use crate::error::{Disconnected, TaskError};
use crate::oneshot_channel;

/// Owned permission to wait for a spawned task's result.
pub struct JoinHandle<T> {
    name: String,
    result: oneshot_channel::Receiver<T>,
    thread: thread::JoinHandle<()>,
}

/// Runs `f` on a new named thread.
///
/// The result is only observable through [`JoinHandle::join`]; dropping the
/// handle detaches the task.
pub fn spawn<F, T>(name: impl Into<String>, f: F) -> Result<JoinHandle<T>, TaskError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let name = name.into();
    let (tx, rx) = oneshot_channel::channel();

    let thread = thread::Builder::new()
        .name(name.clone())
        .spawn(move || tx.send(f()))
        .map_err(|source| TaskError::Spawn {
            name: name.clone(),
            source,
        })?;

    debug!(task = %name, "task spawned");
    Ok(JoinHandle {
        name,
        result: rx,
        thread,
    })
}

impl<T> JoinHandle<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the task has finished, successfully or not.
    pub fn is_finished(&self) -> bool {
        self.result.is_ready()
    }

    /// Blocks until the task returns.
    pub fn join(self) -> Result<T, TaskError> {
        let JoinHandle {
            name,
            result,
            thread,
        } = self;

        let outcome = result.recv();
        // The sender is gone either way, so the thread is done or unwinding.
        // Its panic payload was already reported by the panic hook.
        let _ = thread.join();

        match outcome {
            Ok(value) => {
                debug!(task = %name, "task joined");
                Ok(value)
            }
            Err(Disconnected) => {
                warn!(task = %name, "task panicked");
                Err(TaskError::Panicked { name })
            }
        }
    }
}

impl<T> fmt::Debug for JoinHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinHandle")
            .field("name", &self.name)
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}
