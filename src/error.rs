//! Error types shared by the channels, the task glue and configuration.

use std::fmt;

use thiserror::Error;

/// Returned by [`Sender::send`](crate::rendezvous_channel::Sender::send) when
/// the channel is closed. Carries the value that could not be delivered.
#[derive(Clone, PartialEq, Eq, Error)]
#[error("sending on a closed channel")]
pub struct SendError<T>(pub T);

impl<T> SendError<T> {
    /// Takes back the undelivered value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

// Manual impl so `T` needs no `Debug` bound, matching the std channels.
impl<T> fmt::Debug for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendError").finish_non_exhaustive()
    }
}

/// The channel is closed and drained: no further values will ever arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("end of stream")]
pub struct EndOfStream;

/// The oneshot sender went away without sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("oneshot sender dropped without sending")]
pub struct Disconnected;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("failed to spawn task `{name}`: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("task `{name}` panicked before producing a result")]
    Panicked { name: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to extract configuration: {0}")]
    Extraction(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
