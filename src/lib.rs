//! Channels that hand a value from one thread to another.
//!
//! [`rendezvous_channel`] is unbuffered: `send` returns only once a receiver
//! has taken the value. [`oneshot_channel`] carries a single value without
//! blocking the sender, and [`task`] uses it to return a spawned task's
//! result.

pub mod config;
pub mod demo;
pub mod error;
pub mod logging;
pub mod oneshot_channel;
pub mod rendezvous_channel;
pub mod task;

pub use config::DemoConfig;
pub use error::{ConfigError, Disconnected, EndOfStream, SendError, TaskError};
pub use rendezvous_channel::{channel, Receiver, Sender, State};
