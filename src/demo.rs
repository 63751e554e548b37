//! The handoff scenarios behind the command-line subcommands.

use std::io::Write;

use tracing::info;

use crate::config::DemoConfig;
use crate::error::{EndOfStream, SendError};
use crate::rendezvous_channel;
use crate::task;

/// A producer task sends `config.count` values starting at `config.value`,
/// then drops its sender. Each received value is written as
/// `Received: <value>`. Returns how many values were received.
pub fn handoff<W: Write>(config: &DemoConfig, out: &mut W) -> anyhow::Result<usize> {
    let (tx, rx) = rendezvous_channel::channel();
    let first = config.value;
    let count = i64::try_from(config.count)?;

    let producer = task::spawn("producer", move || {
        for i in 0..count {
            tx.send(first.wrapping_add(i))?;
        }
        Ok::<_, SendError<i64>>(())
    })?;

    let mut received = 0;
    for value in &rx {
        writeln!(out, "Received: {value}")?;
        received += 1;
    }

    producer.join()??;
    info!(received, "handoff finished");
    Ok(received)
}

/// Closes the channel before anything is sent.
pub fn closed<W: Write>(out: &mut W) -> anyhow::Result<()> {
    let (tx, rx) = rendezvous_channel::channel::<i64>();
    tx.close();

    match rx.recv() {
        Ok(value) => writeln!(out, "Received: {value}")?,
        Err(EndOfStream) => writeln!(out, "Received: end of stream")?,
    }
    Ok(())
}

/// Spawns a greeting task and waits for it, so its line is never lost when
/// the main thread finishes first.
pub fn hello<W: Write>(out: &mut W) -> anyhow::Result<()> {
    let greeter = task::spawn("greeter", || "Hello from a goroutine")?;

    writeln!(out, "Hello from main")?;
    let greeting = greeter.join()?;
    writeln!(out, "{greeting}")?;
    Ok(())
}
