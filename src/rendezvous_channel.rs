//! Unbuffered rendezvous channel.
//!
//! A sender places its value in a single slot and then waits until a receiver
//! has taken it, so `send` returning means the handoff happened. The slot is
//! guarded by a mutex; receivers wait on `slot_full`, senders on `slot_empty`.
//!
//! The channel closes when [`Sender::close`] or [`Receiver::close`] is called,
//! or when the last handle on either side is dropped. A value already in the
//! slot at that point is still handed to a receiver, unless no receiver is
//! left, in which case the blocked sender gets it back.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use crate::error::{EndOfStream, SendError};

/// Snapshot of a channel's slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Empty,
    ValuePending,
    /// Closed and drained.
    Closed,
}

struct Inner<T> {
    slot: Option<T>,
    closed: bool,
    senders: usize,
    receivers: usize,
    // Values put into and taken out of the slot. A sender waits until
    // `taken` catches up with the number its own value was given.
    sent: u64,
    taken: u64,
}

struct Channel<T> {
    inner: Mutex<Inner<T>>,
    slot_full: Condvar,
    slot_empty: Condvar,
}

impl<T> Channel<T> {
    // A panic while the lock is held can only come from a user `Drop`, which
    // leaves `Inner` consistent, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(
        &self,
        cv: &Condvar,
        guard: MutexGuard<'a, Inner<T>>,
    ) -> MutexGuard<'a, Inner<T>> {
        cv.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }

    fn close(&self) -> bool {
        let mut inner = self.lock();
        if inner.closed {
            return false;
        }
        inner.closed = true;
        let pending = inner.slot.is_some();
        drop(inner);

        debug!(pending, "channel closed");
        self.wake_all();
        true
    }

    // Called when the last handle on one side goes away. Waiters must be
    // woken even if the channel was already closed: a sender blocked on its
    // handoff re-checks `receivers` only when notified.
    fn disconnect(&self) {
        if !self.close() {
            self.wake_all();
        }
    }

    fn wake_all(&self) {
        self.slot_full.notify_all();
        self.slot_empty.notify_all();
    }

    fn state(&self) -> State {
        let inner = self.lock();
        match (&inner.slot, inner.closed) {
            (Some(_), _) => State::ValuePending,
            (None, true) => State::Closed,
            (None, false) => State::Empty,
        }
    }

    fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

/// Creates a rendezvous channel, returning the sending and receiving halves.
pub fn channel<T>() -> (Sender<T>, Receiver<T>) {
    let channel = Arc::new(Channel {
        inner: Mutex::new(Inner {
            slot: None,
            closed: false,
            senders: 1,
            receivers: 1,
            sent: 0,
            taken: 0,
        }),
        slot_full: Condvar::new(),
        slot_empty: Condvar::new(),
    });

    (
        Sender {
            channel: channel.clone(),
        },
        Receiver { channel },
    )
}

pub struct Sender<T> {
    channel: Arc<Channel<T>>,
}

pub struct Receiver<T> {
    channel: Arc<Channel<T>>,
}

impl<T> Sender<T> {
    /// Blocks until a receiver has taken `value`.
    ///
    /// Fails immediately if the channel is closed. Also fails, handing the
    /// value back, if every receiver is dropped while the value is pending.
    pub fn send(&self, value: T) -> Result<(), SendError<T>> {
        let chan = &*self.channel;
        let mut inner = chan.lock();

        while inner.slot.is_some() && !inner.closed {
            inner = chan.wait(&chan.slot_empty, inner);
        }
        if inner.closed {
            trace!("send on closed channel");
            return Err(SendError(value));
        }

        inner.slot = Some(value);
        inner.sent += 1;
        let ticket = inner.sent;
        chan.slot_full.notify_one();
        trace!(ticket, "value pending");

        while inner.taken < ticket {
            if inner.receivers == 0 {
                if let Some(value) = inner.slot.take() {
                    trace!(ticket, "no receivers left, value withdrawn");
                    return Err(SendError(value));
                }
            }
            inner = chan.wait(&chan.slot_empty, inner);
        }

        trace!(ticket, "handoff complete");
        Ok(())
    }

    /// Closes the channel. Returns `false` if it was already closed.
    pub fn close(&self) -> bool {
        self.channel.close()
    }

    pub fn is_closed(&self) -> bool {
        self.channel.is_closed()
    }

    pub fn state(&self) -> State {
        self.channel.state()
    }
}

impl<T> Receiver<T> {
    /// Blocks until a value arrives, or returns [`EndOfStream`] once the
    /// channel is closed and drained.
    pub fn recv(&self) -> Result<T, EndOfStream> {
        let chan = &*self.channel;
        let mut inner = chan.lock();

        loop {
            if let Some(value) = inner.slot.take() {
                inner.taken += 1;
                trace!(taken = inner.taken, "value received");
                drop(inner);
                // Wakes the sender waiting on this handoff as well as any
                // sender waiting for the slot.
                chan.slot_empty.notify_all();
                return Ok(value);
            }
            if inner.closed {
                return Err(EndOfStream);
            }
            inner = chan.wait(&chan.slot_full, inner);
        }
    }

    /// Closes the channel. Returns `false` if it was already closed.
    ///
    /// A value already pending can still be received.
    pub fn close(&self) -> bool {
        self.channel.close()
    }

    pub fn is_closed(&self) -> bool {
        self.channel.is_closed()
    }

    pub fn state(&self) -> State {
        self.channel.state()
    }

    /// Iterates over received values until end of stream.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { receiver: self }
    }
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        self.channel.lock().senders += 1;
        Self {
            channel: self.channel.clone(),
        }
    }
}

impl<T> Clone for Receiver<T> {
    fn clone(&self) -> Self {
        self.channel.lock().receivers += 1;
        Self {
            channel: self.channel.clone(),
        }
    }
}

impl<T> Drop for Sender<T> {
    fn drop(&mut self) {
        let last = {
            let mut inner = self.channel.lock();
            inner.senders -= 1;
            inner.senders == 0
        };
        if last {
            self.channel.disconnect();
        }
    }
}

impl<T> Drop for Receiver<T> {
    fn drop(&mut self) {
        let last = {
            let mut inner = self.channel.lock();
            inner.receivers -= 1;
            inner.receivers == 0
        };
        if last {
            self.channel.disconnect();
        }
    }
}

impl<T> fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Debug for Receiver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

pub struct Iter<'a, T> {
    receiver: &'a Receiver<T>,
}

impl<T> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.receiver.recv().ok()
    }
}

impl<'a, T> IntoIterator for &'a Receiver<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

pub struct IntoIter<T> {
    receiver: Receiver<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.receiver.recv().ok()
    }
}

impl<T> IntoIterator for Receiver<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter { receiver: self }
    }
}
