use std::{
    cell::UnsafeCell,
    mem::MaybeUninit,
    sync::{
        atomic::{fence, AtomicU8, Ordering},
        Arc, OnceLock,
    },
    thread::{self, Thread},
};

use crate::error::Disconnected;

const EMPTY: u8 = 0;
const READY: u8 = 1;
const TAKEN: u8 = 2;
const DISCONNECTED: u8 = 3;

pub struct Sender<T> {
    channel: Arc<Channel<T>>,
}

pub struct Receiver<T> {
    channel: Arc<Channel<T>>,
}

struct Channel<T> {
    message: UnsafeCell<MaybeUninit<T>>,
    state: AtomicU8,
    // Thread blocked in `Receiver::recv`, set once by that thread.
    waiter: OnceLock<Thread>,
}

unsafe impl<T> Sync for Channel<T> where T: Send {}

/// Creates a single-use channel. The receiver may be moved to another
/// thread before calling [`Receiver::recv`].
pub fn channel<T>() -> (Sender<T>, Receiver<T>) {
    let a = Arc::new(Channel {
        message: UnsafeCell::new(MaybeUninit::uninit()),
        state: AtomicU8::new(EMPTY),
        waiter: OnceLock::new(),
    });

    (Sender { channel: a.clone() }, Receiver { channel: a })
}

impl<T> Channel<T> {
    // Pairs with the fence in `Receiver::recv`: either the receiver sees the
    // new state, or we see its thread and unpark it.
    fn wake(&self) {
        fence(Ordering::SeqCst);
        if let Some(t) = self.waiter.get() {
            t.unpark();
        }
    }
}

impl<T> Sender<T> {
    /// Never blocks. Consumes the sender, so at most one message is sent.
    pub fn send(self, message: T) {
        // Safety: `self` is the only sender and it is consumed here, so
        // nothing else writes to `message`, and the receiver does not read
        // it until it observes READY below.
        unsafe {
            (*self.channel.message.get()).write(message);
        }

        self.channel.state.store(READY, Ordering::Release);
        self.channel.wake();
    }
}

impl<T> Drop for Sender<T> {
    fn drop(&mut self) {
        if self
            .channel
            .state
            .compare_exchange(EMPTY, DISCONNECTED, Ordering::Release, Ordering::Relaxed)
            .is_ok()
        {
            self.channel.wake();
        }
    }
}

impl<T> Receiver<T> {
    /// Whether `recv` would return without blocking.
    pub fn is_ready(&self) -> bool {
        self.channel.state.load(Ordering::Relaxed) != EMPTY
    }

    /// Parks the calling thread until the message arrives. Fails if the
    /// sender is dropped without sending.
    pub fn recv(self) -> Result<T, Disconnected> {
        self.channel.waiter.get_or_init(thread::current);
        fence(Ordering::SeqCst);

        loop {
            match self.channel.state.load(Ordering::Acquire) {
                READY => break,
                DISCONNECTED => return Err(Disconnected),
                _ => thread::park(),
            }
        }

        // Once READY, only this receiver changes the state again.
        self.channel.state.store(TAKEN, Ordering::Relaxed);

        // Safety: the state was READY, so `message` is initialized, and
        // moving to TAKEN stops `Channel::drop` from dropping it again.
        Ok(unsafe { (*self.channel.message.get()).assume_init_read() })
    }
}

impl<T> Drop for Channel<T> {
    fn drop(&mut self) {
        if *self.state.get_mut() == READY {
            // Safety: `self.state` is `READY`, so `self.message`
            // is initialized and was never read.
            unsafe { self.message.get_mut().assume_init_drop() }
        }
    }
}
