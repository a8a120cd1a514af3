//! Checkout of the engine's hardware channels.

use core::sync::atomic::{AtomicBool, Ordering};

use super::relax;

/// The number of independent channels on the engine.
pub const CHANNELS: usize = 4;

/// One of the engine's channels, checked out from a [`ChannelPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Channel(u8);

impl Channel {
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index < CHANNELS);
        Channel(index as u8)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Tracks which of the engine's channels are in use.
///
/// The pool is owned by the application and shared by reference with every
/// [`Context`](crate::Context) created on the engine.
#[derive(Debug)]
pub struct ChannelPool {
    busy: [AtomicBool; CHANNELS],
}

impl Default for ChannelPool {
    fn default() -> Self {
        ChannelPool::new()
    }
}

impl ChannelPool {
    /// Creates a pool with every channel idle.
    pub const fn new() -> Self {
        const IDLE: AtomicBool = AtomicBool::new(false);
        ChannelPool { busy: [IDLE; CHANNELS] }
    }

    /// Checks out the first idle channel, or returns `None` if all are busy.
    pub fn try_allocate(&self) -> Option<Channel> {
        self.busy.iter()
            .position(|flag| flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok())
            .map(Channel::new)
    }

    /// Checks out a channel, waiting for one to be released if necessary.
    ///
    /// Between attempts this yields the current thread when `std` is available and issues a
    /// spin-loop hint otherwise. This never returns if every channel stays checked out.
    pub fn allocate(&self) -> Channel {
        self.allocate_with(relax)
    }

    /// Checks out a channel, calling `backoff` between attempts.
    ///
    /// On an RTOS `backoff` is typically a task delay. This never returns if every channel stays
    /// checked out.
    pub fn allocate_with(&self, mut backoff: impl FnMut()) -> Channel {
        let mut waited = false;
        loop {
            if let Some(channel) = self.try_allocate() {
                debug!("allocated AES channel {}", channel.index());
                return channel;
            }

            if !waited {
                warn!("no idle AES channel, waiting for a release");
                waited = true;
            }

            backoff();
        }
    }

    /// Returns a channel to the pool. Indices outside the pool are ignored.
    pub fn release(&self, index: usize) {
        if let Some(flag) = self.busy.get(index) {
            flag.store(false, Ordering::Release);
            debug!("released AES channel {}", index);
        }
    }

    pub fn is_busy(&self, index: usize) -> bool {
        self.busy.get(index).map_or(false, |flag| flag.load(Ordering::Acquire))
    }

    /// The number of idle channels.
    pub fn idle(&self) -> usize {
        self.busy.iter().filter(|flag| !flag.load(Ordering::Acquire)).count()
    }
}
