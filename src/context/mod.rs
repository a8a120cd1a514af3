//! Cipher sessions on one engine channel.

use core::mem::MaybeUninit;
use core::ptr;
use core::sync::atomic::{self, Ordering};

use crate::aes::{Key, KeySize};
use crate::aes::key::MAX_KEY_LEN;
use crate::hardware::{Channel, ChannelPool, Config, Engine, Mode, Operation, Swap};
use crate::word::{self, Word, WORD_LEN};
use crate::{Error, Result};

mod block;
pub mod modes;

/// Everything a context knows about its session. All-zero is a valid, inert state.
#[derive(Clone, Copy)]
#[repr(C)]
struct State {
    key: [Word; MAX_KEY_LEN / WORD_LEN],
    channel: u8,
    live: bool,
    keyed: bool,
    key_size: KeySize,
    operation: Operation,
    mode: Mode,
    swap: Swap,
}

impl State {
    const fn zeroed() -> Self {
        State {
            key: [0; MAX_KEY_LEN / WORD_LEN],
            channel: 0,
            live: false,
            keyed: false,
            key_size: KeySize::Aes128,
            operation: Operation::Decrypt,
            mode: Mode::Ecb,
            swap: Swap::None,
        }
    }
}

/// Overwrites `state` with zeros in a way the optimizer will not remove.
fn wipe(state: &mut State) {
    unsafe {
        ptr::write_volatile(state as *mut State as *mut MaybeUninit<State>, MaybeUninit::zeroed());
    }
    atomic::compiler_fence(Ordering::SeqCst);
}

/// An AES session bound to one channel of the engine.
///
/// The channel is checked out when the context is created and returned to the pool when it is
/// dropped, at which point the key material held by the context is wiped.
pub struct Context<'a, E: Engine> {
    engine: &'a E,
    pool: &'a ChannelPool,
    state: State,
}

impl<'a, E: Engine> Context<'a, E> {
    /// Creates a context on the first idle channel of `pool`.
    ///
    /// If every channel is checked out this waits, yielding between attempts, until another
    /// context releases one. It never returns if no channel is ever released.
    pub fn new(engine: &'a E, pool: &'a ChannelPool) -> Self {
        let channel = pool.allocate();
        Context::on_channel(engine, pool, channel)
    }

    /// Like [`Context::new`], calling `backoff` between allocation attempts.
    pub fn new_with_backoff(engine: &'a E, pool: &'a ChannelPool, backoff: impl FnMut()) -> Self {
        let channel = pool.allocate_with(backoff);
        Context::on_channel(engine, pool, channel)
    }

    fn on_channel(engine: &'a E, pool: &'a ChannelPool, channel: Channel) -> Self {
        let mut state = State::zeroed();
        state.swap = Swap::InOut;
        state.channel = channel.index() as u8;
        state.live = true;

        engine.enable();

        Context { engine, pool, state }
    }

    /// The engine channel this context holds.
    pub fn channel(&self) -> Channel {
        Channel::new(self.state.channel as usize)
    }

    /// The size of the current key, if one has been set.
    pub fn key_size(&self) -> Option<KeySize> {
        if self.state.keyed {
            Some(self.state.key_size)
        } else {
            None
        }
    }

    /// Sets the encryption key.
    ///
    /// `bits` must be 128, 192 or 256 and `key` must hold at least `bits / 8` bytes. On error the
    /// previous key stays in effect.
    pub fn set_key_enc(&mut self, key: &[u8], bits: u32) -> Result<()> {
        let key = Key::from_bits(key, bits)?;
        let size = key.size();
        trace!("set key, {} bits", bits);

        self.state.key = [0; MAX_KEY_LEN / WORD_LEN];
        word::pack_be(key.as_slice(), &mut self.state.key[..size.words()]);
        self.state.key_size = size;
        self.state.keyed = true;

        self.engine.set_key(self.channel(), &self.state.key[..size.words()], size);
        Ok(())
    }

    /// Sets the decryption key.
    ///
    /// The engine derives the decryption schedule from the raw key, so this is the same as
    /// [`set_key_enc`](Context::set_key_enc).
    pub fn set_key_dec(&mut self, key: &[u8], bits: u32) -> Result<()> {
        self.set_key_enc(key, bits)
    }

    /// Releases the channel and wipes the context. Equivalent to dropping it.
    pub fn free(self) {}

    fn config(&self) -> Config {
        Config {
            operation: self.state.operation,
            mode: self.state.mode,
            key_size: self.state.key_size,
            swap: self.state.swap,
        }
    }

    fn ensure_keyed(&self) -> Result<()> {
        if self.state.keyed {
            Ok(())
        } else {
            Err(Error::BadInputData)
        }
    }

    fn teardown(&mut self) {
        if self.state.live {
            self.pool.release(self.state.channel as usize);
        }

        wipe(&mut self.state);
    }
}

impl<E: Engine> Drop for Context<'_, E> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use crate::hardware::sim::SimEngine;
    use crate::CHANNELS;
    use super::*;

    const KEY: [u8; 32] = [
        0x60, 0x3d, 0xeb, 0x10, 0x15, 0xca, 0x71, 0xbe,
        0x2b, 0x73, 0xae, 0xf0, 0x85, 0x7d, 0x77, 0x81,
        0x1f, 0x35, 0x2c, 0x07, 0x3b, 0x61, 0x08, 0xd7,
        0x2d, 0x98, 0x10, 0xa3, 0x09, 0x14, 0xdf, 0xf4,
    ];

    fn is_wiped(state: &State) -> bool {
        state.key.iter().all(|&w| w == 0)
            && state.channel == 0
            && !state.live
            && !state.keyed
            && state.key_size as u8 == 0
            && state.operation as u8 == 0
            && state.mode as u8 == 0
            && state.swap as u8 == 0
    }

    #[test]
    fn new_checks_out_channel_and_enables_engine() {
        let engine = SimEngine::new();
        let pool = ChannelPool::new();

        let ctx = Context::new(&engine, &pool);
        assert!(engine.is_enabled());
        assert!(pool.is_busy(ctx.channel().index()));
        assert_eq!(ctx.state.swap, Swap::InOut);
        assert_eq!(ctx.key_size(), None);
    }

    #[test]
    fn set_key_packs_big_endian_words() {
        let engine = SimEngine::new();
        let pool = ChannelPool::new();
        let mut ctx = Context::new(&engine, &pool);

        ctx.set_key_enc(&KEY, 192).unwrap();
        assert_eq!(ctx.key_size(), Some(KeySize::Aes192));
        assert_eq!(&ctx.state.key[..6], &[0x603deb10, 0x15ca71be, 0x2b73aef0, 0x857d7781, 0x1f352c07, 0x3b6108d7]);
        assert_eq!(&ctx.state.key[6..], &[0, 0]);
        assert_eq!(engine.key_registers(ctx.channel()), ctx.state.key);
    }

    #[test]
    fn invalid_key_length_keeps_previous_key() {
        let engine = SimEngine::new();
        let pool = ChannelPool::new();
        let mut ctx = Context::new(&engine, &pool);

        ctx.set_key_enc(&KEY, 256).unwrap();
        let before = ctx.state.key;

        for &bits in &[0, 64, 100, 127, 129, 255, 257, 384] {
            assert_eq!(ctx.set_key_enc(&KEY, bits), Err(Error::InvalidKeyLength));
            assert_eq!(ctx.set_key_dec(&KEY, bits), Err(Error::InvalidKeyLength));
        }
        assert_eq!(ctx.set_key_enc(&KEY[..16], 192), Err(Error::InvalidKeyLength));

        assert_eq!(ctx.state.key, before);
        assert_eq!(ctx.key_size(), Some(KeySize::Aes256));
        assert_eq!(engine.key_registers(ctx.channel()), before);
    }

    #[test]
    fn teardown_wipes_and_releases() {
        let engine = SimEngine::new();
        let pool = ChannelPool::new();
        let mut ctx = Context::new(&engine, &pool);
        ctx.set_key_enc(&KEY, 256).unwrap();
        let channel = ctx.channel();

        ctx.teardown();
        assert!(is_wiped(&ctx.state));
        assert!(!pool.is_busy(channel.index()));

        // A second teardown, as done by drop, must not release a channel it no longer owns.
        let other = pool.allocate();
        assert_eq!(other, channel);
        drop(ctx);
        assert!(pool.is_busy(other.index()));
    }

    #[test]
    fn free_returns_channel_to_pool() {
        let engine = SimEngine::new();
        let pool = ChannelPool::new();

        let contexts: Vec<_> = (0..CHANNELS).map(|_| Context::new(&engine, &pool)).collect();
        assert_eq!(pool.idle(), 0);

        let mut contexts = contexts.into_iter();
        let first = contexts.next().unwrap();
        let channel = first.channel();
        first.free();

        let ctx = Context::new(&engine, &pool);
        assert_eq!(ctx.channel(), channel);
    }

    #[test]
    fn waits_for_a_released_channel() {
        let engine = SimEngine::new();
        let pool = ChannelPool::new();

        let mut held: Vec<_> = (0..CHANNELS).map(|_| Context::new(&engine, &pool)).collect();
        let mut attempts = 0;
        let ctx = Context::new_with_backoff(&engine, &pool, || {
            attempts += 1;
            if attempts == 3 {
                held.pop();
            }
        });

        assert_eq!(attempts, 3);
        assert_eq!(ctx.channel().index(), CHANNELS - 1);
    }
}
