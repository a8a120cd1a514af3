//! The interface to the on-chip crypto engine.
//!
//! The engine exposes a handful of independent channels. Each channel is configured with a
//! direction, a chaining mode, a key size and a byte-swap mode, loaded with key and IV words, and
//! then fed one DMA transfer at a time. Completion of a transfer is reported by an interrupt,
//! which the interrupt handler forwards to [`Completion::signal`].
//!
//! [`Engine`] is the register-level driver as seen from this crate. [`sim::SimEngine`] is a
//! software model of the engine.

use core::sync::atomic::{AtomicBool, Ordering};

use cfg_if::cfg_if;

use crate::aes::KeySize;
use crate::word::Word;

pub mod channel;
pub mod sim;

pub use self::channel::{Channel, ChannelPool, CHANNELS};

/// The possible AES operations.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Operation {
    /// Produce plaintext from ciphertext
    Decrypt = 0,

    /// Produce ciphertext from plaintext
    Encrypt = 1,
}

/// Chaining modes performed by the engine itself.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Mode {
    /// Electronic codebook
    Ecb = 0,

    /// Cipher block chaining, using the channel's IV registers
    Cbc = 1,
}

/// Byte order applied to each 32-bit word on the engine's DMA path.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Swap {
    /// Words are consumed and produced in register order.
    None = 0,
    /// Output words are byte-reversed.
    Out = 1,
    /// Input words are byte-reversed.
    In = 2,
    /// Both directions are byte-reversed, so memory holds the block in standard byte order.
    InOut = 3,
}

impl Swap {
    pub fn swaps_input(self) -> bool {
        match self {
            Swap::In | Swap::InOut => true,
            Swap::None | Swap::Out => false,
        }
    }

    pub fn swaps_output(self) -> bool {
        match self {
            Swap::Out | Swap::InOut => true,
            Swap::None | Swap::In => false,
        }
    }
}

/// The configuration written to a channel before each transform.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Config {
    pub operation: Operation,
    pub mode: Mode,
    pub key_size: KeySize,
    pub swap: Swap,
}

/// The completion flag raised by the engine's interrupt.
///
/// There is one flag per engine, shared by all channels, so at most one transform may be in
/// flight per engine. A driver claims the engine with [`Completion::begin`], which waits for any
/// other transform to finish and clears the flag, and holds the returned [`Transfer`] until it has
/// consumed the output.
#[derive(Debug, Default)]
pub struct Completion {
    done: AtomicBool,
    claimed: AtomicBool,
}

impl Completion {
    pub const fn new() -> Self {
        Completion {
            done: AtomicBool::new(false),
            claimed: AtomicBool::new(false),
        }
    }

    pub fn clear(&self) {
        self.done.store(false, Ordering::Release);
    }

    /// Marks the current transform as finished. Called from the engine's interrupt handler.
    pub fn signal(&self) {
        self.done.store(true, Ordering::Release);
    }

    pub fn is_signalled(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Spins until the flag is signalled.
    ///
    /// There is no timeout: if the engine never raises its interrupt this never returns.
    pub fn wait(&self) {
        while !self.is_signalled() {
            core::hint::spin_loop();
        }
    }

    /// Claims the engine for one transform and clears the flag.
    ///
    /// Waits, yielding like [`ChannelPool::allocate`], while another transform holds the claim.
    pub fn begin(&self) -> Transfer<'_> {
        while self.claimed
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            relax();
        }

        self.clear();
        Transfer { completion: self }
    }

    /// Whether a transform currently holds the engine.
    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }
}

/// Exclusive use of the engine for one transform. Dropping it lets the next transform start.
#[derive(Debug)]
pub struct Transfer<'a> {
    completion: &'a Completion,
}

impl Transfer<'_> {
    /// Spins until this transform signals completion. See [`Completion::wait`].
    pub fn wait(&self) {
        self.completion.wait();
    }
}

impl Drop for Transfer<'_> {
    fn drop(&mut self) {
        self.completion.claimed.store(false, Ordering::Release);
    }
}

cfg_if! {
    if #[cfg(any(test, feature = "std"))] {
        pub(crate) fn relax() {
            std::thread::yield_now();
        }
    } else {
        pub(crate) fn relax() {
            core::hint::spin_loop();
        }
    }
}

/// Register-level access to the crypto engine.
///
/// Methods take `&self` like peripheral register blocks do. Implementations shared between
/// threads must be `Sync` and keep each register access atomic. Whole transforms are serialized
/// by the driver through [`Completion::begin`], so only one transform is in flight per engine
/// across all contexts.
pub trait Engine {
    /// Enables the engine clock and unmasks its completion interrupt.
    fn enable(&self);

    /// Writes the control register of `channel`.
    fn open(&self, channel: Channel, config: Config);

    /// Loads the key registers of `channel`. `key` holds `size.words()` big-endian words.
    fn set_key(&self, channel: Channel, key: &[Word], size: KeySize);

    /// Loads the IV registers of `channel`.
    fn set_init_vect(&self, channel: Channel, iv: &[Word; 4]);

    /// Programs the DMA descriptor of `channel`.
    ///
    /// # Safety
    ///
    /// `src` must be valid for reads and `dst` valid for writes of `len` bytes, both aligned to
    /// [`DMA_ALIGN`](crate::word::DMA_ALIGN), until the transform started on this descriptor has
    /// signalled completion.
    unsafe fn set_dma_transfer(&self, channel: Channel, src: *const Word, dst: *mut Word, len: usize);

    /// Triggers a one-shot transform of the programmed DMA descriptor.
    fn start(&self, channel: Channel);

    /// The completion flag set by this engine's interrupt handler.
    fn completion(&self) -> &Completion;
}
