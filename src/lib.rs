//! AES on a DMA-driven, multi-channel crypto engine.
//!
//! This crate substitutes the single-block AES primitive of a cryptographic library with a
//! microcontroller's on-chip crypto engine, and layers the usual block cipher modes on top of it:
//!
//! - ECB ✓
//! - CBC ✓ (chained by the engine)
//! - CFB-128 ✓
//! - CFB-8 ✓
//! - CTR ✓
//!
//! A [`Context`] checks out one of the engine's channels from a [`ChannelPool`] for as long as it
//! lives, holds the key in the word layout the engine's key registers expect, and stages caller
//! buffers that do not satisfy the DMA alignment requirement.
//!
//! The engine itself is reached through the [`Engine`] trait. [`hardware::sim::SimEngine`] models
//! the engine in software on top of the reference cipher in [`aes::simple`].
//!
//! ```
//! use crpt_aes::{ChannelPool, Context, Operation, hardware::sim::SimEngine};
//!
//! let engine = SimEngine::new();
//! let pool = ChannelPool::new();
//!
//! let mut ctx = Context::new(&engine, &pool);
//! ctx.set_key_enc(&[0x2b; 16], 128)?;
//!
//! let mut nonce_counter = [0; 16];
//! let mut stream_block = [0; 16];
//! let mut offset = 0;
//! let mut ciphertext = [0; 5];
//! ctx.crypt_ctr(&mut offset, &mut nonce_counter, &mut stream_block, b"hello", &mut ciphertext)?;
//! # Ok::<(), crpt_aes::Error>(())
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[macro_use] mod util;

pub mod aes;
pub mod context;
pub mod hardware;
pub mod selftest;
pub mod word;

pub use self::aes::{Key, KeySize, BLOCK_LEN};
pub use self::context::{modes, Context};
pub use self::hardware::{Channel, ChannelPool, Engine, Operation, CHANNELS};

use core::fmt;

pub type Result<T> = core::result::Result<T, Error>;

/// Errors reported by the cipher operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// The key is not 128, 192 or 256 bits long.
    InvalidKeyLength,

    /// CBC input is not a whole number of blocks, or input and output lengths differ.
    InvalidInputLength,

    /// No key has been set, or a stream offset is outside the block.
    BadInputData,
}

impl Error {
    /// The numeric code of this error in the host library's convention.
    pub fn code(self) -> i32 {
        match self {
            Error::InvalidKeyLength => -0x0020,
            Error::BadInputData => -0x0021,
            Error::InvalidInputLength => -0x0022,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            Error::InvalidKeyLength => "invalid key length",
            Error::InvalidInputLength => "invalid data input length",
            Error::BadInputData => "bad input data",
        };

        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Anything which can encrypt and decrypt a single AES block.
pub trait BlockCipher {
    /// Encrypts `input` into `output`.
    fn encrypt_block(&mut self, input: &[u8; BLOCK_LEN], output: &mut [u8; BLOCK_LEN]) -> Result<()>;

    /// Decrypts `input` into `output`.
    fn decrypt_block(&mut self, input: &[u8; BLOCK_LEN], output: &mut [u8; BLOCK_LEN]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes() {
        assert_eq!(Error::InvalidKeyLength.code(), -0x20);
        assert_eq!(Error::BadInputData.code(), -0x21);
        assert_eq!(Error::InvalidInputLength.code(), -0x22);
        assert_eq!(Error::InvalidKeyLength.to_string(), "invalid key length");
    }
}
