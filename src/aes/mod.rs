//! Types and operations common to the hardware path and the software reference cipher.
//!
//! This includes keys, key sizes, raw AES blocks and the reference implementation itself.

pub mod block;
pub mod key;
pub mod ops;
pub mod simple;

pub use self::block::{AlignedBlock, Block, BLOCK_LEN};
pub use self::key::{Key, KeySize};

include!(concat!(env!("OUT_DIR"), "/sbox.rs"));
