//! Conversions between byte buffers and the engine's 32-bit register words.
//!
//! The engine is programmed one word at a time. Key registers expect each word in big-endian
//! order. The IV registers are loaded straight from memory, which on the little-endian targets
//! this crate is written for means byte 0 of each word lands in the low bits.

use crate::aes::BLOCK_LEN;

/// The width of one engine register and of one DMA beat.
pub type Word = u32;

/// Bytes per [`Word`].
pub const WORD_LEN: usize = core::mem::size_of::<Word>();

/// Required alignment of DMA source and destination addresses.
pub const DMA_ALIGN: usize = core::mem::align_of::<Word>();

/// Returns `true` if the engine's DMA can read or write at `ptr` directly.
pub fn is_dma_aligned(ptr: *const u8) -> bool {
    ptr as usize % DMA_ALIGN == 0
}

/// Packs bytes into big-endian words. `bytes.len()` must equal `WORD_LEN * words.len()`.
pub fn pack_be(bytes: &[u8], words: &mut [Word]) {
    debug_assert_eq!(bytes.len(), WORD_LEN * words.len());

    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(WORD_LEN)) {
        *word = Word::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
}

/// Loads a block as the engine's IV registers see it: native little-endian words.
pub fn load_le(block: &[u8; BLOCK_LEN]) -> [Word; 4] {
    let mut words = [0; 4];
    for (word, chunk) in words.iter_mut().zip(block.chunks_exact(WORD_LEN)) {
        *word = Word::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    words
}

/// Reverses the bytes of each 32-bit word of a block in place.
///
/// Converts a block between standard byte order and engine word order. The operation is its own
/// inverse.
pub fn swap_words(block: &mut [u8; BLOCK_LEN]) {
    for word in block.chunks_exact_mut(WORD_LEN) {
        word.reverse();
    }
}
