//! Block cipher modes of operation.
//!
//! ECB and CBC run on the engine's own chaining modes. The stream modes (CFB-128, CFB-8 and CTR)
//! only ever encrypt: the keystream comes from encrypting the IV or counter, whichever direction
//! the caller is going. They are written against [`BlockCipher`] and work with any single-block
//! cipher.
//!
//! Every mode updates its chaining state in place, so a long message may be processed across
//! several calls.

use crate::aes::BLOCK_LEN;
use crate::hardware::{Engine, Mode, Operation};
use crate::word;
use crate::{BlockCipher, Error, Result};

use super::Context;

fn check_lengths(input: &[u8], output: &[u8]) -> Result<()> {
    if input.len() == output.len() {
        Ok(())
    } else {
        Err(Error::InvalidInputLength)
    }
}

fn check_offset(offset: usize) -> Result<()> {
    if offset < BLOCK_LEN {
        Ok(())
    } else {
        Err(Error::BadInputData)
    }
}

/// Increments a 16-byte big-endian counter, wrapping from all ones to all zeros.
pub fn increment_counter(counter: &mut [u8; BLOCK_LEN]) {
    for byte in counter.iter_mut().rev() {
        *byte = byte.wrapping_add(1);
        if *byte != 0 {
            break;
        }
    }
}

/// CFB-128 over `input`, starting `iv_off` bytes into the current keystream block.
///
/// `iv` holds the feedback register and `iv_off` the position in it. Both are advanced for the
/// next call.
pub fn cfb128<C: BlockCipher + ?Sized>(
    cipher: &mut C,
    operation: Operation,
    iv_off: &mut usize,
    iv: &mut [u8; BLOCK_LEN],
    input: &[u8],
    output: &mut [u8],
) -> Result<()> {
    check_lengths(input, output)?;
    check_offset(*iv_off)?;

    let mut n = *iv_off;
    for (&c, out) in input.iter().zip(output.iter_mut()) {
        if n == 0 {
            let feedback = *iv;
            cipher.encrypt_block(&feedback, iv)?;
        }

        match operation {
            Operation::Encrypt => {
                iv[n] ^= c;
                *out = iv[n];
            }
            Operation::Decrypt => {
                *out = iv[n] ^ c;
                iv[n] = c;
            }
        }

        n = (n + 1) % BLOCK_LEN;
    }

    *iv_off = n;
    Ok(())
}

/// CFB-8 over `input`. Costs one block encryption per byte.
pub fn cfb8<C: BlockCipher + ?Sized>(
    cipher: &mut C,
    operation: Operation,
    iv: &mut [u8; BLOCK_LEN],
    input: &[u8],
    output: &mut [u8],
) -> Result<()> {
    check_lengths(input, output)?;

    let mut keystream = [0; BLOCK_LEN];
    for (&c, out) in input.iter().zip(output.iter_mut()) {
        cipher.encrypt_block(iv, &mut keystream)?;
        *out = keystream[0] ^ c;

        let feedback = match operation {
            Operation::Encrypt => *out,
            Operation::Decrypt => c,
        };

        // Shift IV by a byte.
        iv.copy_within(1.., 0);
        iv[BLOCK_LEN - 1] = feedback;
    }

    Ok(())
}

/// CTR over `input`, starting `nc_off` bytes into `stream_block`.
///
/// `nonce_counter` is encrypted into `stream_block` and incremented whenever a fresh keystream
/// block is needed. All three are advanced for the next call.
pub fn ctr<C: BlockCipher + ?Sized>(
    cipher: &mut C,
    nc_off: &mut usize,
    nonce_counter: &mut [u8; BLOCK_LEN],
    stream_block: &mut [u8; BLOCK_LEN],
    input: &[u8],
    output: &mut [u8],
) -> Result<()> {
    check_lengths(input, output)?;
    check_offset(*nc_off)?;

    let mut n = *nc_off;
    for (&c, out) in input.iter().zip(output.iter_mut()) {
        if n == 0 {
            cipher.encrypt_block(nonce_counter, stream_block)?;
            increment_counter(nonce_counter);
        }

        *out = c ^ stream_block[n];
        n = (n + 1) % BLOCK_LEN;
    }

    *nc_off = n;
    Ok(())
}

impl<'a, E: Engine> Context<'a, E> {
    /// Encrypts or decrypts a single block in ECB mode.
    pub fn crypt_ecb(
        &mut self,
        operation: Operation,
        input: &[u8; BLOCK_LEN],
        output: &mut [u8; BLOCK_LEN],
    ) -> Result<()> {
        match operation {
            Operation::Encrypt => self.encrypt(input, output),
            Operation::Decrypt => self.decrypt(input, output),
        }
    }

    /// Encrypts or decrypts whole blocks in CBC mode, chained by the engine.
    ///
    /// `iv` is read for the first block and left holding the IV for the next call. It is kept in
    /// engine word order: each 32-bit word byte-reversed with respect to the standard IV. Convert
    /// with [`word::swap_words`] when starting a message or when handing the chaining value to
    /// another implementation.
    ///
    /// Fails with [`Error::InvalidInputLength`] without touching the engine unless `input` is a
    /// whole number of blocks.
    pub fn crypt_cbc(
        &mut self,
        operation: Operation,
        iv: &mut [u8; BLOCK_LEN],
        input: &[u8],
        output: &mut [u8],
    ) -> Result<()> {
        if input.len() % BLOCK_LEN != 0 {
            return Err(Error::InvalidInputLength);
        }
        check_lengths(input, output)?;

        let blocks = input.chunks_exact(BLOCK_LEN).zip(output.chunks_exact_mut(BLOCK_LEN));
        for (src, dst) in blocks {
            let src = slice_as_array_ref!(src, BLOCK_LEN).map_err(|()| Error::InvalidInputLength)?;
            let dst = slice_as_array_mut!(dst, BLOCK_LEN).map_err(|()| Error::InvalidInputLength)?;

            match operation {
                Operation::Encrypt => {
                    self.transform(Operation::Encrypt, Mode::Cbc, iv, src, dst)?;
                    *iv = *dst;
                }
                Operation::Decrypt => {
                    let ciphertext = *src;
                    self.transform(Operation::Decrypt, Mode::Cbc, iv, src, dst)?;
                    *iv = ciphertext;
                }
            }

            // The IV registers load words in memory order; keep the next IV in engine word order.
            word::swap_words(iv);
        }

        Ok(())
    }

    /// Encrypts or decrypts in CFB-128 mode. See [`cfb128`].
    pub fn crypt_cfb128(
        &mut self,
        operation: Operation,
        iv_off: &mut usize,
        iv: &mut [u8; BLOCK_LEN],
        input: &[u8],
        output: &mut [u8],
    ) -> Result<()> {
        cfb128(self, operation, iv_off, iv, input, output)
    }

    /// Encrypts or decrypts in CFB-8 mode. See [`cfb8`].
    pub fn crypt_cfb8(
        &mut self,
        operation: Operation,
        iv: &mut [u8; BLOCK_LEN],
        input: &[u8],
        output: &mut [u8],
    ) -> Result<()> {
        cfb8(self, operation, iv, input, output)
    }

    /// Encrypts or decrypts in CTR mode. See [`ctr`].
    pub fn crypt_ctr(
        &mut self,
        nc_off: &mut usize,
        nonce_counter: &mut [u8; BLOCK_LEN],
        stream_block: &mut [u8; BLOCK_LEN],
        input: &[u8],
        output: &mut [u8],
    ) -> Result<()> {
        ctr(self, nc_off, nonce_counter, stream_block, input, output)
    }
}
