//! Single-block transforms through the engine.

use crate::aes::{AlignedBlock, BLOCK_LEN};
use crate::hardware::{Engine, Mode, Operation};
use crate::util::Hex;
use crate::word::{self, Word};
use crate::{BlockCipher, Result};

use super::Context;

/// The IV loaded for transforms that do not chain.
const DEFAULT_IV: [u8; BLOCK_LEN] = [0; BLOCK_LEN];

impl<'a, E: Engine> Context<'a, E> {
    /// Encrypts a single block in ECB mode.
    pub fn encrypt(&mut self, input: &[u8; BLOCK_LEN], output: &mut [u8; BLOCK_LEN]) -> Result<()> {
        self.transform(Operation::Encrypt, Mode::Ecb, &DEFAULT_IV, input, output)
    }

    /// Decrypts a single block in ECB mode.
    pub fn decrypt(&mut self, input: &[u8; BLOCK_LEN], output: &mut [u8; BLOCK_LEN]) -> Result<()> {
        self.transform(Operation::Decrypt, Mode::Ecb, &DEFAULT_IV, input, output)
    }

    /// Runs one block through the engine with the given direction, mode and IV.
    ///
    /// Caller buffers are handed to the DMA as they are when word aligned. Otherwise they are
    /// staged through aligned copies on the stack. The engine is claimed from programming the
    /// channel until the output has been copied back, so contexts on other threads wait their
    /// turn. The completion wait has no timeout.
    pub(super) fn transform(
        &mut self,
        operation: Operation,
        mode: Mode,
        iv: &[u8; BLOCK_LEN],
        input: &[u8; BLOCK_LEN],
        output: &mut [u8; BLOCK_LEN],
    ) -> Result<()> {
        self.ensure_keyed()?;
        self.state.operation = operation;
        self.state.mode = mode;

        let engine = self.engine;
        let channel = self.channel();
        let transfer = engine.completion().begin();
        engine.open(channel, self.config());
        engine.set_init_vect(channel, &word::load_le(iv));

        trace!("{:?} {:?} ch{} in  {}", operation, mode, channel.index(), Hex(input));

        let staged_input = if word::is_dma_aligned(input.as_ptr()) {
            None
        } else {
            Some(AlignedBlock::copy_of(input))
        };
        let src = match &staged_input {
            Some(staged) => staged.as_word_ptr(),
            None => input.as_ptr() as *const Word,
        };

        let mut staged_output = if word::is_dma_aligned(output.as_ptr()) {
            None
        } else {
            Some(AlignedBlock::default())
        };
        let dst = match &mut staged_output {
            Some(staged) => staged.as_mut_word_ptr(),
            None => output.as_mut_ptr() as *mut Word,
        };

        unsafe { engine.set_dma_transfer(channel, src, dst, BLOCK_LEN) };
        engine.start(channel);
        transfer.wait();

        if let Some(staged) = staged_output {
            *output = staged.0;
        }
        drop(transfer);

        trace!("{:?} {:?} ch{} out {}", operation, mode, channel.index(), Hex(output));
        Ok(())
    }
}

impl<E: Engine> BlockCipher for Context<'_, E> {
    fn encrypt_block(&mut self, input: &[u8; BLOCK_LEN], output: &mut [u8; BLOCK_LEN]) -> Result<()> {
        self.encrypt(input, output)
    }

    fn decrypt_block(&mut self, input: &[u8; BLOCK_LEN], output: &mut [u8; BLOCK_LEN]) -> Result<()> {
        self.decrypt(input, output)
    }
}
