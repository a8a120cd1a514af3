//! A software model of the crypto engine.
//!
//! The model keeps per-channel control, key, IV and DMA registers and performs each transform
//! synchronously inside [`Engine::start`], signalling completion before returning. Data moves
//! through the same word-oriented path as on silicon:
//!
//! - DMA reads and writes memory bytes. Unless the input (output) swap is configured, the engine
//!   sees (produces) every 32-bit word byte-reversed.
//! - Key and IV registers hold big-endian words: the first byte of the key or IV is the most
//!   significant byte of register 0.
//!
//! Faults that would hang or corrupt real hardware, such as a misaligned DMA address or starting
//! an unconfigured channel, panic.

use core::cell::{Cell, RefCell};
use core::ptr;

use crate::aes::{ops::Aes, simple::Schedule, Block, Key, KeySize, BLOCK_LEN};
use crate::aes::key::MAX_KEY_LEN;
use crate::hardware::{Channel, Completion, Config, Engine, Mode, Operation, CHANNELS};
use crate::word::{self, Word, WORD_LEN};

#[derive(Clone, Copy)]
struct Dma {
    src: *const Word,
    dst: *mut Word,
    len: usize,
}

#[derive(Clone, Copy, Default)]
struct Registers {
    control: Option<Config>,
    key: [Word; MAX_KEY_LEN / WORD_LEN],
    iv: [Word; 4],
    dma: Option<Dma>,
}

impl Registers {
    fn schedule(&self, size: KeySize) -> Schedule {
        let mut bytes = [0u8; MAX_KEY_LEN];
        for (chunk, word) in bytes.chunks_exact_mut(WORD_LEN).zip(self.key.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }

        let key = match Key::from_bits(&bytes, size.bits()) {
            Ok(key) => key,
            Err(_) => unreachable!("every key size fits the key registers"),
        };

        Schedule::from(key)
    }

    fn iv(&self) -> Block {
        let mut block = Block::default();
        for (chunk, word) in block.0.chunks_exact_mut(WORD_LEN).zip(self.iv.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }

        block
    }
}

/// A crypto engine emulated in software.
pub struct SimEngine {
    channels: RefCell<[Registers; CHANNELS]>,
    completion: Completion,
    enabled: Cell<bool>,
    transforms: Cell<usize>,
}

impl Default for SimEngine {
    fn default() -> Self {
        SimEngine::new()
    }
}

impl SimEngine {
    pub fn new() -> Self {
        SimEngine {
            channels: RefCell::new([Registers::default(); CHANNELS]),
            completion: Completion::new(),
            enabled: Cell::new(false),
            transforms: Cell::new(0),
        }
    }

    /// Whether [`Engine::enable`] has been called.
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// The number of transforms started so far, across all channels.
    pub fn transforms(&self) -> usize {
        self.transforms.get()
    }

    /// The current contents of the key registers of `channel`.
    pub fn key_registers(&self, channel: Channel) -> [Word; MAX_KEY_LEN / WORD_LEN] {
        self.channels.borrow()[channel.index()].key
    }

    fn transform(config: Config, regs: &Registers, block: &mut Block) {
        let sched = regs.schedule(config.key_size);
        let round_keys = sched.as_slice();

        match (config.mode, config.operation) {
            (Mode::Ecb, Operation::Encrypt) => block.encrypt(round_keys),
            (Mode::Ecb, Operation::Decrypt) => block.decrypt(round_keys),
            (Mode::Cbc, Operation::Encrypt) => {
                *block ^= &regs.iv();
                block.encrypt(round_keys);
            }
            (Mode::Cbc, Operation::Decrypt) => {
                block.decrypt(round_keys);
                *block ^= &regs.iv();
            }
        }
    }
}

impl Engine for SimEngine {
    fn enable(&self) {
        self.enabled.set(true);
    }

    fn open(&self, channel: Channel, config: Config) {
        self.channels.borrow_mut()[channel.index()].control = Some(config);
    }

    fn set_key(&self, channel: Channel, key: &[Word], size: KeySize) {
        assert_eq!(key.len(), size.words(), "key length does not match key size");

        let mut channels = self.channels.borrow_mut();
        let regs = &mut channels[channel.index()];
        regs.key = Default::default();
        regs.key[..key.len()].copy_from_slice(key);
    }

    fn set_init_vect(&self, channel: Channel, iv: &[Word; 4]) {
        self.channels.borrow_mut()[channel.index()].iv = *iv;
    }

    unsafe fn set_dma_transfer(&self, channel: Channel, src: *const Word, dst: *mut Word, len: usize) {
        assert!(word::is_dma_aligned(src as *const u8), "DMA source {:p} is not word aligned", src);
        assert!(word::is_dma_aligned(dst as *const u8), "DMA destination {:p} is not word aligned", dst);

        self.channels.borrow_mut()[channel.index()].dma = Some(Dma { src, dst, len });
    }

    fn start(&self, channel: Channel) {
        assert!(self.is_enabled(), "engine clock is disabled");

        let regs = self.channels.borrow()[channel.index()];
        let config = match regs.control {
            Some(config) => config,
            None => panic!("channel {} started before it was opened", channel.index()),
        };
        let dma = match regs.dma {
            Some(dma) => dma,
            None => panic!("channel {} started without a DMA descriptor", channel.index()),
        };
        assert_eq!(dma.len, BLOCK_LEN, "one-shot transfers move exactly one block");

        let mut block = Block::default();
        unsafe { ptr::copy(dma.src as *const u8, block.0.as_mut_ptr(), BLOCK_LEN) };
        if !config.swap.swaps_input() {
            word::swap_words(&mut block.0);
        }

        SimEngine::transform(config, &regs, &mut block);

        if !config.swap.swaps_output() {
            word::swap_words(&mut block.0);
        }
        unsafe { ptr::copy(block.0.as_ptr(), dma.dst as *mut u8, BLOCK_LEN) };

        self.transforms.set(self.transforms.get() + 1);
        self.completion.signal();
    }

    fn completion(&self) -> &Completion {
        &self.completion
    }
}

#[cfg(test)]
mod tests {
    use crate::aes::AlignedBlock;
    use crate::hardware::{ChannelPool, Swap};
    use crate::util::test::{hex_block, hex_to_bytes};
    use super::*;

    const KEY: &str = "000102030405060708090a0b0c0d0e0f";
    const PLAIN: &str = "00112233445566778899aabbccddeeff";
    const CIPHER: &str = "69c4e0d86a7b0430d8cdb78070b4c55a";

    fn keyed_channel(engine: &SimEngine, pool: &ChannelPool) -> Channel {
        let channel = pool.allocate();
        let mut words = [0; 4];
        word::pack_be(&hex_to_bytes(KEY), &mut words);

        engine.enable();
        engine.set_key(channel, &words, KeySize::Aes128);
        channel
    }

    fn run(engine: &SimEngine, channel: Channel, config: Config, input: &AlignedBlock) -> AlignedBlock {
        let mut output = AlignedBlock::default();

        engine.open(channel, config);
        engine.completion().clear();
        unsafe { engine.set_dma_transfer(channel, input.as_word_ptr(), output.as_mut_word_ptr(), BLOCK_LEN) };
        engine.start(channel);
        assert!(engine.completion().is_signalled());

        output
    }

    fn ecb(operation: Operation, swap: Swap) -> Config {
        Config { operation, mode: Mode::Ecb, key_size: KeySize::Aes128, swap }
    }

    #[test]
    fn in_out_swap_is_standard_byte_order() {
        let engine = SimEngine::new();
        let pool = ChannelPool::new();
        let channel = keyed_channel(&engine, &pool);

        let input = AlignedBlock(hex_block(PLAIN));
        let output = run(&engine, channel, ecb(Operation::Encrypt, Swap::InOut), &input);
        assert_eq!(output.0, hex_block(CIPHER));

        let back = run(&engine, channel, ecb(Operation::Decrypt, Swap::InOut), &output);
        assert_eq!(back.0, input.0);
        assert_eq!(engine.transforms(), 2);
    }

    #[test]
    fn no_swap_reverses_every_word() {
        let engine = SimEngine::new();
        let pool = ChannelPool::new();
        let channel = keyed_channel(&engine, &pool);

        let mut input = AlignedBlock(hex_block(PLAIN));
        word::swap_words(&mut input.0);
        let mut output = run(&engine, channel, ecb(Operation::Encrypt, Swap::None), &input);
        word::swap_words(&mut output.0);

        assert_eq!(output.0, hex_block(CIPHER));
    }

    #[test]
    fn cbc_xors_iv_registers() {
        let engine = SimEngine::new();
        let pool = ChannelPool::new();
        let channel = keyed_channel(&engine, &pool);

        // With an all-zero plaintext the CBC input is the IV itself.
        let mut iv = [0; 4];
        word::pack_be(&hex_to_bytes(PLAIN), &mut iv);
        engine.set_init_vect(channel, &iv);

        let config = Config { mode: Mode::Cbc, ..ecb(Operation::Encrypt, Swap::InOut) };
        let output = run(&engine, channel, config, &AlignedBlock::default());
        assert_eq!(output.0, hex_block(CIPHER));

        let config = Config { operation: Operation::Decrypt, ..config };
        let back = run(&engine, channel, config, &output);
        assert_eq!(back.0, [0; 16]);
    }

    #[test]
    fn channels_keep_separate_keys() {
        let engine = SimEngine::new();
        let pool = ChannelPool::new();
        let first = keyed_channel(&engine, &pool);
        let second = pool.allocate();
        engine.set_key(second, &[0; 8], KeySize::Aes256);

        assert_eq!(engine.key_registers(first)[..4], [0x00010203, 0x04050607, 0x08090a0b, 0x0c0d0e0f]);
        assert_eq!(engine.key_registers(second), [0; 8]);
    }

    #[test]
    #[should_panic(expected = "not word aligned")]
    fn rejects_misaligned_dma() {
        let engine = SimEngine::new();
        let pool = ChannelPool::new();
        let channel = keyed_channel(&engine, &pool);

        let buf = [AlignedBlock::default(); 2];
        let src = unsafe { (buf[0].0.as_ptr()).add(1) } as *const Word;
        let mut out = AlignedBlock::default();
        unsafe { engine.set_dma_transfer(channel, src, out.as_mut_word_ptr(), BLOCK_LEN) };
    }

    #[test]
    #[should_panic(expected = "before it was opened")]
    fn start_requires_open() {
        let engine = SimEngine::new();
        let pool = ChannelPool::new();
        let channel = keyed_channel(&engine, &pool);
        engine.start(channel);
    }
}
