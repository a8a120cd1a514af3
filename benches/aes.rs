#![feature(test)]

extern crate test;
extern crate crpt_aes;

use crpt_aes as aes;

use self::aes::hardware::sim::SimEngine;
use self::aes::{word, ChannelPool, Context, Operation, BLOCK_LEN};

const KEY: [u8; 16] = [
    0xff, 0xef, 0xdf, 0xcf,
    0xb8, 0xa8, 0x98, 0x88,
    0x7f, 0x6f, 0x5f, 0x4f,
    0x30, 0x20, 0x10, 0x00,
];

fn data() -> [u8; 8192] {
    let mut data = [0u8; 8192];
    for (i, s) in data.chunks_exact_mut(2).enumerate() {
        s[0] = (i % 0xff) as u8;
        s[1] = (i / 0xff) as u8;
    }

    data
}

fn mode<F>(b: &mut test::Bencher, mut run: F)
    where F: FnMut(&mut Context<'_, SimEngine>, &[u8], &mut [u8])
{
    let engine = SimEngine::new();
    let pool = ChannelPool::new();
    let mut ctx = Context::new(&engine, &pool);
    ctx.set_key_enc(&KEY, 128).unwrap();

    let input = data();
    let mut output = [0u8; 8192];

    b.bytes = input.len() as u64;
    b.iter(|| {
        run(&mut ctx, test::black_box(&input[..]), &mut output[..]);
        test::black_box(&output);
    });
}

#[bench]
fn ecb(b: &mut test::Bencher) {
    mode(b, |ctx, input, output| {
        for (src, dst) in input.chunks_exact(BLOCK_LEN).zip(output.chunks_exact_mut(BLOCK_LEN)) {
            let mut block = [0; BLOCK_LEN];
            block.copy_from_slice(src);
            let mut out = [0; BLOCK_LEN];
            ctx.crypt_ecb(Operation::Encrypt, &block, &mut out).unwrap();
            dst.copy_from_slice(&out);
        }
    });
}

#[bench]
fn cbc(b: &mut test::Bencher) {
    mode(b, |ctx, input, output| {
        let mut iv = [0; BLOCK_LEN];
        word::swap_words(&mut iv);
        ctx.crypt_cbc(Operation::Encrypt, &mut iv, input, output).unwrap();
    });
}

#[bench]
fn cfb128(b: &mut test::Bencher) {
    mode(b, |ctx, input, output| {
        let (mut iv, mut off) = ([0; BLOCK_LEN], 0);
        ctx.crypt_cfb128(Operation::Encrypt, &mut off, &mut iv, input, output).unwrap();
    });
}

#[bench]
fn cfb8(b: &mut test::Bencher) {
    mode(b, |ctx, input, output| {
        let mut iv = [0; BLOCK_LEN];
        ctx.crypt_cfb8(Operation::Encrypt, &mut iv, input, output).unwrap();
    });
}

#[bench]
fn ctr(b: &mut test::Bencher) {
    mode(b, |ctx, input, output| {
        let (mut counter, mut stream, mut off) = ([0; BLOCK_LEN], [0; BLOCK_LEN], 0);
        ctx.crypt_ctr(&mut off, &mut counter, &mut stream, input, output).unwrap();
    });
}
