//! Known-answer tests run through a live context.
//!
//! Meant to be run once at start-up against the real engine. Vectors are from FIPS-197 appendix C
//! and NIST SP 800-38A appendix F.

use core::fmt;

use crate::aes::BLOCK_LEN;
use crate::context::Context;
use crate::hardware::{ChannelPool, Engine, Operation};
use crate::word;

/// The name of the first known-answer test which did not match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Failure {
    pub test: &'static str,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AES self test failed: {}", self.test)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Failure {}

const FIPS_PLAIN: [u8; 16] = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77,
    0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
];

const FIPS_KEY: [u8; 32] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
    0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
    0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17,
    0x18, 0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f,
];

const FIPS_ECB: [(&str, u32, [u8; 16]); 3] = [
    ("ecb-128", 128, [
        0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30,
        0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4, 0xc5, 0x5a,
    ]),
    ("ecb-192", 192, [
        0xdd, 0xa9, 0x7c, 0xa4, 0x86, 0x4c, 0xdf, 0xe0,
        0x6e, 0xaf, 0x70, 0xa0, 0xec, 0x0d, 0x71, 0x91,
    ]),
    ("ecb-256", 256, [
        0x8e, 0xa2, 0xb7, 0xca, 0x51, 0x67, 0x45, 0xbf,
        0xea, 0xfc, 0x49, 0x90, 0x4b, 0x49, 0x60, 0x89,
    ]),
];

const SP_KEY: [u8; 16] = [
    0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6,
    0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f, 0x3c,
];

const SP_IV: [u8; 16] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07,
    0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
];

const SP_COUNTER: [u8; 16] = [
    0xf0, 0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7,
    0xf8, 0xf9, 0xfa, 0xfb, 0xfc, 0xfd, 0xfe, 0xff,
];

const SP_PLAIN: [u8; 32] = [
    0x6b, 0xc1, 0xbe, 0xe2, 0x2e, 0x40, 0x9f, 0x96,
    0xe9, 0x3d, 0x7e, 0x11, 0x73, 0x93, 0x17, 0x2a,
    0xae, 0x2d, 0x8a, 0x57, 0x1e, 0x03, 0xac, 0x9c,
    0x9e, 0xb7, 0x6f, 0xac, 0x45, 0xaf, 0x8e, 0x51,
];

const SP_CBC: [u8; 32] = [
    0x76, 0x49, 0xab, 0xac, 0x81, 0x19, 0xb2, 0x46,
    0xce, 0xe9, 0x8e, 0x9b, 0x12, 0xe9, 0x19, 0x7d,
    0x50, 0x86, 0xcb, 0x9b, 0x50, 0x72, 0x19, 0xee,
    0x95, 0xdb, 0x11, 0x3a, 0x91, 0x76, 0x78, 0xb2,
];

const SP_CFB128: [u8; 32] = [
    0x3b, 0x3f, 0xd9, 0x2e, 0xb7, 0x2d, 0xad, 0x20,
    0x33, 0x34, 0x49, 0xf8, 0xe8, 0x3c, 0xfb, 0x4a,
    0xc8, 0xa6, 0x45, 0x37, 0xa0, 0xb3, 0xa9, 0x3f,
    0xcd, 0xe3, 0xcd, 0xad, 0x9f, 0x1c, 0xe5, 0x8b,
];

const SP_CFB8: [u8; 18] = [
    0x3b, 0x79, 0x42, 0x4c, 0x9c, 0x0d, 0xd4, 0x36,
    0xba, 0xce, 0x9e, 0x0e, 0xd4, 0x58, 0x6a, 0x4f,
    0x32, 0xb9,
];

const SP_CTR: [u8; 32] = [
    0x87, 0x4d, 0x61, 0x91, 0xb6, 0x20, 0xe3, 0x26,
    0x1b, 0xef, 0x68, 0x64, 0x99, 0x0d, 0xb6, 0xce,
    0x98, 0x06, 0xf6, 0x6b, 0x79, 0x70, 0xfd, 0xff,
    0x86, 0x17, 0x18, 0x7b, 0xb9, 0xff, 0xfd, 0xff,
];

fn check(test: &'static str, ok: bool) -> Result<(), Failure> {
    if ok {
        Ok(())
    } else {
        warn!("self test {} failed", test);
        Err(Failure { test })
    }
}

/// Runs every known-answer test in both directions on one context from `pool`.
///
/// Like [`Context::new`], this waits for an idle channel.
pub fn run<E: Engine>(engine: &E, pool: &ChannelPool) -> Result<(), Failure> {
    let mut ctx = Context::new(engine, pool);

    for &(test, bits, ref expected) in FIPS_ECB.iter() {
        let failed = Failure { test };
        ctx.set_key_enc(&FIPS_KEY, bits).map_err(|_| failed)?;

        let mut out = [0; BLOCK_LEN];
        ctx.crypt_ecb(Operation::Encrypt, &FIPS_PLAIN, &mut out).map_err(|_| failed)?;
        check(test, out == *expected)?;

        let mut back = [0; BLOCK_LEN];
        ctx.crypt_ecb(Operation::Decrypt, &out, &mut back).map_err(|_| failed)?;
        check(test, back == FIPS_PLAIN)?;
    }

    ctx.set_key_enc(&SP_KEY, 128).map_err(|_| Failure { test: "sp800-38a key" })?;

    cbc(&mut ctx)?;
    cfb128(&mut ctx)?;
    cfb8(&mut ctx)?;
    ctr(&mut ctx)?;

    debug!("self test passed on channel {}", ctx.channel().index());
    Ok(())
}

fn cbc<E: Engine>(ctx: &mut Context<'_, E>) -> Result<(), Failure> {
    const TEST: &str = "cbc-128";
    let failed = Failure { test: TEST };

    let mut iv = SP_IV;
    word::swap_words(&mut iv);
    let mut out = [0; 32];
    ctx.crypt_cbc(Operation::Encrypt, &mut iv, &SP_PLAIN, &mut out).map_err(|_| failed)?;
    check(TEST, out == SP_CBC)?;

    let mut iv = SP_IV;
    word::swap_words(&mut iv);
    let mut back = [0; 32];
    ctx.crypt_cbc(Operation::Decrypt, &mut iv, &out, &mut back).map_err(|_| failed)?;
    check(TEST, back == SP_PLAIN)
}

fn cfb128<E: Engine>(ctx: &mut Context<'_, E>) -> Result<(), Failure> {
    const TEST: &str = "cfb128-128";
    let failed = Failure { test: TEST };

    let (mut iv, mut off) = (SP_IV, 0);
    let mut out = [0; 32];
    ctx.crypt_cfb128(Operation::Encrypt, &mut off, &mut iv, &SP_PLAIN, &mut out).map_err(|_| failed)?;
    check(TEST, out == SP_CFB128)?;

    let (mut iv, mut off) = (SP_IV, 0);
    let mut back = [0; 32];
    ctx.crypt_cfb128(Operation::Decrypt, &mut off, &mut iv, &out, &mut back).map_err(|_| failed)?;
    check(TEST, back == SP_PLAIN)
}

fn cfb8<E: Engine>(ctx: &mut Context<'_, E>) -> Result<(), Failure> {
    const TEST: &str = "cfb8-128";
    let failed = Failure { test: TEST };
    let plain = &SP_PLAIN[..SP_CFB8.len()];

    let mut iv = SP_IV;
    let mut out = [0; 18];
    ctx.crypt_cfb8(Operation::Encrypt, &mut iv, plain, &mut out).map_err(|_| failed)?;
    check(TEST, out == SP_CFB8)?;

    let mut iv = SP_IV;
    let mut back = [0; 18];
    ctx.crypt_cfb8(Operation::Decrypt, &mut iv, &out, &mut back).map_err(|_| failed)?;
    check(TEST, back[..] == *plain)
}

fn ctr<E: Engine>(ctx: &mut Context<'_, E>) -> Result<(), Failure> {
    const TEST: &str = "ctr-128";
    let failed = Failure { test: TEST };

    let (mut counter, mut stream, mut off) = (SP_COUNTER, [0; BLOCK_LEN], 0);
    let mut out = [0; 32];
    ctx.crypt_ctr(&mut off, &mut counter, &mut stream, &SP_PLAIN, &mut out).map_err(|_| failed)?;
    check(TEST, out == SP_CTR)?;

    let (mut counter, mut off) = (SP_COUNTER, 0);
    let mut back = [0; 32];
    ctx.crypt_ctr(&mut off, &mut counter, &mut stream, &out, &mut back).map_err(|_| failed)?;
    check(TEST, back == SP_PLAIN)
}
