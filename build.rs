//! Generates the AES substitution tables from GF(2⁸) arithmetic.

use std::{env, fmt::Write as _, fs, io, path::PathBuf};

use gf256::{inverse_table, Element};

fn write_table(out: &mut String, name: &str, table: &[u8; 256]) {
    writeln!(out, "/// Generated by `build.rs`.").unwrap();
    writeln!(out, "pub const {}: [u8; 256] = [", name).unwrap();
    for row in table.chunks(16) {
        out.push_str("   ");
        for byte in row {
            write!(out, " 0x{:02x},", byte).unwrap();
        }
        out.push('\n');
    }
    writeln!(out, "];").unwrap();
}

fn main() -> io::Result<()> {
    let mut sbox = [0u8; 256];
    let mut inv_sbox = [0u8; 256];

    for (i, inv) in inverse_table().iter().enumerate() {
        let Element(s) = inv.affine();
        sbox[i] = s;
        inv_sbox[s as usize] = i as u8;
    }

    let mut out = String::new();
    write_table(&mut out, "SBOX", &sbox);
    write_table(&mut out, "INV_SBOX", &inv_sbox);

    let dest = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo")).join("sbox.rs");
    fs::write(dest, out)?;

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=gf256/src");
    Ok(())
}
