//! Arithmetic in GF(2⁸)/(x⁸ + x⁴ + x³ + x + 1), the finite field used by AES.
//!
//! Used at build time to derive the S-box and at run time by the reference cipher's
//! `MixColumns`.

#![no_std]

use core::ops;

mod inv;

pub use self::inv::inverse_table;

/// The reduction polynomial with the x⁸ term dropped.
const REDUCTION: u8 = 0x1b;

/// An element of GF(2⁸)/(x⁸ + x⁴ + x³ + x + 1).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Element(pub u8);

impl Element {
    /// Multiplies by `x`, reducing modulo the field polynomial.
    pub fn xtime(self) -> Self {
        let Element(b) = self;
        let carry = b & 0x80 != 0;
        let shifted = b << 1;

        Element(if carry { shifted ^ REDUCTION } else { shifted })
    }

    /// Applies the affine transformation of the AES S-box to this element.
    ///
    /// ```text
    /// b' = b ⊕ (b ⋘ 1) ⊕ (b ⋘ 2) ⊕ (b ⋘ 3) ⊕ (b ⋘ 4) ⊕ 0x63
    /// ```
    pub fn affine(self) -> Self {
        let Element(b) = self;
        Element(b ^ b.rotate_left(1) ^ b.rotate_left(2) ^ b.rotate_left(3) ^ b.rotate_left(4) ^ 0x63)
    }
}

impl ops::Add for Element {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl ops::AddAssign for Element {
    fn add_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

impl ops::Mul for Element {
    type Output = Self;

    fn mul(mut self, rhs: Self) -> Self::Output {
        self *= rhs;
        self
    }
}

impl ops::MulAssign for Element {
    fn mul_assign(&mut self, rhs: Self) {
        let mut lhs = *self;
        let Element(mut rhs) = rhs;

        let mut ret = Element(0);
        while rhs != 0 {
            if rhs & 1 != 0 {
                ret += lhs;
            }

            lhs = lhs.xtime();
            rhs >>= 1;
        }

        *self = ret;
    }
}
