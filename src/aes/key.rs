//! Types for storing AES key material.

use try_from::TryFrom;

use crate::Error;

/// The round constants used for key expansion.
pub const ROUND_CONSTANTS: [u8; 10] = [
    0x01, 0x02, 0x04, 0x08, 0x10,
    0x20, 0x40, 0x80, 0x1b, 0x36,
];

/// The longest key, in bytes.
pub const MAX_KEY_LEN: usize = 32;

/// The size class of an AES key, encoded as the engine's key-size field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum KeySize {
    Aes128 = 0,
    Aes192 = 1,
    Aes256 = 2,
}

impl KeySize {
    /// Key length in bits.
    pub fn bits(self) -> u32 {
        match self {
            KeySize::Aes128 => 128,
            KeySize::Aes192 => 192,
            KeySize::Aes256 => 256,
        }
    }

    /// Key length in bytes.
    pub fn len(self) -> usize {
        self.bits() as usize / 8
    }

    /// Key length in 32-bit words.
    pub fn words(self) -> usize {
        self.len() / 4
    }

    /// Returns the number of rounds which should be used for a key of this length.
    pub fn rounds(self) -> usize {
        match self {
            KeySize::Aes128 => 10,
            KeySize::Aes192 => 12,
            KeySize::Aes256 => 14,
        }
    }
}

impl TryFrom<u32> for KeySize {
    type Err = Error;

    fn try_from(bits: u32) -> Result<Self, Self::Err> {
        match bits {
            128 => Ok(KeySize::Aes128),
            192 => Ok(KeySize::Aes192),
            256 => Ok(KeySize::Aes256),
            _ => Err(Error::InvalidKeyLength),
        }
    }
}

/// A secret key which has not yet been expanded.
///
/// Must be either 128, 192, or 256 bits long.
#[derive(Clone, Copy)]
pub enum Key<'a> {
    /// A 128-bit key.
    Aes128(&'a [u8; 16]),

    /// A 192-bit key.
    Aes192(&'a [u8; 24]),

    /// A 256-bit key.
    Aes256(&'a [u8; 32]),
}

impl<'a> Key<'a> {
    /// Creates a `Key` from a byte slice.
    ///
    /// The slice must be either 16, 24, or 32 bytes long.
    pub fn from_bytes(key: &'a [u8]) -> crate::Result<Self> {
        let bits = key.len() as u32 * 8;
        Key::from_bits(key, bits)
    }

    /// Creates a `Key` from the first `bits / 8` bytes of `key`.
    ///
    /// `bits` must be 128, 192 or 256, and `key` must hold at least that many bits.
    pub fn from_bits(key: &'a [u8], bits: u32) -> crate::Result<Self> {
        let size = KeySize::try_from(bits)?;
        let key = key.get(..size.len()).ok_or(Error::InvalidKeyLength)?;

        let key = match size {
            KeySize::Aes128 => slice_as_array_ref!(key, 16).map(Key::Aes128),
            KeySize::Aes192 => slice_as_array_ref!(key, 24).map(Key::Aes192),
            KeySize::Aes256 => slice_as_array_ref!(key, 32).map(Key::Aes256),
        };

        key.map_err(|()| Error::InvalidKeyLength)
    }

    pub fn size(&self) -> KeySize {
        match self {
            Key::Aes128(_) => KeySize::Aes128,
            Key::Aes192(_) => KeySize::Aes192,
            Key::Aes256(_) => KeySize::Aes256,
        }
    }

    /// The number of 128-bit round keys used for encryption with a key of this length.
    pub fn num_round_keys(&self) -> usize {
        self.size().rounds() + 1
    }

    /// Returns the length of this key in bytes.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// A byte slice containing the key material.
    pub fn as_slice(&self) -> &'a [u8] {
        match *self {
            Key::Aes128(a) => &a[..],
            Key::Aes192(a) => &a[..],
            Key::Aes256(a) => &a[..],
        }
    }
}
