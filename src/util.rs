use core::fmt;

macro_rules! slice_as_array_ref {
    ($s:expr, $len:expr) => {
        if $s.len() != $len {
            Err(())
        } else {
            Ok(unsafe {
                &*($s.as_ptr() as *const [_; $len])
            })
        }
    }
}

macro_rules! slice_as_array_mut {
    ($s:expr, $len:expr) => {
        if $s.len() != $len {
            Err(())
        } else {
            Ok(unsafe {
                &mut *($s.as_mut_ptr() as *mut [_; $len])
            })
        }
    }
}

/// Reverse a series of expressions.
macro_rules! reverse {
    ([] $($reversed:expr;)*) => {
        $( $reversed; )*
    };
    ([$head:expr; $($tail:expr;)*] $($reversed:expr;)*) => {
        reverse!([$($tail;)*] $head; $($reversed;)*)
    };
    ($($exprs:expr;)*) => {
        reverse!([$($exprs;)*])
    };
}

/// This macro defines the inverse of a function which is comprised exclusively of involutions.
///
/// To invert a series of involutions (e.g. `mem::swap`), apply the same operations in reverse
/// order.
macro_rules! define_function_of_involutions_with_inverse {
    ( $(
            #[inverse = $inverse:ident]
            $vis:vis fn $fn:ident ($($args:tt)*) {
                $( $expr:expr; )*
            }
    );* $(;)*) => {
        $(
            $vis fn $fn($($args)*) {
                $( $expr; )*
            }

            $vis fn $inverse($($args)*) {
                reverse!{ $( $expr; )* }
            }
        )*
    };
}

macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            cfg_if::cfg_if! {
                if #[cfg(feature = "log")] {
                    ::log::trace!($s $(, $x)*);
                } else {
                    let _ = ($( & $x ),*);
                }
            }
        }
    };
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            cfg_if::cfg_if! {
                if #[cfg(feature = "log")] {
                    ::log::debug!($s $(, $x)*);
                } else {
                    let _ = ($( & $x ),*);
                }
            }
        }
    };
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {
        {
            cfg_if::cfg_if! {
                if #[cfg(feature = "log")] {
                    ::log::warn!($s $(, $x)*);
                } else {
                    let _ = ($( & $x ),*);
                }
            }
        }
    };
}

/// Formats a byte slice as contiguous lowercase hex.
pub(crate) struct Hex<'a>(pub &'a [u8]);

impl fmt::Display for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }

        Ok(())
    }
}

#[cfg(test)]
pub mod test {
    /// Parses a hex string, ignoring whitespace.
    pub fn hex(s: &str) -> impl '_ + Iterator<Item = u8> {
        let mut state = None;

        s.chars()
            .filter(|c| !c.is_whitespace())
            .filter_map(move |c| {
                let nibble = c.to_digit(16).unwrap() as u8;
                if let Some(upper) = state.take() {
                    Some(upper << 4 | nibble)
                } else {
                    state = Some(nibble);
                    None
                }
            })
    }

    pub fn hex_to_bytes(s: &str) -> Vec<u8> {
        hex(s).collect()
    }

    /// Parses exactly one 16-byte block.
    pub fn hex_block(s: &str) -> [u8; 16] {
        let bytes = hex_to_bytes(s);
        let mut block = [0; 16];
        block.copy_from_slice(&bytes);
        block
    }

    #[test]
    fn parses_hex_with_whitespace() {
        assert_eq!(hex_to_bytes("00 ff\n1a2B"), vec![0x00, 0xff, 0x1a, 0x2b]);
    }

    #[test]
    fn formats_hex() {
        assert_eq!(format!("{}", super::Hex(&[0x00, 0xab, 0x10])), "00ab10");
    }
}
