//! The round transformations of AES.

/// An AES implementation built from its round transformations.
pub trait Aes: Sized + AddRoundKey {
    /// Performs a normal round of AES encryption.
    fn encrypt_round(&mut self, rk: &Self::RoundKey);

    /// Performs the final round of AES encryption (no `MixColumns`).
    fn encrypt_round_last(&mut self, rk: &Self::RoundKey);

    /// Performs a normal round of AES decryption.
    fn decrypt_round(&mut self, rk: &Self::RoundKey);

    /// Performs the final round of AES decryption (no `MixColumns`).
    fn decrypt_round_last(&mut self, rk: &Self::RoundKey);

    /// Performs an AES encryption in-place.
    ///
    /// `round_keys` holds 11, 13 or 15 round keys.
    fn encrypt(&mut self, round_keys: &[Self::RoundKey]) {
        let (first, rest) = split_schedule(round_keys);
        let (last, middle) = rest.split_last().expect("schedule has a final round key");

        self.add_round_key(first);
        for key in middle {
            self.encrypt_round(key);
        }
        self.encrypt_round_last(last);
    }

    /// Performs an AES decryption in-place.
    fn decrypt(&mut self, round_keys: &[Self::RoundKey]) {
        let (first, rest) = split_schedule(round_keys);
        let (last, middle) = rest.split_last().expect("schedule has a final round key");

        self.add_round_key(last);
        for key in middle.iter().rev() {
            self.decrypt_round(key);
        }
        self.decrypt_round_last(first);
    }
}

fn split_schedule<K>(round_keys: &[K]) -> (&K, &[K]) {
    let rounds = round_keys.len();
    assert!(rounds == 11 || rounds == 13 || rounds == 15, "invalid schedule length {}", rounds);

    (&round_keys[0], &round_keys[1..])
}

impl<T> Aes for T
    where T: ShiftRows + MixColumns + SubBytes + AddRoundKey
{
    fn encrypt_round(&mut self, rk: &Self::RoundKey) {
        self.sub_bytes();
        self.shift_rows();
        self.mix_columns();
        self.add_round_key(rk);
    }

    fn encrypt_round_last(&mut self, rk: &Self::RoundKey) {
        self.sub_bytes();
        self.shift_rows();
        self.add_round_key(rk);
    }

    fn decrypt_round(&mut self, rk: &Self::RoundKey) {
        self.inv_shift_rows();
        self.inv_sub_bytes();
        self.add_round_key(rk);
        self.inv_mix_columns();
    }

    fn decrypt_round_last(&mut self, rk: &Self::RoundKey) {
        self.inv_shift_rows();
        self.inv_sub_bytes();
        self.add_round_key(rk);
    }
}

pub trait ShiftRows {
    /// Executes `ShiftRows` in-place.
    fn shift_rows(&mut self);

    /// Executes `InvShiftRows` in-place.
    fn inv_shift_rows(&mut self);
}

pub trait MixColumns {
    /// Executes `MixColumns` in-place.
    ///
    /// ```text
    /// c[i] = 2 • b[i] ⊕ 3 • b[i+1] ⊕ b[i+2] ⊕ b[i+3]
    /// ```
    fn mix_columns(&mut self);

    /// Executes `InvMixColumns` in-place.
    ///
    /// ```text
    /// c[i] = 14 • b[i] ⊕ 11 • b[i+1] ⊕ 13 • b[i+2] ⊕ 9 • b[i+3]
    /// ```
    fn inv_mix_columns(&mut self);
}

pub trait SubBytes {
    /// Executes `SubBytes` in-place.
    fn sub_bytes(&mut self);

    /// Executes `InvSubBytes` in-place.
    fn inv_sub_bytes(&mut self);
}

pub trait AddRoundKey {
    type RoundKey;

    fn add_round_key(&mut self, rk: &Self::RoundKey);
}
