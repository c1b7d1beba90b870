//! Public-key-only encryption engine for the reference Paillier variant.
//!
//! Generalizes the teacher crate's `EncryptionKey` from `rug::Integer` to
//! [`BigInt`] and drops its `oadd`/`osub`/`omul`/`oneg` methods, whose role
//! is now played by [`crate::ciphertext::Ciphertext`]'s own operators —
//! this type keeps only what a public key alone can do: encode a plaintext
//! and encrypt it without knowledge of `p, q`.

use rand_core::{CryptoRng, RngCore};

use crate::bigint::BigInt;
use crate::error::{CryptoError, Result};
use crate::utils;

/// Fixed-generator (`g = n+1`) Paillier public key, giving the
/// `(1+N)^x mod N^2 = (1 + xN) mod N^2` encoding shortcut.
#[derive(Clone, Debug)]
pub(crate) struct EncryptionKey {
    n: BigInt,
    nn: BigInt,
    half_n: BigInt,
    neg_half_n: BigInt,
}

impl EncryptionKey {
    pub fn from_n(n: BigInt) -> Self {
        let nn = &n * &n;
        let half_n = &n >> 1;
        let neg_half_n = -&half_n;
        EncryptionKey {
            n,
            nn,
            half_n,
            neg_half_n,
        }
    }

    pub fn n(&self) -> &BigInt {
        &self.n
    }

    pub fn nn(&self) -> &BigInt {
        &self.nn
    }

    pub fn half_n(&self) -> &BigInt {
        &self.half_n
    }

    /// `l(x) = (x-1)/n`, defined only when `x == 1 mod n` and `x` is in the
    /// multiplicative group mod `n^2`.
    pub(crate) fn l(&self, x: &BigInt) -> Option<BigInt> {
        if x.modulo(&self.n) != BigInt::one() {
            return None;
        }
        if !utils::in_mult_group(x, &self.nn) {
            return None;
        }
        BigInt::l(x, &self.n).ok()
    }

    /// Encrypts `x` in `{-N/2, .., N/2}` under `nonce` in `Z*_n`.
    pub fn encrypt_with(&self, x: &BigInt, nonce: &BigInt) -> Result<BigInt> {
        if !self.in_signed_group(x) || !utils::in_mult_group(nonce, &self.n) {
            return Err(CryptoError::PlaintextOutOfBounds.into());
        }
        let x = if !x.is_negative() {
            x.clone()
        } else {
            x + &self.n
        };

        // a = (1 + N)^x mod N^2 = (1 + xN) mod N^2
        let a = (&BigInt::one() + &(&x * &self.n)).modulo(&self.nn);
        // b = nonce^N mod N^2
        let b = nonce.pow_mod(&self.n, &self.nn)?;

        Ok((&a * &b).modulo(&self.nn))
    }

    /// Encrypts `x`, sampling the nonce from the injected RNG.
    pub fn encrypt_with_random(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
        x: &BigInt,
    ) -> Result<(BigInt, BigInt)> {
        let nonce = utils::sample_in_mult_group(rng, &self.n);
        let ciphertext = self.encrypt_with(x, &nonce)?;
        Ok((ciphertext, nonce))
    }

    /// Checks whether `x` is in `{-N/2, .., N/2}`.
    pub fn in_signed_group(&self, x: &BigInt) -> bool {
        self.neg_half_n <= *x && *x <= self.half_n
    }
}
