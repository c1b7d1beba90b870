//! Private-key encryption/decryption engine for the reference Paillier
//! variant, accelerated by the known factorization of `n`.
//!
//! Generalizes the teacher crate's `DecryptionKey<FastExp>` (`rug::Integer`,
//! a generic `FastExp` type parameter defaulting to an undocumented
//! `utils::CrtExp`) into a concrete, always-CRT-accelerated engine built on
//! [`crate::fast_mod::FastMod`] — the teacher always instantiated its
//! generic with the CRT engine in practice, so the generic parameter added
//! no real flexibility; this crate keeps the acceleration unconditionally
//! and drops the parameter.

use rand_core::{CryptoRng, RngCore};

use crate::bigint::BigInt;
use crate::encryption_key::EncryptionKey;
use crate::error::{CryptoError, Result};
use crate::fast_mod::FastMod;
use crate::utils;

#[derive(Clone)]
pub(crate) struct DecryptionKey {
    ek: EncryptionKey,
    /// `lcm(p-1, q-1)`
    lambda: BigInt,
    /// `L((N+1)^lambda mod N^2)^-1 mod N`
    u: BigInt,
    p: BigInt,
    q: BigInt,
    fast_mod: FastMod,
}

impl DecryptionKey {
    /// Samples two safe primes of `bits` bits each and builds the key.
    pub fn generate(rng: &mut (impl RngCore + CryptoRng), bits: u32) -> Result<Self> {
        let p = utils::generate_safe_prime(rng, bits);
        let q = utils::generate_safe_prime(rng, bits);
        Self::from_primes(p, q)
    }

    /// Builds a key from two distinct safe primes.
    pub fn from_primes(p: BigInt, q: BigInt) -> Result<Self> {
        if p == q {
            return Err(CryptoError::InvalidKey("p and q must be distinct").into());
        }
        let pm1 = &p - &BigInt::one();
        let qm1 = &q - &BigInt::one();
        let ek = EncryptionKey::from_n(&p * &q);
        let lambda = pm1.lcm(&qm1);
        if lambda == BigInt::zero() {
            return Err(CryptoError::InvalidKey("lambda is zero").into());
        }

        // (N+1)^lambda mod N^2
        let t = ek.n() + &BigInt::one();
        let tt = t.pow_mod(&lambda, ek.nn())?;

        // L((N+1)^lambda mod N^2)^-1 mod N
        let u = ek
            .l(&tt)
            .ok_or(CryptoError::InvalidKey("l(t) undefined"))?
            .inv_mod(ek.n())
            .map_err(|_| CryptoError::InvalidKey("u has no inverse"))?;

        let fast_mod = FastMod::new(p.clone(), q.clone());

        Ok(DecryptionKey {
            ek,
            lambda,
            u,
            p,
            q,
            fast_mod,
        })
    }

    /// Decrypts `c`, returning a plaintext in `{-N/2, .., N/2}`.
    pub fn decrypt(&self, c: &BigInt) -> Result<BigInt> {
        if !utils::in_mult_group(c, self.ek.nn()) {
            return Err(CryptoError::Operation.into());
        }

        // a = c^lambda mod n^2
        let a = self.fast_mod.pow_mod_n2(c, &self.lambda);
        let l = self.ek.l(&a).ok_or(CryptoError::Operation)?;
        let plaintext = (&l * &self.u).modulo(self.ek.n());

        if &(&plaintext << 1) >= self.n() {
            Ok(&plaintext - self.n())
        } else {
            Ok(plaintext)
        }
    }

    /// Encrypts `x` under `nonce`, using the known factorization of `n` to
    /// accelerate the `nonce^n mod n^2` term via [`FastMod`].
    pub fn encrypt_with(&self, x: &BigInt, nonce: &BigInt) -> Result<BigInt> {
        if !self.ek.in_signed_group(x) || !utils::in_mult_group(nonce, self.n()) {
            return Err(CryptoError::PlaintextOutOfBounds.into());
        }
        let x = if !x.is_negative() {
            x.clone()
        } else {
            x + self.n()
        };

        let a = (&BigInt::one() + &(&x * self.n())).modulo(self.ek.nn());
        let b = self.fast_mod.pow_mod_n2(nonce, self.n());

        Ok((&a * &b).modulo(self.ek.nn()))
    }

    pub fn encrypt_with_random(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
        x: &BigInt,
    ) -> Result<(BigInt, BigInt)> {
        let nonce = utils::sample_in_mult_group(rng, self.n());
        let ciphertext = self.encrypt_with(x, &nonce)?;
        Ok((ciphertext, nonce))
    }

    pub fn encryption_key(&self) -> EncryptionKey {
        self.ek.clone()
    }

    pub fn fast_mod(&self) -> &FastMod {
        &self.fast_mod
    }

    pub fn n(&self) -> &BigInt {
        self.ek.n()
    }

    pub fn lambda(&self) -> &BigInt {
        &self.lambda
    }

    pub fn u(&self) -> &BigInt {
        &self.u
    }

    pub fn p(&self) -> &BigInt {
        &self.p
    }

    pub fn q(&self) -> &BigInt {
        &self.q
    }

    pub fn bits_length(&self) -> u32 {
        self.p.bit_length().min(self.q.bit_length())
    }
}
