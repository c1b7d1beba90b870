//! Reference Paillier variant: plain `g^m * r^n mod n^2`, generator
//! `g = n+1`, lambda/mu precomputed.
//!
//! Grounded on `original_source/src/paillier.cpp`'s `Paillier` class. The
//! fixed choice `g = n+1` is a standard, textbook-valid instance of "draw a
//! generator of the right order" (it always has order exactly `n` in
//! `Z*_{n^2}`, regardless of `p, q`) and is what lets encryption collapse to
//! the `(1 + xN) mod N^2` shortcut the teacher crate is built around — see
//! DESIGN.md for this resolved open question. Internally this reuses the
//! teacher's `EncryptionKey`/`DecryptionKey` as the encode/encrypt engines.

use std::sync::Arc;

use rand_core::{CryptoRng, RngCore};

use crate::bigint::BigInt;
use crate::ciphertext::Ciphertext;
use crate::decryption_key::DecryptionKey;
use crate::encryption_key::EncryptionKey;
use crate::error::{CryptoError, Result};
use crate::keys::{KeyPair, PrivateKey, PublicKey};

/// The reference Paillier cryptosystem: a public key always present, a
/// private key present only when this instance can decrypt.
pub struct Paillier {
    n2: Arc<BigInt>,
    ek: EncryptionKey,
    dk: Option<DecryptionKey>,
    public: PublicKey,
    private: Option<PrivateKey>,
}

impl Paillier {
    /// Generates a fresh key pair at `key_size_bits` (the bit length of
    /// each of the two safe primes `p, q`; `n` is roughly twice that).
    #[tracing::instrument(skip(rng))]
    pub fn generate(rng: &mut (impl RngCore + CryptoRng), key_size_bits: u32) -> Result<Self> {
        let dk = DecryptionKey::generate(rng, key_size_bits)?;
        tracing::debug!(bits = key_size_bits, "generated paillier reference key pair");
        Ok(Self::from_decryption_key(dk))
    }

    /// Builds an instance from two known safe primes.
    pub fn from_primes(p: BigInt, q: BigInt) -> Result<Self> {
        let dk = DecryptionKey::from_primes(p, q)?;
        Ok(Self::from_decryption_key(dk))
    }

    fn from_decryption_key(dk: DecryptionKey) -> Self {
        let ek = dk.encryption_key();
        let n2 = Arc::new(ek.nn().clone());
        let key_size_bits = dk.bits_length();
        let public = PublicKey::new(key_size_bits as usize, ek.n().clone(), ek.n() + &BigInt::one());
        let private = Some(PrivateKey::new(key_size_bits as usize, dk.p().clone(), dk.q().clone()));
        Paillier {
            n2,
            ek,
            dk: Some(dk),
            public,
            private,
        }
    }

    /// Builds an encryption-only instance from a public modulus `n`. No
    /// decryption is possible; [`Paillier::decrypt`] will error.
    pub fn from_public_n(n: BigInt, key_size_bits: usize) -> Self {
        let ek = EncryptionKey::from_n(n.clone());
        let n2 = Arc::new(ek.nn().clone());
        let public = PublicKey::new(key_size_bits, n.clone(), &n + &BigInt::one());
        Paillier {
            n2,
            ek,
            dk: None,
            public,
            private: None,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Bit budget available to the packing codec for a single plaintext
    /// integer encrypted under this instance: half of `key_size_bits`.
    pub fn plaintext_size_bits(&self) -> usize {
        self.public.key_size_bits / 2
    }

    pub fn private_key(&self) -> Option<&PrivateKey> {
        self.private.as_ref()
    }

    pub fn key_pair(&self) -> Option<KeyPair> {
        self.private.clone().map(|private| KeyPair {
            public: self.public.clone(),
            private,
        })
    }

    fn wrap(&self, data: BigInt) -> Ciphertext {
        Ciphertext::new(data, self.n2.clone(), None)
    }

    /// Encrypts `plaintext` (in `{-n/2, .., n/2}`) with a nonce sampled
    /// from `rng`.
    pub fn encrypt_with_random(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
        plaintext: &BigInt,
    ) -> Result<(Ciphertext, BigInt)> {
        let (data, nonce) = match &self.dk {
            Some(dk) => dk.encrypt_with_random(rng, plaintext)?,
            None => self.ek.encrypt_with_random(rng, plaintext)?,
        };
        Ok((self.wrap(data), nonce))
    }

    /// Encrypts `plaintext` under an explicit `nonce` drawn from `Z*_n`.
    pub fn encrypt_with(&self, plaintext: &BigInt, nonce: &BigInt) -> Result<Ciphertext> {
        let data = match &self.dk {
            Some(dk) => dk.encrypt_with(plaintext, nonce)?,
            None => self.ek.encrypt_with(plaintext, nonce)?,
        };
        Ok(self.wrap(data))
    }

    /// Decrypts `ciphertext`, returning a value in `{-n/2, .., n/2}`.
    pub fn decrypt(&self, ciphertext: &Ciphertext) -> Result<BigInt> {
        let dk = self.dk.as_ref().ok_or(CryptoError::NoPrivateKey)?;
        dk.decrypt(ciphertext.data())
    }

    /// An inert encryption of zero, for callers that need a neutral
    /// homomorphic-sum accumulator without an RNG on hand.
    pub fn zero_ciphertext(&self) -> Ciphertext {
        self.wrap(BigInt::one())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let mut rng = utils::global_rng();
        let paillier = Paillier::generate(&mut rng, 256).unwrap();
        let x = BigInt::from(-7i64);
        let (c, _nonce) = paillier.encrypt_with_random(&mut rng, &x).unwrap();
        assert_eq!(paillier.decrypt(&c).unwrap(), x);
    }

    #[test]
    fn homomorphic_addition() {
        let mut rng = utils::global_rng();
        let paillier = Paillier::generate(&mut rng, 256).unwrap();
        let a = BigInt::from(3i64);
        let b = BigInt::from(4i64);
        let (ca, _) = paillier.encrypt_with_random(&mut rng, &a).unwrap();
        let (cb, _) = paillier.encrypt_with_random(&mut rng, &b).unwrap();
        let sum = ca.add(&cb).unwrap();
        assert_eq!(paillier.decrypt(&sum).unwrap(), BigInt::from(7i64));
    }

    #[test]
    fn public_only_instance_cannot_decrypt() {
        let mut rng = utils::global_rng();
        let full = Paillier::generate(&mut rng, 256).unwrap();
        let pub_only = Paillier::from_public_n(
            full.public_key().n.clone(),
            full.public_key().key_size_bits,
        );
        let x = BigInt::from(1i64);
        let (c, _) = pub_only.encrypt_with_random(&mut rng, &x).unwrap();
        assert!(pub_only.decrypt(&c).is_err());
        assert_eq!(full.decrypt(&c).unwrap(), x);
    }
}
