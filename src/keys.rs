//! Key material data types: [`PublicKey`], [`PrivateKey`] (reference
//! variant), [`FastPrivateKey`] (fast variant), and the corresponding
//! key-pair wrappers.
//!
//! Grounded on `original_source/include/OPHELib/paillier_base.h`'s
//! `PublicKey`/`PrivateKey`/`KeyPair`. The original couples both Paillier
//! variants into a single `PrivateKey` struct and distinguishes them by
//! checking whether `a == 0 && a_bits == 0` (spec §9 open question 2). This
//! crate instead uses two distinct private-key types tagged by which
//! scheme produced them, so an attempt to build a fast-variant instance
//! from a reference-variant key is a type error rather than a runtime
//! check — see DESIGN.md for the resolved open question.

use crate::bigint::BigInt;

/// Public key shared between both Paillier variants: `n = p*q` and a
/// generator `g`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub key_size_bits: usize,
    pub n: BigInt,
    pub g: BigInt,
}

impl PublicKey {
    pub fn new(key_size_bits: usize, n: BigInt, g: BigInt) -> Self {
        PublicKey { key_size_bits, n, g }
    }
}

/// Private key for the reference [`crate::paillier::Paillier`] variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivateKey {
    pub key_size_bits: usize,
    pub p: BigInt,
    pub q: BigInt,
}

impl PrivateKey {
    pub fn new(key_size_bits: usize, p: BigInt, q: BigInt) -> Self {
        PrivateKey { key_size_bits, p, q }
    }
}

/// Private key for the [`crate::paillier_fast::PaillierFast`] variant: `a`
/// is a prime divisor of both `p-1` and `q-1`, of exactly `a_bits` bits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FastPrivateKey {
    pub key_size_bits: usize,
    pub a_bits: usize,
    pub p: BigInt,
    pub q: BigInt,
    pub a: BigInt,
}

impl FastPrivateKey {
    pub fn new(key_size_bits: usize, a_bits: usize, p: BigInt, q: BigInt, a: BigInt) -> Self {
        FastPrivateKey {
            key_size_bits,
            a_bits,
            p,
            q,
            a,
        }
    }
}

/// A (public, private) key pair for the reference variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

/// A (public, private) key pair for the fast variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FastKeyPair {
    pub public: PublicKey,
    pub private: FastPrivateKey,
}
