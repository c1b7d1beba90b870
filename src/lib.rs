//! A partially homomorphic Paillier cryptosystem: a reference variant, a
//! CRT-accelerated fast variant, a bit-packing codec for batching many
//! small signed plaintexts into one ciphertext, a compact wire format, and
//! a small privacy-preserving linear-regression layer built on top.
//!
//! No constant-time hardening, no CCA security, no post-quantum resistance,
//! and no cross-implementation key-serialization guarantees are provided or
//! intended.

pub mod bigint;
pub mod ciphertext;
mod decryption_key;
mod encryption_key;
pub mod error;
pub mod fast_mod;
pub mod keys;
pub mod packing;
pub mod paillier;
pub mod paillier_fast;
pub mod randomizer;
pub mod regression;
pub mod utils;

#[cfg(feature = "serde")]
pub mod wire;

pub use crate::bigint::BigInt;
pub use crate::ciphertext::{Ciphertext, PackedCiphertext};
pub use crate::error::{
    CryptoError, DimensionError, Error, ErrorKind, MathError, ParamError, Result,
};
pub use crate::keys::{FastKeyPair, FastPrivateKey, KeyPair, PrivateKey, PublicKey};
pub use crate::paillier::Paillier;
pub use crate::paillier_fast::PaillierFast;
