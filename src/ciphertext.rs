//! An encrypted [`BigInt`] value, and the homomorphic operators defined
//! over it.
//!
//! Grounded on `original_source/include/OPHELib/paillier_base.h`'s
//! `Ciphertext` class: every ciphertext carries a shared reference to its
//! modulus `n^2` (and, when available, a [`FastMod`]) so homomorphic
//! operations never need to consult the originating Paillier instance.
//! Generalizes the teacher crate's key-held `oadd`/`osub`/`oneg`/`omul`
//! methods (which take `&self` on `EncryptionKey`) into ciphertext-carried
//! operations, per spec §5's "shared resources" note.

use std::sync::Arc;

use crate::bigint::BigInt;
use crate::error::{CryptoError, Result};
use crate::fast_mod::FastMod;

/// An encrypted [`BigInt`] value.
///
/// Equality compares only `data`, not the modulus handles, so a ciphertext
/// loaded from the wire (with no modulus attached) compares correctly to a
/// freshly computed one.
#[derive(Clone, Debug)]
pub struct Ciphertext {
    pub(crate) data: BigInt,
    pub(crate) n2: Option<Arc<BigInt>>,
    pub(crate) fast_mod: Option<Arc<FastMod>>,
}

impl PartialEq for Ciphertext {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}
impl Eq for Ciphertext {}

impl Ciphertext {
    /// Constructs a ciphertext with no modulus attached. Every homomorphic
    /// operation on it will fail until [`Ciphertext::attach`] is called.
    pub fn inert(data: BigInt) -> Self {
        Ciphertext {
            data,
            n2: None,
            fast_mod: None,
        }
    }

    pub(crate) fn new(data: BigInt, n2: Arc<BigInt>, fast_mod: Option<Arc<FastMod>>) -> Self {
        Ciphertext {
            data,
            n2: Some(n2),
            fast_mod,
        }
    }

    /// The raw ciphertext data, in `[0, n^2)` when a modulus is attached.
    pub fn data(&self) -> &BigInt {
        &self.data
    }

    /// Attaches a shared modulus (and optional [`FastMod`]) to a
    /// ciphertext that was deserialized without one.
    pub fn attach(mut self, n2: Arc<BigInt>, fast_mod: Option<Arc<FastMod>>) -> Self {
        self.n2 = Some(n2);
        self.fast_mod = fast_mod;
        self
    }

    fn require_n2(&self) -> Result<&Arc<BigInt>> {
        self.n2.as_ref().ok_or_else(|| CryptoError::NoModulus.into())
    }

    fn matching_n2<'a>(&'a self, other: &'a Ciphertext) -> Result<&'a Arc<BigInt>> {
        let a = self.require_n2()?;
        let b = other.require_n2()?;
        if !Arc::ptr_eq(a, b) && **a != **b {
            return Err(CryptoError::MismatchedModulus.into());
        }
        Ok(a)
    }

    /// Homomorphic negation: `Enc(-m)`.
    pub fn neg(&self) -> Result<Ciphertext> {
        let n2 = self.require_n2()?;
        let data = self.data.inv_mod(n2)?;
        Ok(Ciphertext {
            data,
            n2: Some(n2.clone()),
            fast_mod: self.fast_mod.clone(),
        })
    }

    /// Homomorphic addition: `Enc(m1) + Enc(m2) = Enc(m1 + m2)`.
    pub fn add(&self, other: &Ciphertext) -> Result<Ciphertext> {
        let n2 = self.matching_n2(other)?.clone();
        let data = (&self.data * &other.data).modulo(&n2);
        Ok(Ciphertext {
            data,
            n2: Some(n2),
            fast_mod: self.fast_mod.clone().or_else(|| other.fast_mod.clone()),
        })
    }

    /// Homomorphic subtraction: `Enc(m1) - Enc(m2) = Enc(m1 - m2)`.
    pub fn sub(&self, other: &Ciphertext) -> Result<Ciphertext> {
        let negated = other.neg()?;
        self.add(&negated)
    }

    /// Homomorphic scalar multiplication: `Enc(m) * k = Enc(m * k)`.
    ///
    /// `k == 0` yields an encryption of zero with no re-randomization
    /// applied — the result is deterministic given the inputs (documented
    /// open-question resolution, see DESIGN.md).
    pub fn mul_scalar(&self, k: &BigInt) -> Result<Ciphertext> {
        let n2 = self.require_n2()?.clone();
        let data = match &self.fast_mod {
            Some(fast_mod) => fast_mod.pow_mod_n2(&self.data, k),
            None => self.data.pow_mod(k, &n2)?,
        };
        Ok(Ciphertext {
            data,
            n2: Some(n2),
            fast_mod: self.fast_mod.clone(),
        })
    }

    pub fn add_assign(&mut self, other: &Ciphertext) -> Result<()> {
        *self = self.add(other)?;
        Ok(())
    }

    pub fn sub_assign(&mut self, other: &Ciphertext) -> Result<()> {
        *self = self.sub(other)?;
        Ok(())
    }

    pub fn mul_scalar_assign(&mut self, k: &BigInt) -> Result<()> {
        *self = self.mul_scalar(k)?;
        Ok(())
    }
}

/// A ciphertext that encrypts the bit-packed concatenation of several
/// signed plaintexts.
///
/// See [`crate::packing`] for the encode/pack/decode operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedCiphertext {
    pub data: Ciphertext,
    pub n_plaintexts: usize,
    pub plaintext_bits: usize,
    pub buffer_bits: usize,
}

impl PackedCiphertext {
    pub fn new(
        data: Ciphertext,
        n_plaintexts: usize,
        plaintext_bits: usize,
        buffer_bits: usize,
    ) -> Self {
        PackedCiphertext {
            data,
            n_plaintexts,
            plaintext_bits,
            buffer_bits,
        }
    }
}
