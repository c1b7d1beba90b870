//! Wire (de)serialization, feature-gated behind `serde`.
//!
//! Generalizes the teacher crate's `serde.rs` (which only serialized
//! `EncryptionKey`/`DecryptionKey` as `n` / `[p, q]`) to every public type:
//! [`BigInt`] encodes as `{ neg, magnitude }` using `rug::Integer`'s
//! `to_digits`/`from_digits` with `Order::Lsf` (least-significant digit
//! first), matching the spec's "import/export are inverse" contract.
//! Ciphertexts round-trip with no modulus attached — callers reattach one
//! with [`crate::ciphertext::Ciphertext::attach`] after loading a key.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::bigint::BigInt;
use crate::ciphertext::{Ciphertext, PackedCiphertext};
use crate::keys::{FastKeyPair, FastPrivateKey, KeyPair, PrivateKey, PublicKey};

#[derive(Serialize, Deserialize)]
struct BigIntWire {
    neg: bool,
    magnitude: Vec<u32>,
}

impl Serialize for BigInt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (neg, magnitude) = self.to_u32_digits();
        BigIntWire { neg, magnitude }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BigInt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = BigIntWire::deserialize(deserializer)?;
        Ok(BigInt::from_u32_digits(wire.neg, &wire.magnitude))
    }
}

#[derive(Serialize, Deserialize)]
struct CiphertextWire {
    data: BigInt,
}

impl Serialize for Ciphertext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CiphertextWire {
            data: self.data().clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Ciphertext {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = CiphertextWire::deserialize(deserializer)?;
        Ok(Ciphertext::inert(wire.data))
    }
}

#[derive(Serialize, Deserialize)]
struct PackedCiphertextWire {
    data: Ciphertext,
    n_plaintexts: usize,
    plaintext_bits: usize,
    buffer_bits: usize,
}

impl Serialize for PackedCiphertext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PackedCiphertextWire {
            data: self.data.clone(),
            n_plaintexts: self.n_plaintexts,
            plaintext_bits: self.plaintext_bits,
            buffer_bits: self.buffer_bits,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PackedCiphertext {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = PackedCiphertextWire::deserialize(deserializer)?;
        Ok(PackedCiphertext::new(
            wire.data,
            wire.n_plaintexts,
            wire.plaintext_bits,
            wire.buffer_bits,
        ))
    }
}

#[derive(Serialize, Deserialize)]
struct PublicKeyWire {
    key_size_bits: usize,
    n: BigInt,
    g: BigInt,
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PublicKeyWire {
            key_size_bits: self.key_size_bits,
            n: self.n.clone(),
            g: self.g.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = PublicKeyWire::deserialize(deserializer)?;
        Ok(PublicKey::new(wire.key_size_bits, wire.n, wire.g))
    }
}

#[derive(Serialize, Deserialize)]
struct PrivateKeyWire {
    key_size_bits: usize,
    p: BigInt,
    q: BigInt,
}

impl Serialize for PrivateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PrivateKeyWire {
            key_size_bits: self.key_size_bits,
            p: self.p.clone(),
            q: self.q.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PrivateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = PrivateKeyWire::deserialize(deserializer)?;
        Ok(PrivateKey::new(wire.key_size_bits, wire.p, wire.q))
    }
}

#[derive(Serialize, Deserialize)]
struct FastPrivateKeyWire {
    key_size_bits: usize,
    a_bits: usize,
    p: BigInt,
    q: BigInt,
    a: BigInt,
}

impl Serialize for FastPrivateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FastPrivateKeyWire {
            key_size_bits: self.key_size_bits,
            a_bits: self.a_bits,
            p: self.p.clone(),
            q: self.q.clone(),
            a: self.a.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FastPrivateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = FastPrivateKeyWire::deserialize(deserializer)?;
        Ok(FastPrivateKey::new(
            wire.key_size_bits,
            wire.a_bits,
            wire.p,
            wire.q,
            wire.a,
        ))
    }
}

#[derive(Serialize, Deserialize)]
struct KeyPairWire {
    public: PublicKey,
    private: PrivateKey,
}

impl Serialize for KeyPair {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        KeyPairWire {
            public: self.public.clone(),
            private: self.private.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for KeyPair {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = KeyPairWire::deserialize(deserializer)?;
        if wire.public.n != &wire.private.p * &wire.private.q {
            return Err(D::Error::custom("public n does not match p*q"));
        }
        Ok(KeyPair {
            public: wire.public,
            private: wire.private,
        })
    }
}

#[derive(Serialize, Deserialize)]
struct FastKeyPairWire {
    public: PublicKey,
    private: FastPrivateKey,
}

impl Serialize for FastKeyPair {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FastKeyPairWire {
            public: self.public.clone(),
            private: self.private.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FastKeyPair {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = FastKeyPairWire::deserialize(deserializer)?;
        if wire.public.n != &wire.private.p * &wire.private.q {
            return Err(D::Error::custom("public n does not match p*q"));
        }
        Ok(FastKeyPair {
            public: wire.public,
            private: wire.private,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils;

    #[test]
    fn bigint_roundtrips_through_bincode() {
        let values = [
            BigInt::zero(),
            BigInt::from(42i64),
            BigInt::from(-42i64),
            BigInt::from_str_radix("123456789012345678901234567890", 10).unwrap(),
        ];
        for v in values {
            let bytes = bincode::serialize(&v).unwrap();
            let back: BigInt = bincode::deserialize(&bytes).unwrap();
            assert_eq!(v, back);
        }
    }

    #[test]
    fn ciphertext_roundtrips_without_modulus_then_reattaches() {
        let mut rng = utils::global_rng();
        let paillier = crate::paillier::Paillier::generate(&mut rng, 256).unwrap();
        let (c, _nonce) = paillier
            .encrypt_with_random(&mut rng, &BigInt::from(5i64))
            .unwrap();
        let bytes = bincode::serialize(&c).unwrap();
        let back: Ciphertext = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back.data(), c.data());
        assert!(back.add(&back).is_err());
    }
}
