//! Bit-packing codec: concatenates several small signed plaintexts into one
//! ciphertext so a single Paillier operation amortizes over all of them.
//!
//! Grounded on `original_source/include/ophelib/packing.h` and
//! `src/packing.cpp`'s `Vector` namespace. Each packed slot reserves
//! `plaintext_bits` data bits plus a buffer of `buffer_bits` zero bits above
//! it, so that summing up to `2^buffer_bits` packed ciphertexts homomorphically
//! cannot let a carry from one slot corrupt its neighbor.

use crate::bigint::BigInt;
use crate::ciphertext::{Ciphertext, PackedCiphertext};
use crate::error::{DimensionError, ParamError, Result};
use crate::paillier::Paillier;

/// How many signed `plaintext_bits`-wide slots fit in a Paillier instance's
/// `plaintext_size_bits`-wide plaintext, leaving `buffer_bits` of headroom
/// per slot (the sign itself rides inside the slot, two's-complement
/// style — no extra bit is reserved for it).
///
/// Mirrors `ophelib::Vector::pack_count`.
pub fn pack_count(plaintext_size_bits: usize, plaintext_bits: usize, buffer_bits: usize) -> usize {
    let shift = plaintext_bits + buffer_bits;
    if shift == 0 {
        return 0;
    }
    plaintext_size_bits / shift
}

/// Packs `plaintexts` (each required to fit, signed, in `plaintext_bits`
/// bits) into a single [`BigInt`] with `buffer_bits` of zero headroom
/// between slots, most-significant slot first. Fails if more than
/// `pack_count(plaintext_size_bits, plaintext_bits, buffer_bits)` values
/// are given, or if any value's magnitude overflows `plaintext_bits`.
pub fn pack_plaintexts(
    plaintexts: &[BigInt],
    plaintext_bits: usize,
    buffer_bits: usize,
    plaintext_size_bits: usize,
) -> Result<BigInt> {
    let max_count = pack_count(plaintext_size_bits, plaintext_bits, buffer_bits);
    if plaintexts.len() > max_count {
        return Err(ParamError::TooManySlots {
            max: max_count,
            got: plaintexts.len(),
        }
        .into());
    }

    let shift = (plaintext_bits + buffer_bits) as u32;
    let max_magnitude = &(&BigInt::from(1i64) << (plaintext_bits as u32)) - &BigInt::one();

    let mut packed = BigInt::zero();
    for x in plaintexts {
        let magnitude = if x.is_negative() { -x.clone() } else { x.clone() };
        if magnitude > max_magnitude {
            return Err(ParamError::PlaintextTooWide { max: plaintext_bits }.into());
        }
        let slot_value = if x.is_negative() {
            x + &(&BigInt::from(1i64) << shift)
        } else {
            x.clone()
        };
        packed = &(&packed << shift) + &slot_value;
    }
    Ok(packed)
}

/// Encrypts the bit-packed concatenation of `plaintexts` as one
/// [`PackedCiphertext`]. Mirrors `ophelib::Vector::encrypt_pack`.
pub fn encrypt_pack(
    paillier: &Paillier,
    rng: &mut (impl rand_core::RngCore + rand_core::CryptoRng),
    plaintexts: &[BigInt],
    plaintext_bits: usize,
    buffer_bits: usize,
) -> Result<PackedCiphertext> {
    let packed_value = pack_plaintexts(plaintexts, plaintext_bits, buffer_bits, paillier.plaintext_size_bits())?;
    let (ciphertext, _nonce) = paillier.encrypt_with_random(rng, &packed_value)?;
    Ok(PackedCiphertext::new(
        ciphertext,
        plaintexts.len(),
        plaintext_bits,
        buffer_bits,
    ))
}

/// Chunks `plaintexts` into groups of `pack_count(plaintext_size_bits,
/// plaintext_bits, buffer_bits)` and encrypts each chunk, mirroring
/// `ophelib::Vector::encrypt_pack_vec`.
pub fn encrypt_pack_vec(
    paillier: &Paillier,
    rng: &mut (impl rand_core::RngCore + rand_core::CryptoRng),
    plaintexts: &[BigInt],
    plaintext_bits: usize,
    buffer_bits: usize,
) -> Result<Vec<PackedCiphertext>> {
    let per_chunk = pack_count(paillier.plaintext_size_bits(), plaintext_bits, buffer_bits).max(1);
    plaintexts
        .chunks(per_chunk)
        .map(|chunk| encrypt_pack(paillier, rng, chunk, plaintext_bits, buffer_bits))
        .collect()
}

/// Packs already-encrypted ciphertexts into one, homomorphically:
/// `C = (((c[0]*2^shift)+c[1])*2^shift+c[2])...*2^shift+c[n-1]`, each
/// multiply-by-scalar and add being an ordinary [`Ciphertext`] operation
/// (no fresh encryption happens here). Mirrors
/// `ophelib::Vector::pack_ciphertexts`.
pub fn pack_ciphertexts(
    ciphertexts: &[Ciphertext],
    plaintext_bits: usize,
    buffer_bits: usize,
    plaintext_size_bits: usize,
) -> Result<PackedCiphertext> {
    if ciphertexts.is_empty() {
        return Err(DimensionError::Length { expected: 1, actual: 0 }.into());
    }
    let max_count = pack_count(plaintext_size_bits, plaintext_bits, buffer_bits);
    if ciphertexts.len() > max_count {
        return Err(ParamError::TooManySlots {
            max: max_count,
            got: ciphertexts.len(),
        }
        .into());
    }

    let shift = &BigInt::from(1i64) << (plaintext_bits + buffer_bits) as u32;
    let mut rest = ciphertexts.iter();
    let mut sum = rest.next().expect("checked non-empty above").clone();
    for c in rest {
        sum = sum.mul_scalar(&shift)?.add(c)?;
    }
    Ok(PackedCiphertext::new(sum, ciphertexts.len(), plaintext_bits, buffer_bits))
}

/// Chunks `ciphertexts` into groups of `pack_count(plaintext_size_bits,
/// plaintext_bits, buffer_bits)` and homomorphically packs each chunk,
/// mirroring `ophelib::Vector::pack_ciphertexts_vec`.
pub fn pack_ciphertexts_vec(
    ciphertexts: &[Ciphertext],
    plaintext_bits: usize,
    buffer_bits: usize,
    plaintext_size_bits: usize,
) -> Result<Vec<PackedCiphertext>> {
    let per_chunk = pack_count(plaintext_size_bits, plaintext_bits, buffer_bits).max(1);
    ciphertexts
        .chunks(per_chunk)
        .map(|chunk| pack_ciphertexts(chunk, plaintext_bits, buffer_bits, plaintext_size_bits))
        .collect()
}

/// Decrypts a [`PackedCiphertext`] back into its constituent signed
/// plaintexts, most-significant slot first — the inverse of
/// [`pack_plaintexts`]. Mirrors `ophelib::Vector::decrypt_pack`.
pub fn decrypt_pack(paillier: &Paillier, packed: &PackedCiphertext) -> Result<Vec<BigInt>> {
    let plaintext = paillier.decrypt(&packed.data)?;
    unpack_with(
        &plaintext,
        packed.n_plaintexts,
        packed.plaintext_bits,
        packed.buffer_bits,
    )
}

/// Same as [`decrypt_pack`] but across a vector of packed ciphertexts,
/// concatenating the results in order. Mirrors
/// `ophelib::Vector::decrypt_pack` (`Vec<PackedCiphertext>` overload).
pub fn decrypt_pack_vec(paillier: &Paillier, packed: &[PackedCiphertext]) -> Result<Vec<BigInt>> {
    let mut out = Vec::new();
    for p in packed {
        out.extend(decrypt_pack(paillier, p)?);
    }
    Ok(out)
}

/// Unpacks `packed` into `n_plaintexts` signed values of `plaintext_bits`
/// bits each, given the `buffer_bits` used at packing time — the inverse of
/// [`pack_plaintexts`].
pub fn unpack_with(
    packed: &BigInt,
    n_plaintexts: usize,
    plaintext_bits: usize,
    buffer_bits: usize,
) -> Result<Vec<BigInt>> {
    let slot_bits = (plaintext_bits + buffer_bits) as u32;
    let slot_modulus = &BigInt::from(1i64) << slot_bits;
    let half = &BigInt::from(1i64) << (slot_bits - 1);

    let mut remaining = packed.clone();
    let mut slots = Vec::with_capacity(n_plaintexts);
    for _ in 0..n_plaintexts {
        let slot = remaining.modulo(&slot_modulus);
        let signed = if slot >= half { &slot - &(&half << 1) } else { slot };
        slots.push(signed);
        remaining = &remaining >> slot_bits;
    }
    slots.reverse();
    Ok(slots)
}

/// Bit buffer between adjacent packed slots (spec-fixed at 1 bit).
const PACK_BUFFER_BITS: usize = 1;

/// Fast batched decryption of many ciphertexts: groups them into
/// `pack_count`-sized chunks, homomorphically packs each chunk (no fresh
/// encryption), decrypts once per chunk via the fast variant's
/// [`crate::fast_mod::FastMod`]-accelerated decryption, then unpacks each
/// chunk's single decrypted integer back into its plaintext slots — this
/// is what amortizes decryption cost across a whole chunk instead of
/// paying for one decryption per ciphertext. Mirrors
/// `ophelib::Vector::decrypt_fast` (`Vec` overload).
pub fn decrypt_fast_vec(
    scheme: &crate::paillier_fast::PaillierFast,
    ciphertexts: &[Ciphertext],
    plaintext_bits: usize,
) -> Result<Vec<BigInt>> {
    let plaintext_size_bits = scheme.plaintext_size_bits();
    let per_chunk = pack_count(plaintext_size_bits, plaintext_bits, PACK_BUFFER_BITS).max(1);

    let mut out = Vec::with_capacity(ciphertexts.len());
    for chunk in ciphertexts.chunks(per_chunk) {
        let packed = pack_ciphertexts(chunk, plaintext_bits, PACK_BUFFER_BITS, plaintext_size_bits)?;
        let decrypted = scheme.decrypt(&packed.data)?;
        out.extend(unpack_with(
            &decrypted,
            packed.n_plaintexts,
            packed.plaintext_bits,
            PACK_BUFFER_BITS,
        )?);
    }
    Ok(out)
}

fn check_rectangular(matrix: &[Vec<Ciphertext>]) -> Result<()> {
    let cols = matrix.first().map_or(0, |row| row.len());
    if matrix.iter().any(|row| row.len() != cols) {
        return Err(DimensionError::Shape {
            expected_rows: matrix.len(),
            expected_cols: cols,
            actual_rows: matrix.len(),
            actual_cols: matrix.iter().map(|r| r.len()).max().unwrap_or(0),
        }
        .into());
    }
    Ok(())
}

/// Matrix form of [`decrypt_fast_vec`]: each row is decrypted independently,
/// parallelized across rows when the `parallel` feature is enabled, matching
/// ophelib's OpenMP-parallel `decrypt_fast` matrix overload.
#[cfg(feature = "parallel")]
pub fn decrypt_fast_mat(
    scheme: &crate::paillier_fast::PaillierFast,
    matrix: &[Vec<Ciphertext>],
    plaintext_bits: usize,
) -> Result<Vec<Vec<BigInt>>> {
    check_rectangular(matrix)?;
    if matrix.is_empty() {
        return Ok(Vec::new());
    }

    let results: Vec<Result<Vec<BigInt>>> = std::thread::scope(|scope| {
        let handles: Vec<_> = matrix
            .iter()
            .map(|row| scope.spawn(move || decrypt_fast_vec(scheme, row, plaintext_bits)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("decrypt_fast row thread panicked"))
            .collect()
    });
    results.into_iter().collect()
}

#[cfg(not(feature = "parallel"))]
pub fn decrypt_fast_mat(
    scheme: &crate::paillier_fast::PaillierFast,
    matrix: &[Vec<Ciphertext>],
    plaintext_bits: usize,
) -> Result<Vec<Vec<BigInt>>> {
    check_rectangular(matrix)?;
    matrix
        .iter()
        .map(|row| decrypt_fast_vec(scheme, row, plaintext_bits))
        .collect()
}
