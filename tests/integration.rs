//! End-to-end tests exercising both Paillier variants, the packing codec,
//! the wire format and the regression layer together, the way a caller of
//! this crate actually would rather than through any single module's
//! internals.

use std::sync::OnceLock;

use paillier_suite::keys::PublicKey;
use paillier_suite::packing::{self, pack_count};
use paillier_suite::regression::LinearRegression;
use paillier_suite::{BigInt, Paillier, PaillierFast};

fn rng() -> paillier_suite::utils::GlobalRng {
    paillier_suite::utils::global_rng()
}

/// The fast variant's smallest supported key size still involves a
/// structured-prime search and a LUT precompute; share one instance across
/// the tests that don't care about key generation itself.
fn small_fast_scheme() -> &'static PaillierFast {
    static SCHEME: OnceLock<PaillierFast> = OnceLock::new();
    SCHEME.get_or_init(|| {
        let mut rng = rng();
        #[cfg(feature = "insecure-debug-keys")]
        {
            PaillierFast::generate(&mut rng, 1024).unwrap()
        }
        #[cfg(not(feature = "insecure-debug-keys"))]
        {
            PaillierFast::generate(&mut rng, 2048).unwrap()
        }
    })
}

#[test]
fn reference_variant_roundtrips_signed_range() {
    let mut rng = rng();
    let paillier = Paillier::generate(&mut rng, 256).unwrap();
    let n = &paillier.public_key().n;
    let half_n = &(n >> 1);

    let corner_cases = [
        -half_n.clone(),
        &-half_n.clone() + &BigInt::one(),
        half_n.clone() - BigInt::one(),
        half_n.clone(),
        BigInt::zero(),
    ];
    for plaintext in corner_cases {
        let (c, _nonce) = paillier.encrypt_with_random(&mut rng, &plaintext).unwrap();
        assert_eq!(paillier.decrypt(&c).unwrap(), plaintext);
    }
}

#[test]
fn reference_variant_rejects_out_of_range_plaintext() {
    let mut rng = rng();
    let paillier = Paillier::generate(&mut rng, 256).unwrap();
    let n = &paillier.public_key().n;
    let half_n = &(n >> 1);
    let out_of_bounds = half_n + &BigInt::one();
    assert!(paillier.encrypt_with_random(&mut rng, &out_of_bounds).is_err());
}

#[test]
fn reference_variant_homomorphic_addition_and_scalar_mul() {
    let mut rng = rng();
    let paillier = Paillier::generate(&mut rng, 256).unwrap();

    let a = BigInt::from(17i64);
    let b = BigInt::from(-5i64);
    let (ca, _) = paillier.encrypt_with_random(&mut rng, &a).unwrap();
    let (cb, _) = paillier.encrypt_with_random(&mut rng, &b).unwrap();

    let sum = ca.add(&cb).unwrap();
    assert_eq!(paillier.decrypt(&sum).unwrap(), BigInt::from(12i64));

    let scaled = ca.mul_scalar(&BigInt::from(3i64)).unwrap();
    assert_eq!(paillier.decrypt(&scaled).unwrap(), BigInt::from(51i64));

    let diff = ca.sub(&cb).unwrap();
    assert_eq!(paillier.decrypt(&diff).unwrap(), BigInt::from(22i64));
}

#[test]
fn fast_variant_roundtrips_and_matches_reference_semantics() {
    let mut rng = rng();
    let scheme = small_fast_scheme();

    let a = BigInt::from(123i64);
    let b = BigInt::from(-45i64);
    let ca = scheme.encrypt_with_random(&mut rng, &a).unwrap();
    let cb = scheme.encrypt_with_random(&mut rng, &b).unwrap();

    assert_eq!(scheme.decrypt(&ca).unwrap(), a);
    let sum = ca.add(&cb).unwrap();
    assert_eq!(scheme.decrypt(&sum).unwrap(), BigInt::from(78i64));
}

#[test]
fn ciphertexts_from_different_moduli_cannot_be_combined() {
    let mut rng = rng();
    let a = Paillier::generate(&mut rng, 256).unwrap();
    let b = Paillier::generate(&mut rng, 256).unwrap();

    let (ca, _) = a.encrypt_with_random(&mut rng, &BigInt::from(1i64)).unwrap();
    let (cb, _) = b.encrypt_with_random(&mut rng, &BigInt::from(1i64)).unwrap();
    assert!(ca.add(&cb).is_err());
}

#[test]
fn packing_round_trips_through_full_encrypt_decrypt_cycle() {
    let mut rng = rng();
    let paillier = Paillier::generate(&mut rng, 256).unwrap();
    let values = vec![
        BigInt::from(5i64),
        BigInt::from(-3i64),
        BigInt::from(0i64),
        BigInt::from(-1i64),
    ];
    let packed = packing::encrypt_pack(&paillier, &mut rng, &values, 16, 8).unwrap();
    let decoded = packing::decrypt_pack(&paillier, &packed).unwrap();
    assert_eq!(decoded, values);
}

#[test]
fn packing_chunks_long_vectors_and_reassembles_in_order() {
    let mut rng = rng();
    let paillier = Paillier::generate(&mut rng, 256).unwrap();
    let per_chunk = pack_count(paillier.plaintext_size_bits(), 8, 4);

    let values: Vec<BigInt> = (0..(per_chunk * 2 + 3) as i64)
        .map(|i| BigInt::from(i - (per_chunk as i64)))
        .collect();

    let packed = packing::encrypt_pack_vec(&paillier, &mut rng, &values, 8, 4).unwrap();
    assert!(packed.len() >= 3);
    let decoded = packing::decrypt_pack_vec(&paillier, &packed).unwrap();
    assert_eq!(decoded, values);
}

#[test]
fn fast_variant_batch_decrypt_matches_individual_decryption() {
    let mut rng = rng();
    let scheme = small_fast_scheme();
    let values = vec![BigInt::from(1i64), BigInt::from(-2i64), BigInt::from(3i64)];
    let row: Vec<_> = values
        .iter()
        .map(|v| scheme.encrypt_with_random(&mut rng, v).unwrap())
        .collect();

    let vec_decoded = packing::decrypt_fast_vec(scheme, &row, 16).unwrap();
    assert_eq!(vec_decoded, values);

    let matrix = vec![row.clone(), row.clone()];
    let mat_decoded = packing::decrypt_fast_mat(scheme, &matrix, 16).unwrap();
    assert_eq!(mat_decoded, vec![values.clone(), values]);
}

#[test]
fn fast_variant_rejects_ragged_matrix() {
    let scheme = small_fast_scheme();
    let mut rng = rng();
    let row_a = vec![scheme.encrypt_with_random(&mut rng, &BigInt::from(1i64)).unwrap()];
    let row_b = vec![
        scheme.encrypt_with_random(&mut rng, &BigInt::from(1i64)).unwrap(),
        scheme.encrypt_with_random(&mut rng, &BigInt::from(2i64)).unwrap(),
    ];
    assert!(packing::decrypt_fast_mat(scheme, &[row_a, row_b], 16).is_err());
}

#[test]
fn public_key_only_scheme_encrypts_but_cannot_decrypt() {
    let mut rng = rng();
    let full = Paillier::generate(&mut rng, 256).unwrap();
    let PublicKey { n, key_size_bits, .. } = full.public_key().clone();
    let pub_only = Paillier::from_public_n(n, key_size_bits);

    let (c, _) = pub_only.encrypt_with_random(&mut rng, &BigInt::from(9i64)).unwrap();
    assert!(pub_only.decrypt(&c).is_err());
    assert_eq!(full.decrypt(&c).unwrap(), BigInt::from(9i64));
}

#[test]
fn wire_format_round_trips_a_key_pair_and_an_encrypted_value() {
    let mut rng = rng();
    let paillier = Paillier::generate(&mut rng, 256).unwrap();
    let key_pair = paillier.key_pair().unwrap();

    let bytes = bincode::serialize(&key_pair).unwrap();
    let restored: paillier_suite::KeyPair = bincode::deserialize(&bytes).unwrap();
    assert_eq!(restored.public.n, key_pair.public.n);
    assert_eq!(restored.private.p, key_pair.private.p);

    let (c, _) = paillier.encrypt_with_random(&mut rng, &BigInt::from(-8i64)).unwrap();
    let c_bytes = bincode::serialize(&c).unwrap();
    let restored_c: paillier_suite::Ciphertext = bincode::deserialize(&c_bytes).unwrap();
    assert!(restored_c.add(&restored_c).is_err());

    let rebuilt = Paillier::from_primes(restored.private.p, restored.private.q).unwrap();
    assert_eq!(rebuilt.decrypt(&c).unwrap(), BigInt::from(-8i64));
}

#[test]
fn wire_format_rejects_a_tampered_key_pair() {
    let mut rng = rng();
    let paillier = Paillier::generate(&mut rng, 256).unwrap();
    let mut key_pair = paillier.key_pair().unwrap();
    key_pair.private.p = &key_pair.private.p + &BigInt::one();

    let bytes = bincode::serialize(&key_pair).unwrap();
    let restored: Result<paillier_suite::KeyPair, _> = bincode::deserialize(&bytes);
    assert!(restored.is_err());
}

#[test]
fn linear_regression_fits_a_simple_linear_relationship() {
    let mut rng = rng();
    let paillier = Paillier::generate(&mut rng, 256).unwrap();

    // y = 3*x1 - 2*x2
    let x = vec![
        vec![BigInt::from(1i64), BigInt::from(1i64)],
        vec![BigInt::from(2i64), BigInt::from(0i64)],
        vec![BigInt::from(0i64), BigInt::from(3i64)],
        vec![BigInt::from(4i64), BigInt::from(1i64)],
    ];
    let y_plain = [1i64, 6, -6, 10];
    let y: Vec<_> = y_plain
        .iter()
        .map(|v| paillier.encrypt_with_random(&mut rng, &BigInt::from(*v)).unwrap().0)
        .collect();

    let theta0 = vec![
        paillier.encrypt_with_random(&mut rng, &BigInt::zero()).unwrap().0,
        paillier.encrypt_with_random(&mut rng, &BigInt::zero()).unwrap().0,
    ];
    let mut model = LinearRegression::new(BigInt::from(1i64), BigInt::from(4i64), 25, theta0);

    model
        .fit(&x, &y, 40, 12, |packed, divisor| {
            packed
                .iter()
                .map(|p| {
                    let decrypted = paillier.decrypt(&p.data)?;
                    let update = &(-decrypted) / divisor;
                    Ok(paillier.encrypt_with_random(&mut rng, &update)?.0)
                })
                .collect()
        })
        .unwrap();

    let predictions = model.predict(&x).unwrap();
    for (p, expected) in predictions.iter().zip(y_plain.iter()) {
        let decrypted = paillier.decrypt(p).unwrap();
        let diff = &decrypted - &BigInt::from(*expected);
        let diff_abs = if diff.is_negative() { -diff } else { diff };
        assert!(diff_abs < BigInt::from(2i64), "prediction too far from target");
    }
}

/// Slow end-to-end test at production key size; run with `cargo test --
/// --ignored` (or `--include-ignored`).
#[test]
#[ignore]
fn production_key_size_end_to_end() {
    let mut rng = rng();
    let paillier = Paillier::generate(&mut rng, 2048).unwrap();
    let fast = PaillierFast::generate(&mut rng, 2048).unwrap();

    let x = BigInt::from(-999_999i64);
    let (c, _) = paillier.encrypt_with_random(&mut rng, &x).unwrap();
    assert_eq!(paillier.decrypt(&c).unwrap(), x);

    let cf = fast.encrypt_with_random(&mut rng, &x).unwrap();
    assert_eq!(fast.decrypt(&cf).unwrap(), x);
}
