//! Shared helpers: RNG plumbing, multiplicative-group membership checks,
//! safe/structured prime generation, and the randomizer-table combinatorics.
//!
//! Generalizes the teacher crate's `utils.rs`. The teacher wraps any
//! `rand_core::RngCore` so it can drive `rug`'s GMP-backed random state;
//! that wrapper is kept verbatim since it's exactly the right shape.

use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rand::{RngCore as _, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRng, RngCore};
use rug::{Complete, Integer};
use std::sync::Mutex;

use crate::bigint::BigInt;

/// Wraps any randomness source that implements [`rand_core::RngCore`] and
/// makes it compatible with [`rug::rand`].
pub fn external_rand(rng: &mut impl RngCore) -> rug::rand::ThreadRandState<'_> {
    use bytemuck::TransparentWrapper;

    #[derive(bytemuck::TransparentWrapper)]
    #[repr(transparent)]
    struct ExternalRand<R>(R);

    impl<R: RngCore> rug::rand::ThreadRandGen for ExternalRand<R> {
        fn gen(&mut self) -> u32 {
            self.0.next_u32()
        }
    }

    rug::rand::ThreadRandState::new_custom(ExternalRand::wrap_mut(rng))
}

/// Process-wide random source, seeded from OS entropy at first use.
///
/// Collapses the original C++ implementation's `Random::instance()`
/// singleton (a `gmp_randstate_t` seeded once from `/dev/urandom`) into a
/// safe Rust equivalent: a mutex-guarded, lazily-initialized CSPRNG. Exists
/// only for callers who don't want to thread an RNG through; every core
/// operation also accepts an explicit RNG so tests can use deterministic
/// seeds (see design note on injectable randomness).
static GLOBAL_RNG: Lazy<Mutex<ChaCha20Rng>> =
    Lazy::new(|| Mutex::new(ChaCha20Rng::from_rng(OsRng).expect("OS entropy source failed")));

/// A thin RNG handle that serializes access to the process-wide source.
/// Safe to share across worker threads during randomizer-table
/// precomputation.
#[derive(Clone, Copy, Default)]
pub struct GlobalRng;

impl RngCore for GlobalRng {
    fn next_u32(&mut self) -> u32 {
        GLOBAL_RNG.lock().expect("global rng poisoned").next_u32()
    }
    fn next_u64(&mut self) -> u64 {
        GLOBAL_RNG.lock().expect("global rng poisoned").next_u64()
    }
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        GLOBAL_RNG
            .lock()
            .expect("global rng poisoned")
            .fill_bytes(dest)
    }
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        GLOBAL_RNG
            .lock()
            .expect("global rng poisoned")
            .try_fill_bytes(dest)
    }
}

impl CryptoRng for GlobalRng {}

/// Returns a handle to the process-wide random source.
pub fn global_rng() -> GlobalRng {
    GlobalRng
}

/// Checks that `x` is in `Z*_n`, i.e. `0 <= x` and `gcd(x, n) == 1`.
#[inline]
pub fn in_mult_group(x: &BigInt, n: &BigInt) -> bool {
    !x.is_negative() && in_mult_group_abs(x, n)
}

/// Checks that `abs(x)` is in `Z*_n`.
#[inline]
pub fn in_mult_group_abs(x: &BigInt, n: &BigInt) -> bool {
    x.gcd(n) == BigInt::one()
}

/// Samples `x` uniformly in `Z*_n`.
pub fn sample_in_mult_group(rng: &mut (impl RngCore + CryptoRng), n: &BigInt) -> BigInt {
    loop {
        let x = BigInt::random_below(rng, n);
        if in_mult_group(&x, n) {
            return x;
        }
    }
}

/// Generates a random prime of exactly `bits` bits.
pub fn generate_prime(rng: &mut (impl RngCore + CryptoRng), bits: u32) -> BigInt {
    BigInt::random_prime(rng, bits)
}

/// Generates a random safe prime (`p` such that `(p-1)/2` is also prime) of
/// exactly `bits` bits, as used by the reference Paillier variant.
pub fn generate_safe_prime(rng: &mut (impl RngCore + CryptoRng), bits: u32) -> BigInt {
    loop {
        let mut candidate = BigInt::random_bits(rng, bits - 1);
        candidate.set_bit(bits - 2, true);
        let candidate = &(&candidate << 1) + &BigInt::one();
        if candidate.is_prime() {
            return candidate;
        }
    }
}

/// Binomial coefficient `C(n, r)`, computed exactly.
pub fn n_choose_r(n: u64, r: u64) -> Integer {
    if r > n {
        return Integer::new();
    }
    Integer::from(n).binomial(r as u32)
}

/// Smallest `r_use` such that `log2(C(r_lut + r_use - 1, r_use)) >= r_bits`.
///
/// Standalone recomputation of the fast randomizer's `r_use` parameter
/// (spec: "a standalone utility recomputes it for arbitrary parameters"),
/// grounded on `bin/ophelib_compute_randomizer_params.cpp`'s `compute_bits`.
pub fn compute_r_use(r_bits: u32, r_lut: u64) -> u64 {
    let mut r_use = 1u64;
    loop {
        let combinations = n_choose_r(r_lut + r_use - 1, r_use);
        let bits = log2_integer(&combinations);
        if bits >= r_bits as f64 {
            return r_use;
        }
        r_use += 1;
    }
}

fn log2_integer(x: &Integer) -> f64 {
    if x.cmp0() == std::cmp::Ordering::Equal {
        return f64::NEG_INFINITY;
    }
    // significant_bits() gives a coarse estimate good enough to avoid
    // precision loss from converting a huge Integer straight to f64.
    let bits = x.significant_bits();
    if bits <= 1024 {
        x.to_f64().log2()
    } else {
        let shift = bits - 1024;
        let scaled = (x >> shift).complete();
        scaled.to_f64().log2() + shift as f64
    }
}
