//! Produces the multiplicative noise factor `r^n mod n^2` used to
//! re-randomize a Paillier ciphertext after encryption.
//!
//! Reshaped from the original C++ implementation's
//! `PaillierFast::Randomizer` / `PaillierFast::FastRandomizer` inheritance
//! pair (`include/ophelib/paillier_fast.h`) into a capability trait with
//! two concrete variants, per the design note on `Randomizer` →
//! `FastRandomizer`.

use std::sync::Mutex;

use rand_core::{CryptoRng, RngCore};

use crate::bigint::BigInt;
use crate::error::{CryptoError, Result};
use crate::fast_mod::FastMod;

/// Capability to produce a fresh re-randomization factor `r^n mod n^2`.
pub trait Randomizer {
    fn get_noise(&self) -> Result<BigInt>;
}

/// Direct randomizer: draws a fresh `r` of `r_bits` bits on every call and
/// computes `r^n mod n^2`, optionally accelerated by [`FastMod`].
///
/// Used by the reference [`crate::paillier::Paillier`] variant, matching
/// `original_source/src/paillier.cpp`'s `randomizer_val`.
pub struct DirectRandomizer<R> {
    n: BigInt,
    n2: BigInt,
    fast_mod: Option<FastMod>,
    r_bits: u32,
    rng: Mutex<R>,
}

impl<R: RngCore + CryptoRng> DirectRandomizer<R> {
    pub fn new(n: BigInt, n2: BigInt, fast_mod: Option<FastMod>, r_bits: u32, rng: R) -> Self {
        DirectRandomizer {
            n,
            n2,
            fast_mod,
            r_bits,
            rng: Mutex::new(rng),
        }
    }
}

impl<R: RngCore + CryptoRng> Randomizer for DirectRandomizer<R> {
    fn get_noise(&self) -> Result<BigInt> {
        let r = {
            let mut rng = self.rng.lock().expect("randomizer rng poisoned");
            BigInt::random_bits(&mut *rng, self.r_bits)
        };
        let noise = match &self.fast_mod {
            Some(fast_mod) => fast_mod.pow_mod_n2(&r, &self.n),
            None => r.pow_mod(&self.n, &self.n2)?,
        };
        Ok(noise)
    }
}

/// Fast randomizer using a precomputed lookup table of
/// `(g^n)^{r_i} mod n^2` values.
///
/// Table size `r_lut_size` and selection count `r_use_count` are derived
/// from the combinatorial bound `log2(C(r_lut_size + r_use_count - 1,
/// r_use_count)) >= r_bits` (see [`crate::utils::compute_r_use`]), so that
/// the random product over `r_use_count` table entries (with replacement)
/// has at least `r_bits` bits of entropy.
pub struct LutRandomizer {
    n2: BigInt,
    r_lut_size: usize,
    r_use_count: usize,
    table: Vec<BigInt>,
}

impl LutRandomizer {
    /// Builds an (unpopulated) lut randomizer. Call [`LutRandomizer::precompute`]
    /// before the first [`Randomizer::get_noise`] call.
    pub fn new(n2: BigInt, r_lut_size: usize, r_use_count: usize) -> Self {
        LutRandomizer {
            n2,
            r_lut_size,
            r_use_count,
            table: Vec::new(),
        }
    }

    /// Populates the lookup table: `r_lut_size` independent draws of a
    /// `r_bits`-bit exponent `r_i`, each contributing `gn^{r_i} mod n^2`.
    ///
    /// `gn` is `g^n mod n^2` (optionally via [`FastMod`]), already raised
    /// by the caller before this is invoked. Entries are appended in
    /// whatever order worker threads complete in; the order is observable
    /// but not semantically significant (spec §5 point 2).
    #[cfg(feature = "parallel")]
    pub fn precompute(
        &mut self,
        gn: &BigInt,
        fast_mod: Option<&FastMod>,
        r_bits: u32,
        rng: &mut (impl RngCore + CryptoRng + Clone + Send),
    ) {
        let table = Mutex::new(Vec::with_capacity(self.r_lut_size));
        let n_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .max(1);
        let chunk = self.r_lut_size.div_ceil(n_threads);

        std::thread::scope(|scope| {
            for t in 0..n_threads {
                let start = t * chunk;
                let end = (start + chunk).min(self.r_lut_size);
                if start >= end {
                    continue;
                }
                let mut worker_rng = rng.clone();
                let table = &table;
                let n2 = &self.n2;
                scope.spawn(move || {
                    let mut local = Vec::with_capacity(end - start);
                    for _ in start..end {
                        let r = BigInt::random_bits(&mut worker_rng, r_bits);
                        let value = match fast_mod {
                            Some(fast_mod) => fast_mod.pow_mod_n2(gn, &r),
                            None => gn
                                .pow_mod(&r, n2)
                                .expect("gn must be invertible modulo n^2"),
                        };
                        local.push(value);
                    }
                    table.lock().expect("lut table poisoned").extend(local);
                });
            }
        });

        self.table = table.into_inner().expect("lut table poisoned");
    }

    /// Sequential fallback for the `parallel` feature being disabled.
    #[cfg(not(feature = "parallel"))]
    pub fn precompute(
        &mut self,
        gn: &BigInt,
        fast_mod: Option<&FastMod>,
        r_bits: u32,
        rng: &mut (impl RngCore + CryptoRng),
    ) {
        self.table.clear();
        self.table.reserve(self.r_lut_size);
        for _ in 0..self.r_lut_size {
            let r = BigInt::random_bits(rng, r_bits);
            let value = match fast_mod {
                Some(fast_mod) => fast_mod.pow_mod_n2(gn, &r),
                None => gn
                    .pow_mod(&r, &self.n2)
                    .expect("gn must be invertible modulo n^2"),
            };
            self.table.push(value);
        }
    }

    pub fn is_precomputed(&self) -> bool {
        !self.table.is_empty()
    }

    /// Draws `r_use_count` indices with replacement using `rng`, and
    /// returns the product of the selected table entries modulo `n^2`.
    pub fn get_noise_with(&self, rng: &mut (impl RngCore + CryptoRng)) -> Result<BigInt> {
        if !self.is_precomputed() {
            return Err(CryptoError::NotPrecomputed.into());
        }
        let mut acc = BigInt::one();
        for _ in 0..self.r_use_count {
            let idx = (rng.next_u64() as usize) % self.r_lut_size;
            acc = (&acc * &self.table[idx]).modulo(&self.n2);
        }
        Ok(acc)
    }
}
