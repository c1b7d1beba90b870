//! Fast modular exponentiation modulo `n^2`, splitting the computation
//! into independent exponentiations modulo `p^2` and `q^2` and recombining
//! with the Chinese Remainder Theorem.
//!
//! Grounded on the teacher crate's `decryption_key/faster_encryption.rs`
//! (`factorized_exp`), generalized into a standalone, reusable type the way
//! the original C++ implementation's `FastMod` class
//! (`include/ophelib/fast_mod.h`, `src/fast_mod.cpp`) is: the teacher only
//! used this trick to speed up encryption. Here it backs both encryption
//! and decryption in [`crate::paillier_fast::PaillierFast`].

use rug::Complete;

use crate::bigint::BigInt;

/// Precomputed CRT state for fast exponentiation modulo `n^2 = (p*q)^2`.
///
/// Correctness relies on `gcd(p^2, q^2) == 1`, guaranteed because `p` and
/// `q` are distinct primes.
#[derive(Clone, Debug)]
pub struct FastMod {
    p: BigInt,
    q: BigInt,
    p2: BigInt,
    q2: BigInt,
    n: BigInt,
    n2: BigInt,
}

impl FastMod {
    /// Builds from the two secret primes, deriving `p^2, q^2, n, n^2`.
    pub fn new(p: BigInt, q: BigInt) -> Self {
        let p2 = &p * &p;
        let q2 = &q * &q;
        let n = &p * &q;
        let n2 = &n * &n;
        FastMod { p, q, p2, q2, n, n2 }
    }

    /// Builds from fully precomputed values, to save recomputing them when
    /// the caller already has them on hand.
    pub fn from_parts(p: BigInt, q: BigInt, p2: BigInt, q2: BigInt, n: BigInt, n2: BigInt) -> Self {
        FastMod { p, q, p2, q2, n, n2 }
    }

    pub fn n(&self) -> &BigInt {
        &self.n
    }

    pub fn n2(&self) -> &BigInt {
        &self.n2
    }

    /// `base^exp mod n^2`, computed by reducing modulo `p^2` and `q^2`
    /// independently and recombining via the extended Euclidean algorithm
    /// on `(p^2, q^2)`.
    pub fn pow_mod_n2(&self, base: &BigInt, exp: &BigInt) -> BigInt {
        let u = pow_mod_or_zero(base, exp, &self.p2);
        let v = pow_mod_or_zero(base, exp, &self.q2);
        self.crt_combine(&u, &v)
    }

    /// Same as [`FastMod::pow_mod_n2`] but computes the two
    /// half-exponentiations concurrently. Must produce identical results
    /// to the sequential variant (tested).
    #[cfg(feature = "parallel")]
    pub fn pow_mod_n2_par(&self, base: &BigInt, exp: &BigInt) -> BigInt {
        let (u, v) = std::thread::scope(|scope| {
            let u_handle = scope.spawn(|| pow_mod_or_zero(base, exp, &self.p2));
            let v_handle = scope.spawn(|| pow_mod_or_zero(base, exp, &self.q2));
            (
                u_handle.join().expect("p^2 exponentiation thread panicked"),
                v_handle.join().expect("q^2 exponentiation thread panicked"),
            )
        });
        self.crt_combine(&u, &v)
    }

    fn crt_combine(&self, u: &BigInt, v: &BigInt) -> BigInt {
        let (r, s) = extended_gcd(self.p2.raw(), self.q2.raw());
        let r = BigInt::from_raw(r);
        let s = BigInt::from_raw(s);
        // (u*s*q2 + v*r*p2) mod n2
        let term1 = &(u * &s) * &self.q2;
        let term2 = &(v * &r) * &self.p2;
        (&term1 + &term2).modulo(&self.n2)
    }
}

/// `base^exp mod m`, treating a missing (non-existent) inverse for a
/// negative exponent as the algebraic identity it would be for an exact
/// CRT component: the shared `FastMod` construction guarantees the bases
/// it's called with are always invertible mod `p^2`/`q^2` in this crate's
/// use, so failure here indicates a genuine misuse and is reported as a
/// panic rather than threaded through as a `Result` in this hot path.
fn pow_mod_or_zero(base: &BigInt, exp: &BigInt, modulus: &BigInt) -> BigInt {
    base.pow_mod(exp, modulus)
        .expect("base must be invertible modulo p^2/q^2 when exponent is negative")
}

/// Extended Euclidean algorithm: returns `(r, s)` such that
/// `r*a + s*b == gcd(a, b)`.
fn extended_gcd(a: &rug::Integer, b: &rug::Integer) -> (rug::Integer, rug::Integer) {
    let (_gcd, r, s) = a.clone().gcd_cofactors(b.clone(), rug::Integer::new());
    (r, s)
}
