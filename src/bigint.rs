//! Arbitrary-precision signed integer used at every public surface of this
//! crate.
//!
//! Thin wrapper around [`rug::Integer`] (the teacher crate uses
//! `rug::Integer` directly as its `Ciphertext`/`Plaintext`/`Nonce` type
//! aliases; here it's promoted to a dedicated newtype so the public API
//! never leaks `rug` types). Bit length of zero is defined as 1, matching
//! the `size_bits()` contract of the original C++ `Integer` class.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Shl, Shr, Sub};

use rand_core::{CryptoRng, RngCore};
use rug::integer::IsPrime;
use rug::{Complete, Integer};

use crate::error::{MathError, Result};
use crate::utils;

/// Arbitrary-precision signed integer.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BigInt(pub(crate) Integer);

impl BigInt {
    pub fn zero() -> Self {
        BigInt(Integer::new())
    }

    pub fn one() -> Self {
        BigInt(Integer::from(1))
    }

    pub fn from_str_radix(s: &str, radix: i32) -> Result<Self> {
        Integer::from_str_radix(s, radix)
            .map(BigInt)
            .map_err(|_| MathError::OutOfRange.into())
    }

    pub(crate) fn raw(&self) -> &Integer {
        &self.0
    }

    pub(crate) fn into_raw(self) -> Integer {
        self.0
    }

    pub(crate) fn from_raw(i: Integer) -> Self {
        BigInt(i)
    }

    /// Bit length. `bit_length(0) == 1`.
    pub fn bit_length(&self) -> u32 {
        if self.0.cmp0() == Ordering::Equal {
            1
        } else {
            self.0.significant_bits()
        }
    }

    pub fn set_bit(&mut self, index: u32, value: bool) {
        self.0.set_bit(index, value);
    }

    pub fn is_negative(&self) -> bool {
        self.0.cmp0() == Ordering::Less
    }

    /// `self ^ exponent`. There is no negative-exponent case: the exponent
    /// is unsigned, so a caller who wants "reject negative exponents"
    /// (rather than ophelib's silent zero) gets it for free from the type.
    pub fn pow(&self, exponent: u32) -> Self {
        BigInt(self.0.clone().pow(exponent))
    }

    /// `self ^ exponent mod modulus`. Fails if `modulus == 0` or if the
    /// base has no inverse when `exponent` is negative.
    pub fn pow_mod(&self, exponent: &BigInt, modulus: &BigInt) -> Result<Self> {
        if modulus.0.cmp0() == Ordering::Equal {
            return Err(MathError::DivByZero.into());
        }
        self.0
            .clone()
            .pow_mod(&exponent.0, &modulus.0)
            .map(BigInt)
            .map_err(|_| MathError::NoInverse.into())
    }

    /// Multiplicative inverse modulo `modulus`. Fails if it does not exist.
    pub fn inv_mod(&self, modulus: &BigInt) -> Result<Self> {
        self.0
            .clone()
            .invert(&modulus.0)
            .map(BigInt)
            .map_err(|_| MathError::NoInverse.into())
    }

    pub fn gcd(&self, other: &BigInt) -> Self {
        BigInt(self.0.clone().gcd(&other.0))
    }

    pub fn lcm(&self, other: &BigInt) -> Self {
        BigInt(self.0.clone().lcm(&other.0))
    }

    /// Miller-Rabin primality test, round count scaled by bit length
    /// (27 rounds below 150 bits, tapering to 2 rounds at >= 1300 bits),
    /// yielding an error rate below 2^-80 for random inputs. Matches the
    /// `N_PRIME_CHEKS_FOR_SIZE` table from the original implementation.
    pub fn is_prime(&self) -> bool {
        let rounds = miller_rabin_rounds(self.bit_length());
        matches!(
            self.0.is_probably_prime(rounds),
            IsPrime::Yes | IsPrime::Probably
        )
    }

    /// The Paillier `L` function: `(u - 1) / d`, exact integer division.
    pub fn l(u: &BigInt, d: &BigInt) -> Result<Self> {
        if d.0.cmp0() == Ordering::Equal {
            return Err(MathError::DivByZero.into());
        }
        Ok(BigInt((&u.0 - Integer::ONE).complete() / &d.0))
    }

    /// Uniformly random integer in `[0, bound)`. `bound` must be >= 2.
    pub fn random_below(rng: &mut (impl RngCore + CryptoRng), bound: &BigInt) -> Self {
        let mut state = utils::external_rand(rng);
        BigInt(bound.0.clone().random_below(&mut state))
    }

    /// Uniformly random integer of at most `n_bits` bits (`n_bits >= 1`).
    pub fn random_bits(rng: &mut (impl RngCore + CryptoRng), n_bits: u32) -> Self {
        let mut state = utils::external_rand(rng);
        BigInt(Integer::from(Integer::random_bits(n_bits, &mut state)))
    }

    /// Random prime of exactly `n_bits` bits (`n_bits >= 2`): the top bit
    /// is forced set so the output has exactly `n_bits` bits, and
    /// primality is confirmed with [`BigInt::is_prime`].
    pub fn random_prime(rng: &mut (impl RngCore + CryptoRng), n_bits: u32) -> Self {
        loop {
            let mut candidate = Self::random_bits(rng, n_bits);
            candidate.set_bit(n_bits - 1, true);
            if candidate.is_prime() {
                return candidate;
            }
        }
    }

    /// `self mod modulus`, normalized to `[0, modulus)`.
    pub fn modulo(&self, modulus: &BigInt) -> Self {
        let c = (&self.0 % &modulus.0).complete();
        if c.cmp0() == Ordering::Less {
            BigInt((&modulus.0 + c).complete())
        } else {
            BigInt(c)
        }
    }

    pub fn to_u32_digits(&self) -> (bool, Vec<u32>) {
        let neg = self.is_negative();
        let digits = self.0.to_digits::<u32>(rug::integer::Order::Lsf);
        (neg, digits)
    }

    pub fn from_u32_digits(neg: bool, digits: &[u32]) -> Self {
        let mut i = Integer::from_digits(digits, rug::integer::Order::Lsf);
        if neg {
            i = -i;
        }
        BigInt(i)
    }
}

fn miller_rabin_rounds(bits: u32) -> u32 {
    match bits {
        b if b >= 1300 => 2,
        b if b >= 850 => 3,
        b if b >= 650 => 4,
        b if b >= 550 => 5,
        b if b >= 450 => 6,
        b if b >= 400 => 7,
        b if b >= 350 => 8,
        b if b >= 300 => 9,
        b if b >= 250 => 12,
        b if b >= 200 => 15,
        b if b >= 150 => 18,
        _ => 27,
    }
}

impl From<i64> for BigInt {
    fn from(v: i64) -> Self {
        BigInt(Integer::from(v))
    }
}

impl From<u64> for BigInt {
    fn from(v: u64) -> Self {
        BigInt(Integer::from(v))
    }
}

impl From<i32> for BigInt {
    fn from(v: i32) -> Self {
        BigInt(Integer::from(v))
    }
}

impl From<u32> for BigInt {
    fn from(v: u32) -> Self {
        BigInt(Integer::from(v))
    }
}

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.0.cmp(&other.0))
    }
}

impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Debug for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigInt({} bits)", self.bit_length())
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for &BigInt {
    type Output = BigInt;
    fn add(self, rhs: &BigInt) -> BigInt {
        BigInt((&self.0 + &rhs.0).complete())
    }
}

impl Sub for &BigInt {
    type Output = BigInt;
    fn sub(self, rhs: &BigInt) -> BigInt {
        BigInt((&self.0 - &rhs.0).complete())
    }
}

impl Mul for &BigInt {
    type Output = BigInt;
    fn mul(self, rhs: &BigInt) -> BigInt {
        BigInt((&self.0 * &rhs.0).complete())
    }
}

impl Neg for &BigInt {
    type Output = BigInt;
    fn neg(self) -> BigInt {
        BigInt((-&self.0).complete())
    }
}

impl Shl<u32> for &BigInt {
    type Output = BigInt;
    fn shl(self, rhs: u32) -> BigInt {
        BigInt((&self.0 << rhs).complete())
    }
}

impl Shr<u32> for &BigInt {
    type Output = BigInt;
    fn shr(self, rhs: u32) -> BigInt {
        BigInt((&self.0 >> rhs).complete())
    }
}

/// Truncating division. Panics if `rhs == 0`, matching `rug::Integer`'s own
/// `Div` impl (and every other operator forwarded here).
impl std::ops::Div for &BigInt {
    type Output = BigInt;
    fn div(self, rhs: &BigInt) -> BigInt {
        BigInt((&self.0 / &rhs.0).complete())
    }
}

impl Add for BigInt {
    type Output = BigInt;
    fn add(self, rhs: BigInt) -> BigInt {
        &self + &rhs
    }
}

impl Sub for BigInt {
    type Output = BigInt;
    fn sub(self, rhs: BigInt) -> BigInt {
        &self - &rhs
    }
}

impl Mul for BigInt {
    type Output = BigInt;
    fn mul(self, rhs: BigInt) -> BigInt {
        &self * &rhs
    }
}

impl Neg for BigInt {
    type Output = BigInt;
    fn neg(self) -> BigInt {
        -&self
    }
}
