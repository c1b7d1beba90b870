//! Error taxonomy shared by every module in this crate.
//!
//! Mirrors the structure the teacher crate uses (an opaque [`Error`]
//! wrapping a private `Reason` enum), generalized to the five error
//! categories the scheme actually needs: arithmetic domain errors, shape
//! mismatches, cryptographic usage errors, unsupported parameters, and a
//! reserved not-implemented marker.

use std::fmt;

/// Opaque error type returned by every fallible operation in this crate.
///
/// Callers can match on [`Error::kind`] to recover the category without
/// depending on the (private) reason enum directly.
#[derive(Debug, thiserror::Error)]
#[error("{reason}")]
pub struct Error {
    reason: Reason,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Error {
    pub(crate) fn new(reason: Reason) -> Self {
        Error {
            reason,
            source: None,
        }
    }

    /// Which broad category this error falls into.
    pub fn kind(&self) -> ErrorKind {
        self.reason.kind()
    }
}

impl From<Reason> for Error {
    fn from(reason: Reason) -> Self {
        Error::new(reason)
    }
}

/// Broad category of an [`Error`], matching the taxonomy in the
/// specification: domain errors in arithmetic, shape mismatches,
/// cryptographic misuse, unsupported parameters, and reserved
/// not-implemented markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Math,
    Dimension,
    Crypto,
    Param,
    NotImplemented,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum Reason {
    #[error("math error: {0}")]
    Math(#[from] MathError),
    #[error("dimension error: {0}")]
    Dimension(#[from] DimensionError),
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
    #[error("parameter error: {0}")]
    Param(#[from] ParamError),
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}

impl Reason {
    fn kind(&self) -> ErrorKind {
        match self {
            Reason::Math(_) => ErrorKind::Math,
            Reason::Dimension(_) => ErrorKind::Dimension,
            Reason::Crypto(_) => ErrorKind::Crypto,
            Reason::Param(_) => ErrorKind::Param,
            Reason::NotImplemented(_) => ErrorKind::NotImplemented,
        }
    }
}

/// Domain errors in arithmetic: non-invertible elements, division/modulo
/// by zero, out-of-range conversions.
#[derive(Debug, thiserror::Error)]
pub enum MathError {
    #[error("modular inverse does not exist")]
    NoInverse,
    #[error("division or modulo by zero")]
    DivByZero,
    #[error("value out of range for target type")]
    OutOfRange,
    #[error("matrix is not invertible")]
    SingularMatrix,
}

/// Vector/matrix shape mismatch.
#[derive(Debug, thiserror::Error)]
pub enum DimensionError {
    #[error("expected length {expected}, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("expected {expected_rows}x{expected_cols} matrix, got {actual_rows}x{actual_cols}")]
    Shape {
        expected_rows: usize,
        expected_cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },
}

/// Cryptographic usage errors: missing keys, missing/mismatched moduli,
/// invalid key material.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("no public key loaded")]
    NoPublicKey,
    #[error("no private key loaded")]
    NoPrivateKey,
    #[error("ciphertext has no modulus attached")]
    NoModulus,
    #[error("ciphertexts belong to different moduli")]
    MismatchedModulus,
    #[error("plaintext out of bounds")]
    PlaintextOutOfBounds,
    #[error("nonce is not in the multiplicative group")]
    InvalidNonce,
    #[error("invalid private key: {0}")]
    InvalidKey(&'static str),
    #[error("randomizer lookup table was not precomputed")]
    NotPrecomputed,
    #[error("homomorphic operation failed")]
    Operation,
}

/// Unsupported key_size_bits / r_bits / plaintext-bit configuration.
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    #[error("unsupported key size: {0} bits")]
    UnsupportedKeySize(usize),
    #[error("unsupported randomizer bit strength: {0}")]
    UnsupportedRBits(usize),
    #[error("too many plaintexts for this pack (max {max}, got {got})")]
    TooManySlots { max: usize, got: usize },
    #[error("plaintext has more than {max} bits of magnitude")]
    PlaintextTooWide { max: usize },
}

impl Error {
    pub(crate) fn not_implemented(what: &'static str) -> Self {
        Error::new(Reason::NotImplemented(what))
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Math => "math",
            ErrorKind::Dimension => "dimension",
            ErrorKind::Crypto => "crypto",
            ErrorKind::Param => "param",
            ErrorKind::NotImplemented => "not_implemented",
        };
        f.write_str(s)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
