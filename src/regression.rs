//! Privacy-preserving linear regression: plaintext features, encrypted
//! targets and weights, fit via gradient descent.
//!
//! Grounded on `original_source/include/ophelib/ml.h` / `src/ml.cpp`'s
//! `ML::LinregPlainEnc`. Division (which needs the private key) cannot
//! happen homomorphically, so the original pushes it out to a
//! client-supplied callback; this module keeps that inversion of control
//! as a plain closure argument rather than the original's abstract-class
//! + `std::function` pair.

use crate::bigint::BigInt;
use crate::ciphertext::{Ciphertext, PackedCiphertext};
use crate::error::{DimensionError, Result};

/// Encrypted dot product of a plaintext feature row with an encrypted
/// weight vector: `sum_j x[j] * theta[j]`.
pub fn dot(x_row: &[BigInt], theta: &[Ciphertext]) -> Result<Ciphertext> {
    if x_row.len() != theta.len() {
        return Err(DimensionError::Length {
            expected: theta.len(),
            actual: x_row.len(),
        }
        .into());
    }
    let mut terms = x_row.iter().zip(theta.iter());
    let (x0, t0) = terms.next().ok_or(DimensionError::Length {
        expected: 1,
        actual: 0,
    })?;
    let mut acc = t0.mul_scalar(x0)?;
    for (x, t) in terms {
        acc = acc.add(&t.mul_scalar(x)?)?;
    }
    Ok(acc)
}

/// Linear regression over plaintext features `X` and encrypted targets `y`,
/// fit by gradient descent with encrypted weights `theta`.
///
/// `X` is normalized and integerized by `multiplier` before being passed
/// in, matching `original_source`'s convention that `y` is integerized at
/// twice the precision of `X` (so that products `x * theta` and `y` share a
/// scale).
pub struct LinearRegression {
    pub multiplier: BigInt,
    pub alpha_inv: BigInt,
    pub n_iter: usize,
    theta: Vec<Ciphertext>,
}

impl LinearRegression {
    pub fn new(multiplier: BigInt, alpha_inv: BigInt, n_iter: usize, theta: Vec<Ciphertext>) -> Self {
        LinearRegression {
            multiplier,
            alpha_inv,
            n_iter,
            theta,
        }
    }

    pub fn weights(&self) -> &[Ciphertext] {
        &self.theta
    }

    pub fn n_features(&self) -> usize {
        self.theta.len()
    }

    /// Runs up to `n_iter` gradient descent steps.
    ///
    /// `divide` is the client-side callback: given the packed per-feature
    /// gradient accumulators and the divisor `alpha_inv * n_samples`, it
    /// must return `encrypt(-decrypt(gradient) / divisor)` for each
    /// feature — exactly ophelib's `client_callback_fn_t` contract. This
    /// crate never performs the division itself since doing so requires
    /// the private key.
    pub fn fit(
        &mut self,
        x: &[Vec<BigInt>],
        y: &[Ciphertext],
        plaintext_bits: usize,
        buffer_bits: usize,
        mut divide: impl FnMut(&[PackedCiphertext], &BigInt) -> Result<Vec<Ciphertext>>,
    ) -> Result<usize> {
        if x.len() != y.len() {
            return Err(DimensionError::Length {
                expected: y.len(),
                actual: x.len(),
            }
            .into());
        }
        let n_samples = x.len();
        let n_features = self.theta.len();
        let divisor = &self.alpha_inv * &BigInt::from(n_samples as u64);

        for _ in 0..self.n_iter {
            // error[i] = dot(x[i], theta) - y[i]
            let mut errors = Vec::with_capacity(n_samples);
            for (x_row, y_i) in x.iter().zip(y.iter()) {
                let prediction = dot(x_row, &self.theta)?;
                errors.push(prediction.sub(y_i)?);
            }

            // gradient[j] = sum_i x[i][j] * error[i], packed per feature
            // for the client callback to divide and re-encrypt.
            let mut packed_gradients = Vec::with_capacity(n_features);
            for j in 0..n_features {
                let mut acc = errors[0].mul_scalar(&x[0][j])?;
                for i in 1..n_samples {
                    acc = acc.add(&errors[i].mul_scalar(&x[i][j])?)?;
                }
                packed_gradients.push(PackedCiphertext::new(acc, 1, plaintext_bits, buffer_bits));
            }

            let updates = divide(&packed_gradients, &divisor)?;
            if updates.len() != n_features {
                return Err(DimensionError::Length {
                    expected: n_features,
                    actual: updates.len(),
                }
                .into());
            }
            for (theta_j, update_j) in self.theta.iter_mut().zip(updates.iter()) {
                theta_j.add_assign(update_j)?;
            }
        }

        Ok(self.n_iter)
    }

    /// Predicts encrypted targets for plaintext feature rows.
    pub fn predict(&self, x: &[Vec<BigInt>]) -> Result<Vec<Ciphertext>> {
        x.iter().map(|row| dot(row, &self.theta)).collect()
    }
}

/// Normalizes and integerizes a single feature value: `round(x * multiplier)`.
///
/// Grounded on `ml.cpp`'s `normalize`/`integerize` helpers, collapsed into
/// one step since this crate takes already-scaled `f64` inputs rather than
/// the original's separate mean/stddev normalization pass.
pub fn integerize(x: f64, multiplier: &BigInt) -> BigInt {
    let scaled = (x * multiplier_as_f64(multiplier)).round();
    BigInt::from(scaled as i64)
}

fn multiplier_as_f64(multiplier: &BigInt) -> f64 {
    multiplier.to_string().parse().unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paillier::Paillier;
    use crate::utils;

    #[test]
    fn dot_product_matches_plaintext_computation() {
        let mut rng = utils::global_rng();
        let paillier = Paillier::generate(&mut rng, 256).unwrap();
        let theta = vec![
            paillier.encrypt_with_random(&mut rng, &BigInt::from(2i64)).unwrap().0,
            paillier.encrypt_with_random(&mut rng, &BigInt::from(3i64)).unwrap().0,
        ];
        let x_row = vec![BigInt::from(5i64), BigInt::from(7i64)];
        let result = dot(&x_row, &theta).unwrap();
        // 5*2 + 7*3 = 31
        assert_eq!(paillier.decrypt(&result).unwrap(), BigInt::from(31i64));
    }

    #[test]
    fn fit_converges_towards_plaintext_gradient_descent() {
        let mut rng = utils::global_rng();
        let paillier = Paillier::generate(&mut rng, 256).unwrap();

        // y = 2*x, single feature, trivially fit theta -> 2.
        let x = vec![
            vec![BigInt::from(1i64)],
            vec![BigInt::from(2i64)],
            vec![BigInt::from(3i64)],
        ];
        let y_plain = [2i64, 4, 6];
        let y: Vec<_> = y_plain
            .iter()
            .map(|v| {
                paillier
                    .encrypt_with_random(&mut rng, &BigInt::from(*v))
                    .unwrap()
                    .0
            })
            .collect();

        let theta0 = paillier.encrypt_with_random(&mut rng, &BigInt::zero()).unwrap().0;
        let mut model = LinearRegression::new(BigInt::from(1i64), BigInt::from(1i64), 5, vec![theta0]);

        model
            .fit(&x, &y, 32, 8, |packed, divisor| {
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

        // After a handful of steps theta should have moved towards 2.
        let final_theta = paillier.decrypt(&model.weights()[0]).unwrap();
        assert!(final_theta > BigInt::zero());
    }
}
