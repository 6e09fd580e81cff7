//! Secret sharing over the integers.
//!
//! The secret is multiplied by `delta = n!` and the polynomial coefficients are
//! random signed integers of `key_bits + bits(delta²) + sigma` bits, so that
//! any `t - 1` shares are statistically independent of the secret. Integer
//! Lagrange coefficients are `delta` times the rational ones, hence the
//! interpolation at zero yields `delta²·s` and reconstruction ends with an
//! exact division.

use super::{
    integer_lagrange, validate_indices, LagrangeCoefficients, Share, ThresholdConfig,
    ThresholdSharing,
};
use crate::{Error, Result};
use itertools::Itertools;
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::Zero;
use rand::{CryptoRng, RngCore};
use secagg_util::sample_signed;

/// Statistically hiding secret sharing of integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerSharing {
    config: ThresholdConfig,
    key_bits: usize,
    sigma: usize,
    delta: BigUint,
    coefficient_bits: u64,
}

impl IntegerSharing {
    /// Creates a scheme for secrets of at most `key_bits` bits with statistical
    /// security parameter `sigma`.
    pub fn new(key_bits: usize, sigma: usize, config: ThresholdConfig) -> Result<Self> {
        if key_bits == 0 {
            return Err(Error::configuration("The key size must be positive"));
        }
        if sigma == 0 {
            return Err(Error::configuration(
                "The statistical security parameter must be positive",
            ));
        }
        let delta = config.delta();
        let coefficient_bits = (key_bits + sigma) as u64 + (&delta * &delta).bits();
        Ok(Self {
            config,
            key_bits,
            sigma,
            delta,
            coefficient_bits,
        })
    }

    /// `n!`.
    pub fn delta(&self) -> &BigUint {
        &self.delta
    }

    /// Bit length of the secrets.
    pub fn key_bits(&self) -> usize {
        self.key_bits
    }

    /// Statistical security parameter.
    pub fn sigma(&self) -> usize {
        self.sigma
    }

    /// Bit length of the random polynomial coefficients.
    pub fn coefficient_bits(&self) -> u64 {
        self.coefficient_bits
    }
}

impl ThresholdSharing for IntegerSharing {
    type Secret = BigInt;
    type Value = BigInt;
    type Coefficient = BigInt;

    fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    fn share<R: RngCore + CryptoRng>(
        &self,
        secret: &BigInt,
        rng: &mut R,
    ) -> Result<Vec<Share<BigInt>>> {
        let mut coefficients = (1..self.config.threshold())
            .map(|_| sample_signed(self.coefficient_bits, rng))
            .collect_vec();
        coefficients.push(secret * BigInt::from(self.delta.clone()));

        Ok((1..=self.config.parties())
            .map(|i| {
                let x = BigInt::from(i);
                let y = coefficients
                    .iter()
                    .fold(BigInt::zero(), |acc, c| acc * &x + c);
                Share::new(i, y)
            })
            .collect())
    }

    fn lagrange<T>(&self, shares: &[Share<T>]) -> Result<LagrangeCoefficients<BigInt>> {
        let indices = validate_indices(shares, &self.config)?;
        integer_lagrange(&indices, &self.delta)
    }

    fn reconstruct(
        &self,
        shares: &[Share<BigInt>],
        coefficients: &LagrangeCoefficients<BigInt>,
    ) -> Result<BigInt> {
        validate_indices(shares, &self.config)?;
        let interpolated: BigInt = shares
            .iter()
            .zip_eq(coefficients.for_shares(shares)?)
            .map(|(s, c)| s.value() * c)
            .sum();
        let delta_squared = BigInt::from(&self.delta * &self.delta);
        let (secret, remainder) = interpolated.div_rem(&delta_squared);
        if !remainder.is_zero() {
            return Err(Error::arithmetic(
                "The interpolated value is not a multiple of delta²",
            ));
        }
        Ok(secret)
    }
}

impl Share<BigInt> {
    /// Subtracts two shares held at the same index.
    pub fn try_sub(&self, other: &Self) -> Result<Self> {
        if self.index() != other.index() {
            return Err(Error::index_mismatch(self.index(), other.index()));
        }
        Ok(Share::new(self.index(), self.value() - other.value()))
    }

    /// Multiplies the share by a public scalar.
    pub fn scale(&self, scalar: &BigInt) -> Self {
        Share::new(self.index(), self.value() * scalar)
    }
}
