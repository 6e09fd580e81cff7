//! Secret sharing over `Z_{n·φ(n)}`.
//!
//! The order `n·φ(n)` is a multiple of the order of every unit of
//! `Z_{n²}`, so shares of an exponent can be combined in the exponent with the
//! integer Lagrange coefficients. Only the dealer knows the order; the other
//! parties hold a [`RingSharing::public`] instance which computes Lagrange
//! coefficients but cannot share or reconstruct.

use super::{
    integer_lagrange, validate_indices, LagrangeCoefficients, Share, ThresholdConfig,
    ThresholdSharing,
};
use crate::{Error, Result};
use itertools::Itertools;
use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use secagg_math::modular::{mod_inverse, reduce_signed};

/// Secret sharing modulo `n·φ(n)`.
#[derive(Clone, PartialEq, Eq)]
pub struct RingSharing {
    config: ThresholdConfig,
    delta: BigUint,
    order: Option<BigUint>,
}

impl std::fmt::Debug for RingSharing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingSharing")
            .field("config", &self.config)
            .field("dealer", &self.order.is_some())
            .finish()
    }
}

impl RingSharing {
    /// Creates the dealer's scheme for the modulus `n` with Euler totient `phi_n`.
    pub fn new(n: &BigUint, phi_n: &BigUint, config: ThresholdConfig) -> Result<Self> {
        if n <= &BigUint::one() || phi_n.is_zero() || phi_n >= n {
            return Err(Error::configuration("Invalid modulus or totient"));
        }
        Ok(Self {
            config,
            delta: config.delta(),
            order: Some(n * phi_n),
        })
    }

    /// Creates a scheme without knowledge of the ring order, for parties that
    /// only combine shares in the exponent.
    pub fn public(config: ThresholdConfig) -> Self {
        Self {
            config,
            delta: config.delta(),
            order: None,
        }
    }

    /// `n!`.
    pub fn delta(&self) -> &BigUint {
        &self.delta
    }

    /// The ring order `n·φ(n)`, known to the dealer only.
    pub fn order(&self) -> Result<&BigUint> {
        self.order
            .as_ref()
            .ok_or_else(|| Error::configuration("The ring order is only known to the dealer"))
    }

    /// The bound below which [`ThresholdSharing::reconstruct`] recovers the
    /// secret exactly: `n·φ(n) / gcd(delta, n·φ(n))`.
    pub fn reconstruction_bound(&self) -> Result<BigUint> {
        let order = self.order()?;
        Ok(order / self.delta.gcd(order))
    }
}

impl ThresholdSharing for RingSharing {
    type Secret = BigUint;
    type Value = BigUint;
    type Coefficient = BigInt;

    fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    fn share<R: RngCore + CryptoRng>(
        &self,
        secret: &BigUint,
        rng: &mut R,
    ) -> Result<Vec<Share<BigUint>>> {
        let order = self.order()?;
        let mut coefficients = (1..self.config.threshold())
            .map(|_| rng.gen_biguint_below(order))
            .collect_vec();
        coefficients.push(secret % order);

        Ok((1..=self.config.parties())
            .map(|i| {
                let x = BigUint::from(i);
                let y = coefficients
                    .iter()
                    .fold(BigUint::zero(), |acc, c| (acc * &x + c) % order);
                Share::new(i, y)
            })
            .collect())
    }

    fn lagrange<T>(&self, shares: &[Share<T>]) -> Result<LagrangeCoefficients<BigInt>> {
        let indices = validate_indices(shares, &self.config)?;
        integer_lagrange(&indices, &self.delta)
    }

    /// Interpolation gives `delta·s` modulo the order; `delta` is divided out
    /// modulo `order / gcd(delta, order)`.
    fn reconstruct(
        &self,
        shares: &[Share<BigUint>],
        coefficients: &LagrangeCoefficients<BigInt>,
    ) -> Result<BigUint> {
        let order = self.order()?;
        validate_indices(shares, &self.config)?;
        let interpolated: BigInt = shares
            .iter()
            .zip_eq(coefficients.for_shares(shares)?)
            .map(|(s, c)| BigInt::from(s.value().clone()) * c)
            .sum();
        let v = reduce_signed(&interpolated, order);

        let g = self.delta.gcd(order);
        if !(&v % &g).is_zero() {
            return Err(Error::arithmetic(
                "The interpolated value is not a multiple of gcd(delta, n·φ(n))",
            ));
        }
        let bound = order / &g;
        let inverse = mod_inverse(&(&self.delta / &g), &bound)?;
        Ok(((v / &g) * inverse) % bound)
    }
}
