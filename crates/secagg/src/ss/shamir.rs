//! Shamir secret sharing over a prime field.

use super::{
    common_length, validate_indices, LagrangeCoefficients, Share, ThresholdConfig,
    ThresholdSharing,
};
use crate::{Error, Result};
use itertools::Itertools;
use rand::{CryptoRng, RngCore};
use secagg_math::zp::{FieldElement, PrimeField};
use std::sync::Arc;

/// Shamir secret sharing of field elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShamirSharing {
    field: Arc<PrimeField>,
    config: ThresholdConfig,
}

impl ShamirSharing {
    /// Creates a scheme for secrets of `bits` bits.
    pub fn new(bits: usize, config: ThresholdConfig) -> Result<Self> {
        Ok(Self {
            field: PrimeField::new_arc(bits)?,
            config,
        })
    }

    /// Creates a scheme over an existing field.
    pub fn with_field(field: &Arc<PrimeField>, config: ThresholdConfig) -> Self {
        Self {
            field: field.clone(),
            config,
        }
    }

    /// The field of the secrets and shares.
    pub fn field(&self) -> &Arc<PrimeField> {
        &self.field
    }

    fn check_field(&self, x: &FieldElement) -> Result<()> {
        if x.field() != &self.field {
            return Err(Error::Consistency(
                "The element does not belong to the field of the scheme".to_string(),
            ));
        }
        Ok(())
    }

    /// Split `secret`, also returning the polynomial coefficients from the
    /// highest degree down to the constant term.
    pub fn share_with_coefficients<R: RngCore + CryptoRng>(
        &self,
        secret: &FieldElement,
        rng: &mut R,
    ) -> Result<(Vec<Share<FieldElement>>, Vec<FieldElement>)> {
        self.check_field(secret)?;
        let mut coefficients = (1..self.config.threshold())
            .map(|_| FieldElement::random(&self.field, rng))
            .collect_vec();
        coefficients.push(secret.clone());

        let shares = (1..=self.config.parties())
            .map(|i| {
                let x = FieldElement::from_u64(i as u64, &self.field);
                Share::new(i, evaluate(&coefficients, &x))
            })
            .collect();
        Ok((shares, coefficients))
    }

    /// Split every component of `secrets` independently; party `i` receives
    /// the vector of its shares.
    pub fn share_vector<R: RngCore + CryptoRng>(
        &self,
        secrets: &[FieldElement],
        rng: &mut R,
    ) -> Result<Vec<Share<Vec<FieldElement>>>> {
        let mut values = vec![Vec::with_capacity(secrets.len()); self.config.parties()];
        for secret in secrets {
            for (v, s) in values.iter_mut().zip_eq(self.share(secret, rng)?) {
                v.push(s.into_value());
            }
        }
        Ok(values
            .into_iter()
            .enumerate()
            .map(|(i, v)| Share::new(i + 1, v))
            .collect())
    }

    /// Reconstruct a vector shared with [`ShamirSharing::share_vector`]. The
    /// Lagrange coefficients are computed once for all components.
    pub fn reconstruct_vector(
        &self,
        shares: &[Share<Vec<FieldElement>>],
    ) -> Result<Vec<FieldElement>> {
        let lagrange = self.lagrange(shares)?;
        let coefficients = lagrange.for_shares(shares)?;
        let len = common_length(shares)?;
        (0..len)
            .map(|k| {
                shares.iter().zip_eq(&coefficients).try_fold(
                    FieldElement::zero(&self.field),
                    |acc, (s, c)| {
                        let y = &s.value()[k];
                        self.check_field(y)?;
                        Ok(&acc + &(y * *c))
                    },
                )
            })
            .collect()
    }
}

fn evaluate(coefficients: &[FieldElement], x: &FieldElement) -> FieldElement {
    match coefficients.split_first() {
        Some((first, rest)) => rest
            .iter()
            .fold(first.clone(), |acc, c| &(&acc * x) + c),
        None => FieldElement::zero(x.field()),
    }
}

impl ThresholdSharing for ShamirSharing {
    type Secret = FieldElement;
    type Value = FieldElement;
    type Coefficient = FieldElement;

    fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    fn share<R: RngCore + CryptoRng>(
        &self,
        secret: &FieldElement,
        rng: &mut R,
    ) -> Result<Vec<Share<FieldElement>>> {
        self.share_with_coefficients(secret, rng)
            .map(|(shares, _)| shares)
    }

    fn lagrange<T>(&self, shares: &[Share<T>]) -> Result<LagrangeCoefficients<FieldElement>> {
        let indices = validate_indices(shares, &self.config)?;
        let points = indices
            .iter()
            .map(|&i| FieldElement::from_u64(i as u64, &self.field))
            .collect_vec();
        points
            .iter()
            .zip_eq(&indices)
            .map(|(xj, &j)| {
                let (num, den) = points.iter().filter(|xm| *xm != xj).fold(
                    (
                        FieldElement::one(&self.field),
                        FieldElement::one(&self.field),
                    ),
                    |(num, den), xm| (&num * xm, &den * &(xm - xj)),
                );
                Ok((j, &num * &den.inv()?))
            })
            .collect::<Result<Vec<_>>>()
            .map(LagrangeCoefficients::new)
    }

    fn reconstruct(
        &self,
        shares: &[Share<FieldElement>],
        coefficients: &LagrangeCoefficients<FieldElement>,
    ) -> Result<FieldElement> {
        validate_indices(shares, &self.config)?;
        let coefficients = coefficients.for_shares(shares)?;
        shares.iter().zip_eq(coefficients).try_fold(
            FieldElement::zero(&self.field),
            |acc, (s, c)| {
                self.check_field(s.value())?;
                self.check_field(c)?;
                Ok(&acc + &(s.value() * c))
            },
        )
    }
}

impl Share<FieldElement> {
    /// Subtracts two shares held at the same index.
    pub fn try_sub(&self, other: &Self) -> Result<Self> {
        if self.index() != other.index() {
            return Err(Error::index_mismatch(self.index(), other.index()));
        }
        Ok(Share::new(self.index(), self.value().try_sub(other.value())?))
    }

    /// Multiplies the share by a public scalar.
    pub fn scale(&self, scalar: &FieldElement) -> Result<Self> {
        Ok(Share::new(self.index(), self.value().try_mul(scalar)?))
    }
}
