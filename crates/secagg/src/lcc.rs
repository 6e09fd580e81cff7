//! Lagrange coded masks.
//!
//! A mask of `d` field elements is cut into `U - T + 1` rows of
//! `ceil(d / (U - T + 1))` elements, and `T - 1` random rows are appended.
//! The `U` rows are the values of a polynomial at the points
//! `n + 1, ..., n + U`, and user `i` receives its evaluation at `i`. Any `U`
//! encoded shares give back the mask, while `T - 1` of them reveal nothing
//! about it. Encoding is linear, so the sum of the shares that one user
//! received from several others decodes to the sum of their masks.

use crate::ss::{common_length, validate_indices, Share, ThresholdConfig};
use crate::{Error, Result};
use itertools::Itertools;
use num_bigint::BigUint;
use num_traits::Zero;
use rand::{CryptoRng, RngCore};
use secagg_math::zp::{FieldElement, PrimeField};
use secagg_util::{add_vectors, scale_vector};
use std::sync::Arc;

/// Lagrange coded computing for `n` users, of which `U` are expected online,
/// with privacy against `T - 1` colluding users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LagrangeCoding {
    field: Arc<PrimeField>,
    config: ThresholdConfig,
    privacy: usize,
}

impl LagrangeCoding {
    /// Creates a coding over the field for `bits`-bit values, for `users`
    /// users with `target_online` of them expected online and privacy
    /// threshold `privacy`.
    pub fn new(bits: usize, users: usize, target_online: usize, privacy: usize) -> Result<Self> {
        let config = ThresholdConfig::new(users, target_online)?;
        if privacy == 0 || privacy > target_online {
            return Err(Error::Configuration(format!(
                "Privacy threshold {} must be between 1 and the number of online users {}",
                privacy, target_online
            )));
        }
        Ok(Self {
            field: PrimeField::new_arc(bits)?,
            config,
            privacy,
        })
    }

    /// The field of the masks.
    pub fn field(&self) -> &Arc<PrimeField> {
        &self.field
    }

    /// Number of rows carrying the mask.
    pub fn sub_masks(&self) -> usize {
        self.config.threshold() - self.privacy + 1
    }

    /// Number of elements of an encoded share for masks of `dimension` elements.
    pub fn columns(&self, dimension: usize) -> usize {
        dimension.div_ceil(self.sub_masks())
    }

    fn point(&self, x: usize) -> FieldElement {
        FieldElement::from_u64(x as u64, &self.field)
    }

    /// The points holding the rows of the mask and the random rows.
    fn row_points(&self, count: usize) -> Vec<FieldElement> {
        let users = self.config.parties();
        (users + 1..=users + count).map(|x| self.point(x)).collect()
    }

    /// Lagrange basis polynomials through `from`, evaluated at `at`.
    fn basis(from: &[FieldElement], at: &FieldElement) -> Result<Vec<FieldElement>> {
        let one = FieldElement::one(at.field());
        from.iter()
            .enumerate()
            .map(|(i, xi)| {
                let (num, den) = from.iter().enumerate().filter(|(l, _)| *l != i).try_fold(
                    (one.clone(), one.clone()),
                    |(num, den), (_, xl)| {
                        let num = num.try_mul(&at.try_sub(xl)?)?;
                        let den = den.try_mul(&xi.try_sub(xl)?)?;
                        Ok::<_, Error>((num, den))
                    },
                )?;
                Ok(num.try_mul(&den.inv()?)?)
            })
            .collect()
    }

    /// Evaluates at every point of `to` the polynomial through the points
    /// `(from[i], values[i])`, component by component.
    pub fn interpolate(
        &self,
        values: &[Vec<FieldElement>],
        from: &[FieldElement],
        to: &[FieldElement],
    ) -> Result<Vec<Vec<FieldElement>>> {
        if values.len() != from.len() {
            return Err(Error::length_mismatch(from.len(), values.len()));
        }
        let len = values.first().map_or(0, Vec::len);
        if let Some(v) = values.iter().find(|v| v.len() != len) {
            return Err(Error::length_mismatch(len, v.len()));
        }
        if values.iter().flatten().any(|x| x.field() != &self.field) {
            return Err(Error::Consistency(
                "The values do not belong to the field of the coding".to_string(),
            ));
        }

        let p = self.field.modulus();
        let rows = values
            .iter()
            .map(|v| v.iter().map(|x| x.value().clone()).collect_vec())
            .collect_vec();
        to.iter()
            .map(|t| {
                let basis = Self::basis(from, t)?;
                rows.iter()
                    .zip_eq(&basis)
                    .fold(vec![BigUint::zero(); len], |acc, (row, c)| {
                        add_vectors(&acc, &scale_vector(row, c.value(), p), p)
                    })
                    .into_iter()
                    .map(|x| Ok(FieldElement::new(x, &self.field)?))
                    .collect::<Result<Vec<_>>>()
            })
            .collect()
    }

    /// Encodes `mask` into one share per user, at indices `1..=n`.
    pub fn encode_mask<R: RngCore + CryptoRng>(
        &self,
        mask: &[FieldElement],
        rng: &mut R,
    ) -> Result<Vec<Share<Vec<FieldElement>>>> {
        if mask.is_empty() {
            return Err(Error::configuration("Cannot encode an empty mask"));
        }
        let columns = self.columns(mask.len());
        let mut padded = mask.to_vec();
        padded.resize(columns * self.sub_masks(), FieldElement::zero(&self.field));

        let mut rows = padded.chunks(columns).map(<[_]>::to_vec).collect_vec();
        rows.extend((1..self.privacy).map(|_| self.field.random_vector(columns, rng)));

        let targets = (1..=self.config.parties())
            .map(|i| self.point(i))
            .collect_vec();
        let encoded = self.interpolate(&rows, &self.row_points(rows.len()), &targets)?;
        log::trace!(
            "Encoded a mask of {} elements into {} shares of {} elements",
            mask.len(),
            encoded.len(),
            columns
        );
        Ok(encoded
            .into_iter()
            .enumerate()
            .map(|(i, v)| Share::new(i + 1, v))
            .collect())
    }

    /// Recovers a mask of `dimension` elements from at least `U` encoded
    /// shares held by distinct users.
    pub fn decode_mask(
        &self,
        shares: &[Share<Vec<FieldElement>>],
        dimension: usize,
    ) -> Result<Vec<FieldElement>> {
        validate_indices(shares, &self.config)?;
        let shares = &shares[..self.config.threshold()];
        let len = common_length(shares)?;
        if len != self.columns(dimension) {
            return Err(Error::length_mismatch(self.columns(dimension), len));
        }

        let from = shares.iter().map(|s| self.point(s.index())).collect_vec();
        let values = shares.iter().map(|s| s.value().clone()).collect_vec();
        let rows = self.interpolate(&values, &from, &self.row_points(self.sub_masks()))?;
        Ok(rows.into_iter().flatten().take(dimension).collect())
    }
}
