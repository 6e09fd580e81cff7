//! Threshold secret sharing.
//!
//! Three `t`-out-of-`n` schemes share the same [`Share`] type and the same
//! [`ThresholdSharing`] interface:
//! - [`ShamirSharing`] over a fixed prime field,
//! - [`IntegerSharing`] over the integers, with statistical hiding,
//! - [`RingSharing`] over `Z_{n·φ(n)}` for an RSA modulus `n`.
//!
//! Lagrange coefficients only depend on the indices of the shares, so they are
//! computed once with [`ThresholdSharing::lagrange`] and reused for every
//! component of a vector.

mod integer;
mod ring;
mod shamir;

pub use integer::IntegerSharing;
pub use ring::RingSharing;
pub use shamir::ShamirSharing;

use crate::{Error, Result};
use itertools::Itertools;
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use secagg_math::modular::byte_len;
use secagg_math::zp::FieldElement;
use secagg_util::factorial;
use serde::{Deserialize, Serialize};

/// Size in bytes of a share index on the wire.
pub const INDEX_BYTES: usize = 2;

/// Algebraic operations required from the value of a [`Share`].
pub trait ShareValue: Clone {
    /// Adds two values held at the same evaluation point.
    fn combine(&self, other: &Self) -> Result<Self>;

    /// Number of bytes of the value on the wire.
    fn byte_len(&self) -> usize;
}

impl ShareValue for BigInt {
    fn combine(&self, other: &Self) -> Result<Self> {
        Ok(self + other)
    }

    fn byte_len(&self) -> usize {
        self.to_signed_bytes_be().len()
    }
}

impl ShareValue for BigUint {
    fn combine(&self, other: &Self) -> Result<Self> {
        Ok(self + other)
    }

    fn byte_len(&self) -> usize {
        byte_len(self)
    }
}

impl ShareValue for FieldElement {
    fn combine(&self, other: &Self) -> Result<Self> {
        Ok(self.try_add(other)?)
    }

    fn byte_len(&self) -> usize {
        self.field().element_bytes()
    }
}

impl<T: ShareValue> ShareValue for Vec<T> {
    fn combine(&self, other: &Self) -> Result<Self> {
        if self.len() != other.len() {
            return Err(Error::length_mismatch(self.len(), other.len()));
        }
        self.iter()
            .zip_eq(other)
            .map(|(a, b)| a.combine(b))
            .collect()
    }

    fn byte_len(&self) -> usize {
        self.iter().map(ShareValue::byte_len).sum()
    }
}

/// A share: the value of a sharing polynomial at the public point `index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share<T> {
    index: usize,
    value: T,
}

impl<T> Share<T> {
    /// Creates a share.
    pub fn new(index: usize, value: T) -> Self {
        Self { index, value }
    }

    /// The evaluation point.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The share value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Consumes the share and returns its value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Applies `f` to the value, keeping the index.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Share<U> {
        Share {
            index: self.index,
            value: f(self.value),
        }
    }
}

impl<T: ShareValue> Share<T> {
    /// Adds two shares held at the same index.
    pub fn try_add(&self, other: &Self) -> Result<Self> {
        if self.index != other.index {
            return Err(Error::index_mismatch(self.index, other.index));
        }
        Ok(Self {
            index: self.index,
            value: self.value.combine(&other.value)?,
        })
    }

    /// Adds shares held at the same index, such as one party's shares of
    /// several secrets.
    pub fn sum(shares: &[Self]) -> Result<Self> {
        let (first, rest) = shares
            .split_first()
            .ok_or_else(|| Error::insufficient_shares(0, 1))?;
        rest.iter().try_fold(first.clone(), |acc, s| acc.try_add(s))
    }

    /// Number of bytes of the share on the wire.
    pub fn size_in_bytes(&self) -> usize {
        INDEX_BYTES + self.value.byte_len()
    }
}

/// The number of parties and the reconstruction threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawThresholdConfig")]
pub struct ThresholdConfig {
    parties: usize,
    threshold: usize,
}

#[derive(Deserialize)]
struct RawThresholdConfig {
    parties: usize,
    threshold: usize,
}

impl TryFrom<RawThresholdConfig> for ThresholdConfig {
    type Error = Error;

    fn try_from(raw: RawThresholdConfig) -> Result<Self> {
        Self::new(raw.parties, raw.threshold)
    }
}

impl ThresholdConfig {
    /// Creates a configuration where any `threshold` of `parties` shares
    /// reconstruct the secret.
    pub fn new(parties: usize, threshold: usize) -> Result<Self> {
        if parties == 0 {
            return Err(Error::configuration("At least one party is required"));
        }
        if parties > u16::MAX as usize {
            return Err(Error::Configuration(format!(
                "At most {} parties are supported",
                u16::MAX
            )));
        }
        if threshold == 0 || threshold > parties {
            return Err(Error::Configuration(format!(
                "Threshold {} must be between 1 and the number of parties {}",
                threshold, parties
            )));
        }
        Ok(Self { parties, threshold })
    }

    /// Number of parties.
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Minimum number of shares for reconstruction.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// `parties!`, which clears the denominators of the Lagrange coefficients.
    pub fn delta(&self) -> BigUint {
        factorial(self.parties)
    }
}

/// Lagrange coefficients at zero for a set of share indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LagrangeCoefficients<C> {
    coefficients: Vec<(usize, C)>,
}

impl<C> LagrangeCoefficients<C> {
    pub(crate) fn new(coefficients: Vec<(usize, C)>) -> Self {
        Self { coefficients }
    }

    /// The coefficient of the share at `index`.
    pub fn get(&self, index: usize) -> Option<&C> {
        self.coefficients
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, c)| c)
    }

    /// Number of coefficients.
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// Returns whether there are no coefficients.
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Iterates over `(index, coefficient)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &C)> {
        self.coefficients.iter().map(|(i, c)| (*i, c))
    }

    /// The coefficient of every share, in order.
    pub(crate) fn for_shares<T>(&self, shares: &[Share<T>]) -> Result<Vec<&C>> {
        if self.len() != shares.len() {
            return Err(Error::length_mismatch(self.len(), shares.len()));
        }
        shares
            .iter()
            .map(|s| {
                self.get(s.index()).ok_or_else(|| {
                    Error::Consistency(format!(
                        "No Lagrange coefficient for share index {}",
                        s.index()
                    ))
                })
            })
            .collect()
    }
}

/// A `t`-out-of-`n` secret sharing scheme.
pub trait ThresholdSharing {
    /// The type of secrets.
    type Secret;

    /// The type of share values.
    type Value: ShareValue;

    /// The type of Lagrange coefficients.
    type Coefficient;

    /// The threshold configuration.
    fn config(&self) -> &ThresholdConfig;

    /// Split `secret` into one share per party, at indices `1..=n`.
    fn share<R: RngCore + CryptoRng>(
        &self,
        secret: &Self::Secret,
        rng: &mut R,
    ) -> Result<Vec<Share<Self::Value>>>;

    /// Lagrange coefficients at zero for the indices of `shares`.
    fn lagrange<T>(&self, shares: &[Share<T>]) -> Result<LagrangeCoefficients<Self::Coefficient>>;

    /// Recover the secret from at least `t` shares and their coefficients.
    fn reconstruct(
        &self,
        shares: &[Share<Self::Value>],
        coefficients: &LagrangeCoefficients<Self::Coefficient>,
    ) -> Result<Self::Secret>;
}

/// Checks that `shares` form a valid reconstruction set and returns their
/// indices.
pub(crate) fn validate_indices<T>(
    shares: &[Share<T>],
    config: &ThresholdConfig,
) -> Result<Vec<usize>> {
    if shares.len() < config.threshold() {
        return Err(Error::insufficient_shares(
            shares.len(),
            config.threshold(),
        ));
    }
    let indices = shares.iter().map(Share::index).collect_vec();
    if let Some(&index) = indices
        .iter()
        .find(|&&i| i == 0 || i > config.parties())
    {
        return Err(Error::invalid_index(index, config.parties()));
    }
    if let Some(&index) = indices.iter().duplicates().next() {
        return Err(Error::DuplicateShare(index));
    }
    Ok(indices)
}

/// Integer Lagrange coefficients `delta·Π x_m / Π (x_m − x_j)`.
pub(crate) fn integer_lagrange(
    indices: &[usize],
    delta: &BigUint,
) -> Result<LagrangeCoefficients<BigInt>> {
    let delta = BigInt::from(delta.clone());
    indices
        .iter()
        .map(|&j| {
            let xj = BigInt::from(j);
            let (num, den) = indices.iter().filter(|&&m| m != j).fold(
                (BigInt::one(), BigInt::one()),
                |(num, den), &m| {
                    let xm = BigInt::from(m);
                    (num * &xm, den * (&xm - &xj))
                },
            );
            let (coefficient, remainder) = (&delta * num).div_rem(&den);
            if !remainder.is_zero() {
                return Err(Error::arithmetic(format!(
                    "The Lagrange coefficient of index {} is not an integer",
                    j
                )));
            }
            Ok((j, coefficient))
        })
        .collect::<Result<Vec<_>>>()
        .map(LagrangeCoefficients::new)
}

/// Checks that all vectors have the same length and returns it.
pub(crate) fn common_length<T>(shares: &[Share<Vec<T>>]) -> Result<usize> {
    let len = shares.first().map_or(0, |s| s.value().len());
    if let Some(s) = shares.iter().find(|s| s.value().len() != len) {
        return Err(Error::length_mismatch(len, s.value().len()));
    }
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::{
        integer_lagrange, validate_indices, LagrangeCoefficients, Share, ThresholdConfig,
    };
    use crate::{Error, ErrorKind};
    use num_bigint::{BigInt, BigUint};

    #[test]
    fn config_validation() {
        assert!(ThresholdConfig::new(5, 3).is_ok());
        assert!(ThresholdConfig::new(5, 5).is_ok());
        assert!(ThresholdConfig::new(1, 1).is_ok());
        for (n, t) in [(0, 0), (5, 0), (5, 6), (70000, 3)] {
            assert_eq!(
                ThresholdConfig::new(n, t).unwrap_err().kind(),
                ErrorKind::Configuration
            );
        }
    }

    #[test]
    fn config_serde() -> Result<(), Box<dyn std::error::Error>> {
        let config = ThresholdConfig::new(5, 3)?;
        let json = serde_json::to_string(&config)?;
        assert_eq!(json, r#"{"parties":5,"threshold":3}"#);
        assert_eq!(serde_json::from_str::<ThresholdConfig>(&json)?, config);
        assert!(serde_json::from_str::<ThresholdConfig>(r#"{"parties":3,"threshold":5}"#).is_err());
        Ok(())
    }

    #[test]
    fn delta() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(ThresholdConfig::new(5, 3)?.delta(), BigUint::from(120u32));
        Ok(())
    }

    #[test]
    fn share_arithmetic() -> Result<(), Box<dyn std::error::Error>> {
        let a = Share::new(2, BigInt::from(5));
        let b = Share::new(2, BigInt::from(-7));
        assert_eq!(a.try_add(&b)?, Share::new(2, BigInt::from(-2)));
        assert_eq!(
            a.try_add(&Share::new(3, BigInt::from(1))),
            Err(Error::index_mismatch(2, 3))
        );
        assert_eq!(
            Share::sum(&[a.clone(), b.clone(), a.clone()])?,
            Share::new(2, BigInt::from(3))
        );
        assert_eq!(
            Share::<BigInt>::sum(&[]),
            Err(Error::insufficient_shares(0, 1))
        );
        Ok(())
    }

    #[test]
    fn vector_shares() -> Result<(), Box<dyn std::error::Error>> {
        let a = Share::new(1, vec![BigUint::from(1u32), BigUint::from(2u32)]);
        let b = Share::new(1, vec![BigUint::from(3u32), BigUint::from(4u32)]);
        assert_eq!(
            a.try_add(&b)?.into_value(),
            vec![BigUint::from(4u32), BigUint::from(6u32)]
        );
        let c = Share::new(1, vec![BigUint::from(3u32)]);
        assert_eq!(a.try_add(&c), Err(Error::length_mismatch(2, 1)));
        Ok(())
    }

    #[test]
    fn share_size() {
        let s = Share::new(1, BigUint::from(0x1234u32));
        assert_eq!(s.size_in_bytes(), 4);
        let s = Share::new(1, vec![BigUint::from(1u32); 3]);
        assert_eq!(s.size_in_bytes(), 5);
    }

    #[test]
    fn index_validation() -> Result<(), Box<dyn std::error::Error>> {
        let config = ThresholdConfig::new(5, 3)?;
        let shares = |indices: &[usize]| indices.iter().map(|&i| Share::new(i, ())).collect::<Vec<_>>();

        assert_eq!(validate_indices(&shares(&[1, 3, 5]), &config)?, vec![1, 3, 5]);
        assert_eq!(
            validate_indices(&shares(&[1, 3]), &config),
            Err(Error::insufficient_shares(2, 3))
        );
        assert_eq!(
            validate_indices(&shares(&[1, 3, 3]), &config),
            Err(Error::DuplicateShare(3))
        );
        assert_eq!(
            validate_indices(&shares(&[0, 1, 2]), &config),
            Err(Error::invalid_index(0, 5))
        );
        assert_eq!(
            validate_indices(&shares(&[1, 2, 6]), &config),
            Err(Error::invalid_index(6, 5))
        );
        Ok(())
    }

    #[test]
    fn integer_coefficients() -> Result<(), Box<dyn std::error::Error>> {
        // For indices {1, 2, 3}: L_1 = 3, L_2 = -3, L_3 = 1.
        let delta = BigUint::from(120u32);
        let lagrange = integer_lagrange(&[1, 2, 3], &delta)?;
        assert_eq!(lagrange.get(1), Some(&BigInt::from(360)));
        assert_eq!(lagrange.get(2), Some(&BigInt::from(-360)));
        assert_eq!(lagrange.get(3), Some(&BigInt::from(120)));
        assert_eq!(lagrange.get(4), None);
        Ok(())
    }

    #[test]
    fn coefficients_must_match_shares() {
        let lagrange = LagrangeCoefficients::new(vec![(1, 1), (2, 2)]);
        let shares = vec![Share::new(1, ()), Share::new(3, ())];
        assert!(matches!(
            lagrange.for_shares(&shares),
            Err(Error::Consistency(_))
        ));
        assert_eq!(
            lagrange.for_shares(&shares[..1]),
            Err(Error::length_mismatch(2, 1))
        );
    }
}
