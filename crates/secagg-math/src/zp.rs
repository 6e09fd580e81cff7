//! Arithmetic in the fixed prime fields used for Shamir secret sharing.
//!
//! A [`PrimeField`] is selected by the bit length of the values it must hold;
//! the smallest supported prime larger than `2^bits` is used. Values are
//! never silently reduced on the way in: [`FieldElement::new`] rejects
//! anything outside `[0, p)`.

use crate::modular::byte_len;
use crate::{Error, Result};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use secagg_traits::{AggParameters, AggParametrized, DeserializeParametrized, Serialize};
use std::fmt::Debug;
use std::ops::{Add, Mul, Neg, Sub};
use std::sync::Arc;

/// The supported field sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldSize {
    /// p = 2^65 - 493.
    P64,
    /// p = 2^129 - 1365.
    P128,
    /// p = 2^257 - 93.
    P256,
    /// p = 2^521 - 1.
    P512,
    /// p = 2^1279 - 1.
    P1024,
    /// p = 2^2203 - 1.
    P2048,
}

impl FieldSize {
    /// Select the smallest field size supporting values of `bits` bits.
    pub fn for_bits(bits: usize) -> Result<Self> {
        match bits {
            1..=64 => Ok(Self::P64),
            65..=128 => Ok(Self::P128),
            129..=256 => Ok(Self::P256),
            257..=512 => Ok(Self::P512),
            513..=1024 => Ok(Self::P1024),
            1025..=2048 => Ok(Self::P2048),
            _ => Err(Error::UnsupportedBitLength(bits)),
        }
    }

    /// The largest bit length supported by this field size.
    pub const fn max_bits(&self) -> usize {
        match self {
            Self::P64 => 64,
            Self::P128 => 128,
            Self::P256 => 256,
            Self::P512 => 512,
            Self::P1024 => 1024,
            Self::P2048 => 2048,
        }
    }

    /// The prime modulus.
    pub fn prime(&self) -> BigUint {
        let one = BigUint::one();
        match self {
            Self::P64 => (one << 65usize) - 493u32,
            Self::P128 => (one << 129usize) - 1365u32,
            Self::P256 => (one << 257usize) - 93u32,
            Self::P512 => (one << 521usize) - 1u32,
            Self::P1024 => (one << 1279usize) - 1u32,
            Self::P2048 => (one << 2203usize) - 1u32,
        }
    }
}

/// A prime field able to hold values of a given bit length.
#[derive(Clone)]
pub struct PrimeField {
    size: FieldSize,
    bits: usize,
    p: BigUint,
}

impl Debug for PrimeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimeField")
            .field("size", &self.size)
            .field("bits", &self.bits)
            .finish()
    }
}

impl PartialEq for PrimeField {
    fn eq(&self, other: &Self) -> bool {
        self.p == other.p
    }
}

impl Eq for PrimeField {}

impl AggParameters for PrimeField {}

impl PrimeField {
    /// Creates the field for values of `bits` bits.
    pub fn new(bits: usize) -> Result<Self> {
        let size = FieldSize::for_bits(bits)?;
        Ok(Self {
            size,
            bits,
            p: size.prime(),
        })
    }

    /// Creates the field for values of `bits` bits inside an `Arc`.
    pub fn new_arc(bits: usize) -> Result<Arc<Self>> {
        Self::new(bits).map(Arc::new)
    }

    /// The prime modulus.
    pub fn modulus(&self) -> &BigUint {
        &self.p
    }

    /// The bit length this field was requested for.
    pub fn bits(&self) -> usize {
        self.bits
    }

    /// The selected field size.
    pub fn size(&self) -> FieldSize {
        self.size
    }

    /// Number of bytes of a serialized element.
    pub fn element_bytes(&self) -> usize {
        byte_len(&self.p)
    }

    /// Sample a vector of `len` uniformly random elements.
    pub fn random_vector<R: RngCore + CryptoRng>(
        self: &Arc<Self>,
        len: usize,
        rng: &mut R,
    ) -> Vec<FieldElement> {
        (0..len).map(|_| FieldElement::random(self, rng)).collect()
    }
}

/// An element of a [`PrimeField`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldElement {
    value: BigUint,
    field: Arc<PrimeField>,
}

impl FieldElement {
    /// Creates an element from its canonical representative.
    ///
    /// Returns an error if `value` is not below the field prime.
    pub fn new(value: BigUint, field: &Arc<PrimeField>) -> Result<Self> {
        if value >= field.p {
            return Err(Error::OutOfRange(format!(
                "{} bits do not fit the field for {}-bit values",
                value.bits(),
                field.bits
            )));
        }
        Ok(Self {
            value,
            field: field.clone(),
        })
    }

    /// Creates an element from a `u64`. Every field prime exceeds `2^64`.
    pub fn from_u64(value: u64, field: &Arc<PrimeField>) -> Self {
        Self {
            value: BigUint::from(value),
            field: field.clone(),
        }
    }

    /// The zero element.
    pub fn zero(field: &Arc<PrimeField>) -> Self {
        Self {
            value: BigUint::zero(),
            field: field.clone(),
        }
    }

    /// The unit element.
    pub fn one(field: &Arc<PrimeField>) -> Self {
        Self {
            value: BigUint::one(),
            field: field.clone(),
        }
    }

    /// Sample a uniformly random element.
    pub fn random<R: RngCore + CryptoRng>(field: &Arc<PrimeField>, rng: &mut R) -> Self {
        use num_bigint::RandBigInt;
        Self {
            value: rng.gen_biguint_below(&field.p),
            field: field.clone(),
        }
    }

    /// The canonical representative in `[0, p)`.
    pub fn value(&self) -> &BigUint {
        &self.value
    }

    /// Consumes the element and returns its canonical representative.
    pub fn into_value(self) -> BigUint {
        self.value
    }

    /// The field of this element.
    pub fn field(&self) -> &Arc<PrimeField> {
        &self.field
    }

    /// Returns whether the element is zero.
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    fn check_field(&self, other: &Self) -> Result<()> {
        if self.field != other.field {
            return Err(Error::FieldMismatch);
        }
        Ok(())
    }

    /// Adds two elements, failing if they belong to different fields.
    pub fn try_add(&self, other: &Self) -> Result<Self> {
        self.check_field(other)?;
        Ok(self + other)
    }

    /// Subtracts two elements, failing if they belong to different fields.
    pub fn try_sub(&self, other: &Self) -> Result<Self> {
        self.check_field(other)?;
        Ok(self - other)
    }

    /// Multiplies two elements, failing if they belong to different fields.
    pub fn try_mul(&self, other: &Self) -> Result<Self> {
        self.check_field(other)?;
        Ok(self * other)
    }

    /// Raise the element to the power `exponent`.
    pub fn pow(&self, exponent: &BigUint) -> Self {
        Self {
            value: self.value.modpow(exponent, &self.field.p),
            field: self.field.clone(),
        }
    }

    /// The multiplicative inverse, computed as `x^(p-2)`.
    pub fn inv(&self) -> Result<Self> {
        if self.is_zero() {
            return Err(Error::NoInverse(
                "0".to_string(),
                self.field.p.to_string(),
            ));
        }
        Ok(self.pow(&(&self.field.p - 2u32)))
    }
}

/// Panics if the elements belong to different fields; see
/// [`FieldElement::try_add`] for a fallible version.
impl Add<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn add(self, rhs: &FieldElement) -> FieldElement {
        assert_eq!(self.field, rhs.field, "Incompatible fields");
        let mut value = &self.value + &rhs.value;
        if value >= self.field.p {
            value -= &self.field.p;
        }
        FieldElement {
            value,
            field: self.field.clone(),
        }
    }
}

/// Panics if the elements belong to different fields.
impl Sub<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn sub(self, rhs: &FieldElement) -> FieldElement {
        assert_eq!(self.field, rhs.field, "Incompatible fields");
        let value = if self.value >= rhs.value {
            &self.value - &rhs.value
        } else {
            &self.field.p - &rhs.value + &self.value
        };
        FieldElement {
            value,
            field: self.field.clone(),
        }
    }
}

/// Panics if the elements belong to different fields.
impl Mul<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn mul(self, rhs: &FieldElement) -> FieldElement {
        assert_eq!(self.field, rhs.field, "Incompatible fields");
        FieldElement {
            value: (&self.value * &rhs.value) % &self.field.p,
            field: self.field.clone(),
        }
    }
}

impl Neg for &FieldElement {
    type Output = FieldElement;

    fn neg(self) -> FieldElement {
        let value = if self.value.is_zero() {
            BigUint::zero()
        } else {
            &self.field.p - &self.value
        };
        FieldElement {
            value,
            field: self.field.clone(),
        }
    }
}

impl AggParametrized for FieldElement {
    type Parameters = PrimeField;
}

impl Serialize for FieldElement {
    fn to_bytes(&self) -> Vec<u8> {
        self.value.to_bytes_be()
    }
}

impl DeserializeParametrized for FieldElement {
    type Error = Error;

    fn from_bytes(bytes: &[u8], par: &Arc<PrimeField>) -> Result<Self> {
        let value = BigUint::from_bytes_be(bytes);
        Self::new(value, par)
    }
}
