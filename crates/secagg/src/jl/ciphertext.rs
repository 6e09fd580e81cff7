//! Ciphertexts of the Joye-Libert scheme.

use crate::jl::PublicParameters;
use crate::ss::ShareValue;
use crate::{Error, Result};
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use secagg_math::modular::pow_signed;
use secagg_traits::{AggParametrized, DeserializeParametrized, Serialize};
use std::sync::Arc;

/// An element of `Z_{n²}` encrypting a plaintext modulo `n`.
///
/// Multiplying ciphertexts adds the plaintexts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedNumber {
    pub(crate) par: Arc<PublicParameters>,
    pub(crate) c: BigUint,
}

impl EncryptedNumber {
    pub(crate) fn new(c: BigUint, par: &Arc<PublicParameters>) -> Self {
        Self {
            par: par.clone(),
            c,
        }
    }

    /// The public parameters of this ciphertext.
    pub fn parameters(&self) -> &Arc<PublicParameters> {
        &self.par
    }

    /// The ciphertext as an element of `Z_{n²}`.
    pub fn value(&self) -> &BigUint {
        &self.c
    }

    /// Homomorphic addition.
    pub fn try_add(&self, other: &Self) -> Result<Self> {
        if self.par != other.par {
            return Err(Error::parameters_mismatch());
        }
        Ok(Self {
            par: self.par.clone(),
            c: (&self.c * &other.c) % self.par.n_squared(),
        })
    }

    /// Homomorphic multiplication of the plaintext by a public scalar.
    pub fn scale(&self, k: &BigUint) -> Self {
        Self {
            par: self.par.clone(),
            c: self.c.modpow(k, self.par.n_squared()),
        }
    }

    /// Homomorphic multiplication of the plaintext by a signed scalar.
    pub(crate) fn scale_signed(&self, k: &BigInt) -> Result<Self> {
        Ok(Self {
            par: self.par.clone(),
            c: pow_signed(&self.c, k, self.par.n_squared())?,
        })
    }

    /// Homomorphic sum of a non-empty collection of ciphertexts.
    pub fn sum<'a, I>(ciphertexts: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a EncryptedNumber>,
    {
        let mut iter = ciphertexts.into_iter();
        let first = iter
            .next()
            .ok_or_else(|| Error::insufficient_shares(0, 1))?;
        iter.try_fold(first.clone(), |acc, c| acc.try_add(c))
    }

    /// Number of bytes of a ciphertext on the wire.
    pub fn size_in_bytes(&self) -> usize {
        self.par.ciphertext_bits().div_ceil(8)
    }
}

impl ShareValue for EncryptedNumber {
    fn combine(&self, other: &Self) -> Result<Self> {
        self.try_add(other)
    }

    fn byte_len(&self) -> usize {
        self.size_in_bytes()
    }
}

impl AggParametrized for EncryptedNumber {
    type Parameters = PublicParameters;
}

impl Serialize for EncryptedNumber {
    fn to_bytes(&self) -> Vec<u8> {
        self.c.to_bytes_be()
    }
}

impl DeserializeParametrized for EncryptedNumber {
    type Error = Error;

    fn from_bytes(bytes: &[u8], par: &Arc<PublicParameters>) -> Result<Self> {
        let c = BigUint::from_bytes_be(bytes);
        if c.is_zero() || &c >= par.n_squared() {
            return Err(Error::arithmetic(
                "The encoded value is not a nonzero element of Z_{n²}",
            ));
        }
        Ok(Self::new(c, par))
    }
}
