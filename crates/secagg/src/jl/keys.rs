//! User and server keys of the Joye-Libert scheme.

use crate::jl::{EncryptedNumber, PublicParameters};
use crate::{Error, Result};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};
use secagg_math::modular::{mod_inverse, pow_signed};
use secagg_traits::AggParametrized;
use std::fmt::Debug;
use std::sync::Arc;

/// The key of a user, used to protect its inputs.
#[derive(Clone, PartialEq, Eq)]
pub struct UserKey {
    pub(crate) par: Arc<PublicParameters>,
    pub(crate) s: BigInt,
}

impl Debug for UserKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserKey")
            .field("par", &self.par)
            .finish_non_exhaustive()
    }
}

impl AggParametrized for UserKey {
    type Parameters = PublicParameters;
}

impl UserKey {
    /// Creates a key from a signed integer.
    pub fn new(s: BigInt, par: &Arc<PublicParameters>) -> Self {
        Self {
            par: par.clone(),
            s,
        }
    }

    /// Creates a key from a non-negative integer.
    pub fn from_biguint(s: BigUint, par: &Arc<PublicParameters>) -> Self {
        Self::new(BigInt::from_biguint(Sign::Plus, s), par)
    }

    /// The public parameters of this key.
    pub fn parameters(&self) -> &Arc<PublicParameters> {
        &self.par
    }

    /// The secret integer.
    pub fn secret(&self) -> &BigInt {
        &self.s
    }

    /// Encrypt `x < n` under the round tag `tag`:
    /// `(1 + n·x)·H(tag)^s mod n²`.
    pub fn encrypt(&self, x: &BigUint, tag: &BigUint) -> Result<EncryptedNumber> {
        let n = self.par.n();
        let n_squared = self.par.n_squared();
        if x >= n {
            return Err(Error::arithmetic("The plaintext must be smaller than n"));
        }
        let nude = (n * x + 1u32) % n_squared;
        let mask = pow_signed(&self.par.hash(tag)?, &self.s, n_squared)?;
        Ok(EncryptedNumber::new((nude * mask) % n_squared, &self.par))
    }
}

/// The key of the server, used to decrypt aggregates.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerKey {
    pub(crate) par: Arc<PublicParameters>,
    pub(crate) s: BigInt,
}

impl Debug for ServerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerKey")
            .field("par", &self.par)
            .finish_non_exhaustive()
    }
}

impl AggParametrized for ServerKey {
    type Parameters = PublicParameters;
}

impl ServerKey {
    /// Creates a key from a signed integer.
    pub fn new(s: BigInt, par: &Arc<PublicParameters>) -> Self {
        Self {
            par: par.clone(),
            s,
        }
    }

    /// The public parameters of this key.
    pub fn parameters(&self) -> &Arc<PublicParameters> {
        &self.par
    }

    /// The secret integer.
    pub fn secret(&self) -> &BigInt {
        &self.s
    }

    /// Decrypt an aggregate ciphertext whose plaintext was multiplied by
    /// `scale`, and divide `scale` out.
    ///
    /// The aggregate must contain the contribution of every user key; a
    /// missing contribution is detected with overwhelming probability and
    /// reported as an arithmetic error.
    pub fn decrypt(&self, y: &EncryptedNumber, tag: &BigUint, scale: &BigUint) -> Result<BigUint> {
        if y.par != self.par {
            return Err(Error::parameters_mismatch());
        }
        let n = self.par.n();
        let n_squared = self.par.n_squared();

        let exponent = BigInt::from(scale.clone()) * &self.s;
        let mask = pow_signed(&self.par.hash(tag)?, &exponent, n_squared)?;
        let v = (&y.c * mask) % n_squared;
        if v.is_zero() {
            return Err(Error::arithmetic("The unmasked aggregate is zero"));
        }
        let v = v - 1u32;
        if !(&v % n).is_zero() {
            return Err(Error::arithmetic(
                "The aggregate does not cancel out: a contribution is missing",
            ));
        }
        let x = (v / n) % n;
        if scale.is_one() {
            return Ok(x);
        }
        let inverse = mod_inverse(&(scale % n), n)?;
        Ok((x * inverse) % n)
    }
}
