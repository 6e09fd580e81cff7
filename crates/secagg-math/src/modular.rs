//! Modular arithmetic on arbitrary-precision integers.

use crate::{Error, Result};
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

/// Reduces a signed integer into `[0, modulus)`.
///
/// Panics if `modulus` is zero.
pub fn reduce_signed(a: &BigInt, modulus: &BigUint) -> BigUint {
    let m = BigInt::from(modulus.clone());
    a.mod_floor(&m).magnitude().clone()
}

/// Computes the inverse of `a` modulo `modulus`.
pub fn mod_inverse(a: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    if modulus.is_zero() {
        return Err(Error::Default("The modulus must be positive".to_string()));
    }
    let m = BigInt::from(modulus.clone());
    let egcd = BigInt::from(a % modulus).extended_gcd(&m);
    if !egcd.gcd.is_one() {
        return Err(Error::NoInverse(a.to_string(), modulus.to_string()));
    }
    Ok(reduce_signed(&egcd.x, modulus))
}

/// Computes `base^exponent mod modulus` for a signed exponent. Negative
/// exponents go through the inverse of `base`.
pub fn pow_signed(base: &BigUint, exponent: &BigInt, modulus: &BigUint) -> Result<BigUint> {
    if modulus.is_zero() {
        return Err(Error::Default("The modulus must be positive".to_string()));
    }
    if exponent.is_negative() {
        let inverse = mod_inverse(base, modulus)?;
        Ok(inverse.modpow(exponent.magnitude(), modulus))
    } else {
        Ok(base.modpow(exponent.magnitude(), modulus))
    }
}

/// Number of bytes needed to represent `x`, at least one.
pub fn byte_len(x: &BigUint) -> usize {
    std::cmp::max(1, x.bits().div_ceil(8) as usize)
}
