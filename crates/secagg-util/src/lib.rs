#![crate_name = "secagg_util"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]

//! Utilities for the secagg library.

use itertools::Itertools;
use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_traits::One;
use rand::{CryptoRng, Rng, RngCore};

/// Returns the smallest `k` such that `2^k >= x`, and 0 when `x <= 1`.
pub fn ceil_log2(x: u64) -> usize {
    if x <= 1 {
        0
    } else {
        (64 - (x - 1).leading_zeros()) as usize
    }
}

/// Computes `n!`.
pub fn factorial(n: usize) -> BigUint {
    (2..=n).fold(BigUint::one(), |acc, i| acc * BigUint::from(i))
}

/// Returns `2^bits - 1`.
pub fn bit_mask(bits: usize) -> BigUint {
    (BigUint::one() << bits) - 1u32
}

/// Sample an integer of magnitude below `2^bits` with a uniformly random sign.
pub fn sample_signed<R: RngCore + CryptoRng>(bits: u64, rng: &mut R) -> BigInt {
    let magnitude = rng.gen_biguint(bits);
    let sign = if rng.gen::<bool>() {
        Sign::Minus
    } else {
        Sign::Plus
    };
    BigInt::from_biguint(sign, magnitude)
}

/// Generate a random prime of exactly `bits` bits.
///
/// The two most significant bits are set, so that the product of two primes
/// of `bits` bits has exactly `2 * bits` bits.
pub fn generate_prime<R: RngCore + CryptoRng>(
    bits: usize,
    rng: &mut R,
) -> Result<BigUint, &'static str> {
    use num_bigint_dig::RandPrime;

    if bits < 8 {
        return Err("Primes must have at least 8 bits");
    }
    let p = rng.gen_prime(bits);
    Ok(BigUint::from_bytes_be(&p.to_bytes_be()))
}

/// Returns whether `p` is a probable prime.
pub fn is_probable_prime(p: &BigUint) -> bool {
    let p = num_bigint_dig::BigUint::from_bytes_be(&p.to_bytes_be());
    num_bigint_dig::prime::probably_prime(&p, 20)
}

/// Component-wise addition of two vectors modulo `modulus`.
///
/// Panics if the vectors have different lengths.
pub fn add_vectors(a: &[BigUint], b: &[BigUint], modulus: &BigUint) -> Vec<BigUint> {
    a.iter()
        .zip_eq(b)
        .map(|(ai, bi)| (ai + bi) % modulus)
        .collect()
}

/// Component-wise subtraction of two vectors modulo `modulus`.
///
/// Panics if the vectors have different lengths.
pub fn sub_vectors(a: &[BigUint], b: &[BigUint], modulus: &BigUint) -> Vec<BigUint> {
    a.iter()
        .zip_eq(b)
        .map(|(ai, bi)| (ai + modulus - bi % modulus) % modulus)
        .collect()
}

/// Multiply every entry of a vector by `scalar` modulo `modulus`.
pub fn scale_vector(a: &[BigUint], scalar: &BigUint, modulus: &BigUint) -> Vec<BigUint> {
    a.iter().map(|ai| (ai * scalar) % modulus).collect()
}
