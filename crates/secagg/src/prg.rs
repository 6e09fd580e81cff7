//! Expansion of a short seed into a mask vector.
//!
//! Users who agree on a seed derive the same pseudorandom vector, so one can
//! add it to its input and the other subtract it, and the masks cancel in the
//! sum.

use crate::{Error, Result};
use num_bigint::BigUint;
use num_traits::One;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use secagg_util::{add_vectors, bit_mask, sub_vectors};
use zeroize::Zeroizing;

/// A seed of the generator.
pub type Seed = <ChaCha20Rng as SeedableRng>::Seed;

/// Expands seeds into vectors of `len` elements of `element_bits` bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prg {
    len: usize,
    element_bits: usize,
    modulus: BigUint,
}

impl Prg {
    /// Creates a generator of vectors of `len` elements in `[0, 2^element_bits)`.
    pub fn new(len: usize, element_bits: usize) -> Result<Self> {
        if element_bits == 0 {
            return Err(Error::configuration(
                "Mask elements need at least one bit",
            ));
        }
        Ok(Self {
            len,
            element_bits,
            modulus: BigUint::one() << element_bits,
        })
    }

    /// Number of elements of a mask.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether masks are empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bit length of the elements.
    pub fn element_bits(&self) -> usize {
        self.element_bits
    }

    /// The masking modulus `2^element_bits`.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Derives a seed from the low 256 bits of `x`.
    pub fn seed_from_biguint(x: &BigUint) -> Seed {
        let mut seed = Seed::default();
        let low = x & &bit_mask(seed.len() * 8);
        let bytes = Zeroizing::new(low.to_bytes_be());
        let offset = seed.len() - bytes.len();
        seed[offset..].copy_from_slice(&bytes);
        seed
    }

    /// Expands `seed` into a mask.
    pub fn expand(&self, seed: &Seed) -> Vec<BigUint> {
        let mut rng = ChaCha20Rng::from_seed(*seed);
        let mut buf = Zeroizing::new(vec![0u8; self.element_bits.div_ceil(8)]);
        (0..self.len)
            .map(|_| {
                rng.fill_bytes(&mut buf);
                BigUint::from_bytes_be(&buf) % &self.modulus
            })
            .collect()
    }

    fn check_len(&self, x: &[BigUint]) -> Result<()> {
        if x.len() != self.len {
            return Err(Error::length_mismatch(self.len, x.len()));
        }
        Ok(())
    }

    /// Adds the mask expanded from `seed` to `x`, modulo `2^element_bits`.
    pub fn mask(&self, x: &[BigUint], seed: &Seed) -> Result<Vec<BigUint>> {
        self.check_len(x)?;
        Ok(add_vectors(x, &self.expand(seed), &self.modulus))
    }

    /// Removes the mask expanded from `seed` from `x`.
    pub fn unmask(&self, x: &[BigUint], seed: &Seed) -> Result<Vec<BigUint>> {
        self.check_len(x)?;
        Ok(sub_vectors(x, &self.expand(seed), &self.modulus))
    }
}
