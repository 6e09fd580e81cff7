//! Full-domain hash onto the units of `Z_{n^2}`.
//!
//! The hash expands SHA-256 in counter mode over a domain separator, the
//! modulus and the fixed-width tag, until the output exceeds the byte length of
//! `n^2` by 16 bytes, and reduces the result modulo `n^2`. Outputs that are
//! zero or share a factor with `n` are rejected and the expansion continues
//! with fresh counters.

use crate::modular::byte_len;
use crate::{Error, Result};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use sha2::{Digest, Sha256};
use std::fmt::Debug;

const DOMAIN_SEPARATOR: &[u8] = b"secagg/jl/fdh";

/// Extra output bytes making the bias of the final reduction negligible.
const STATISTICAL_BYTES: usize = 16;

/// A full-domain hash keyed by an RSA modulus `n`.
#[derive(Clone)]
pub struct FullDomainHash {
    n: BigUint,
    n_squared: BigUint,
    tag_len: usize,
    output_len: usize,
    prefix: Sha256,
}

impl Debug for FullDomainHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FullDomainHash")
            .field("modulus_bits", &self.n_squared.bits())
            .finish()
    }
}

impl PartialEq for FullDomainHash {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n
    }
}

impl Eq for FullDomainHash {}

impl FullDomainHash {
    /// Creates the hash for the modulus `n`.
    pub fn new(n: &BigUint) -> Result<Self> {
        if n <= &BigUint::one() {
            return Err(Error::HashDomain(
                "The modulus must be larger than one".to_string(),
            ));
        }
        let n_squared = n * n;
        let mut prefix = Sha256::new();
        prefix.update(DOMAIN_SEPARATOR);
        prefix.update(n_squared.to_bytes_be());
        Ok(Self {
            n: n.clone(),
            tag_len: byte_len(n),
            output_len: byte_len(&n_squared) + STATISTICAL_BYTES,
            n_squared,
            prefix,
        })
    }

    /// The modulus `n^2` of the output domain.
    pub fn modulus(&self) -> &BigUint {
        &self.n_squared
    }

    /// Hash a tag, which must fit in the byte length of `n`.
    pub fn hash(&self, tag: &BigUint) -> Result<BigUint> {
        let tag_bytes = tag.to_bytes_be();
        if tag_bytes.len() > self.tag_len {
            return Err(Error::HashDomain(format!(
                "The tag has {} bits, at most {} are supported",
                tag.bits(),
                8 * self.tag_len
            )));
        }
        let mut padded = vec![0u8; self.tag_len - tag_bytes.len()];
        padded.extend_from_slice(&tag_bytes);

        let mut hasher = self.prefix.clone();
        hasher.update(&padded);

        let mut counter = 0u32;
        let mut output = Vec::with_capacity(self.output_len + 32);
        loop {
            output.clear();
            while output.len() < self.output_len {
                let mut block = hasher.clone();
                block.update(counter.to_be_bytes());
                output.extend_from_slice(&block.finalize());
                counter = counter.checked_add(1).ok_or_else(|| {
                    Error::HashDomain("The hash counter overflowed".to_string())
                })?;
            }
            output.truncate(self.output_len);

            let candidate = BigUint::from_bytes_be(&output) % &self.n_squared;
            if !candidate.is_zero() && candidate.gcd(&self.n).is_one() {
                return Ok(candidate);
            }
            log::warn!("Full-domain hash candidate is not a unit, resampling");
        }
    }
}
