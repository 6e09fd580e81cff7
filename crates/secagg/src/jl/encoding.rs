//! Packing of many small values into one plaintext slot.
//!
//! Each value occupies an element of `value_bits + ceil(log2(max_additions))`
//! bits, so that up to `max_additions` encodings can be added slot-wise
//! without carries crossing element boundaries.

use crate::{Error, Result};
use itertools::Itertools;
use num_bigint::BigUint;
use num_traits::Zero;
use secagg_util::{bit_mask, ceil_log2};
use serde::{Deserialize, Serialize};

/// Configuration of the vector encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawVectorEncoding")]
pub struct VectorEncoding {
    slot_bits: usize,
    max_additions: usize,
    value_bits: usize,
    len: usize,
}

#[derive(Deserialize)]
struct RawVectorEncoding {
    slot_bits: usize,
    max_additions: usize,
    value_bits: usize,
    len: usize,
}

impl TryFrom<RawVectorEncoding> for VectorEncoding {
    type Error = Error;

    fn try_from(raw: RawVectorEncoding) -> Result<Self> {
        Self::new(raw.slot_bits, raw.max_additions, raw.value_bits, raw.len)
    }
}

impl VectorEncoding {
    /// Creates an encoding of `len` values of `value_bits` bits into slots of
    /// `slot_bits` bits, supporting the sum of up to `max_additions` encodings.
    pub fn new(slot_bits: usize, max_additions: usize, value_bits: usize, len: usize) -> Result<Self> {
        if max_additions == 0 || value_bits == 0 || len == 0 {
            return Err(Error::configuration(
                "The number of additions, the value size and the length must be positive",
            ));
        }
        let encoding = Self {
            slot_bits,
            max_additions,
            value_bits,
            len,
        };
        if encoding.element_bits() > slot_bits {
            return Err(Error::Configuration(format!(
                "An element of {} bits does not fit in a slot of {} bits",
                encoding.element_bits(),
                slot_bits
            )));
        }
        Ok(encoding)
    }

    /// Bits per slot.
    pub fn slot_bits(&self) -> usize {
        self.slot_bits
    }

    /// Maximum number of encodings that can be added.
    pub fn max_additions(&self) -> usize {
        self.max_additions
    }

    /// Bits per value.
    pub fn value_bits(&self) -> usize {
        self.value_bits
    }

    /// Number of values in a vector.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: the length is positive.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bits per element, including the headroom for additions.
    pub fn element_bits(&self) -> usize {
        self.value_bits + ceil_log2(self.max_additions as u64)
    }

    /// Number of elements per slot.
    pub fn compression_ratio(&self) -> usize {
        self.slot_bits / self.element_bits()
    }

    /// Number of slots of an encoded vector.
    pub fn slots(&self) -> usize {
        self.len.div_ceil(self.compression_ratio())
    }

    /// Encode a vector of exactly `len` values of at most `value_bits` bits.
    pub fn encode(&self, values: &[BigUint]) -> Result<Vec<BigUint>> {
        if values.len() != self.len {
            return Err(Error::length_mismatch(self.len, values.len()));
        }
        if let Some(v) = values.iter().find(|v| v.bits() > self.value_bits as u64) {
            return Err(Error::Arithmetic(format!(
                "The value {} does not fit in {} bits",
                v, self.value_bits
            )));
        }
        let element_bits = self.element_bits();
        Ok(values
            .chunks(self.compression_ratio())
            .map(|batch| {
                batch
                    .iter()
                    .fold(BigUint::zero(), |acc, v| (acc << element_bits) | v)
            })
            .collect())
    }

    /// The encoding of the all-zero vector.
    pub fn zeros(&self) -> Vec<BigUint> {
        vec![BigUint::zero(); self.slots()]
    }

    /// Decode an encoded vector, or the sum of encoded vectors, into `len`
    /// values.
    pub fn decode(&self, encoded: &[BigUint]) -> Result<Vec<BigUint>> {
        if encoded.len() != self.slots() {
            return Err(Error::length_mismatch(self.slots(), encoded.len()));
        }
        let element_bits = self.element_bits();
        let ratio = self.compression_ratio();
        let mask = bit_mask(element_bits);
        Ok(encoded
            .iter()
            .enumerate()
            .flat_map(|(i, slot)| {
                let count = std::cmp::min(ratio, self.len - i * ratio);
                (0..count)
                    .rev()
                    .map(|j| (slot >> (j * element_bits)) & &mask)
                    .collect_vec()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::VectorEncoding;
    use crate::{Error, ErrorKind};
    use num_bigint::{BigUint, RandBigInt};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn sizes() -> Result<(), Box<dyn std::error::Error>> {
        let ve = VectorEncoding::new(100, 5, 16, 10)?;
        assert_eq!(ve.element_bits(), 19);
        assert_eq!(ve.compression_ratio(), 5);
        assert_eq!(ve.slots(), 2);

        let ve = VectorEncoding::new(100, 1, 16, 13)?;
        assert_eq!(ve.element_bits(), 16);
        assert_eq!(ve.compression_ratio(), 6);
        assert_eq!(ve.slots(), 3);
        Ok(())
    }

    #[test]
    fn invalid() {
        assert_eq!(
            VectorEncoding::new(10, 4, 16, 3).unwrap_err().kind(),
            ErrorKind::Configuration
        );
        assert!(VectorEncoding::new(100, 0, 16, 3).is_err());
        assert!(VectorEncoding::new(100, 2, 0, 3).is_err());
        assert!(VectorEncoding::new(100, 2, 16, 0).is_err());
    }

    #[test]
    fn layout() -> Result<(), Box<dyn std::error::Error>> {
        let ve = VectorEncoding::new(16, 2, 4, 3)?;
        // 5-bit elements, 3 per slot.
        let encoded = ve.encode(&[1u32, 2, 3].map(BigUint::from))?;
        assert_eq!(encoded, vec![BigUint::from((1u32 << 10) | (2 << 5) | 3)]);
        Ok(())
    }

    #[test]
    fn sum_of_encodings() -> Result<(), Box<dyn std::error::Error>> {
        let ve = VectorEncoding::new(64, 3, 8, 7)?;
        let a = [255u32, 0, 17, 1, 200, 3, 9].map(BigUint::from);
        let b = [255u32, 255, 1, 2, 100, 0, 9].map(BigUint::from);
        let c = [255u32, 1, 1, 3, 0, 0, 9].map(BigUint::from);
        let sum = ve
            .encode(&a)?
            .into_iter()
            .zip(ve.encode(&b)?)
            .zip(ve.encode(&c)?)
            .map(|((x, y), z)| x + y + z)
            .collect::<Vec<_>>();
        let expected = (0..7)
            .map(|i| &a[i] + &b[i] + &c[i])
            .collect::<Vec<_>>();
        assert_eq!(ve.decode(&sum)?, expected);
        Ok(())
    }

    #[test]
    fn zeros_decode_to_zeros() -> Result<(), Box<dyn std::error::Error>> {
        let ve = VectorEncoding::new(64, 3, 8, 20)?;
        assert_eq!(ve.decode(&ve.zeros())?, vec![BigUint::from(0u32); 20]);
        Ok(())
    }

    #[test]
    fn bounds() -> Result<(), Box<dyn std::error::Error>> {
        let ve = VectorEncoding::new(64, 3, 8, 2)?;
        assert_eq!(
            ve.encode(&[BigUint::from(1u32)]),
            Err(Error::length_mismatch(2, 1))
        );
        assert!(matches!(
            ve.encode(&[BigUint::from(256u32), BigUint::from(1u32)]),
            Err(Error::Arithmetic(_))
        ));
        assert_eq!(ve.decode(&[]), Err(Error::length_mismatch(1, 0)));
        Ok(())
    }

    #[test]
    fn serde_validates() -> Result<(), Box<dyn std::error::Error>> {
        let ve = VectorEncoding::new(64, 3, 8, 20)?;
        let json = serde_json::to_string(&ve)?;
        assert_eq!(serde_json::from_str::<VectorEncoding>(&json)?, ve);

        let invalid = r#"{"slot_bits":4,"max_additions":3,"value_bits":8,"len":20}"#;
        assert!(serde_json::from_str::<VectorEncoding>(invalid).is_err());
        Ok(())
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(
            slot_bits in 40usize..512,
            value_bits in 1usize..32,
            len in 1usize..40,
            seed: u64,
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let ve = VectorEncoding::new(slot_bits, 10, value_bits, len).unwrap();
            let values = (0..len)
                .map(|_| rng.gen_biguint(value_bits as u64))
                .collect::<Vec<_>>();
            prop_assert_eq!(ve.decode(&ve.encode(&values).unwrap()).unwrap(), values);
        }
    }
}
