//! Parameters of the Joye-Libert scheme.
//!
//! [`SchemeParameters`] is the immutable configuration chosen before setup and
//! threaded explicitly through every call. [`PublicParameters`] is produced by
//! setup and holds the modulus `n`.

use crate::jl::VectorEncoding;
use crate::ss::ThresholdConfig;
use crate::{Error, Result};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use secagg_math::fdh::FullDomainHash;
use secagg_traits::{AggParameters, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};
use std::fmt::Debug;
use std::sync::Arc;

/// Configuration of a secure-aggregation deployment.
#[derive(Debug, Clone, PartialEq, Eq, SerdeSerialize, SerdeDeserialize)]
#[serde(try_from = "RawSchemeParameters")]
pub struct SchemeParameters {
    /// Number of users and number of users needed to compensate for the
    /// others.
    config: ThresholdConfig,

    /// Bit length of `n²`; `n` has half as many bits.
    key_size: usize,

    /// Statistical security parameter of the integer secret sharing.
    sigma: usize,

    /// Packing of vectors into plaintext slots, when vectors are protected.
    vector_encoding: Option<VectorEncoding>,
}

#[derive(SerdeDeserialize)]
struct RawSchemeParameters {
    config: ThresholdConfig,
    key_size: usize,
    sigma: usize,
    vector_encoding: Option<VectorEncoding>,
}

impl TryFrom<RawSchemeParameters> for SchemeParameters {
    type Error = Error;

    fn try_from(raw: RawSchemeParameters) -> Result<Self> {
        let mut builder = SchemeParametersBuilder::new();
        builder
            .set_users(raw.config.parties())
            .set_threshold(raw.config.threshold())
            .set_key_size(raw.key_size)
            .set_sigma(raw.sigma);
        if let Some(encoding) = raw.vector_encoding {
            builder.set_vector_encoding(encoding);
        }
        builder.build()
    }
}

impl SchemeParameters {
    /// Default bit length of `n²`.
    pub const DEFAULT_KEY_SIZE: usize = 2048;

    /// Default statistical security parameter.
    pub const DEFAULT_SIGMA: usize = 128;

    /// Number of users.
    pub fn users(&self) -> usize {
        self.config.parties()
    }

    /// Reconstruction threshold.
    pub fn threshold(&self) -> usize {
        self.config.threshold()
    }

    /// Bit length of `n²`.
    pub fn key_size(&self) -> usize {
        self.key_size
    }

    /// Bit length of `n`.
    pub fn modulus_bits(&self) -> usize {
        self.key_size / 2
    }

    /// Statistical security parameter.
    pub fn sigma(&self) -> usize {
        self.sigma
    }

    /// The vector encoding, if any.
    pub fn vector_encoding(&self) -> Option<&VectorEncoding> {
        self.vector_encoding.as_ref()
    }

    /// The threshold configuration of the key sharing.
    pub fn threshold_config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// `users!`.
    pub fn delta(&self) -> BigUint {
        self.config.delta()
    }
}

/// Builder for [`SchemeParameters`].
#[derive(Debug)]
pub struct SchemeParametersBuilder {
    users: usize,
    threshold: Option<usize>,
    key_size: usize,
    sigma: usize,
    vector_encoding: Option<VectorEncoding>,
}

impl SchemeParametersBuilder {
    /// Creates a new instance of the builder
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            users: Default::default(),
            threshold: None,
            key_size: SchemeParameters::DEFAULT_KEY_SIZE,
            sigma: SchemeParameters::DEFAULT_SIGMA,
            vector_encoding: None,
        }
    }

    /// Sets the number of users.
    pub fn set_users(&mut self, users: usize) -> &mut Self {
        self.users = users;
        self
    }

    /// Sets the threshold. Defaults to the number of users.
    pub fn set_threshold(&mut self, threshold: usize) -> &mut Self {
        self.threshold = Some(threshold);
        self
    }

    /// Sets the bit length of `n²`. Must be at least 256 and a multiple of 16.
    pub fn set_key_size(&mut self, key_size: usize) -> &mut Self {
        self.key_size = key_size;
        self
    }

    /// Sets the statistical security parameter.
    pub fn set_sigma(&mut self, sigma: usize) -> &mut Self {
        self.sigma = sigma;
        self
    }

    /// Sets the vector encoding. Its slots must be smaller than `n`.
    pub fn set_vector_encoding(&mut self, encoding: VectorEncoding) -> &mut Self {
        self.vector_encoding = Some(encoding);
        self
    }

    /// Build a new `SchemeParameters` inside an `Arc`.
    pub fn build_arc(&self) -> Result<Arc<SchemeParameters>> {
        self.build().map(Arc::new)
    }

    /// Build a new `SchemeParameters`.
    pub fn build(&self) -> Result<SchemeParameters> {
        let config = ThresholdConfig::new(self.users, self.threshold.unwrap_or(self.users))?;

        if self.key_size < 256 || self.key_size % 16 != 0 {
            return Err(Error::Configuration(format!(
                "The key size {} must be at least 256 and a multiple of 16",
                self.key_size
            )));
        }
        if self.sigma == 0 {
            return Err(Error::configuration(
                "The statistical security parameter must be positive",
            ));
        }
        if let Some(encoding) = &self.vector_encoding {
            let modulus_bits = self.key_size / 2;
            if encoding.slot_bits() >= modulus_bits {
                return Err(Error::Configuration(format!(
                    "Slots of {} bits do not fit below a modulus of {} bits",
                    encoding.slot_bits(),
                    modulus_bits
                )));
            }
        }

        Ok(SchemeParameters {
            config,
            key_size: self.key_size,
            sigma: self.sigma,
            vector_encoding: self.vector_encoding.clone(),
        })
    }
}

/// Public parameters produced by setup.
#[derive(Clone)]
pub struct PublicParameters {
    n: BigUint,
    n_squared: BigUint,
    bits: usize,
    hash: FullDomainHash,
}

impl Debug for PublicParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = self.n.to_string();
        let shortened = if digits.len() > 12 {
            format!("{}...{}", &digits[..6], &digits[digits.len() - 6..])
        } else {
            digits
        };
        f.debug_struct("PublicParameters")
            .field("n", &shortened)
            .field("bits", &self.bits)
            .finish()
    }
}

impl PartialEq for PublicParameters {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n
    }
}

impl Eq for PublicParameters {}

impl AggParameters for PublicParameters {}

impl PublicParameters {
    /// Creates the public parameters for the modulus `n`.
    pub fn new(n: BigUint) -> Result<Self> {
        if n <= BigUint::one() || n.is_even() {
            return Err(Error::configuration("The modulus must be an odd integer larger than one"));
        }
        let hash = FullDomainHash::new(&n)?;
        Ok(Self {
            n_squared: &n * &n,
            bits: n.bits() as usize,
            n,
            hash,
        })
    }

    /// Creates the public parameters for the modulus `n` inside an `Arc`.
    pub fn new_arc(n: BigUint) -> Result<Arc<Self>> {
        Self::new(n).map(Arc::new)
    }

    /// The modulus `n`.
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// The ciphertext modulus `n²`.
    pub fn n_squared(&self) -> &BigUint {
        &self.n_squared
    }

    /// Bit length of `n`.
    pub fn bits(&self) -> usize {
        self.bits
    }

    /// Number of bits of a ciphertext.
    pub fn ciphertext_bits(&self) -> usize {
        2 * self.bits
    }

    /// Hash a tag into the units of `Z_{n²}`.
    pub fn hash(&self, tag: &BigUint) -> Result<BigUint> {
        Ok(self.hash.hash(tag)?)
    }

    /// The tag of the slot `counter` of a vector protected in round `tau`:
    /// `(counter << bits/2) | tau`.
    pub fn slot_tag(&self, tau: u64, counter: usize) -> Result<BigUint> {
        let half = self.bits / 2;
        let tau = BigUint::from(tau);
        let counter = BigUint::from(counter);
        if tau.bits() > half as u64 || counter.bits() > half as u64 {
            return Err(Error::Consistency(format!(
                "Round tag or slot counter exceeds {} bits",
                half
            )));
        }
        Ok((counter << half) | tau)
    }
}

impl Serialize for PublicParameters {
    fn to_bytes(&self) -> Vec<u8> {
        self.n.to_bytes_be()
    }
}

impl Deserialize for PublicParameters {
    type Error = Error;

    fn try_deserialize(bytes: &[u8]) -> Result<Self> {
        Self::new(BigUint::from_bytes_be(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::{PublicParameters, SchemeParameters, SchemeParametersBuilder};
    use crate::jl::VectorEncoding;
    use crate::ErrorKind;
    use num_bigint::BigUint;
    use num_traits::One;
    use secagg_traits::{Deserialize, Serialize};
    use std::error::Error;

    #[test]
    fn defaults() -> Result<(), Box<dyn Error>> {
        let par = SchemeParametersBuilder::new().set_users(10).build()?;
        assert_eq!(par.users(), 10);
        assert_eq!(par.threshold(), 10);
        assert_eq!(par.key_size(), SchemeParameters::DEFAULT_KEY_SIZE);
        assert_eq!(par.modulus_bits(), 1024);
        assert_eq!(par.sigma(), SchemeParameters::DEFAULT_SIGMA);
        assert!(par.vector_encoding().is_none());
        assert_eq!(par.delta(), BigUint::from(3628800u32));
        Ok(())
    }

    #[test]
    fn validation() -> Result<(), Box<dyn Error>> {
        let kind = |b: &SchemeParametersBuilder| b.build().unwrap_err().kind();

        assert_eq!(kind(&SchemeParametersBuilder::new()), ErrorKind::Configuration);
        assert_eq!(
            kind(SchemeParametersBuilder::new().set_users(5).set_threshold(6)),
            ErrorKind::Configuration
        );
        assert_eq!(
            kind(SchemeParametersBuilder::new().set_users(5).set_threshold(0)),
            ErrorKind::Configuration
        );
        assert_eq!(
            kind(SchemeParametersBuilder::new().set_users(5).set_key_size(128)),
            ErrorKind::Configuration
        );
        assert_eq!(
            kind(SchemeParametersBuilder::new().set_users(5).set_key_size(1000)),
            ErrorKind::Configuration
        );
        assert_eq!(
            kind(SchemeParametersBuilder::new().set_users(5).set_sigma(0)),
            ErrorKind::Configuration
        );
        assert_eq!(
            kind(
                SchemeParametersBuilder::new()
                    .set_users(5)
                    .set_key_size(512)
                    .set_vector_encoding(VectorEncoding::new(256, 5, 16, 10)?)
            ),
            ErrorKind::Configuration
        );
        assert!(SchemeParametersBuilder::new()
            .set_users(5)
            .set_key_size(512)
            .set_vector_encoding(VectorEncoding::new(255, 5, 16, 10)?)
            .build()
            .is_ok());
        Ok(())
    }

    #[test]
    fn serde() -> Result<(), Box<dyn Error>> {
        let par = SchemeParametersBuilder::new()
            .set_users(5)
            .set_threshold(3)
            .set_key_size(512)
            .set_vector_encoding(VectorEncoding::new(255, 5, 16, 10)?)
            .build()?;
        let json = serde_json::to_string(&par)?;
        assert_eq!(serde_json::from_str::<SchemeParameters>(&json)?, par);

        let invalid = json.replace("\"threshold\":3", "\"threshold\":7");
        assert!(serde_json::from_str::<SchemeParameters>(&invalid).is_err());
        Ok(())
    }

    #[test]
    fn public_parameters() -> Result<(), Box<dyn Error>> {
        let n = ((BigUint::one() << 61usize) - 1u32) * ((BigUint::one() << 89usize) - 1u32);
        let pp = PublicParameters::new(n.clone())?;
        assert_eq!(pp.bits(), 150);
        assert_eq!(pp.ciphertext_bits(), 300);
        assert_eq!(pp.n_squared(), &(&n * &n));
        assert_eq!(PublicParameters::try_deserialize(&pp.to_bytes())?, pp);
        assert_eq!(
            PublicParameters::new(BigUint::from(16u32)).unwrap_err().kind(),
            ErrorKind::Configuration
        );
        assert!(format!("{:?}", pp).starts_with("PublicParameters"));
        Ok(())
    }

    #[test]
    fn slot_tags() -> Result<(), Box<dyn Error>> {
        let n = ((BigUint::one() << 61usize) - 1u32) * ((BigUint::one() << 89usize) - 1u32);
        let pp = PublicParameters::new(n)?;
        assert_eq!(pp.slot_tag(5, 0)?, BigUint::from(5u32));
        assert_eq!(
            pp.slot_tag(5, 3)?,
            (BigUint::from(3u32) << 75usize) | BigUint::from(5u32)
        );
        assert_ne!(pp.slot_tag(5, 1)?, pp.slot_tag(6, 1)?);

        // A 92-bit modulus leaves 46 bits for the round tag.
        let n = ((BigUint::one() << 31usize) - 1u32) * ((BigUint::one() << 61usize) - 1u32);
        let pp = PublicParameters::new(n)?;
        assert!(pp.slot_tag((1 << 46) - 1, 0).is_ok());
        assert_eq!(
            pp.slot_tag(1 << 46, 0).unwrap_err().kind(),
            ErrorKind::Consistency
        );
        Ok(())
    }
}
