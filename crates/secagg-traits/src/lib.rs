#![crate_name = "secagg_traits"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]

//! Traits for the secagg secure-aggregation library.
//!
//! Besides the (de)serialization traits shared by the scheme objects, this
//! crate defines the interfaces of the two primitives that the arithmetic core
//! consumes but does not implement: the authenticated channel cipher that
//! wraps shares in transit, and the key-agreement primitive deriving pairwise
//! channel keys.

use rand::{CryptoRng, RngCore};
use std::sync::Arc;

/// The public parameters of an aggregation scheme.
pub trait AggParameters {}

/// Indicates that an object is parametrized.
pub trait AggParametrized {
    /// The type of the parameters.
    type Parameters: AggParameters;
}

/// Serialization.
pub trait Serialize {
    /// Serialize `Self` into a vector of bytes.
    fn to_bytes(&self) -> Vec<u8>;
}

/// Deserialization without context.
pub trait Deserialize
where
    Self: Sized,
{
    /// The type of error returned.
    type Error;

    /// Attempt to deserialize from a vector of bytes
    fn try_deserialize(bytes: &[u8]) -> Result<Self, Self::Error>;
}

/// Deserialization setting an explicit parameter set.
pub trait DeserializeParametrized
where
    Self: Sized,
    Self: AggParametrized,
{
    /// The type of error returned.
    type Error;

    /// Attempt to deserialize from a vector of bytes
    fn from_bytes(bytes: &[u8], par: &Arc<Self::Parameters>) -> Result<Self, Self::Error>;
}

/// Size in bytes of the keys used by a [`ChannelCipher`].
pub const CHANNEL_KEY_BYTES: usize = 16;

/// A channel key.
pub type ChannelKey = [u8; CHANNEL_KEY_BYTES];

/// The output of an authenticated encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedMessage {
    /// Encrypted payload.
    pub ciphertext: Vec<u8>,
    /// Authentication tag.
    pub tag: Vec<u8>,
    /// Nonce, freshly drawn for every encryption.
    pub nonce: Vec<u8>,
}

impl SealedMessage {
    /// Number of bytes on the wire.
    pub fn len(&self) -> usize {
        self.ciphertext.len() + self.tag.len() + self.nonce.len()
    }

    /// Returns true when all components are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Authenticated symmetric cipher with 128-bit keys.
///
/// Implementations must draw a fresh nonce on every call to
/// [`ChannelCipher::encrypt`], and [`ChannelCipher::decrypt`] must fail when
/// the tag does not authenticate the ciphertext.
pub trait ChannelCipher {
    /// The type of error returned.
    type Error: std::fmt::Display;

    /// Encrypt and authenticate `plaintext`.
    fn encrypt<R: RngCore + CryptoRng>(
        &self,
        key: &ChannelKey,
        plaintext: &[u8],
        rng: &mut R,
    ) -> Result<SealedMessage, Self::Error>;

    /// Verify and decrypt a sealed message.
    fn decrypt(&self, key: &ChannelKey, sealed: &SealedMessage) -> Result<Vec<u8>, Self::Error>;
}

/// Key agreement, implemented by the secret key type.
pub trait KeyAgreement
where
    Self: Sized,
{
    /// The public key type.
    type PublicKey;

    /// The type of error returned.
    type Error: std::fmt::Display;

    /// Generate a fresh key pair.
    fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> (Self, Self::PublicKey);

    /// Derive the shared secret with a peer.
    fn agree(&self, peer: &Self::PublicKey) -> Result<Vec<u8>, Self::Error>;
}
