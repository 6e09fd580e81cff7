//! The Joye-Libert additively homomorphic aggregation scheme.
//!
//! A user protects `x` in round `tau` as `(1 + n·x)·H(tau)^s mod n²`. The
//! product of the ciphertexts of all users, multiplied by `H(tau)^{s_0}` where
//! `s_0` is the server key, equals `1 + n·Σx mod n²`.
//!
//! Vectors are packed with a [`VectorEncoding`] and each slot is protected under
//! its own tag derived from the round tag and the slot counter.

mod ciphertext;
mod encoding;
mod keys;
mod parameters;
mod scheme;

pub use ciphertext::EncryptedNumber;
pub use encoding::VectorEncoding;
pub use keys::{ServerKey, UserKey};
pub use parameters::{PublicParameters, SchemeParameters, SchemeParametersBuilder};
pub use scheme::JoyeLibert;

pub(crate) use scheme::{decrypt_slots, encrypt_slots, sum_slots};
