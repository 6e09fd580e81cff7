use thiserror::Error;

/// The Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Enum encapsulating all the possible errors from this library.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Indicates that no prime field is large enough for the requested bit length.
    #[error("No prime field supports {0}-bit values")]
    UnsupportedBitLength(usize),

    /// Indicates that a value is not invertible modulo the given modulus.
    #[error("{0} is not invertible modulo {1}")]
    NoInverse(String, String),

    /// Indicates that a value falls outside the domain of the full-domain hash.
    #[error("Hash domain error: {0}")]
    HashDomain(String),

    /// Indicates that a value does not fit its domain.
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Indicates that two field elements belong to different fields.
    #[error("Field elements belong to different fields")]
    FieldMismatch,

    /// Indicates a default error.
    #[error("{0}")]
    Default(String),
}
