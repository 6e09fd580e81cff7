use thiserror::Error;

/// The Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Enum encapsulating all the possible errors from this library.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Indicates that an error in the underlying mathematical library was
    /// encountered.
    #[error("{0}")]
    MathError(#[from] secagg_math::Error),

    /// Indicates an invalid configuration or invalid parameters.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Indicates that fewer shares than the threshold were provided.
    #[error("Insufficient shares: {0} provided, at least {1} required")]
    InsufficientShares(usize, usize),

    /// Indicates that two shares carry the same index.
    #[error("Duplicate share index {0}")]
    DuplicateShare(usize),

    /// Indicates that inputs do not belong together.
    #[error("Inconsistent inputs: {0}")]
    Consistency(String),

    /// Indicates an arithmetic failure, such as a value outside its range.
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    /// Indicates that a received message failed verification.
    #[error("Integrity check failed: {0}")]
    Integrity(String),
}

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid parameters.
    Configuration,
    /// Below-threshold reconstruction.
    InsufficientShares,
    /// Mismatched inputs.
    Consistency,
    /// Out-of-range values or missing contributions.
    Arithmetic,
    /// Failed authentication or routing checks.
    Integrity,
}

impl Error {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MathError(e) => match e {
                secagg_math::Error::UnsupportedBitLength(_) => ErrorKind::Configuration,
                secagg_math::Error::HashDomain(_) | secagg_math::Error::FieldMismatch => {
                    ErrorKind::Consistency
                }
                _ => ErrorKind::Arithmetic,
            },
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::InsufficientShares(..) => ErrorKind::InsufficientShares,
            Self::DuplicateShare(_) | Self::Consistency(_) => ErrorKind::Consistency,
            Self::Arithmetic(_) => ErrorKind::Arithmetic,
            Self::Integrity(_) => ErrorKind::Integrity,
        }
    }

    /// Create an insufficient shares error.
    pub fn insufficient_shares(provided: usize, required: usize) -> Self {
        Self::InsufficientShares(provided, required)
    }

    /// Create an invalid share index error.
    pub fn invalid_index(index: usize, parties: usize) -> Self {
        Self::Consistency(format!(
            "Invalid share index {}, must be between 1 and {}",
            index, parties
        ))
    }

    /// Create a share index mismatch error.
    pub fn index_mismatch(expected: usize, found: usize) -> Self {
        Self::Consistency(format!(
            "Share index mismatch: expected {}, found {}",
            expected, found
        ))
    }

    /// Create a length mismatch error.
    pub fn length_mismatch(expected: usize, found: usize) -> Self {
        Self::Consistency(format!(
            "Length mismatch: expected {}, found {}",
            expected, found
        ))
    }

    /// Create a public parameters mismatch error.
    pub fn parameters_mismatch() -> Self {
        Self::Consistency("Values were produced under different public parameters".to_string())
    }

    /// Create a configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an arithmetic error.
    pub fn arithmetic<S: Into<String>>(msg: S) -> Self {
        Self::Arithmetic(msg.into())
    }

    /// Create an integrity error.
    pub fn integrity<S: Into<String>>(msg: S) -> Self {
        Self::Integrity(msg.into())
    }
}
