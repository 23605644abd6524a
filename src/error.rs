//! Error handling for spow
//!
//! Configuration problems are reported through [`ConfigError`] before any
//! hashing starts. Everything that can go wrong afterwards (search exhaustion,
//! cancellation, malformed certificate text, I/O) is an [`Error`].
//! A certificate that fails verification is not an error; see
//! [`crate::verifier::Verdict`].

use thiserror::Error;

/// Result type alias for spow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Parameter validation failures, detected once at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Initial chain digest does not match the hash output size
    #[error("initial digest must be {expected} bytes, got {actual}")]
    DigestLength { expected: usize, actual: usize },

    /// Domain token does not have the fixed token width
    #[error("domain token must be {expected} bytes, got {actual}")]
    TokenLength { expected: usize, actual: usize },

    /// More leading zero bits requested than the 32-bit predicate window holds
    #[error("difficulty {difficulty} exceeds the maximum of {max} bits")]
    DifficultyTooHigh { difficulty: u32, max: u32 },

    /// Difficulty plus safety does not fit the nonce field
    #[error("nonce width {bits} (difficulty + safety) exceeds the maximum of {max} bits")]
    NonceTooWide { bits: u32, max: u32 },

    /// Difficulty plus safety is zero, so there is nothing to record per step
    #[error("nonce width (difficulty + safety) must be at least one bit")]
    EmptyNonce,

    /// A certificate needs at least one step
    #[error("step count must be at least 1")]
    NoSteps,

    /// Certificate length does not fit in memory on this platform
    #[error("certificate of {bits} bits is too large for this platform")]
    CertificateTooLarge { bits: u64 },

    /// A hex-encoded parameter could not be decoded
    #[error("invalid hex in {field}: {message}")]
    InvalidHex { field: &'static str, message: String },
}

/// Main error type for spow
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameters
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No nonce in the step's search range satisfied the predicate
    #[error("Nonce space exhausted in step {step} after {hashes} hashes")]
    Exhausted { step: u32, hashes: u64 },

    /// Cancellation of a running construction
    #[error("Operation was cancelled: {operation}")]
    Cancelled { operation: String },

    /// Certificate text could not be decoded
    #[error("Invalid certificate encoding: {message}")]
    Encoding { message: String },

    /// Hex decoding errors
    #[error("Hex error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking worker task panicked or was aborted
    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    /// Create a configuration error from a validation failure
    pub fn config(error: ConfigError) -> Self {
        Self::Config(error)
    }

    /// Create an exhaustion error for the given step
    pub fn exhausted(step: u32, hashes: u64) -> Self {
        Self::Exhausted { step, hashes }
    }

    /// Create a cancellation error
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Create a certificate encoding error
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Step index at which construction failed, if this is an exhaustion
    pub fn failed_step(&self) -> Option<u32> {
        match self {
            Error::Exhausted { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::Exhausted { .. } => "exhausted",
            Error::Cancelled { .. } => "cancelled",
            Error::Encoding { .. } => "encoding",
            Error::Hex(_) => "hex",
            Error::Json(_) => "json",
            Error::Yaml(_) => "yaml",
            Error::Io(_) => "io",
            Error::Join(_) => "join",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::exhausted(17, 4096);
        assert_eq!(
            err.to_string(),
            "Nonce space exhausted in step 17 after 4096 hashes"
        );

        let err = Error::config(ConfigError::DifficultyTooHigh {
            difficulty: 40,
            max: 32,
        });
        assert_eq!(
            err.to_string(),
            "Configuration error: difficulty 40 exceeds the maximum of 32 bits"
        );
    }

    #[test]
    fn test_failed_step() {
        assert_eq!(Error::exhausted(3, 10).failed_step(), Some(3));
        assert_eq!(Error::cancelled("prove").failed_step(), None);
    }

    #[test]
    fn test_error_conversions() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.category(), "io");

        let err: Error = ConfigError::NoSteps.into();
        assert!(matches!(err, Error::Config(ConfigError::NoSteps)));
        assert_eq!(err.category(), "config");
    }
}
