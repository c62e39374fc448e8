//! Error handling for the Reed-Muller codec.
//!
//! This module defines the error types used throughout the crate.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error enum for the Reed-Muller codec.
#[derive(Error, Debug)]
pub enum Error {
    /// A GF(2) scalar was constructed from a value other than 0 or 1
    #[error("invalid bit value: {0} (expected 0 or 1)")]
    InvalidBitValue(String),

    /// Two words of unequal length were combined, or a word of the wrong
    /// length was passed to encode/decode/search
    #[error("word length mismatch: expected {expected} bits, got {actual}")]
    LengthMismatch {
        /// Expected word length in bits
        expected: usize,
        /// Actual word length in bits
        actual: usize,
    },

    /// A fixed-width conversion was requested with fewer bits than the
    /// value needs
    #[error("requested width {requested} is smaller than the value's natural width {natural}")]
    SizeTooSmall {
        /// Natural width of the value in bits
        natural: usize,
        /// Requested width in bits
        requested: usize,
    },

    /// Noise probability outside the half-open interval [0.0, 1.0)
    #[error("noise probability {0} is outside [0.0, 1.0)")]
    InvalidProbability(f64),

    /// Code order outside the supported range
    #[error("unsupported code order {order}: must be between 1 and {max}")]
    InvalidOrder {
        /// Requested code order
        order: usize,
        /// Maximum supported order
        max: usize,
    },

    /// Malformed greyscale image file
    #[error("image format error: {0}")]
    ImageFormat(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error during serialization/deserialization
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::LengthMismatch {
            expected: 8,
            actual: 4,
        };
        assert_eq!(
            err.to_string(),
            "word length mismatch: expected 8 bits, got 4"
        );

        let err = Error::InvalidProbability(1.5);
        assert!(err.to_string().contains("1.5"));

        let err = Error::InvalidOrder { order: 0, max: 12 };
        assert!(err.to_string().contains("order 0"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
