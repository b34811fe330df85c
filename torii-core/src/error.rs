/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 29/7/26
******************************************************************************/

//! Error types for the torii order-entry protocol toolkit.
//!
//! This module provides a unified error hierarchy using `thiserror` for typed,
//! domain-specific errors across both wire protocols and the verification
//! harness.

use thiserror::Error;

/// Result type alias using [`ToriiError`] as the error type.
pub type Result<T> = std::result::Result<T, ToriiError>;

/// Top-level error type for all torii operations.
#[derive(Debug, Error)]
pub enum ToriiError {
    /// Error on the wire: malformed bytes, checksum mismatch, bad field.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Session-layer error: handshake, sequencing, unexpected messages.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// A received field did not match the checker's expectation.
    #[error("validation failure: {0}")]
    Validation(#[from] ValidationError),

    /// A receive deadline elapsed. The session stays alive.
    #[error("timed out after {waited_ms} ms")]
    Timeout {
        /// How long the caller waited, in milliseconds.
        waited_ms: u64,
    },

    /// I/O error from the underlying transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToriiError {
    /// Returns true if this is a receive timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Errors raised while encoding or decoding wire bytes.
///
/// A codec error is fatal to the current frame. For FIX the session can
/// recover by discarding bytes up to the next frame start; for the
/// length-prefixed ESP framing loss of sync tears the session down.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Buffer ended before a fixed-width field could be read.
    #[error("truncated frame: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes required by the next field.
        needed: usize,
        /// Bytes remaining in the buffer.
        available: usize,
    },

    /// A field contained bytes outside the ASCII range.
    #[error("non-ascii bytes in field {field}")]
    NonAscii {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A field value could not be interpreted for its declared kind.
    #[error("invalid value for field {field}: {reason}")]
    InvalidFieldValue {
        /// Name of the offending field.
        field: &'static str,
        /// Description of why the value is invalid.
        reason: String,
    },

    /// A single-character enumeration field held a character outside its set.
    #[error("invalid enum value {value:?} for field {field}")]
    InvalidEnum {
        /// Name of the offending field.
        field: &'static str,
        /// The character found on the wire.
        value: char,
    },

    /// FIX frame did not start with `8=`.
    #[error("invalid begin string: frame must start with 8=")]
    InvalidBeginString,

    /// FIX BodyLength field (tag 9) missing or out of place.
    #[error("missing body length field (tag 9)")]
    MissingBodyLength,

    /// FIX BodyLength value not a valid integer.
    #[error("invalid body length value")]
    InvalidBodyLength,

    /// FIX frame had no `10=` trailer.
    #[error("missing checksum field (tag 10)")]
    MissingChecksum,

    /// Checksum did not recompute.
    #[error("checksum mismatch: calculated {calculated}, declared {declared}")]
    ChecksumMismatch {
        /// Checksum recomputed from the frame bytes.
        calculated: u8,
        /// Checksum declared in the frame.
        declared: u8,
    },

    /// A tag could not be parsed as an integer.
    #[error("invalid tag format: {0}")]
    InvalidTag(String),
}

/// Errors in session-layer operations for either protocol.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The client is not connected.
    #[error("not connected")]
    NotConnected,

    /// Connection-level failure (connect retry exhausted, peer closed, ...).
    #[error("connection error: {0}")]
    Connection(String),

    /// A handshake step received something other than the expected message.
    ///
    /// Carries a rendering of the offending decoded message.
    #[error("unexpected message: expected {expected}, received {received}")]
    UnexpectedMessage {
        /// What the handshake was waiting for.
        expected: String,
        /// Rendering of the message actually received.
        received: String,
    },

    /// The counterparty rejected a session-level request.
    #[error("rejected by counterparty: {message}")]
    Rejected {
        /// Rendering of the reject frame.
        message: String,
    },

    /// Sequence numbers disagree.
    #[error("sequence mismatch: expected {expected}, received {received}")]
    SequenceMismatch {
        /// Expected sequence number.
        expected: u64,
        /// Received sequence number.
        received: u64,
    },

    /// Invalid configuration supplied by the caller.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// A received field did not equal the value the checker expected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("field {field}: expected {expected}, got {actual}")]
pub struct ValidationError {
    /// Name of the mismatching field.
    pub field: String,
    /// Expected value, rendered.
    pub expected: String,
    /// Actual value, rendered.
    pub actual: String,
}

impl ValidationError {
    /// Creates a new validation failure record.
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_error_display() {
        let err = CodecError::ChecksumMismatch {
            calculated: 100,
            declared: 200,
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch: calculated 100, declared 200"
        );
    }

    #[test]
    fn test_torii_error_from_codec() {
        let codec = CodecError::Truncated {
            needed: 72,
            available: 10,
        };
        let err: ToriiError = codec.into();
        assert!(matches!(err, ToriiError::Codec(_)));
    }

    #[test]
    fn test_timeout_predicate() {
        let err = ToriiError::Timeout { waited_ms: 10_000 };
        assert!(err.is_timeout());
        assert!(!ToriiError::from(SessionError::NotConnected).is_timeout());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("OrderQuantity", "100", "99");
        assert_eq!(err.to_string(), "field OrderQuantity: expected 100, got 99");
    }
}
