//! Error types using thiserror
//!
//! The signing and validation paths each have their own error enum so that
//! callers can tell "bad key / bad data" apart from "forged signature".
//! Application-level failures (config, IO) are wrapped in `AppError`.

use thiserror::Error;

/// Failure while turning message inputs into field elements
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("asset must not be empty")]
    EmptyAsset,

    #[error("{field} must not contain NUL bytes")]
    NulByte { field: &'static str },

    #[error("oracle name must be 1..=5 bytes, got {0}")]
    OracleNameLength(usize),

    #[error("invalid quantized price '{0}'")]
    InvalidPrice(String),

    #[error("timestamp {0}ns is outside the encodable range")]
    TimestampOutOfRange(i64),

    #[error("{field} does not fit in a field element")]
    OutOfField { field: &'static str },

    #[error("invalid hex in {field}: {reason}")]
    InvalidHex { field: &'static str, reason: String },

    #[error("invalid external asset id '{0}'")]
    InvalidExternalAssetId(String),
}

/// Errors returned by `hash_and_sign`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignError {
    /// Private key is malformed or outside `[1, N-1]`
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// Message inputs could not be encoded
    #[error("invalid input: {0}")]
    InvalidInput(#[from] EncodingError),

    /// Arithmetic invariant violated; indicates a bug, not bad data
    #[error("internal error: {0}")]
    InternalError(String),
}

/// Errors returned by `validate_signature`
///
/// A well-formed signature that does not match is `Ok(false)`, never an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidateError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] EncodingError),

    /// `r` or `s` is zero or outside the signable range
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Public key is not a field element or has no point on the curve
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Signing error: {0}")]
    Sign(#[from] SignError),

    #[error("Validation error: {0}")]
    Validate(#[from] ValidateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_error_display() {
        let err = SignError::InvalidKey("zero".to_string());
        assert_eq!(err.to_string(), "invalid private key: zero");
    }

    #[test]
    fn test_encoding_error_converts_to_invalid_input() {
        let err: SignError = EncodingError::EmptyAsset.into();
        assert!(matches!(err, SignError::InvalidInput(EncodingError::EmptyAsset)));
        assert_eq!(err.to_string(), "invalid input: asset must not be empty");

        let err: ValidateError = EncodingError::OracleNameLength(6).into();
        assert_eq!(
            err.to_string(),
            "invalid input: oracle name must be 1..=5 bytes, got 6"
        );
    }

    #[test]
    fn test_app_error_wraps_validate_error() {
        let err: AppError = ValidateError::InvalidSignature("r is zero".into()).into();
        assert_eq!(err.to_string(), "Validation error: invalid signature: r is zero");
    }
}
