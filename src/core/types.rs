//! Wire types for signed price updates
//!
//! These mirror the JSON the publisher network exchanges: hex strings for
//! field elements, decimal strings for quantized prices.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::error::{EncodingError, ValidateError};
use crate::stark::field::{bytes_to_hex, parse_hex_bytes, FieldBytes};
use crate::stark::Attestation;

/// Fixed-point price as a non-negative decimal integer string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuantizedPrice(String);

impl QuantizedPrice {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into an integer; signs, blanks and non-digits are rejected
    pub fn to_biguint(&self) -> Result<BigUint, EncodingError> {
        if self.0.is_empty() || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EncodingError::InvalidPrice(self.0.clone()));
        }
        BigUint::parse_bytes(self.0.as_bytes(), 10)
            .ok_or_else(|| EncodingError::InvalidPrice(self.0.clone()))
    }
}

impl fmt::Display for QuantizedPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for QuantizedPrice {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let price = Self::new(s);
        price.to_biguint()?;
        Ok(price)
    }
}

impl From<u64> for QuantizedPrice {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// Signature scheme tag carried next to every signed price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureType {
    Stark,
}

impl fmt::Display for SignatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureType::Stark => write!(f, "stark"),
        }
    }
}

/// Stark ECDSA signature as minimal `0x` hex strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarkSignature {
    pub r: String,
    pub s: String,
}

impl StarkSignature {
    pub fn from_attestation(attestation: &Attestation) -> Self {
        Self {
            r: bytes_to_hex(&attestation.r_bytes()),
            s: bytes_to_hex(&attestation.s_bytes()),
        }
    }

    /// Decode both components into 32-byte buffers
    pub fn to_bytes(&self) -> Result<(FieldBytes, FieldBytes), ValidateError> {
        let r = parse_hex_bytes(&self.r, "r")
            .map_err(|e| ValidateError::InvalidSignature(e.to_string()))?;
        let s = parse_hex_bytes(&self.s, "s")
            .map_err(|e| ValidateError::InvalidSignature(e.to_string()))?;
        Ok((r, s))
    }

    /// Compact `0x` + 64 hex digits of `r` + 64 hex digits of `s`
    pub fn to_compact_hex(&self) -> Result<String, ValidateError> {
        let (r, s) = self.to_bytes()?;
        Ok(format!("0x{}{}", hex::encode(r), hex::encode(s)))
    }

    /// Parse the compact form; anything but exactly 128 hex digits is rejected
    pub fn from_compact_hex(value: &str) -> Result<Self, ValidateError> {
        let digits = value.strip_prefix("0x").unwrap_or(value);
        if digits.len() != 128 {
            return Err(ValidateError::InvalidSignature(format!(
                "compact signature must be 128 hex digits, got {}",
                digits.len()
            )));
        }
        let (r, s) = digits.split_at(64);
        let r = parse_hex_bytes(r, "r").map_err(|e| ValidateError::InvalidSignature(e.to_string()))?;
        let s = parse_hex_bytes(s, "s").map_err(|e| ValidateError::InvalidSignature(e.to_string()))?;
        Ok(Self {
            r: bytes_to_hex(&r),
            s: bytes_to_hex(&s),
        })
    }
}

/// Signature plus the hash it covers and the observation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampedSignature {
    pub signature: StarkSignature,
    /// Observation time in nanoseconds
    pub timestamp: i64,
    pub msg_hash: String,
}

/// One attested price, ready to hand to the oracle collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPrice {
    pub publisher_key: String,
    pub external_asset_id: String,
    pub signature_type: SignatureType,
    pub quantized_price: QuantizedPrice,
    pub timestamped_signature: TimestampedSignature,
}
