//! Message encoding
//!
//! A price observation is packed into two field elements:
//!
//! ```text
//! x = (asset << 40) + oracle_name
//! y = (quantized_price << 32) + timestamp_seconds
//! ```
//!
//! `asset` is the big-endian integer of the asset's UTF-8 bytes, right-padded
//! with zero bytes to 16 bytes. `oracle_name` (1..=5 bytes) fills a fixed
//! 40-bit slot and the timestamp a fixed 32-bit slot. NUL bytes are rejected
//! so that padding can never make two names collide. This layout is shared
//! with on-chain verifiers: changing it invalidates every signature.

use num_bigint::BigUint;
use starknet_crypto::{pedersen_hash, FieldElement};

use crate::core::types::QuantizedPrice;
use crate::error::EncodingError;
use crate::stark::field::{biguint_to_field_element, field_element_from_bytes, FieldBytes};

/// Bits reserved for the oracle name in `x`
pub const ORACLE_NAME_BITS: usize = 40;
pub const ORACLE_NAME_MAX_BYTES: usize = ORACLE_NAME_BITS / 8;
/// Bits reserved for the timestamp (seconds) in `y`
pub const TIMESTAMP_BITS: usize = 32;
/// Assets shorter than this are right-padded with zero bytes
pub const ASSET_PAD_BYTES: usize = 16;

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const ORACLE_NAME_HEX_DIGITS: usize = ORACLE_NAME_MAX_BYTES * 2;

/// A raw price observation, before encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceMessage {
    pub asset: String,
    pub quantized_price: QuantizedPrice,
    pub timestamp_ns: i64,
    pub oracle_name: String,
}

/// Inputs accepted by the signer and the validator
#[derive(Debug, Clone, PartialEq)]
pub enum MessageInputs {
    /// Already-encoded field elements
    Direct { x: FieldElement, y: FieldElement },
    /// Observation to be encoded first
    Price(PriceMessage),
}

/// Encoded `(x, y)` pair, the exact input of the Pedersen hash
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodedMessage {
    pub x: FieldElement,
    pub y: FieldElement,
}

impl EncodedMessage {
    pub fn pedersen_hash(&self) -> FieldElement {
        pedersen_hash(&self.x, &self.y)
    }
}

impl MessageInputs {
    /// Build direct inputs from boundary buffers, rejecting values `>= P`
    pub fn from_bytes(x: &FieldBytes, y: &FieldBytes) -> Result<Self, EncodingError> {
        Ok(Self::Direct {
            x: field_element_from_bytes(x, "x")?,
            y: field_element_from_bytes(y, "y")?,
        })
    }

    pub fn price(
        asset: impl Into<String>,
        quantized_price: QuantizedPrice,
        timestamp_ns: i64,
        oracle_name: impl Into<String>,
    ) -> Self {
        Self::Price(PriceMessage {
            asset: asset.into(),
            quantized_price,
            timestamp_ns,
            oracle_name: oracle_name.into(),
        })
    }

    pub fn encode(&self) -> Result<EncodedMessage, EncodingError> {
        match self {
            MessageInputs::Direct { x, y } => Ok(EncodedMessage { x: *x, y: *y }),
            MessageInputs::Price(message) => encode_price_message(message),
        }
    }
}

pub fn encode_price_message(message: &PriceMessage) -> Result<EncodedMessage, EncodingError> {
    let asset = asset_int(&message.asset)?;
    let oracle = oracle_name_int(&message.oracle_name)?;
    let price = message.quantized_price.to_biguint()?;
    let seconds = timestamp_seconds(message.timestamp_ns)?;

    let x = (asset << ORACLE_NAME_BITS) + oracle;
    let y = (price << TIMESTAMP_BITS) + BigUint::from(seconds);

    Ok(EncodedMessage {
        x: biguint_to_field_element(&x, "x")?,
        y: biguint_to_field_element(&y, "y")?,
    })
}

/// Asset bytes, right-padded to `ASSET_PAD_BYTES`
fn padded_asset_bytes(asset: &str) -> Result<Vec<u8>, EncodingError> {
    if asset.is_empty() {
        return Err(EncodingError::EmptyAsset);
    }
    if asset.bytes().any(|b| b == 0) {
        return Err(EncodingError::NulByte { field: "asset" });
    }
    let mut bytes = asset.as_bytes().to_vec();
    if bytes.len() < ASSET_PAD_BYTES {
        bytes.resize(ASSET_PAD_BYTES, 0);
    }
    Ok(bytes)
}

pub fn asset_int(asset: &str) -> Result<BigUint, EncodingError> {
    Ok(BigUint::from_bytes_be(&padded_asset_bytes(asset)?))
}

pub fn oracle_name_int(oracle_name: &str) -> Result<BigUint, EncodingError> {
    let bytes = oracle_name.as_bytes();
    if bytes.is_empty() || bytes.len() > ORACLE_NAME_MAX_BYTES {
        return Err(EncodingError::OracleNameLength(bytes.len()));
    }
    if bytes.contains(&0) {
        return Err(EncodingError::NulByte { field: "oracle name" });
    }
    Ok(BigUint::from_bytes_be(bytes))
}

/// Whole seconds of a nanosecond timestamp; must fit the 32-bit slot
pub fn timestamp_seconds(timestamp_ns: i64) -> Result<u32, EncodingError> {
    if timestamp_ns < 0 {
        return Err(EncodingError::TimestampOutOfRange(timestamp_ns));
    }
    u32::try_from(timestamp_ns / NANOS_PER_SECOND)
        .map_err(|_| EncodingError::TimestampOutOfRange(timestamp_ns))
}

/// `0x` + padded asset hex + 10-digit oracle name hex; numerically equal to `x`
pub fn encode_external_asset_id(asset: &str, oracle_name: &str) -> Result<String, EncodingError> {
    let asset_hex = hex::encode(padded_asset_bytes(asset)?);
    let oracle = oracle_name_int(oracle_name)?;
    Ok(format!(
        "0x{}{:0>width$}",
        asset_hex,
        oracle.to_str_radix(16),
        width = ORACLE_NAME_HEX_DIGITS
    ))
}

/// Split an external asset id back into `(asset, oracle_name)`
pub fn decode_external_asset_id(external_asset_id: &str) -> Result<(String, String), EncodingError> {
    let invalid = || EncodingError::InvalidExternalAssetId(external_asset_id.to_string());

    let digits = external_asset_id
        .strip_prefix("0x")
        .unwrap_or(external_asset_id);
    if digits.len() <= ORACLE_NAME_HEX_DIGITS || digits.len() % 2 != 0 {
        return Err(invalid());
    }

    let (asset_hex, oracle_hex) = digits.split_at(digits.len() - ORACLE_NAME_HEX_DIGITS);
    let asset_bytes = hex::decode(asset_hex).map_err(|_| invalid())?;
    let oracle_bytes = hex::decode(oracle_hex).map_err(|_| invalid())?;

    let asset_end = asset_bytes
        .iter()
        .rposition(|b| *b != 0)
        .map(|i| i + 1)
        .ok_or_else(invalid)?;
    let oracle_start = oracle_bytes
        .iter()
        .position(|b| *b != 0)
        .ok_or_else(invalid)?;

    let asset = String::from_utf8(asset_bytes[..asset_end].to_vec()).map_err(|_| invalid())?;
    let oracle_name =
        String::from_utf8(oracle_bytes[oracle_start..].to_vec()).map_err(|_| invalid())?;

    // Only canonical ids round-trip; anything else would verify a different x
    if encode_external_asset_id(&asset, &oracle_name)? != format!("0x{}", digits.to_lowercase()) {
        return Err(invalid());
    }

    Ok((asset, oracle_name))
}
