//! Fixed-width field buffers and Stark curve constants
//!
//! Every value that crosses a boundary (FFI, JSON, CLI) is a 32-byte
//! big-endian buffer. Range checks are done on the raw bytes, before any
//! curve arithmetic: big-endian byte arrays order the same way as the
//! integers they encode.

use num_bigint::BigUint;
use starknet_crypto::FieldElement;
use zeroize::Zeroizing;

use crate::error::EncodingError;

/// Width of every field element / scalar buffer
pub const FIELD_BYTES: usize = 32;

/// Big-endian 32-byte buffer
pub type FieldBytes = [u8; FIELD_BYTES];

/// Field prime P = 2^251 + 17 * 2^192 + 1
pub const FIELD_PRIME: FieldBytes = [
    0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x11,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
];

/// Order N of the Stark curve generator
pub const EC_ORDER: FieldBytes = [
    0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xb7, 0x81, 0x12, 0x6d, 0xca, 0xe7, 0xb2, 0x32,
    0x1e, 0x66, 0xa2, 0x41, 0xad, 0xc6, 0x4d, 0x2f,
];

/// 2^251: exclusive bound for signable hashes and for `r` / `s`
pub const ELEMENT_UPPER_BOUND: FieldBytes = [
    0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Curve coefficient beta in y^2 = x^3 + x + beta
pub const CURVE_BETA: FieldBytes = [
    0x06, 0xf2, 0x14, 0x13, 0xef, 0xbe, 0x40, 0xde,
    0x15, 0x0e, 0x59, 0x6d, 0x72, 0xf7, 0xa8, 0xc5,
    0x60, 0x9a, 0xd2, 0x6c, 0x15, 0xc9, 0x15, 0xc1,
    0xf4, 0xcd, 0xfc, 0xb9, 0x9c, 0xee, 0x9e, 0x89,
];

/// True when `bytes` encodes a value in `[1, bound)`
pub fn is_nonzero_below(bytes: &FieldBytes, bound: &FieldBytes) -> bool {
    bytes.iter().any(|b| *b != 0) && bytes < bound
}

/// True when `bytes` encodes a value in `[0, P)`
pub fn is_canonical(bytes: &FieldBytes) -> bool {
    bytes < &FIELD_PRIME
}

/// Convert a buffer into a field element, rejecting values `>= P`
pub fn field_element_from_bytes(
    bytes: &FieldBytes,
    field: &'static str,
) -> Result<FieldElement, EncodingError> {
    if !is_canonical(bytes) {
        return Err(EncodingError::OutOfField { field });
    }
    FieldElement::from_bytes_be(bytes).map_err(|_| EncodingError::OutOfField { field })
}

/// Left-pad an arbitrary-precision integer into a 32-byte buffer
pub fn biguint_to_bytes(value: &BigUint, field: &'static str) -> Result<FieldBytes, EncodingError> {
    let raw = value.to_bytes_be();
    if raw.len() > FIELD_BYTES {
        return Err(EncodingError::OutOfField { field });
    }
    let mut buf = [0u8; FIELD_BYTES];
    buf[FIELD_BYTES - raw.len()..].copy_from_slice(&raw);
    Ok(buf)
}

/// Convert an arbitrary-precision integer into a field element
pub fn biguint_to_field_element(
    value: &BigUint,
    field: &'static str,
) -> Result<FieldElement, EncodingError> {
    let buf = biguint_to_bytes(value, field)?;
    field_element_from_bytes(&buf, field)
}

/// Parse a hex string (with or without `0x`, any length up to 64 digits)
/// into a left-padded 32-byte buffer.
///
/// Digits are decoded in place, so no heap copy of a secret is left behind.
pub fn parse_hex_bytes(value: &str, field: &'static str) -> Result<FieldBytes, EncodingError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    if digits.is_empty() || digits.len() > FIELD_BYTES * 2 {
        return Err(EncodingError::InvalidHex {
            field,
            reason: format!("expected 1..=64 hex digits, got {}", digits.len()),
        });
    }

    let mut buf = Zeroizing::new([0u8; FIELD_BYTES]);
    let (head, tail) = digits.split_at(digits.len() % 2);
    let tail_start = FIELD_BYTES - tail.len() / 2;
    hex::decode_to_slice(tail, &mut buf[tail_start..]).map_err(|e| EncodingError::InvalidHex {
        field,
        reason: e.to_string(),
    })?;

    // Odd length: the leading digit is a lone low nibble
    if let Some(c) = head.chars().next() {
        let nibble = c.to_digit(16).ok_or_else(|| EncodingError::InvalidHex {
            field,
            reason: format!("invalid character {:?} at index 0", c),
        })?;
        buf[tail_start - 1] = nibble as u8;
    }

    Ok(*buf)
}

/// Minimal `0x`-prefixed hex (no leading zeros), as the publisher wire
/// format expects; zero renders as `0x0`.
pub fn bytes_to_hex(bytes: &FieldBytes) -> String {
    let full = hex::encode(bytes);
    let trimmed = full.trim_start_matches('0');
    if trimmed.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{}", trimmed)
    }
}

pub fn felt_to_hex(value: &FieldElement) -> String {
    bytes_to_hex(&value.to_bytes_be())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_are_ordered() {
        // 2^251 < N < P
        assert!(ELEMENT_UPPER_BOUND < EC_ORDER);
        assert!(EC_ORDER < FIELD_PRIME);
    }

    #[test]
    fn test_is_nonzero_below() {
        let zero = [0u8; FIELD_BYTES];
        let mut one = [0u8; FIELD_BYTES];
        one[31] = 1;

        assert!(!is_nonzero_below(&zero, &EC_ORDER));
        assert!(is_nonzero_below(&one, &EC_ORDER));
        assert!(!is_nonzero_below(&EC_ORDER, &EC_ORDER));
    }

    #[test]
    fn test_field_element_from_bytes_rejects_prime() {
        let result = field_element_from_bytes(&FIELD_PRIME, "x");
        assert_eq!(result, Err(EncodingError::OutOfField { field: "x" }));

        let mut below = FIELD_PRIME;
        below[31] = 0x00;
        assert!(field_element_from_bytes(&below, "x").is_ok());
    }

    #[test]
    fn test_parse_hex_bytes_pads_odd_length() {
        let buf = parse_hex_bytes("0xabc", "key").unwrap();
        assert_eq!(buf[30], 0x0a);
        assert_eq!(buf[31], 0xbc);
        assert!(buf[..30].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_parse_hex_bytes_rejects_garbage() {
        assert!(parse_hex_bytes("0xzz", "key").is_err());
        assert!(parse_hex_bytes("0x", "key").is_err());
        let too_long = format!("0x{}", "1".repeat(65));
        assert!(parse_hex_bytes(&too_long, "key").is_err());
    }

    #[test]
    fn test_parse_hex_bytes_odd_length_matches_padded() {
        let odd = parse_hex_bytes("0x5", "key").unwrap();
        let padded = parse_hex_bytes("0x05", "key").unwrap();
        assert_eq!(odd, padded);

        let full = "0x66253bdeb3c1a235cf4376611e3a14474e2c00fd2fb225f9a388faae7fb095a";
        let buf = parse_hex_bytes(full, "key").unwrap();
        assert_eq!(buf[0], 0x06);
        assert_eq!(buf[31], 0x5a);
        assert_eq!(bytes_to_hex(&buf), full);
    }

    #[test]
    fn test_parse_hex_bytes_rejects_bad_leading_digit() {
        assert!(parse_hex_bytes("0xgab", "key").is_err());
        assert!(parse_hex_bytes("0xabg", "key").is_err());
        assert!(parse_hex_bytes("0xABCDEF", "key").is_ok());
    }

    #[test]
    fn test_bytes_to_hex_trims_leading_zeros() {
        let buf = parse_hex_bytes("0x0060bb", "r").unwrap();
        assert_eq!(bytes_to_hex(&buf), "0x60bb");
        assert_eq!(bytes_to_hex(&[0u8; FIELD_BYTES]), "0x0");
    }

    #[test]
    fn test_biguint_to_bytes_overflow() {
        let too_big = BigUint::from(1u8) << 256usize;
        assert!(biguint_to_bytes(&too_big, "y").is_err());
    }
}
