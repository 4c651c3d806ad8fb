//! Stark key pair types
//!
//! `PrivateKey` owns its scalar bytes and scrubs them on drop; it is never
//! printed. `PublicKey` is the x-coordinate of `private_key * G` and is only
//! constructed once it is known to have a point on the curve.

use std::fmt;

use rand::{CryptoRng, RngCore};
use starknet_crypto::{get_public_key, FieldElement};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{SignError, ValidateError};
use crate::stark::field::{
    bytes_to_hex, field_element_from_bytes, is_canonical, is_nonzero_below, parse_hex_bytes,
    FieldBytes, CURVE_BETA, EC_ORDER, FIELD_BYTES,
};

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    bytes: FieldBytes,
}

impl PrivateKey {
    /// Accepts only scalars in `[1, N-1]`
    pub fn from_bytes(bytes: &FieldBytes) -> Result<Self, SignError> {
        if !is_nonzero_below(bytes, &EC_ORDER) {
            return Err(SignError::InvalidKey(
                "private key must be in [1, curve_order - 1]".to_string(),
            ));
        }
        Ok(Self { bytes: *bytes })
    }

    pub fn from_hex(value: &str) -> Result<Self, SignError> {
        let mut bytes =
            parse_hex_bytes(value, "private key").map_err(|e| SignError::InvalidKey(e.to_string()))?;
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    /// Uniform key in `[1, N-1]` by rejection sampling 252-bit values
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; FIELD_BYTES];
        loop {
            rng.fill_bytes(&mut bytes);
            bytes[0] &= 0x0f;
            if is_nonzero_below(&bytes, &EC_ORDER) {
                let key = Self { bytes };
                bytes.zeroize();
                return key;
            }
        }
    }

    pub(crate) fn scalar(&self) -> Result<FieldElement, SignError> {
        FieldElement::from_bytes_be(&self.bytes)
            .map_err(|_| SignError::InternalError("private key scalar out of field".to_string()))
    }

    pub fn public_key(&self) -> Result<PublicKey, SignError> {
        Ok(PublicKey(get_public_key(&self.scalar()?)))
    }

    /// Hex form of the secret; only for writing freshly generated keys out
    pub fn expose_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(REDACTED)")
    }
}

#[derive(Clone, Copy, PartialEq)]
pub struct PublicKey(FieldElement);

impl PublicKey {
    pub fn from_bytes(bytes: &FieldBytes) -> Result<Self, ValidateError> {
        if !is_canonical(bytes) {
            return Err(ValidateError::InvalidPublicKey(
                "public key is not a field element".to_string(),
            ));
        }
        let x = field_element_from_bytes(bytes, "public key")
            .map_err(|e| ValidateError::InvalidPublicKey(e.to_string()))?;
        if !is_on_curve(&x)? {
            return Err(ValidateError::InvalidPublicKey(format!(
                "{} is not the x-coordinate of a curve point",
                bytes_to_hex(bytes)
            )));
        }
        Ok(Self(x))
    }

    pub fn from_hex(value: &str) -> Result<Self, ValidateError> {
        let bytes = parse_hex_bytes(value, "public key")
            .map_err(|e| ValidateError::InvalidPublicKey(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    pub fn as_field_element(&self) -> &FieldElement {
        &self.0
    }

    pub fn to_bytes(&self) -> FieldBytes {
        self.0.to_bytes_be()
    }

    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.to_bytes())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// y^2 = x^3 + x + beta has a solution for `x`
fn is_on_curve(x: &FieldElement) -> Result<bool, ValidateError> {
    let beta = FieldElement::from_bytes_be(&CURVE_BETA)
        .map_err(|_| ValidateError::InternalError("curve beta out of field".to_string()))?;
    let y_squared = *x * *x * *x + *x + beta;
    Ok(y_squared.sqrt().is_some())
}
