//! Hash-and-sign
//!
//! Pedersen-hashes the encoded message and signs it with Stark ECDSA. The
//! nonce is derived with RFC6979 from `(private_key, hash)`, so signing is
//! deterministic and needs no random source. When a derived nonce is
//! rejected by the curve arithmetic, derivation is repeated with an
//! incremented seed, the same way starknet's reference signer does.

use starknet_crypto::{rfc6979_generate_k, sign, FieldElement, SignError as CurveSignError};
use tracing::debug;

use crate::core::logging::sanitize_signature;
use crate::error::SignError;
use crate::stark::encoding::MessageInputs;
use crate::stark::field::{felt_to_hex, FieldBytes};
use crate::stark::keys::PrivateKey;

/// Bound on nonce re-derivation attempts
const MAX_NONCE_ATTEMPTS: u32 = 64;

/// Result of `hash_and_sign`: the Pedersen hash and the signature over it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attestation {
    pub hash: FieldElement,
    pub r: FieldElement,
    pub s: FieldElement,
}

impl Attestation {
    pub fn hash_bytes(&self) -> FieldBytes {
        self.hash.to_bytes_be()
    }

    pub fn r_bytes(&self) -> FieldBytes {
        self.r.to_bytes_be()
    }

    pub fn s_bytes(&self) -> FieldBytes {
        self.s.to_bytes_be()
    }

    pub fn hash_hex(&self) -> String {
        felt_to_hex(&self.hash)
    }
}

/// Encode, hash and sign `inputs` with `private_key`
#[tracing::instrument(skip_all)]
pub fn hash_and_sign(inputs: &MessageInputs, private_key: &PrivateKey) -> Result<Attestation, SignError> {
    let message = inputs.encode()?;
    let hash = message.pedersen_hash();
    let (r, s) = sign_hash(&hash, private_key)?;

    let attestation = Attestation { hash, r, s };
    debug!(
        msg_hash = %attestation.hash_hex(),
        r = %sanitize_signature(&felt_to_hex(&r)),
        "Signed message hash"
    );
    Ok(attestation)
}

/// Sign a precomputed hash; returns `(r, s)`
pub fn sign_hash(
    hash: &FieldElement,
    private_key: &PrivateKey,
) -> Result<(FieldElement, FieldElement), SignError> {
    let scalar = private_key.scalar()?;
    let mut seed: Option<FieldElement> = None;

    for _ in 0..MAX_NONCE_ATTEMPTS {
        let k = rfc6979_generate_k(hash, &scalar, seed.as_ref());
        match sign(&scalar, hash, &k) {
            Ok(signature) => return Ok((signature.r, signature.s)),
            Err(CurveSignError::InvalidK) => {
                seed = Some(seed.unwrap_or(FieldElement::ZERO) + FieldElement::ONE);
            }
            Err(CurveSignError::InvalidMessageHash) => {
                return Err(SignError::InternalError(format!(
                    "message hash {} is outside the signable range",
                    felt_to_hex(hash)
                )));
            }
        }
    }

    Err(SignError::InternalError(format!(
        "no valid nonce after {} attempts",
        MAX_NONCE_ATTEMPTS
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::QuantizedPrice;
    use crate::error::EncodingError;

    const TEST_PRIVATE_KEY: &str = "0x66253bdeb3c1a235cf4376611e3a14474e2c00fd2fb225f9a388faae7fb095a";

    fn dydx_inputs() -> MessageInputs {
        MessageInputs::price(
            "DYDXUSD",
            QuantizedPrice::new("3335950349880000000"),
            1708940577123456789,
            "czowx",
        )
    }

    #[test]
    fn test_hash_and_sign_reference_vector() {
        let key = PrivateKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        let attestation = hash_and_sign(&dydx_inputs(), &key).unwrap();

        assert_eq!(
            attestation.hash_hex(),
            "0x7cc1cf795d076cfff8b5920adb2dcc0d13813ed4519220a36d693e6084abe1c"
        );
        assert_eq!(
            felt_to_hex(&attestation.r),
            "0x60bbbb4142bca69a5278ecccb59964e3449e43915b02e5c729b9752a16309ac"
        );
        assert_eq!(
            felt_to_hex(&attestation.s),
            "0x4cdbe54b985f6fb4495398f94554883ead7cbb983597dc7ea8b9e32dfe95c27"
        );
    }

    #[test]
    fn test_hash_and_sign_is_deterministic() {
        let key = PrivateKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        let first = hash_and_sign(&dydx_inputs(), &key).unwrap();
        let second = hash_and_sign(&dydx_inputs(), &key).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_distinct_messages_use_distinct_nonces() {
        let key = PrivateKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        let a = hash_and_sign(&dydx_inputs(), &key).unwrap();
        let b = hash_and_sign(
            &MessageInputs::price(
                "DYDXUSD",
                QuantizedPrice::new("3335950349880000001"),
                1708940577123456789,
                "czowx",
            ),
            &key,
        )
        .unwrap();
        // r is the x-coordinate of k*G; equal r would mean a reused nonce
        assert_ne!(a.r, b.r);
    }

    #[test]
    fn test_hash_and_sign_reports_encoding_failure() {
        let key = PrivateKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        let inputs = MessageInputs::price("", QuantizedPrice::new("1"), 0, "czowx");
        let result = hash_and_sign(&inputs, &key);
        assert_eq!(result, Err(SignError::InvalidInput(EncodingError::EmptyAsset)));
    }
}
