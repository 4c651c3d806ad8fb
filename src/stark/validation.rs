//! Signature validation
//!
//! Structural problems (bad public key, out-of-range `r`/`s`, unencodable
//! inputs) are errors. Only a well-formed signature that fails the
//! verification equation yields `Ok(false)`.

use starknet_crypto::{verify, FieldElement, VerifyError};
use tracing::debug;

use crate::error::ValidateError;
use crate::stark::encoding::MessageInputs;
use crate::stark::field::{felt_to_hex, is_nonzero_below, FieldBytes, ELEMENT_UPPER_BOUND};
use crate::stark::keys::PublicKey;

/// Recompute the hash of `inputs` and check `(r, s)` against it
#[tracing::instrument(skip_all, fields(public_key = %public_key))]
pub fn validate_signature(
    inputs: &MessageInputs,
    public_key: &PublicKey,
    r: &FieldBytes,
    s: &FieldBytes,
) -> Result<bool, ValidateError> {
    let r = signature_component(r, "r")?;
    let s = signature_component(s, "s")?;
    let hash = inputs.encode()?.pedersen_hash();
    verify_hash(&hash, public_key, &r, &s)
}

/// Same as `validate_signature`, taking the public key as a raw buffer
pub fn validate_signature_bytes(
    inputs: &MessageInputs,
    public_key: &FieldBytes,
    r: &FieldBytes,
    s: &FieldBytes,
) -> Result<bool, ValidateError> {
    let public_key = PublicKey::from_bytes(public_key)?;
    validate_signature(inputs, &public_key, r, s)
}

/// Check a signature against a precomputed hash
pub fn verify_hash(
    hash: &FieldElement,
    public_key: &PublicKey,
    r: &FieldElement,
    s: &FieldElement,
) -> Result<bool, ValidateError> {
    let valid = verify(public_key.as_field_element(), hash, r, s).map_err(|e| match e {
        VerifyError::InvalidPublicKey => {
            ValidateError::InvalidPublicKey(format!("{} rejected by curve", public_key))
        }
        VerifyError::InvalidR => ValidateError::InvalidSignature("r out of range".to_string()),
        VerifyError::InvalidS => ValidateError::InvalidSignature("s out of range".to_string()),
        VerifyError::InvalidMessageHash => ValidateError::InternalError(format!(
            "message hash {} is outside the signable range",
            felt_to_hex(hash)
        )),
    })?;

    debug!(msg_hash = %felt_to_hex(hash), valid, "Verified signature");
    Ok(valid)
}

/// `r` and `s` must lie in `[1, 2^251)`, which is inside `[1, N-1]`
fn signature_component(bytes: &FieldBytes, name: &str) -> Result<FieldElement, ValidateError> {
    if !is_nonzero_below(bytes, &ELEMENT_UPPER_BOUND) {
        return Err(ValidateError::InvalidSignature(format!(
            "{} must be in [1, 2^251)",
            name
        )));
    }
    FieldElement::from_bytes_be(bytes)
        .map_err(|_| ValidateError::InvalidSignature(format!("{} is not a field element", name)))
}
