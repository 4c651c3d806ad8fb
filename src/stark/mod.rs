//! Stark curve attestation core
//!
//! Encodes price observations into field elements, Pedersen-hashes them and
//! signs / validates with Stark ECDSA.
//!
//! This module is organized into submodules:
//! - `field` - 32-byte buffers, curve constants, range checks
//! - `encoding` - message inputs and the `(x, y)` layout
//! - `keys` - private / public key types
//! - `signing` - `hash_and_sign`
//! - `validation` - `validate_signature`

pub mod encoding;
pub mod field;
pub mod keys;
pub mod signing;
pub mod validation;

pub use encoding::{
    decode_external_asset_id, encode_external_asset_id, EncodedMessage, MessageInputs,
    PriceMessage,
};
pub use field::{FieldBytes, FIELD_BYTES};
pub use keys::{PrivateKey, PublicKey};
pub use signing::{hash_and_sign, sign_hash, Attestation};
pub use validation::{validate_signature, validate_signature_bytes, verify_hash};
