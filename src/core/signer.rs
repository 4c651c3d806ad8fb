//! Publisher-level signing and verification
//!
//! `StarkSigner` holds one oracle's key pair and turns price observations
//! into `SignedPrice` updates. `StarkVerifier` checks those updates from the
//! receiving side, starting from the external asset id rather than the raw
//! asset name.

use chrono::Utc;
use tracing::{debug, info};

use crate::config::SignerConfig;
use crate::core::logging::sanitize_signature;
use crate::core::types::{QuantizedPrice, SignatureType, SignedPrice, StarkSignature, TimestampedSignature};
use crate::error::{EncodingError, SignError, ValidateError};
use crate::stark::{
    decode_external_asset_id, encode_external_asset_id, hash_and_sign, validate_signature,
    MessageInputs, PrivateKey, PublicKey,
};

// ============================================================================
// Signer
// ============================================================================

/// Signs price updates on behalf of one oracle
#[derive(Debug)]
pub struct StarkSigner {
    private_key: PrivateKey,
    public_key: PublicKey,
    oracle_name: String,
}

impl StarkSigner {
    /// Derives the public key once; `oracle_name` must fit the 5-byte slot
    pub fn new(private_key: PrivateKey, oracle_name: impl Into<String>) -> Result<Self, SignError> {
        let oracle_name = oracle_name.into();
        crate::stark::encoding::oracle_name_int(&oracle_name)?;
        let public_key = private_key.public_key()?;

        info!(
            public_key = %public_key,
            oracle = %oracle_name,
            "Stark signer initialized"
        );

        Ok(Self {
            private_key,
            public_key,
            oracle_name,
        })
    }

    /// Build from a validated config
    pub fn from_config(config: &SignerConfig) -> Result<Self, SignError> {
        let private_key = PrivateKey::from_hex(config.stark_private_key.expose())?;
        Self::new(private_key, config.oracle_id.clone())
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn oracle_name(&self) -> &str {
        &self.oracle_name
    }

    /// Sign `(asset, price)` observed at `timestamp_ns`
    #[tracing::instrument(skip(self, quantized_price), fields(oracle = %self.oracle_name))]
    pub fn sign_publisher_price(
        &self,
        timestamp_ns: i64,
        asset: &str,
        quantized_price: &QuantizedPrice,
    ) -> Result<SignedPrice, SignError> {
        let external_asset_id = encode_external_asset_id(asset, &self.oracle_name)?;
        let inputs = MessageInputs::price(
            asset,
            quantized_price.clone(),
            timestamp_ns,
            self.oracle_name.clone(),
        );
        let attestation = hash_and_sign(&inputs, &self.private_key)?;
        let signature = StarkSignature::from_attestation(&attestation);

        debug!(
            external_asset_id = %external_asset_id,
            price = %quantized_price,
            r = %sanitize_signature(&signature.r),
            "Signed publisher price"
        );

        Ok(SignedPrice {
            publisher_key: self.public_key.to_hex(),
            external_asset_id,
            signature_type: SignatureType::Stark,
            quantized_price: quantized_price.clone(),
            timestamped_signature: TimestampedSignature {
                signature,
                timestamp: timestamp_ns,
                msg_hash: attestation.hash_hex(),
            },
        })
    }

    /// Sign with the current wall-clock time
    pub fn sign_now(&self, asset: &str, quantized_price: &QuantizedPrice) -> Result<SignedPrice, SignError> {
        self.sign_publisher_price(now_ns()?, asset, quantized_price)
    }
}

/// Current time in nanoseconds since the Unix epoch
pub fn now_ns() -> Result<i64, EncodingError> {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .ok_or(EncodingError::TimestampOutOfRange(now.timestamp()))
}

// ============================================================================
// Verifier
// ============================================================================

/// Verifies signed price updates received from publishers
#[derive(Debug, Default, Clone, Copy)]
pub struct StarkVerifier;

impl StarkVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Check one publisher signature
    ///
    /// The asset and oracle name are recovered from `external_asset_id`,
    /// which is rejected unless it is in canonical form.
    pub fn verify_publisher_price(
        &self,
        timestamp_ns: i64,
        external_asset_id: &str,
        quantized_price: &QuantizedPrice,
        publisher_key: &str,
        signature: &StarkSignature,
    ) -> Result<bool, ValidateError> {
        let public_key = PublicKey::from_hex(publisher_key)?;
        let (r, s) = signature.to_bytes()?;
        let (asset, oracle_name) = decode_external_asset_id(external_asset_id)?;
        let inputs = MessageInputs::price(asset, quantized_price.clone(), timestamp_ns, oracle_name);

        let valid = validate_signature(&inputs, &public_key, &r, &s)?;
        if !valid {
            debug!(
                external_asset_id,
                publisher_key,
                "Publisher signature did not verify"
            );
        }
        Ok(valid)
    }

    pub fn verify_signed_price(&self, update: &SignedPrice) -> Result<bool, ValidateError> {
        self.verify_publisher_price(
            update.timestamped_signature.timestamp,
            &update.external_asset_id,
            &update.quantized_price,
            &update.publisher_key,
            &update.timestamped_signature.signature,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PRIVATE_KEY: &str = "0x66253bdeb3c1a235cf4376611e3a14474e2c00fd2fb225f9a388faae7fb095a";
    const TEST_PUBLIC_KEY: &str = "0x418d3fd8219a2cf32a00d458f61802d17f01c5bcde5a4f82008ee4a7c8e9a06";
    const TEST_TIMESTAMP: i64 = 1708940577123456789;

    fn signer() -> StarkSigner {
        StarkSigner::new(PrivateKey::from_hex(TEST_PRIVATE_KEY).unwrap(), "czowx").unwrap()
    }

    #[test]
    fn test_sign_publisher_price_reference_vector() {
        let update = signer()
            .sign_publisher_price(
                TEST_TIMESTAMP,
                "DYDXUSD",
                &QuantizedPrice::new("3335950349880000000"),
            )
            .unwrap();

        assert_eq!(update.publisher_key, TEST_PUBLIC_KEY);
        assert_eq!(
            update.external_asset_id,
            "0x44594458555344000000000000000000637a6f7778"
        );
        assert_eq!(update.signature_type, SignatureType::Stark);
        assert_eq!(update.timestamped_signature.timestamp, TEST_TIMESTAMP);
        assert_eq!(
            update.timestamped_signature.msg_hash,
            "0x7cc1cf795d076cfff8b5920adb2dcc0d13813ed4519220a36d693e6084abe1c"
        );
        assert_eq!(
            update.timestamped_signature.signature,
            StarkSignature {
                r: "0x60bbbb4142bca69a5278ecccb59964e3449e43915b02e5c729b9752a16309ac".into(),
                s: "0x4cdbe54b985f6fb4495398f94554883ead7cbb983597dc7ea8b9e32dfe95c27".into(),
            }
        );
    }

    #[test]
    fn test_verify_signed_price_round_trip() {
        let update = signer()
            .sign_publisher_price(
                1700000000000000000,
                "BTC/USD",
                &QuantizedPrice::new("6500000000000"),
            )
            .unwrap();
        assert_eq!(StarkVerifier::new().verify_signed_price(&update), Ok(true));
    }

    #[test]
    fn test_verify_rejects_tampered_price() {
        let mut update = signer()
            .sign_publisher_price(TEST_TIMESTAMP, "DYDXUSD", &QuantizedPrice::new("3335950349880000000"))
            .unwrap();
        update.quantized_price = QuantizedPrice::new("3335950348880000000");
        assert_eq!(StarkVerifier::new().verify_signed_price(&update), Ok(false));
    }

    #[test]
    fn test_verify_rejects_other_publisher() {
        let update = signer()
            .sign_publisher_price(TEST_TIMESTAMP, "DYDXUSD", &QuantizedPrice::new("3335950349880000000"))
            .unwrap();
        let other = PrivateKey::from_hex("0x1234").unwrap().public_key().unwrap();

        let mut forged = update.clone();
        forged.publisher_key = other.to_hex();
        assert_eq!(StarkVerifier::new().verify_signed_price(&forged), Ok(false));
    }

    #[test]
    fn test_verify_same_second_timestamps_share_signature() {
        let update = signer()
            .sign_publisher_price(TEST_TIMESTAMP, "DYDXUSD", &QuantizedPrice::new("3335950349880000000"))
            .unwrap();
        let mut same_second = update.clone();
        same_second.timestamped_signature.timestamp = 1708940577000000000;
        assert_eq!(StarkVerifier::new().verify_signed_price(&same_second), Ok(true));
    }

    #[test]
    fn test_verify_malformed_external_asset_id() {
        let mut update = signer()
            .sign_publisher_price(TEST_TIMESTAMP, "DYDXUSD", &QuantizedPrice::new("3335950349880000000"))
            .unwrap();
        update.external_asset_id = "0x637a".into();
        assert!(matches!(
            StarkVerifier::new().verify_signed_price(&update),
            Err(ValidateError::InvalidInput(EncodingError::InvalidExternalAssetId(_)))
        ));
    }

    #[test]
    fn test_signer_rejects_long_oracle_name() {
        let key = PrivateKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        let result = StarkSigner::new(key, "storks");
        assert!(matches!(
            result,
            Err(SignError::InvalidInput(EncodingError::OracleNameLength(6)))
        ));
    }

    #[test]
    fn test_sign_now_uses_current_time() {
        let before = now_ns().unwrap();
        let update = signer().sign_now("ETHUSD", &QuantizedPrice::from(1_000_000u64)).unwrap();
        assert!(update.timestamped_signature.timestamp >= before);
        assert_eq!(StarkVerifier::new().verify_signed_price(&update), Ok(true));
    }
}
