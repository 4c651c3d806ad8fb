//! Signer configuration types
//!
//! `SignerConfig` is loaded from YAML, then environment variables override
//! individual fields, then `validate()` checks the result as a whole.

use std::fmt;

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::AppError;
use crate::stark::PrivateKey;

use super::constants;

// ============================================================================
// Environment Variables
// ============================================================================

pub const ENV_STARK_PRIVATE_KEY: &str = "SIGNER_STARK_PRIVATE_KEY";
pub const ENV_STARK_PUBLIC_KEY: &str = "SIGNER_STARK_PUBLIC_KEY";
pub const ENV_ORACLE_ID: &str = "SIGNER_ORACLE_ID";

/// Oracle ids occupy exactly this many bytes of the message
pub const ORACLE_ID_LEN: usize = 5;

// ============================================================================
// Secret wrapper
// ============================================================================

/// Hex-encoded secret; scrubbed on drop and never printed
#[derive(Clone, Default, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretHex(String);

impl SecretHex {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("REDACTED")
    }
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Settings for one oracle's signer
#[derive(Debug, Clone, Deserialize)]
pub struct SignerConfig {
    /// Oracle name embedded in every message (exactly 5 characters, e.g. "czowx")
    pub oracle_id: String,
    /// Stark private key, `0x`-prefixed hex
    #[serde(default)]
    pub stark_private_key: SecretHex,
    /// Stark public key, `0x`-prefixed hex; must match the private key
    #[serde(default)]
    pub stark_public_key: String,
    /// Deadline for handing a signed batch to the oracle client
    #[serde(default = "constants::push_timeout_ms")]
    pub push_timeout_ms: u64,
}

impl SignerConfig {
    /// Build entirely from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = Self {
            oracle_id: String::new(),
            stark_private_key: SecretHex::default(),
            stark_public_key: String::new(),
            push_timeout_ms: constants::push_timeout_ms(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Non-empty environment variables replace file values
    pub fn apply_env_overrides(&mut self) {
        if let Some(value) = non_empty_env(ENV_ORACLE_ID) {
            self.oracle_id = value;
        }
        if let Some(value) = non_empty_env(ENV_STARK_PRIVATE_KEY) {
            self.stark_private_key = SecretHex::new(value);
        }
        if let Some(value) = non_empty_env(ENV_STARK_PUBLIC_KEY) {
            self.stark_public_key = value;
        }
    }

    /// Validate signer configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        // Rule: oracle id is exactly 5 bytes with no NUL
        if self.oracle_id.len() != ORACLE_ID_LEN || self.oracle_id.contains('\0') {
            return Err(AppError::Config(format!(
                "oracle_id must be exactly {} characters (got '{}')",
                ORACLE_ID_LEN, self.oracle_id
            )));
        }

        // Rule: both keys are 0x-prefixed hex
        if !is_prefixed_hex(self.stark_private_key.expose()) {
            return Err(AppError::Config(
                "stark_private_key must be 0x-prefixed hex".to_string(),
            ));
        }
        if !is_prefixed_hex(&self.stark_public_key) {
            return Err(AppError::Config(format!(
                "stark_public_key must be 0x-prefixed hex (got '{}')",
                self.stark_public_key
            )));
        }

        // Rule: push timeout > 0
        if self.push_timeout_ms == 0 {
            return Err(AppError::Config(
                "push_timeout_ms must be > 0".to_string(),
            ));
        }

        // Rule: public key matches the one derived from the private key
        let private_key = PrivateKey::from_hex(self.stark_private_key.expose())
            .map_err(|e| AppError::Config(format!("stark_private_key: {}", e)))?;
        let derived = private_key
            .public_key()
            .map_err(|e| AppError::Config(format!("stark_private_key: {}", e)))?;
        let configured = crate::stark::PublicKey::from_hex(&self.stark_public_key)
            .map_err(|e| AppError::Config(format!("stark_public_key: {}", e)))?;
        if derived != configured {
            return Err(AppError::Config(format!(
                "stark_public_key {} does not match the private key (derived {})",
                configured, derived
            )));
        }

        Ok(())
    }

    pub fn push_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.push_timeout_ms)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn is_prefixed_hex(value: &str) -> bool {
    match value.strip_prefix("0x") {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

// ============================================================================
// Tests
// ============================================================================
