//! Signer configuration and YAML loading
//!
//! This module provides:
//! - Configuration types (`SignerConfig`, `SecretHex`)
//! - YAML loading with environment overrides (`load_config`)
//! - Defaults with environment variable overrides

pub mod constants;
mod loader;
mod types;

// Re-export types
pub use types::{
    SecretHex, SignerConfig, ENV_ORACLE_ID, ENV_STARK_PRIVATE_KEY, ENV_STARK_PUBLIC_KEY,
    ORACLE_ID_LEN,
};

// Re-export loader functions
pub use loader::{load_config, load_config_from_str};
