//! Oracle client abstraction
//!
//! The signer never talks to a chain itself. Whatever pushes updates on-chain
//! implements `OracleClient`; `publish_signed_price` drives it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::SignedPrice;

/// Latest value stored on-chain for one asset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalNumericValue {
    pub timestamp_ns: u64,
    pub quantized_value: i128,
}

/// Receipt for a submitted batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResult {
    pub tx_hash: String,
    pub updates: usize,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// Connection, RPC or node failure; the same call may succeed later
    #[error("transport error: {0}")]
    Transport(String),

    /// The chain rejected the update (bad signature, stale value, unknown asset)
    #[error("update rejected: {0}")]
    Rejected(String),

    #[error("asset not found: {0}")]
    AssetNotFound(String),

    #[error("decode error: {0}")]
    Decode(String),
}

impl OracleError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, OracleError::Transport(_))
    }
}

/// Chain-side collaborator for pushing signed prices
#[async_trait]
pub trait OracleClient: Send + Sync {
    /// Latest stored value for `asset_id` (the external asset id)
    async fn get_latest_value(&self, asset_id: &str) -> Result<TemporalNumericValue, OracleError>;

    /// Submit a batch of signed updates in one transaction
    async fn update_values(&self, updates: &[SignedPrice]) -> Result<TxResult, OracleError>;

    /// Balance of the wallet paying for updates, in the chain's smallest unit
    async fn get_wallet_balance(&self) -> Result<u128, OracleError>;
}
