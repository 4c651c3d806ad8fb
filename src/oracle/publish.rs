//! Sign-then-push flow
//!
//! Every observation in a batch is signed before anything is sent. If one
//! signature fails, nothing is broadcast.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::signer::StarkSigner;
use crate::core::types::{QuantizedPrice, SignedPrice};
use crate::error::SignError;

use super::client::{OracleClient, OracleError, TxResult};

/// One price to attest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub asset: String,
    pub quantized_price: QuantizedPrice,
    pub timestamp_ns: i64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("signing failed for '{asset}': {source}")]
    Signing {
        asset: String,
        #[source]
        source: SignError,
    },

    #[error("oracle client error: {0}")]
    Client(#[from] OracleError),

    #[error("oracle client timed out after {0:?}")]
    Timeout(Duration),

    #[error("wallet balance {balance} below minimum {minimum}")]
    LowBalance { balance: u128, minimum: u128 },
}

impl PublishError {
    /// Signing failures are deterministic and never retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            PublishError::Signing { .. } => false,
            PublishError::Client(e) => e.is_retryable(),
            PublishError::Timeout(_) => true,
            PublishError::LowBalance { .. } => false,
        }
    }
}

/// Outcome of one publish round
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Pushed(TxResult),
    /// Every update was at or behind the on-chain value
    UpToDate,
}

async fn with_timeout<T, F>(timeout: Duration, call: F) -> Result<T, PublishError>
where
    F: Future<Output = Result<T, OracleError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(PublishError::from),
        Err(_) => Err(PublishError::Timeout(timeout)),
    }
}

/// Sign every observation; fails on the first signing error
pub fn sign_batch(
    signer: &StarkSigner,
    observations: &[PriceObservation],
) -> Result<Vec<SignedPrice>, PublishError> {
    observations
        .iter()
        .map(|obs| {
            signer
                .sign_publisher_price(obs.timestamp_ns, &obs.asset, &obs.quantized_price)
                .map_err(|source| PublishError::Signing {
                    asset: obs.asset.clone(),
                    source,
                })
        })
        .collect()
}

/// Sign `observations`, drop those not newer than the chain, push the rest
///
/// Each client call is bounded by `timeout`.
#[tracing::instrument(skip_all, fields(oracle = %signer.oracle_name(), count = observations.len()))]
pub async fn publish_signed_price<C>(
    client: &C,
    signer: &StarkSigner,
    observations: &[PriceObservation],
    timeout: Duration,
) -> Result<PublishOutcome, PublishError>
where
    C: OracleClient + ?Sized,
{
    let signed = sign_batch(signer, observations)?;

    let mut fresh = Vec::with_capacity(signed.len());
    for update in signed {
        let latest = match with_timeout(timeout, client.get_latest_value(&update.external_asset_id)).await {
            Ok(value) => Some(value),
            Err(PublishError::Client(OracleError::AssetNotFound(_))) => None,
            Err(e) => return Err(e),
        };

        let timestamp = u64::try_from(update.timestamped_signature.timestamp).unwrap_or(0);
        match latest {
            Some(value) if value.timestamp_ns >= timestamp => {
                debug!(
                    external_asset_id = %update.external_asset_id,
                    on_chain_ns = value.timestamp_ns,
                    update_ns = timestamp,
                    "Skipping update not newer than on-chain value"
                );
            }
            _ => fresh.push(update),
        }
    }

    if fresh.is_empty() {
        return Ok(PublishOutcome::UpToDate);
    }

    let result = with_timeout(timeout, client.update_values(&fresh)).await;
    match &result {
        Ok(tx) => info!(tx_hash = %tx.tx_hash, updates = tx.updates, "Pushed signed prices"),
        Err(e) => warn!(error = %e, retryable = e.is_retryable(), "Push failed"),
    }
    result.map(PublishOutcome::Pushed)
}

/// Fail early when the paying wallet cannot cover another push
pub async fn ensure_wallet_balance<C>(
    client: &C,
    minimum: u128,
    timeout: Duration,
) -> Result<u128, PublishError>
where
    C: OracleClient + ?Sized,
{
    let balance = with_timeout(timeout, client.get_wallet_balance()).await?;
    if balance < minimum {
        warn!(balance, minimum, "Wallet balance below minimum");
        return Err(PublishError::LowBalance { balance, minimum });
    }
    Ok(balance)
}

// ============================================================================
// Tests
// ============================================================================
