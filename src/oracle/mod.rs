//! Oracle collaborator: chain client trait and the sign-then-push flow

pub mod client;
pub mod publish;

pub use client::{OracleClient, OracleError, TemporalNumericValue, TxResult};
pub use publish::{
    ensure_wallet_balance, publish_signed_price, sign_batch, PriceObservation, PublishError,
    PublishOutcome,
};
