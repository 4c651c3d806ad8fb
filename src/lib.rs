//! Stark price signer
//!
//! Attests price observations for on-chain oracles:
//! - Encoding of `(asset, price, timestamp, oracle)` into two field elements
//! - Pedersen hash + Stark ECDSA signing and validation
//! - Publisher-level signer / verifier producing wire-ready updates
//! - C ABI for non-Rust publishers

pub mod config;
pub mod core;
pub mod error;
pub mod ffi;
pub mod oracle;
pub mod stark;

pub use error::AppError;
