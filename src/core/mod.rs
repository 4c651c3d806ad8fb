//! Publisher-facing layer over the Stark primitives
//!
//! This module contains:
//! - `types` - wire types for signed price updates
//! - `signer` - `StarkSigner` / `StarkVerifier`
//! - `quantize` - decimal to fixed-point price conversion
//! - `logging` - tracing subscriber setup and log sanitization

pub mod logging;
pub mod quantize;
pub mod signer;
pub mod types;

pub use logging::{init_logging, init_logging_with_config, sanitize_signature, LoggingConfig};
pub use quantize::{quantize_price, QUANTIZED_DECIMALS};
pub use signer::{now_ns, StarkSigner, StarkVerifier};
pub use types::{QuantizedPrice, SignatureType, SignedPrice, StarkSignature, TimestampedSignature};
