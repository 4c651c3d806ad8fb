//! `stark-signer` command line
//!
//! Signs and verifies price attestations with the configured Stark key.
//! Results are printed to stdout as JSON; logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::OsRng;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{error, info};

use stark_price_signer::config::{self, constants, SignerConfig};
use stark_price_signer::core::{
    init_logging, now_ns, quantize_price, QuantizedPrice, StarkSignature, StarkSigner,
    StarkVerifier,
};
use stark_price_signer::stark::PrivateKey;

#[derive(Parser)]
#[command(name = "stark-signer", version, about = "Stark price attestation signer")]
struct Cli {
    /// Signer config YAML (falls back to SIGNER_CONFIG_PATH, then SIGNER_* env vars)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Sign one price observation
    Sign {
        #[arg(long)]
        asset: String,
        /// Quantized price (decimal integer, 18 implied decimals)
        #[arg(long, conflicts_with = "decimal_price", required_unless_present = "decimal_price")]
        price: Option<QuantizedPrice>,
        /// Human-readable price, quantized before signing
        #[arg(long)]
        decimal_price: Option<Decimal>,
        /// Observation time; defaults to now
        #[arg(long)]
        timestamp_ns: Option<i64>,
    },
    /// Verify a publisher signature
    Verify {
        #[arg(long)]
        external_asset_id: String,
        #[arg(long)]
        price: QuantizedPrice,
        #[arg(long)]
        timestamp_ns: i64,
        #[arg(long)]
        public_key: String,
        #[arg(long)]
        r: String,
        #[arg(long)]
        s: String,
    },
    /// Print the public key of the configured private key
    PublicKey,
    /// Generate a fresh key pair
    Keygen,
}

fn load_signer_config(path: Option<&Path>) -> Result<SignerConfig> {
    if let Some(path) = path {
        return config::load_config(path).context("loading signer config");
    }
    let default_path = PathBuf::from(constants::default_config_path());
    if default_path.exists() {
        return config::load_config(&default_path).context("loading signer config");
    }
    SignerConfig::from_env().context("reading signer config from environment")
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.cmd {
        Cmd::Sign {
            asset,
            price,
            decimal_price,
            timestamp_ns,
        } => {
            let config = load_signer_config(cli.config.as_deref())?;
            let signer = StarkSigner::from_config(&config)?;
            let price = match (price, decimal_price) {
                (Some(price), _) => price,
                (None, Some(decimal)) => quantize_price(decimal)?,
                (None, None) => bail!("either --price or --decimal-price is required"),
            };
            let timestamp_ns = match timestamp_ns {
                Some(ts) => ts,
                None => now_ns()?,
            };

            let update = signer.sign_publisher_price(timestamp_ns, &asset, &price)?;
            info!(asset = %asset, external_asset_id = %update.external_asset_id, "Signed price");
            print_json(&serde_json::to_value(&update)?)
        }
        Cmd::Verify {
            external_asset_id,
            price,
            timestamp_ns,
            public_key,
            r,
            s,
        } => {
            let signature = StarkSignature { r, s };
            let valid = StarkVerifier::new().verify_publisher_price(
                timestamp_ns,
                &external_asset_id,
                &price,
                &public_key,
                &signature,
            )?;
            print_json(&json!({ "valid": valid }))?;
            if !valid {
                std::process::exit(2);
            }
            Ok(())
        }
        Cmd::PublicKey => {
            let config = load_signer_config(cli.config.as_deref())?;
            let signer = StarkSigner::from_config(&config)?;
            print_json(&json!({
                "oracle_id": signer.oracle_name(),
                "public_key": signer.public_key().to_hex(),
            }))
        }
        Cmd::Keygen => {
            let private_key = PrivateKey::random(&mut OsRng);
            let public_key = private_key.public_key()?;
            print_json(&json!({
                "stark_private_key": private_key.expose_hex(),
                "stark_public_key": public_key.to_hex(),
            }))
        }
    }
}

fn main() {
    // Load environment variables from .env file (if it exists)
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!(error = %format!("{:#}", e), "Command failed");
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
