//! Configuration loader for YAML files

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::debug;

use crate::error::AppError;

use super::types::SignerConfig;

/// Load signer configuration from a YAML file
///
/// This function:
/// 1. Checks if the file exists
/// 2. Parses the YAML content
/// 3. Applies `SIGNER_*` environment overrides
/// 4. Validates the configuration rules
///
/// # Example
/// ```ignore
/// use std::path::Path;
/// use stark_price_signer::config::load_config;
///
/// let config = load_config(Path::new("config/signer.yaml"))?;
/// ```
pub fn load_config(path: &Path) -> Result<SignerConfig, AppError> {
    if !path.exists() {
        return Err(AppError::Config(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut config: SignerConfig = serde_yaml::from_reader(reader).map_err(|e| {
        AppError::Config(format!(
            "YAML parse error in '{}': {}",
            path.display(),
            e
        ))
    })?;

    config.apply_env_overrides();
    config.validate()?;

    debug!(path = %path.display(), oracle = %config.oracle_id, "Loaded signer config");
    Ok(config)
}

/// Load configuration from a YAML string, without environment overrides
pub fn load_config_from_str(yaml_content: &str) -> Result<SignerConfig, AppError> {
    let config: SignerConfig = serde_yaml::from_str(yaml_content)
        .map_err(|e| AppError::Config(format!("YAML parse error: {}", e)))?;

    config.validate()?;

    Ok(config)
}

// ============================================================================
// Tests
// ============================================================================
