//! Configuration defaults
//!
//! Values can be overridden via environment variables.

// =============================================================================
// Oracle Push
// =============================================================================

/// Deadline for one `update_values` call (default: 2000ms)
///
/// Environment variable: `PUSH_TIMEOUT_MS`
pub fn push_timeout_ms() -> u64 {
    std::env::var("PUSH_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|ms| *ms > 0)
        .unwrap_or(2000)
}

// =============================================================================
// Paths
// =============================================================================

/// Config file used by the CLI when `--config` is not given and the file exists
///
/// Environment variable: `SIGNER_CONFIG_PATH`
pub fn default_config_path() -> String {
    std::env::var("SIGNER_CONFIG_PATH").unwrap_or_else(|_| "config/signer.yaml".to_string())
}
