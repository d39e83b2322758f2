//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.parley/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub log_file: Option<String>,
    pub placeholder: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub url: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_LOG_FILE: &str = "parley.log";
pub const DEFAULT_PLACEHOLDER: &str = "What's the weather in San Francisco?";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub backend_url: String,
    pub log_file: String,
    pub placeholder: String,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.parley/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".parley").join("config.toml"))
}

/// Load config from `~/.parley/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `ParleyConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<ParleyConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(ParleyConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(ParleyConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: ParleyConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# Parley Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [backend]
# url = "http://localhost:8000"        # Or set PARLEY_BACKEND_URL env var

# [general]
# log_file = "parley.log"
# placeholder = "What's the weather in San Francisco?"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_backend_url` and `cli_log_file` are from CLI flags (None = not specified).
pub fn resolve(
    config: &ParleyConfig,
    cli_backend_url: Option<&str>,
    cli_log_file: Option<&str>,
) -> ResolvedConfig {
    // Backend URL: CLI → env → config → default
    let backend_url = cli_backend_url
        .map(|s| s.to_string())
        .or_else(|| std::env::var("PARLEY_BACKEND_URL").ok())
        .or_else(|| config.backend.url.clone())
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

    // Log file: CLI → config → default
    let log_file = cli_log_file
        .map(|s| s.to_string())
        .or_else(|| config.general.log_file.clone())
        .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());

    let placeholder = config
        .general
        .placeholder
        .clone()
        .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string());

    ResolvedConfig {
        backend_url,
        log_file,
        placeholder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = ParleyConfig::default();
        assert!(config.backend.url.is_none());
        assert!(config.general.log_file.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let config = ParleyConfig::default();
        let resolved = resolve(&config, None, None);
        assert_eq!(resolved.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(resolved.log_file, DEFAULT_LOG_FILE);
        assert_eq!(resolved.placeholder, DEFAULT_PLACEHOLDER);
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = ParleyConfig {
            general: GeneralConfig {
                log_file: Some("custom.log".to_string()),
                placeholder: Some("Ask me anything".to_string()),
            },
            backend: BackendConfig {
                url: Some("http://10.0.0.2:9000".to_string()),
            },
        };
        let resolved = resolve(&config, None, None);
        assert_eq!(resolved.backend_url, "http://10.0.0.2:9000");
        assert_eq!(resolved.log_file, "custom.log");
        assert_eq!(resolved.placeholder, "Ask me anything");
    }

    #[test]
    fn test_resolve_cli_flags_win() {
        let config = ParleyConfig {
            backend: BackendConfig {
                url: Some("http://from-config:8000".to_string()),
            },
            ..Default::default()
        };
        let resolved = resolve(&config, Some("http://from-cli:8000"), Some("cli.log"));
        assert_eq!(resolved.backend_url, "http://from-cli:8000");
        assert_eq!(resolved.log_file, "cli.log");
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[backend]
url = "http://192.168.1.100:8000"

[general]
log_file = "debug.log"
"#;
        let config: ParleyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.backend.url.as_deref(),
            Some("http://192.168.1.100:8000")
        );
        assert_eq!(config.general.log_file.as_deref(), Some("debug.log"));
        assert!(config.general.placeholder.is_none());
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing, everything else stays default
        let toml_str = r#"
[general]
placeholder = "Say hi"
"#;
        let config: ParleyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.placeholder.as_deref(), Some("Say hi"));
        assert!(config.backend.url.is_none());
    }
}
