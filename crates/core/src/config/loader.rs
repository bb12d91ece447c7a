//! Configuration file loader for the `.dcc/` directory.
//!
//! Only `config.toml` is read. A missing directory or file is not an error:
//! the defaults from [`ClientConfig::default`] apply.

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::ClientConfig;
use std::path::Path;

/// Environment variable that overrides `api_base_url`.
pub const API_URL_ENV: &str = "DCC_API_URL";

/// Allowed range for `pipeline.max_parallel`, as accepted by the server.
const MAX_PARALLEL_RANGE: std::ops::RangeInclusive<u32> = 1..=10;

/// Loads client configuration from `<root>/.dcc/config.toml`.
///
/// # Arguments
///
/// * `root` - Root directory containing the `.dcc/` folder
///
/// # Returns
///
/// The parsed and validated `ClientConfig`, or the default configuration
/// when no config file exists.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file exists but cannot be read
/// - The file is not valid TOML for `ClientConfig`
/// - A value is out of range (empty delegation tool, zero summary length,
///   `max_parallel` outside 1..=10)
///
/// # Example
///
/// ```rust,no_run
/// use dcc_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("API at {}", config.api_base_url);
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path) -> ConfigResult<ClientConfig> {
    let config_path = root.join(".dcc").join("config.toml");

    if !config_path.exists() {
        return Ok(ClientConfig::default());
    }

    let content = tokio::fs::read_to_string(&config_path)
        .await
        .map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    let mut config: ClientConfig =
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: config_path.clone(),
            source,
        })?;

    config.api_base_url = config.api_base_url.trim_end_matches('/').to_string();
    validate(&config, &config_path)?;

    Ok(config)
}

/// Applies environment overrides on top of a loaded configuration.
///
/// `DCC_API_URL`, when set and non-empty, replaces `api_base_url`.
pub fn apply_env_overrides(config: &mut ClientConfig) {
    if let Ok(url) = std::env::var(API_URL_ENV) {
        let url = url.trim();
        if !url.is_empty() {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
    }
}

fn validate(config: &ClientConfig, path: &Path) -> ConfigResult<()> {
    let invalid = |reason: String| ConfigError::InvalidConfig {
        path: path.to_path_buf(),
        reason,
    };

    if config.api_base_url.is_empty() {
        return Err(invalid("api_base_url must not be empty".to_string()));
    }
    if config.monitor.delegation_tool.trim().is_empty() {
        return Err(invalid("monitor.delegation_tool must not be empty".to_string()));
    }
    if config.monitor.summary_max_chars == 0 {
        return Err(invalid("monitor.summary_max_chars must be positive".to_string()));
    }
    if !MAX_PARALLEL_RANGE.contains(&config.pipeline.max_parallel) {
        return Err(invalid(format!(
            "pipeline.max_parallel must be within {}..={}, got {}",
            MAX_PARALLEL_RANGE.start(),
            MAX_PARALLEL_RANGE.end(),
            config.pipeline.max_parallel
        )));
    }
    Ok(())
}
