//! Client configuration loading and management.
//!
//! Settings live in `.dcc/config.toml` under a project root. Every key is
//! optional; missing keys fall back to the documented defaults.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::{apply_env_overrides, load_config};
pub use models::{ClientConfig, MonitorConfig, NotificationConfig, PipelineConfig};
