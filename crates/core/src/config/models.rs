//! Configuration models for `.dcc/config.toml`.
//!
//! ```toml
//! api_base_url = "http://127.0.0.1:8000/api"
//!
//! [monitor]
//! delegation_tool = "Task"
//! summary_max_chars = 500
//!
//! [pipeline]
//! max_parallel = 3
//!
//! [notifications]
//! label_max_chars = 25
//! ```

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Unified client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the collaborator API, without a trailing slash.
    pub api_base_url: String,
    pub monitor: MonitorConfig,
    pub pipeline: PipelineConfig,
    pub notifications: NotificationConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            monitor: MonitorConfig::default(),
            pipeline: PipelineConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

/// Settings of the task monitor engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Name of the tool whose invocations open a nesting level.
    pub delegation_tool: String,
    /// Maximum characters kept from a tool's input and output.
    pub summary_max_chars: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            delegation_tool: "Task".to_string(),
            summary_max_chars: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Steps the server may run concurrently when executing a pipeline.
    pub max_parallel: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { max_parallel: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Tab labels longer than this are shortened in notification text.
    pub label_max_chars: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            label_max_chars: 25,
        }
    }
}
