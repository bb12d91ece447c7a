//! Session (run) request and response models.
//!
//! These are the shapes exchanged with the collaborator API around runs:
//! creating a run, reading back its stored events, and reading back the
//! task tree recorded for it.

use serde::{Deserialize, Serialize};

/// Request body for creating a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub workspace_id: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl CreateSessionRequest {
    pub fn new(workspace_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            prompt: prompt.into(),
            skill: None,
            agent: None,
            model: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
}

/// An event as persisted by the server for a past run.
///
/// `data` holds the JSON text exactly as it was streamed; `event_type` is
/// the SSE event name it was streamed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    #[serde(default)]
    pub id: Option<i64>,
    pub session_id: String,
    pub seq: i64,
    pub event_type: String,
    pub data: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEventsResponse {
    #[serde(default)]
    pub events: Vec<StoredEvent>,
}

/// Lifecycle status of a monitored tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorTaskStatus {
    Running,
    Completed,
    Failed,
}

impl MonitorTaskStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// One tool invocation in a run's call tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorTask {
    /// Locally generated id (`mt_<n>`).
    pub id: String,
    #[serde(default)]
    pub session_id: Option<String>,
    /// Correlation id shared by the Start/Result/End events of this call.
    pub tool_call_id: String,
    pub tool_name: String,
    /// Task that was the innermost open delegation when this one started.
    pub parent_id: Option<String>,
    pub depth: usize,
    pub status: MonitorTaskStatus,
    pub description: String,
    #[serde(default)]
    pub subagent_type: Option<String>,
    #[serde(default)]
    pub subagent_model: Option<String>,
    #[serde(default)]
    pub input_summary: Option<String>,
    #[serde(default)]
    pub output_summary: Option<String>,
    pub started_at: String,
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorTasksResponse {
    #[serde(default)]
    pub tasks: Vec<MonitorTask>,
}
