//! Pipeline and step models.
//!
//! A pipeline is an ordered set of steps with a shared lifecycle. Each step
//! may declare dependencies on other steps; ordering is enforced by the
//! server, clients only track the declared set.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Lifecycle status of a whole pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    #[default]
    Draft,
    Ready,
    Running,
    Paused,
    Completed,
    Failed,
}

impl PipelineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Ready => "ready",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a single step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl StepStatus {
    /// Completed, failed and skipped steps count toward progress.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Skipped)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pipeline as returned by the collaborator API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: String,
    #[serde(default)]
    pub workspace_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: PipelineStatus,
    #[serde(default)]
    pub total_cost: Option<f64>,
    #[serde(default)]
    pub total_duration_ms: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Pipeline {
    /// A draft pipeline with no workspace, cost or timestamps.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            workspace_id: None,
            name: name.into(),
            description: None,
            status: PipelineStatus::Draft,
            total_cost: None,
            total_duration_ms: None,
            created_at: None,
        }
    }
}

/// One step of a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStep {
    pub id: String,
    #[serde(default)]
    pub pipeline_id: Option<String>,
    pub position: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub skill: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub prompt_template: Option<String>,
    /// Ids of steps that must finish before this one starts.
    #[serde(default, deserialize_with = "null_as_default")]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub status: StepStatus,
    /// Run bound to this step once it has started.
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub output_summary: Option<String>,
}

impl PipelineStep {
    /// A pending step with no dependencies or routing.
    pub fn new(id: impl Into<String>, position: u32, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pipeline_id: None,
            position,
            name: name.into(),
            description: None,
            agent: None,
            skill: None,
            model: None,
            prompt_template: None,
            depends_on: Vec::new(),
            status: StepStatus::Pending,
            session_id: None,
            output_summary: None,
        }
    }
}

/// A pipeline together with its steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDetail {
    pub pipeline: Pipeline,
    #[serde(default)]
    pub steps: Vec<PipelineStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineListResponse {
    #[serde(default)]
    pub pipelines: Vec<Pipeline>,
}

/// Request body for creating an empty pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePipelineRequest {
    pub workspace_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePipelineResponse {
    pub pipeline_id: String,
}

/// Request body for generating a pipeline (and its steps) from a description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratePipelineRequest {
    pub workspace_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_number: Option<u32>,
}

/// A routing target a pipeline step can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRouteInfo {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentListResponse {
    #[serde(default)]
    pub agents: Vec<AgentRouteInfo>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_with_null_dependencies() {
        let json = r#"{"id":"s1","position":0,"name":"Plan","depends_on":null,"status":"skipped"}"#;
        let step: PipelineStep = serde_json::from_str(json).unwrap();
        assert!(step.depends_on.is_empty());
        assert_eq!(step.status, StepStatus::Skipped);
        assert!(step.status.is_terminal());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&PipelineStatus::Paused).unwrap(),
            r#""paused""#
        );
        let status: StepStatus = serde_json::from_str(r#""running""#).unwrap();
        assert_eq!(status, StepStatus::Running);
        assert!(!StepStatus::Pending.is_terminal());
    }
}
