//! Pipeline event taxonomy.
//!
//! Emitted while a pipeline executes. Step events carry the id of the step's
//! own run in `session_id`; run-level events use the pipeline id there.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One event of a pipeline execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(flatten)]
    pub kind: PipelineEventKind,
}

impl PipelineEvent {
    /// Build an event for `pipeline_id` with no session or timestamp.
    pub fn new(pipeline_id: impl Into<String>, kind: PipelineEventKind) -> Self {
        Self {
            session_id: None,
            pipeline_id: Some(pipeline_id.into()),
            timestamp: None,
            kind,
        }
    }

    pub fn event_type(&self) -> PipelineEventType {
        self.kind.event_type()
    }

    /// Whether this event ends the pipeline execution.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            PipelineEventKind::PipelineCompleted(_) | PipelineEventKind::PipelineFailed(_)
        )
    }
}

/// Variant payloads of a [`PipelineEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PipelineEventKind {
    PipelineStarted {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        steps_total: Option<u32>,
    },

    PipelineStepStarted(StepRef),

    PipelineStepCompleted {
        #[serde(flatten)]
        step: StepRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cost_usd: Option<f64>,
    },

    PipelineStepFailed {
        #[serde(flatten)]
        step: StepRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    PipelineCompleted(PipelineSummary),

    PipelineFailed(PipelineSummary),
}

impl PipelineEventKind {
    pub fn event_type(&self) -> PipelineEventType {
        match self {
            Self::PipelineStarted { .. } => PipelineEventType::PipelineStarted,
            Self::PipelineStepStarted(_) => PipelineEventType::PipelineStepStarted,
            Self::PipelineStepCompleted { .. } => PipelineEventType::PipelineStepCompleted,
            Self::PipelineStepFailed { .. } => PipelineEventType::PipelineStepFailed,
            Self::PipelineCompleted(_) => PipelineEventType::PipelineCompleted,
            Self::PipelineFailed(_) => PipelineEventType::PipelineFailed,
        }
    }
}

/// Identifies the step a step event refers to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_agent: Option<String>,
}

impl StepRef {
    pub fn id(step_id: impl Into<String>) -> Self {
        Self {
            step_id: Some(step_id.into()),
            ..Self::default()
        }
    }
}

/// Aggregates carried by the terminal pipeline events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps_completed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps_total: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Names of the pipeline event types, as used for SSE event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineEventType {
    PipelineStarted,
    PipelineStepStarted,
    PipelineStepCompleted,
    PipelineStepFailed,
    PipelineCompleted,
    PipelineFailed,
}

impl PipelineEventType {
    pub const ALL: [PipelineEventType; 6] = [
        Self::PipelineStarted,
        Self::PipelineStepStarted,
        Self::PipelineStepCompleted,
        Self::PipelineStepFailed,
        Self::PipelineCompleted,
        Self::PipelineFailed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PipelineStarted => "PipelineStarted",
            Self::PipelineStepStarted => "PipelineStepStarted",
            Self::PipelineStepCompleted => "PipelineStepCompleted",
            Self::PipelineStepFailed => "PipelineStepFailed",
            Self::PipelineCompleted => "PipelineCompleted",
            Self::PipelineFailed => "PipelineFailed",
        }
    }
}

impl fmt::Display for PipelineEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown pipeline event type: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_completed_reads_flat_step_fields() {
        let json = r#"{
            "type": "PipelineStepCompleted",
            "session_id": "run-7",
            "pipeline_id": "p1",
            "step_id": "st2",
            "step_name": "Write tests",
            "step_position": 2,
            "cost_usd": 0.5
        }"#;

        let event: PipelineEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.pipeline_id.as_deref(), Some("p1"));
        match event.kind {
            PipelineEventKind::PipelineStepCompleted { step, cost_usd } => {
                assert_eq!(step.step_id.as_deref(), Some("st2"));
                assert_eq!(step.step_position, Some(2));
                assert_eq!(cost_usd, Some(0.5));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_terminal_summary() {
        let json = r#"{"type":"PipelineFailed","pipeline_id":"p1","steps_completed":2,"steps_total":4,"duration_ms":1200}"#;
        let event: PipelineEvent = serde_json::from_str(json).unwrap();

        assert!(event.is_terminal());
        let PipelineEventKind::PipelineFailed(summary) = event.kind else {
            panic!("expected PipelineFailed");
        };
        assert_eq!(summary.steps_completed, Some(2));
        assert_eq!(summary.duration_ms, Some(1200));
        assert_eq!(summary.cost_usd, None);
    }

    #[test]
    fn test_pipeline_event_type_names() {
        for t in PipelineEventType::ALL {
            assert_eq!(t.to_string().parse::<PipelineEventType>().unwrap(), t);
        }
        assert!("RunStarted".parse::<PipelineEventType>().is_err());
    }
}
