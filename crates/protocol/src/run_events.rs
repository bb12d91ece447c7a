//! Run event taxonomy.
//!
//! A run is one agent execution against a prompt. The server reports its
//! lifecycle as a flat stream of `RunEvent`s, each one a JSON object whose
//! `type` field selects the variant:
//!
//! ```json
//! {
//!   "type": "ToolCallStart",
//!   "session_id": "s-1",
//!   "tool_call_id": "t1",
//!   "tool_name": "Bash",
//!   "tool_input": "{\"command\":\"ls -la\"}"
//! }
//! ```
//!
//! Absent fields are omitted on the wire, so every variant field is optional.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One event of a run, as delivered by the event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    /// Run (session) this event belongs to.
    pub session_id: String,

    /// Server-side emission time, when supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Variant-specific payload.
    #[serde(flatten)]
    pub kind: RunEventKind,
}

impl RunEvent {
    /// Build an event for `session_id` with no timestamp.
    pub fn new(session_id: impl Into<String>, kind: RunEventKind) -> Self {
        Self {
            session_id: session_id.into(),
            timestamp: None,
            kind,
        }
    }

    /// The discriminator of this event.
    pub fn event_type(&self) -> RunEventType {
        self.kind.event_type()
    }

    /// Whether this event ends the run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            RunEventKind::RunFinished(_) | RunEventKind::RunError { .. }
        )
    }
}

/// Variant payloads of a [`RunEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunEventKind {
    RunStarted {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cli_session_id: Option<String>,
    },

    /// The run ended successfully; carries the final usage metrics.
    RunFinished(RunUsage),

    RunError {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cost_usd: Option<f64>,
    },

    TextMessageStart {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        role: Option<String>,
    },

    /// A fragment of streamed assistant text.
    TextMessageContent {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },

    TextMessageEnd {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message_id: Option<String>,
    },

    /// A tool invocation began. `tool_input` is the raw JSON text of its arguments.
    ToolCallStart {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_call_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_input: Option<String>,
    },

    ToolCallEnd {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_call_id: Option<String>,
    },

    ToolCallResult {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_call_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_result: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_is_error: Option<bool>,
    },

    StateSnapshot {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        state: Option<serde_json::Map<String, serde_json::Value>>,
    },

    Custom {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        custom_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<serde_json::Value>,
    },
}

impl RunEventKind {
    /// The discriminator of this payload.
    pub fn event_type(&self) -> RunEventType {
        match self {
            Self::RunStarted { .. } => RunEventType::RunStarted,
            Self::RunFinished(_) => RunEventType::RunFinished,
            Self::RunError { .. } => RunEventType::RunError,
            Self::TextMessageStart { .. } => RunEventType::TextMessageStart,
            Self::TextMessageContent { .. } => RunEventType::TextMessageContent,
            Self::TextMessageEnd { .. } => RunEventType::TextMessageEnd,
            Self::ToolCallStart { .. } => RunEventType::ToolCallStart,
            Self::ToolCallEnd { .. } => RunEventType::ToolCallEnd,
            Self::ToolCallResult { .. } => RunEventType::ToolCallResult,
            Self::StateSnapshot { .. } => RunEventType::StateSnapshot,
            Self::Custom { .. } => RunEventType::Custom,
        }
    }
}

/// Final usage metrics reported by `RunFinished`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_write_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_turns: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_session_id: Option<String>,
}

/// Names of the run event types, as used for SSE event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunEventType {
    RunStarted,
    RunFinished,
    RunError,
    TextMessageStart,
    TextMessageContent,
    TextMessageEnd,
    ToolCallStart,
    ToolCallEnd,
    ToolCallResult,
    StateSnapshot,
    Custom,
}

impl RunEventType {
    /// Every member of the taxonomy.
    pub const ALL: [RunEventType; 11] = [
        Self::RunStarted,
        Self::RunFinished,
        Self::RunError,
        Self::TextMessageStart,
        Self::TextMessageContent,
        Self::TextMessageEnd,
        Self::ToolCallStart,
        Self::ToolCallEnd,
        Self::ToolCallResult,
        Self::StateSnapshot,
        Self::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RunStarted => "RunStarted",
            Self::RunFinished => "RunFinished",
            Self::RunError => "RunError",
            Self::TextMessageStart => "TextMessageStart",
            Self::TextMessageContent => "TextMessageContent",
            Self::TextMessageEnd => "TextMessageEnd",
            Self::ToolCallStart => "ToolCallStart",
            Self::ToolCallEnd => "ToolCallEnd",
            Self::ToolCallResult => "ToolCallResult",
            Self::StateSnapshot => "StateSnapshot",
            Self::Custom => "Custom",
        }
    }
}

impl fmt::Display for RunEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown run event type: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_call_start_from_flat_json() {
        let json = r#"{
            "type": "ToolCallStart",
            "session_id": "s-1",
            "timestamp": "2025-01-01T00:00:00Z",
            "tool_call_id": "t1",
            "tool_name": "Bash",
            "tool_input": "{\"command\":\"ls -la\"}"
        }"#;

        let event: RunEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.session_id, "s-1");
        assert_eq!(event.event_type(), RunEventType::ToolCallStart);
        match event.kind {
            RunEventKind::ToolCallStart {
                tool_call_id,
                tool_name,
                tool_input,
            } => {
                assert_eq!(tool_call_id.as_deref(), Some("t1"));
                assert_eq!(tool_name.as_deref(), Some("Bash"));
                assert_eq!(tool_input.as_deref(), Some(r#"{"command":"ls -la"}"#));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_run_finished_usage_is_flat() {
        let json = r#"{"type":"RunFinished","session_id":"s","cost_usd":0.002,"input_tokens":10,"output_tokens":4}"#;
        let event: RunEvent = serde_json::from_str(json).unwrap();

        let RunEventKind::RunFinished(usage) = &event.kind else {
            panic!("expected RunFinished, got {:?}", event.kind);
        };
        assert_eq!(usage.cost_usd, Some(0.002));
        assert_eq!(usage.input_tokens, Some(10));
        assert_eq!(usage.output_tokens, Some(4));
        assert_eq!(usage.num_turns, None);
        assert!(event.is_terminal());
    }

    #[test]
    fn test_unknown_extra_fields_are_ignored() {
        let json = r#"{"type":"RunStarted","session_id":"s","model":"sonnet","role":"assistant"}"#;
        let event: RunEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(
            event.kind,
            RunEventKind::RunStarted { model: Some(ref m), .. } if m == "sonnet"
        ));
    }

    #[test]
    fn test_event_type_names_parse_back() {
        for t in RunEventType::ALL {
            assert_eq!(t.as_str().parse::<RunEventType>().unwrap(), t);
        }
        assert!("PipelineStarted".parse::<RunEventType>().is_err());
    }
}
