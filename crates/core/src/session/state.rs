//! Observable state of one run.

/// Run lifecycle: `Idle -> Running -> Completed | Error`.
///
/// Cancellation also ends in `Error`, with [`CANCELLED_MESSAGE`] as the
/// error text.
///
/// [`CANCELLED_MESSAGE`]: crate::session::CANCELLED_MESSAGE
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Error,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

/// How a run ended, as reported to whoever owns the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolCallStatus {
    Running,
    Completed,
    Error,
}

/// Flat summary of one tool call, independent of the monitor's tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallSummary {
    pub id: String,
    pub name: String,
    pub input: String,
    pub result: Option<String>,
    pub is_error: bool,
    pub status: ToolCallStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunState {
    pub status: RunStatus,
    pub session_id: Option<String>,
    /// Streamed text fragments, in arrival order.
    pub output_chunks: Vec<String>,
    pub tool_calls: Vec<ToolCallSummary>,
    pub cost_usd: Option<f64>,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub cache_read_tokens: Option<u64>,
    pub cache_write_tokens: Option<u64>,
    pub model: Option<String>,
    pub num_turns: Option<u32>,
    pub duration_ms: Option<u64>,
    pub error: Option<String>,
    /// Payloads discarded because they failed validation.
    pub dropped_events: u64,
}

impl RunState {
    pub fn full_output(&self) -> String {
        self.output_chunks.concat()
    }

    /// Input plus output tokens; absent counts are 0.
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.unwrap_or(0) + self.output_tokens.unwrap_or(0)
    }

    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }
}
