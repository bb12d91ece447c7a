//! Single-run lifecycle.

mod run;
mod state;

pub use run::{SessionRun, CANCELLED_MESSAGE, CONNECTION_LOST_MESSAGE};
pub use state::{RunOutcome, RunState, RunStatus, ToolCallStatus, ToolCallSummary};
