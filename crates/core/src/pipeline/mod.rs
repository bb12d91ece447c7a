//! Pipeline progress tracking.

mod tracker;

pub use tracker::{PipelineState, PipelineTracker, PIPELINE_CONNECTION_LOST_MESSAGE};
