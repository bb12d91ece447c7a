//! # dcc-protocol
//!
//! Event taxonomies and wire models shared by every dcc-kit crate.
//!
//! This crate defines:
//! - The run event taxonomy streamed while an agent run executes
//! - The pipeline event taxonomy streamed while a pipeline executes
//! - Request/response models of the collaborator API
//! - Structural validation of named stream frames
//!
//! ## Modules
//!
//! - [`run_events`]: `RunEvent` and its variants
//! - [`pipeline_events`]: `PipelineEvent` and its variants
//! - [`session_models`]: Run creation, stored events, monitor tasks
//! - [`pipeline_models`]: Pipelines, steps, statuses, routing targets
//! - [`wire`]: Frame decoding and `DecodeError`
//!
//! ## Design Principles
//!
//! - Pure data: no I/O, no runtime dependencies
//! - Every field the server may omit is optional, so partial payloads decode
//! - Independent compilation: no dependencies on other dcc-kit crates

pub mod pipeline_events;
pub mod pipeline_models;
pub mod run_events;
pub mod session_models;
pub mod wire;

// Re-export all public types for convenience
pub use pipeline_events::*;
pub use pipeline_models::*;
pub use run_events::*;
pub use session_models::*;
pub use wire::*;
