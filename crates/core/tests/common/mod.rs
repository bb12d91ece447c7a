//! Common test utilities shared by the integration tests.
//!
//! - Fixtures: event builders, pipelines, a wired workbench
//! - Assertions: task tree and state checks

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
pub use fixtures::*;
