//! Hierarchical task monitor.
//!
//! Turns the tool call events of one run into a registry of
//! [`MonitorTask`](dcc_protocol::MonitorTask)s and a derived call tree.
//!
//! ## Modules
//!
//! - [`engine`]: `TaskMonitor`, the delegation-stack state machine
//! - [`describe`]: per-tool description rules
//! - [`tree`]: `TaskNode` and tree derivation

pub mod describe;
pub mod engine;
pub mod tree;

pub use engine::{TaskCounts, TaskMonitor};
pub use tree::{build_tree, TaskNode};
