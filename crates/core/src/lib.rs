//! # dcc-core
//!
//! Client runtime for server-pushed run and pipeline events.
//!
//! This crate provides:
//! - A collaborator API client and the event subscriptions it serves
//! - A task monitor that rebuilds the call tree of a run
//! - Session, tab and pipeline engines folding events into observable state
//!
//! ## Modules
//!
//! - [`api`]: `DccApi` trait, HTTP client and in-process mock
//! - [`config`]: Configuration loading from `.dcc/config.toml`
//! - [`stream`]: Subscriptions, SSE decoding and event routing
//! - [`monitor`]: Hierarchical task monitor
//! - [`session`]: Single-run lifecycle
//! - [`tabs`]: Multi-tab orchestration and background notifications
//! - [`pipeline`]: Pipeline progress tracking
//! - [`workbench`]: Application context that owns the engines

pub mod api;
pub mod config;
pub mod monitor;
pub mod observability;
pub mod pipeline;
pub mod session;
pub mod stream;
pub mod tabs;
pub mod workbench;

pub use workbench::{Dispatched, Workbench};
