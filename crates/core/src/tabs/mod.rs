//! Multi-tab orchestration of concurrent runs.

mod notify;
mod orchestrator;

pub use notify::{shorten_label, Notification, NotificationKind};
pub use orchestrator::{Tab, TabId, TabOrchestrator};
