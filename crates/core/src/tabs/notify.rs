//! Background-completion notifications.

use crate::session::RunOutcome;
use crate::tabs::TabId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

impl From<RunOutcome> for NotificationKind {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Completed => Self::Success,
            RunOutcome::Failed => Self::Error,
        }
    }
}

/// Raised when a run in a non-active tab ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub tab_id: TabId,
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn new(tab_id: TabId, outcome: RunOutcome, label: &str, max_label_chars: usize) -> Self {
        let label = shorten_label(label, max_label_chars);
        let message = match outcome {
            RunOutcome::Completed => format!("\"{label}\" finished"),
            RunOutcome::Failed => format!("\"{label}\" failed"),
        };
        Self {
            tab_id,
            kind: outcome.into(),
            message,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Cut `label` to `max_chars` characters and mark the cut with `...`.
pub fn shorten_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() > max_chars {
        let mut short: String = label.chars().take(max_chars).collect();
        short.push_str("...");
        short
    } else {
        label.to_string()
    }
}
