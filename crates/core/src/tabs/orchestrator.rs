//! Tab orchestrator.
//!
//! Each tab owns one [`SessionRun`] and therefore at most one open run
//! subscription. All subscriptions report into one shared route; incoming
//! messages are matched back to their tab by subscription id, so a message
//! from a closed or replaced subscription finds no owner and is dropped.

use crate::api::DccApi;
use crate::config::{ClientConfig, MonitorConfig};
use crate::session::{RunOutcome, SessionRun};
use crate::stream::{EventConnector, Routed, RunRoute, StreamMessage};
use crate::tabs::Notification;
use dcc_protocol::RunEvent;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub struct Tab {
    pub id: TabId,
    pub label: String,
    pub session: SessionRun,
}

pub struct TabOrchestrator {
    api: Arc<dyn DccApi>,
    connector: Arc<dyn EventConnector>,
    route: RunRoute,
    monitor_config: MonitorConfig,
    label_max_chars: usize,
    tabs: Vec<Tab>,
    active: Option<TabId>,
    next_id: u64,
    notifications: Vec<Notification>,
}

impl fmt::Debug for TabOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabOrchestrator")
            .field("tabs", &self.tabs)
            .field("active", &self.active)
            .field("notifications", &self.notifications)
            .finish()
    }
}

impl TabOrchestrator {
    /// Create an orchestrator with no tabs. The first tab is created by
    /// [`add_tab`](Self::add_tab) or lazily by [`ensure_tab`](Self::ensure_tab).
    pub fn new(
        api: Arc<dyn DccApi>,
        connector: Arc<dyn EventConnector>,
        route: RunRoute,
        config: &ClientConfig,
    ) -> Self {
        Self {
            api,
            connector,
            route,
            monitor_config: config.monitor.clone(),
            label_max_chars: config.notifications.label_max_chars,
            tabs: Vec::new(),
            active: None,
            next_id: 1,
            notifications: Vec::new(),
        }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active_id(&self) -> Option<TabId> {
        self.active
    }

    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active.and_then(|id| self.tab(id))
    }

    pub fn active_tab_mut(&mut self) -> Option<&mut Tab> {
        let id = self.active?;
        self.tab_mut(id)
    }

    pub fn active_session(&self) -> Option<&SessionRun> {
        self.active_tab().map(|t| &t.session)
    }

    pub fn active_session_mut(&mut self) -> Option<&mut SessionRun> {
        self.active_tab_mut().map(|t| &mut t.session)
    }

    /// Append a tab with a fresh session and make it active.
    pub fn add_tab(&mut self, label: Option<&str>) -> &mut Tab {
        let id = TabId(self.next_id);
        self.next_id += 1;

        let label = label
            .map(str::to_string)
            .unwrap_or_else(|| format!("Tab {id}"));
        tracing::debug!(tab = %id, label = %label, "tab added");

        let session = SessionRun::new(
            Arc::clone(&self.api),
            Arc::clone(&self.connector),
            self.route.clone(),
            self.monitor_config.clone(),
        );
        self.tabs.push(Tab { id, label, session });
        self.active = Some(id);

        let last = self.tabs.len() - 1;
        &mut self.tabs[last]
    }

    /// Close a tab, releasing its subscription.
    ///
    /// Closing the active tab activates the last remaining one. Closing the
    /// only tab leaves a fresh one in its place. Returns `false` for an
    /// unknown id.
    pub fn close_tab(&mut self, id: TabId) -> bool {
        let Some(index) = self.tabs.iter().position(|t| t.id == id) else {
            return false;
        };

        let mut tab = self.tabs.remove(index);
        tab.session.reset();
        tracing::debug!(tab = %id, "tab closed");

        if self.active == Some(id) {
            self.active = self.tabs.last().map(|t| t.id);
        }
        if self.tabs.is_empty() {
            self.add_tab(None);
        }
        true
    }

    /// Activate an existing tab. Unknown ids are ignored.
    pub fn switch_tab(&mut self, id: TabId) -> bool {
        if self.tab(id).is_some() {
            self.active = Some(id);
            true
        } else {
            false
        }
    }

    /// The active tab, creating one when there are none.
    pub fn ensure_tab(&mut self) -> &mut Tab {
        if self.tabs.is_empty() {
            return self.add_tab(None);
        }
        let index = self
            .active
            .and_then(|id| self.tabs.iter().position(|t| t.id == id))
            .unwrap_or(0);
        &mut self.tabs[index]
    }

    /// Route one subscription message to the tab that owns it.
    ///
    /// Returns `false` when no tab owns the subscription any more.
    pub fn dispatch(&mut self, routed: Routed<RunEvent>) -> bool {
        let Some(tab_id) = self
            .tabs
            .iter()
            .find(|t| t.session.subscription_id() == Some(routed.subscription))
            .map(|t| t.id)
        else {
            tracing::debug!(subscription = %routed.subscription, "stale run message ignored");
            return false;
        };

        match routed.message {
            StreamMessage::Event(event) => {
                self.deliver(tab_id, &event);
            }
            message => {
                if let Some(tab) = self.tab_mut(tab_id) {
                    tab.session.handle_message(message);
                }
            }
        }
        true
    }

    /// Apply an event to a tab's session.
    ///
    /// A terminal outcome in a tab other than the active one queues a
    /// notification.
    pub fn deliver(&mut self, tab_id: TabId, event: &RunEvent) -> Option<RunOutcome> {
        let active = self.active;
        let max = self.label_max_chars;
        let tab = self.tab_mut(tab_id)?;
        let outcome = tab.session.handle_event(event)?;

        if active != Some(tab_id) {
            let notification = Notification::new(tab_id, outcome, &tab.label, max);
            tracing::info!(tab = %tab_id, message = %notification.message, "background run ended");
            self.notifications.push(notification);
        }
        Some(outcome)
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}
