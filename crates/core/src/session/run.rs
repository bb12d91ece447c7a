//! Session run engine.
//!
//! One `SessionRun` tracks one agent run: it creates the run through the
//! collaborator API, owns the run's event subscription, and folds the
//! streamed events into [`RunState`]. Every event is also forwarded to the
//! session's own [`TaskMonitor`].

use crate::api::{spawn_best_effort, ApiResult, DccApi};
use crate::config::MonitorConfig;
use crate::monitor::TaskMonitor;
use crate::session::state::{RunOutcome, RunState, RunStatus, ToolCallStatus, ToolCallSummary};
use crate::stream::{EventConnector, RunRoute, StreamMessage, Subscription, SubscriptionId};
use dcc_protocol::{CreateSessionRequest, DecodeError, RunEvent, RunEventKind, WireEvent};
use std::fmt;
use std::sync::Arc;

/// Error text of a run ended by [`SessionRun::cancel`].
pub const CANCELLED_MESSAGE: &str = "Cancelled";

/// Error text of a run whose event stream failed while it was running.
pub const CONNECTION_LOST_MESSAGE: &str = "Event stream connection lost";

const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

pub struct SessionRun {
    api: Arc<dyn DccApi>,
    connector: Arc<dyn EventConnector>,
    route: RunRoute,
    subscription: Option<Subscription>,
    state: RunState,
    monitor: TaskMonitor,
}

impl fmt::Debug for SessionRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRun")
            .field("state", &self.state)
            .field("subscription", &self.subscription)
            .field("tasks", &self.monitor.tasks().len())
            .finish()
    }
}

impl SessionRun {
    /// Create an idle session whose subscriptions report into `route`.
    pub fn new(
        api: Arc<dyn DccApi>,
        connector: Arc<dyn EventConnector>,
        route: RunRoute,
        monitor_config: MonitorConfig,
    ) -> Self {
        Self {
            api,
            connector,
            route,
            subscription: None,
            state: RunState::default(),
            monitor: TaskMonitor::new(monitor_config),
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn status(&self) -> RunStatus {
        self.state.status
    }

    pub fn session_id(&self) -> Option<&str> {
        self.state.session_id.as_deref()
    }

    pub fn monitor(&self) -> &TaskMonitor {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut TaskMonitor {
        &mut self.monitor
    }

    /// Id of the open subscription, if any.
    pub fn subscription_id(&self) -> Option<SubscriptionId> {
        self.subscription.as_ref().map(Subscription::id)
    }

    pub fn full_output(&self) -> String {
        self.state.full_output()
    }

    pub fn total_tokens(&self) -> u64 {
        self.state.total_tokens()
    }

    /// Start a new run.
    ///
    /// Resets the session and its monitor, enters `Running`, then asks the
    /// server to create the run and subscribes to its events.
    ///
    /// # Returns
    ///
    /// The new run's session id.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of a failed creation. The session is then in
    /// `Error` with the error's message.
    pub async fn start(&mut self, request: CreateSessionRequest) -> ApiResult<String> {
        self.reset();
        self.state.status = RunStatus::Running;

        match self.api.create_session(&request).await {
            Ok(created) => {
                tracing::info!(session_id = %created.session_id, "run created");
                self.state.session_id = Some(created.session_id.clone());
                self.subscription = Some(
                    self.connector
                        .connect_session(&created.session_id, self.route.clone()),
                );
                Ok(created.session_id)
            }
            Err(err) => {
                tracing::warn!(error = %err, "run creation failed");
                self.state.status = RunStatus::Error;
                self.state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Fold one event into the session state and forward it to the monitor.
    ///
    /// # Returns
    ///
    /// The run's outcome when this event ended it.
    pub fn handle_event(&mut self, event: &RunEvent) -> Option<RunOutcome> {
        let mut outcome = None;

        match &event.kind {
            RunEventKind::RunStarted { .. } => {
                self.state.status = RunStatus::Running;
            }
            RunEventKind::TextMessageContent {
                text: Some(text), ..
            } => {
                self.state.output_chunks.push(text.clone());
            }
            RunEventKind::ToolCallStart {
                tool_call_id: Some(id),
                tool_name: Some(name),
                tool_input,
            } => {
                self.state.tool_calls.push(ToolCallSummary {
                    id: id.clone(),
                    name: name.clone(),
                    input: tool_input.clone().unwrap_or_default(),
                    result: None,
                    is_error: false,
                    status: ToolCallStatus::Running,
                });
            }
            RunEventKind::ToolCallResult {
                tool_call_id: Some(id),
                tool_result,
                tool_is_error,
            } => {
                let is_error = tool_is_error.unwrap_or(false);
                for call in self.state.tool_calls.iter_mut().filter(|c| &c.id == id) {
                    call.result = tool_result.clone();
                    call.is_error = is_error;
                    call.status = if is_error {
                        ToolCallStatus::Error
                    } else {
                        ToolCallStatus::Completed
                    };
                }
            }
            RunEventKind::ToolCallEnd {
                tool_call_id: Some(id),
            } => {
                for call in self
                    .state
                    .tool_calls
                    .iter_mut()
                    .filter(|c| &c.id == id && c.status == ToolCallStatus::Running)
                {
                    call.status = ToolCallStatus::Completed;
                }
            }
            RunEventKind::StateSnapshot { state: Some(state) } => {
                if let Some(model) = state.get("model").and_then(|m| m.as_str()) {
                    self.state.model = Some(model.to_string());
                }
            }
            RunEventKind::RunFinished(usage) => {
                self.state.status = RunStatus::Completed;
                self.state.cost_usd = usage.cost_usd;
                self.state.input_tokens = usage.input_tokens;
                self.state.output_tokens = usage.output_tokens;
                self.state.cache_read_tokens = usage.cache_read_tokens;
                self.state.cache_write_tokens = usage.cache_write_tokens;
                self.state.num_turns = usage.num_turns;
                self.state.duration_ms = usage.duration_ms;
                if let Some(model) = &usage.model {
                    self.state.model = Some(model.clone());
                }
                self.disconnect();
                tracing::info!(session_id = %event.session_id, "run finished");
                outcome = Some(RunOutcome::Completed);
            }
            RunEventKind::RunError { error, .. } => {
                self.state.status = RunStatus::Error;
                self.state.error = Some(
                    error
                        .clone()
                        .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string()),
                );
                self.disconnect();
                tracing::info!(session_id = %event.session_id, "run failed");
                outcome = Some(RunOutcome::Failed);
            }
            _ => {}
        }

        self.monitor.process_event(event);
        outcome
    }

    /// Apply one subscription message.
    pub fn handle_message(&mut self, message: StreamMessage<RunEvent>) -> Option<RunOutcome> {
        match message {
            StreamMessage::Event(event) => self.handle_event(&event),
            StreamMessage::Dropped(err) => {
                self.record_dropped(&err);
                None
            }
            StreamMessage::Disconnected(reason) => {
                self.handle_disconnect(&reason);
                None
            }
        }
    }

    /// The event stream failed or ended.
    ///
    /// A running session moves to `Error`; any other state is kept.
    pub fn handle_disconnect(&mut self, reason: &str) {
        self.disconnect();
        if self.state.status == RunStatus::Running {
            tracing::warn!(session_id = ?self.state.session_id, reason, "run event stream lost");
            self.state.status = RunStatus::Error;
            self.state.error = Some(CONNECTION_LOST_MESSAGE.to_string());
        }
    }

    /// Count a payload that failed validation. The stream continues.
    pub fn record_dropped(&mut self, err: &DecodeError) {
        self.state.dropped_events += 1;
        tracing::warn!(session_id = ?self.state.session_id, error = %err, "dropped run event");
    }

    /// Cancel the run.
    ///
    /// The cancel request is sent in the background and its failure is
    /// ignored. Locally the subscription is closed at once and the session
    /// ends in `Error` with [`CANCELLED_MESSAGE`].
    pub fn cancel(&mut self) {
        if let Some(session_id) = self.state.session_id.clone() {
            let api = Arc::clone(&self.api);
            spawn_best_effort("cancel session", async move {
                api.cancel_session(&session_id).await
            });
        }
        self.disconnect();
        self.state.status = RunStatus::Error;
        self.state.error = Some(CANCELLED_MESSAGE.to_string());
    }

    /// Close any subscription and return to the idle state, monitor included.
    pub fn reset(&mut self) {
        self.disconnect();
        self.state = RunState::default();
        self.monitor.reset();
    }

    /// Rebuild a past run from the events the server stored for it.
    ///
    /// No subscription is opened. Stored events that fail validation are
    /// counted as dropped.
    ///
    /// # Returns
    ///
    /// The number of events applied.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of a failed fetch; the session is then in
    /// `Error` with its message.
    pub async fn replay(&mut self, session_id: &str) -> ApiResult<usize> {
        self.reset();
        self.state.session_id = Some(session_id.to_string());

        let mut stored = match self.api.fetch_session_events(session_id).await {
            Ok(stored) => stored,
            Err(err) => {
                self.state.status = RunStatus::Error;
                self.state.error = Some(err.to_string());
                return Err(err);
            }
        };
        stored.sort_by_key(|e| e.seq);

        let mut applied = 0;
        for event in &stored {
            match RunEvent::decode(&event.event_type, &event.data) {
                Ok(event) => {
                    self.handle_event(&event);
                    applied += 1;
                }
                Err(err) => self.record_dropped(&err),
            }
        }
        tracing::debug!(session_id, applied, "run replayed");
        Ok(applied)
    }

    /// Fill the monitor from the server's recorded tasks of this run.
    ///
    /// A no-op when the monitor already holds tasks or no run is bound.
    pub async fn load_task_history(&mut self) -> bool {
        let Some(session_id) = self.state.session_id.clone() else {
            return false;
        };
        self.monitor
            .load_history(self.api.as_ref(), &session_id)
            .await
    }

    fn disconnect(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.close();
        }
    }
}
