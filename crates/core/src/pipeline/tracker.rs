//! Pipeline progress engine.
//!
//! Holds the loaded pipeline list, the current pipeline and its steps, and
//! the single event subscription of an execution in progress. Progress is
//! derived from the step counters on demand.

use crate::api::{spawn_best_effort, ApiResult, DccApi};
use crate::config::ClientConfig;
use crate::stream::{
    EventConnector, PipelineRoute, Routed, StreamMessage, Subscription, SubscriptionId,
};
use dcc_protocol::{
    AgentRouteInfo, CreatePipelineRequest, DecodeError, GeneratePipelineRequest, Pipeline,
    PipelineDetail, PipelineEvent, PipelineEventKind, PipelineStatus, PipelineStep,
    PipelineSummary, StepRef, StepStatus,
};
use std::fmt;
use std::sync::Arc;

/// Error text of an execution whose event stream failed.
pub const PIPELINE_CONNECTION_LOST_MESSAGE: &str = "Pipeline event stream connection lost";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineState {
    pub pipelines: Vec<Pipeline>,
    pub current: Option<Pipeline>,
    pub steps: Vec<PipelineStep>,
    pub steps_completed: u32,
    pub steps_total: u32,
    pub executing: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub agents: Vec<AgentRouteInfo>,
    /// Payloads discarded because they failed validation.
    pub dropped_events: u64,
}

impl PipelineState {
    /// Percentage of finished steps, rounded to the nearest integer.
    pub fn progress(&self) -> u32 {
        if self.steps_total == 0 {
            return 0;
        }
        let (done, total) = (u64::from(self.steps_completed), u64::from(self.steps_total));
        ((200 * done + total) / (2 * total)) as u32
    }

    pub fn step(&self, step_id: &str) -> Option<&PipelineStep> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    fn adopt_detail(&mut self, detail: PipelineDetail) {
        self.steps_total = detail.steps.len() as u32;
        self.steps_completed = detail
            .steps
            .iter()
            .filter(|s| s.status.is_terminal())
            .count() as u32;
        self.current = Some(detail.pipeline);
        self.steps = detail.steps;
    }
}

pub struct PipelineTracker {
    api: Arc<dyn DccApi>,
    connector: Arc<dyn EventConnector>,
    route: PipelineRoute,
    default_max_parallel: u32,
    state: PipelineState,
    subscription: Option<Subscription>,
    /// Pipeline the latest `execute` was issued for.
    executing_id: Option<String>,
}

impl fmt::Debug for PipelineTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineTracker")
            .field("state", &self.state)
            .field("subscription", &self.subscription)
            .finish()
    }
}

impl PipelineTracker {
    pub fn new(
        api: Arc<dyn DccApi>,
        connector: Arc<dyn EventConnector>,
        route: PipelineRoute,
        config: &ClientConfig,
    ) -> Self {
        Self {
            api,
            connector,
            route,
            default_max_parallel: config.pipeline.max_parallel,
            state: PipelineState::default(),
            subscription: None,
            executing_id: None,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn progress(&self) -> u32 {
        self.state.progress()
    }

    pub fn current(&self) -> Option<&Pipeline> {
        self.state.current.as_ref()
    }

    pub fn subscription_id(&self) -> Option<SubscriptionId> {
        self.subscription.as_ref().map(Subscription::id)
    }

    /// Load the pipeline list, optionally limited to one workspace.
    ///
    /// # Errors
    ///
    /// A failed fetch is returned and also kept as the visible `error`.
    pub async fn load_pipelines(&mut self, workspace_id: Option<&str>) -> ApiResult<()> {
        self.state.loading = true;
        self.state.error = None;
        let result = self.api.fetch_pipelines(workspace_id).await;
        self.state.loading = false;

        match result {
            Ok(pipelines) => {
                self.state.pipelines = pipelines;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load pipelines");
                self.state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Load one pipeline and its steps as the current pipeline.
    ///
    /// `steps_completed` counts the steps already persisted as terminal.
    pub async fn load_pipeline(&mut self, pipeline_id: &str) -> ApiResult<()> {
        self.state.loading = true;
        self.state.error = None;
        let result = self.api.fetch_pipeline(pipeline_id).await;
        self.state.loading = false;

        match result {
            Ok(detail) => {
                self.state.adopt_detail(detail);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(pipeline_id, error = %err, "failed to load pipeline");
                self.state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Create an empty pipeline and return its id.
    pub async fn create(
        &self,
        workspace_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> ApiResult<String> {
        let request = CreatePipelineRequest {
            workspace_id: workspace_id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
        };
        self.api.create_pipeline(&request).await
    }

    /// Generate a pipeline and make it current.
    pub async fn generate(&mut self, request: GeneratePipelineRequest) -> ApiResult<String> {
        self.state.loading = true;
        self.state.error = None;
        let result = self.api.generate_pipeline(&request).await;
        self.state.loading = false;

        match result {
            Ok(detail) => {
                let id = detail.pipeline.id.clone();
                tracing::info!(pipeline_id = %id, steps = detail.steps.len(), "pipeline generated");
                self.state.adopt_detail(detail);
                Ok(id)
            }
            Err(err) => {
                self.state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Delete a pipeline and forget it locally.
    pub async fn remove(&mut self, pipeline_id: &str) -> ApiResult<()> {
        self.api.delete_pipeline(pipeline_id).await?;
        self.state.pipelines.retain(|p| p.id != pipeline_id);
        if self.current().is_some_and(|p| p.id == pipeline_id) {
            self.state.current = None;
            self.state.steps.clear();
        }
        Ok(())
    }

    /// Start executing a pipeline and subscribe to its events.
    ///
    /// Any previous subscription is closed first. `max_parallel` falls back
    /// to the configured default.
    pub fn execute(&mut self, pipeline_id: &str, max_parallel: Option<u32>) -> SubscriptionId {
        self.disconnect();
        self.state.executing = true;
        self.state.steps_completed = 0;
        self.state.error = None;
        if self.current().is_some_and(|p| p.id == pipeline_id) {
            for step in &mut self.state.steps {
                step.status = StepStatus::Pending;
            }
        }

        let max_parallel = max_parallel.unwrap_or(self.default_max_parallel);
        tracing::info!(pipeline_id, max_parallel, "executing pipeline");
        let subscription =
            self.connector
                .connect_pipeline(pipeline_id, max_parallel, self.route.clone());
        let id = subscription.id();
        self.subscription = Some(subscription);
        self.executing_id = Some(pipeline_id.to_string());
        id
    }

    /// Route one subscription message. Messages of any subscription other
    /// than the current one are ignored.
    pub fn dispatch(&mut self, routed: Routed<PipelineEvent>) -> bool {
        if self.subscription_id() != Some(routed.subscription) {
            tracing::debug!(subscription = %routed.subscription, "stale pipeline message ignored");
            return false;
        }
        self.handle_message(routed.message);
        true
    }

    pub fn handle_message(&mut self, message: StreamMessage<PipelineEvent>) {
        match message {
            StreamMessage::Event(event) => {
                self.handle_event(&event);
            }
            StreamMessage::Dropped(err) => self.record_dropped(&err),
            StreamMessage::Disconnected(reason) => self.handle_disconnect(&reason),
        }
    }

    /// Fold one event into the tracker.
    ///
    /// # Returns
    ///
    /// The final pipeline status when this event ended the execution.
    pub fn handle_event(&mut self, event: &PipelineEvent) -> Option<PipelineStatus> {
        match &event.kind {
            PipelineEventKind::PipelineStarted { steps_total } => {
                if let Some(total) = steps_total {
                    self.state.steps_total = *total;
                }
                self.set_status(PipelineStatus::Running);
                None
            }
            PipelineEventKind::PipelineStepStarted(step) => {
                if let Some(found) = self.find_step(step) {
                    found.status = StepStatus::Running;
                    if event.session_id.is_some() {
                        found.session_id = event.session_id.clone();
                    }
                }
                None
            }
            PipelineEventKind::PipelineStepCompleted { step, .. } => {
                self.finish_step(step, StepStatus::Completed);
                None
            }
            PipelineEventKind::PipelineStepFailed { step, error } => {
                tracing::debug!(step = ?step.step_id, error = ?error, "pipeline step failed");
                self.finish_step(step, StepStatus::Failed);
                None
            }
            PipelineEventKind::PipelineCompleted(summary) => {
                Some(self.finish(PipelineStatus::Completed, summary))
            }
            PipelineEventKind::PipelineFailed(summary) => {
                if let Some(error) = &summary.error {
                    self.state.error = Some(error.clone());
                }
                Some(self.finish(PipelineStatus::Failed, summary))
            }
        }
    }

    /// The event stream failed or ended while executing.
    pub fn handle_disconnect(&mut self, reason: &str) {
        self.disconnect();
        if self.state.executing {
            tracing::warn!(reason, "pipeline event stream lost");
            self.state.executing = false;
            self.state.error = Some(PIPELINE_CONNECTION_LOST_MESSAGE.to_string());
            self.set_status(PipelineStatus::Failed);
        }
    }

    pub fn record_dropped(&mut self, err: &DecodeError) {
        self.state.dropped_events += 1;
        tracing::warn!(error = %err, "dropped pipeline event");
    }

    /// Cancel the executing pipeline, or the current one when nothing
    /// was executed.
    ///
    /// The request is sent in the background; locally the execution stops
    /// at once.
    pub fn cancel(&mut self) {
        if let Some(pipeline_id) = self.target_id() {
            let api = Arc::clone(&self.api);
            spawn_best_effort("cancel pipeline", async move {
                api.cancel_pipeline(&pipeline_id).await
            });
        }
        self.set_status(PipelineStatus::Failed);
        self.state.executing = false;
        self.disconnect();
    }

    /// Pause the pipeline. The subscription stays open.
    ///
    /// The status flips at once and is restored if the server rejects.
    pub async fn pause(&mut self) -> ApiResult<()> {
        let Some(pipeline_id) = self.target_id() else {
            return Ok(());
        };
        let previous = self.set_status(PipelineStatus::Paused);
        let result = self.api.pause_pipeline(&pipeline_id).await;
        self.restore_on_error(&result, previous);
        result
    }

    /// Resume a paused pipeline.
    pub async fn resume(&mut self) -> ApiResult<()> {
        let Some(pipeline_id) = self.target_id() else {
            return Ok(());
        };
        let previous = self.set_status(PipelineStatus::Running);
        let result = self.api.resume_pipeline(&pipeline_id).await;
        self.restore_on_error(&result, previous);
        result
    }

    /// Load the available routing targets. Failure leaves an empty list.
    pub async fn load_agents(&mut self) -> &[AgentRouteInfo] {
        self.state.agents = match self.api.fetch_available_agents().await {
            Ok(agents) => agents,
            Err(err) => {
                tracing::warn!(error = %err, "agent list unavailable");
                Vec::new()
            }
        };
        &self.state.agents
    }

    pub fn reset(&mut self) {
        self.disconnect();
        self.executing_id = None;
        self.state = PipelineState::default();
    }

    fn target_id(&self) -> Option<String> {
        self.executing_id
            .clone()
            .or_else(|| self.current().map(|p| p.id.clone()))
    }

    fn find_step(&mut self, step: &StepRef) -> Option<&mut PipelineStep> {
        let id = step.step_id.as_deref()?;
        self.state.steps.iter_mut().find(|s| s.id == id)
    }

    /// Each step counts once, however many terminal events name it.
    fn finish_step(&mut self, step: &StepRef, status: StepStatus) {
        let counts = match self.find_step(step) {
            Some(found) if found.status.is_terminal() => {
                tracing::debug!(step = %found.id, "duplicate terminal step event ignored");
                false
            }
            Some(found) => {
                found.status = status;
                true
            }
            None => true,
        };
        if counts {
            self.state.steps_completed += 1;
        }
    }

    fn finish(&mut self, status: PipelineStatus, summary: &PipelineSummary) -> PipelineStatus {
        if let Some(done) = summary.steps_completed {
            self.state.steps_completed = done;
        }
        if let Some(total) = summary.steps_total {
            self.state.steps_total = total;
        }
        self.set_status(status);
        let target = self.executing_id.as_deref();
        if let Some(current) = self.state.current.as_mut() {
            if target.map_or(true, |id| id == current.id) {
                current.total_cost = summary.cost_usd.or(current.total_cost);
                current.total_duration_ms = summary.duration_ms.or(current.total_duration_ms);
            }
        }
        self.state.executing = false;
        self.disconnect();
        tracing::info!(%status, "pipeline finished");
        status
    }

    /// Set the status of the current pipeline, unless a different
    /// pipeline is the one executing. Returns the replaced status.
    fn set_status(&mut self, status: PipelineStatus) -> Option<PipelineStatus> {
        let target = self.executing_id.as_deref();
        let current = self.state.current.as_mut()?;
        if !target.map_or(true, |id| id == current.id) {
            return None;
        }
        Some(std::mem::replace(&mut current.status, status))
    }

    fn restore_on_error(&mut self, result: &ApiResult<()>, previous: Option<PipelineStatus>) {
        if let (Err(err), Some(previous)) = (result, previous) {
            tracing::warn!(error = %err, %previous, "pipeline control rejected, status restored");
            self.set_status(previous);
        }
    }

    fn disconnect(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiCall, ApiOp, MockApi};
    use crate::stream::{EventRoute, MockConnector};
    use tokio::sync::mpsc::UnboundedReceiver;

    fn detail(statuses: &[StepStatus]) -> PipelineDetail {
        let mut pipeline = Pipeline::new("p1", "Release");
        pipeline.workspace_id = Some("w1".to_string());
        pipeline.status = PipelineStatus::Ready;
        let steps = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                let mut step = PipelineStep::new(format!("s{i}"), i as u32, format!("Step {i}"));
                step.status = *status;
                step
            })
            .collect();
        PipelineDetail { pipeline, steps }
    }

    fn tracker(
        api: MockApi,
    ) -> (
        PipelineTracker,
        Arc<MockApi>,
        Arc<MockConnector>,
        UnboundedReceiver<Routed<PipelineEvent>>,
    ) {
        let api = Arc::new(api);
        let connector = Arc::new(MockConnector::new());
        let (route, rx) = EventRoute::channel();
        let tracker = PipelineTracker::new(
            api.clone(),
            connector.clone(),
            route,
            &ClientConfig::default(),
        );
        (tracker, api, connector, rx)
    }

    fn step_done(id: &str) -> PipelineEvent {
        PipelineEvent::new(
            "p1",
            PipelineEventKind::PipelineStepCompleted {
                step: StepRef::id(id),
                cost_usd: None,
            },
        )
    }

    #[test]
    fn test_progress_rounds_and_handles_zero_total() {
        let mut state = PipelineState::default();
        assert_eq!(state.progress(), 0);

        state.steps_total = 5;
        state.steps_completed = 3;
        assert_eq!(state.progress(), 60);

        state.steps_total = 3;
        state.steps_completed = 2;
        assert_eq!(state.progress(), 67);
    }

    #[tokio::test]
    async fn test_load_counts_persisted_terminal_steps() {
        let statuses = [
            StepStatus::Completed,
            StepStatus::Skipped,
            StepStatus::Failed,
            StepStatus::Running,
            StepStatus::Pending,
        ];
        let (mut tracker, _, _, _rx) = tracker(MockApi::new().with_pipeline(detail(&statuses)));

        tracker.load_pipeline("p1").await.unwrap();

        assert_eq!(tracker.state().steps_total, 5);
        assert_eq!(tracker.state().steps_completed, 3);
        assert_eq!(tracker.progress(), 60);
        assert!(!tracker.state().loading);
    }

    #[tokio::test]
    async fn test_load_failure_is_visible() {
        let (mut tracker, _, _, _rx) = tracker(MockApi::new());

        assert!(tracker.load_pipeline("missing").await.is_err());
        assert_eq!(
            tracker.state().error.as_deref(),
            Some("API 404: Pipeline not found")
        );
        assert!(tracker.current().is_none());
    }

    #[tokio::test]
    async fn test_execution_lifecycle() {
        let statuses = [StepStatus::Completed, StepStatus::Pending];
        let (mut tracker, _, connector, _rx) =
            tracker(MockApi::new().with_pipeline(detail(&statuses)));
        tracker.load_pipeline("p1").await.unwrap();

        let sub = tracker.execute("p1", Some(2));
        assert_eq!(connector.pipeline_connects(), vec![("p1".to_string(), 2, sub)]);
        assert!(tracker.state().executing);
        assert_eq!(tracker.state().steps_completed, 0);
        assert_eq!(tracker.state().step("s0").unwrap().status, StepStatus::Pending);

        tracker.handle_event(&PipelineEvent::new(
            "p1",
            PipelineEventKind::PipelineStarted {
                steps_total: Some(2),
            },
        ));
        assert_eq!(tracker.current().unwrap().status, PipelineStatus::Running);

        let mut started = PipelineEvent::new(
            "p1",
            PipelineEventKind::PipelineStepStarted(StepRef::id("s0")),
        );
        started.session_id = Some("run-7".to_string());
        tracker.handle_event(&started);
        let step = tracker.state().step("s0").unwrap();
        assert_eq!(step.status, StepStatus::Running);
        assert_eq!(step.session_id.as_deref(), Some("run-7"));

        tracker.handle_event(&step_done("s0"));
        tracker.handle_event(&step_done("s0"));
        assert_eq!(tracker.state().steps_completed, 1);
        assert_eq!(tracker.progress(), 50);

        let end = tracker.handle_event(&PipelineEvent::new(
            "p1",
            PipelineEventKind::PipelineCompleted(PipelineSummary {
                steps_completed: Some(2),
                cost_usd: Some(1.5),
                duration_ms: Some(9000),
                ..PipelineSummary::default()
            }),
        ));

        assert_eq!(end, Some(PipelineStatus::Completed));
        let current = tracker.current().unwrap();
        assert_eq!(current.status, PipelineStatus::Completed);
        assert_eq!(current.total_cost, Some(1.5));
        assert_eq!(current.total_duration_ms, Some(9000));
        assert_eq!(tracker.progress(), 100);
        assert!(!tracker.state().executing);
        assert_eq!(connector.closed(), vec![sub]);
    }

    #[tokio::test]
    async fn test_execute_uses_configured_parallelism() {
        let (mut tracker, _, connector, _rx) = tracker(MockApi::new());

        let first = tracker.execute("p1", None);
        let second = tracker.execute("p1", None);

        let connects = connector.pipeline_connects();
        assert_eq!(connects[0].1, 3);
        assert_eq!(connector.closed(), vec![first]);
        assert_eq!(tracker.subscription_id(), Some(second));
    }

    #[tokio::test]
    async fn test_stale_messages_are_ignored() {
        let (mut tracker, _, connector, mut rx) = tracker(MockApi::new());
        tracker.execute("p1", None);
        connector.emit_pipeline("p1", step_done("s0"));
        let routed = rx.recv().await.unwrap();

        tracker.execute("p1", None);
        assert!(!tracker.dispatch(routed));
        assert_eq!(tracker.state().steps_completed, 0);
    }

    #[tokio::test]
    async fn test_disconnect_while_executing_fails_run() {
        let (mut tracker, _, _, _rx) =
            tracker(MockApi::new().with_pipeline(detail(&[StepStatus::Pending])));
        tracker.load_pipeline("p1").await.unwrap();
        tracker.execute("p1", None);

        tracker.handle_message(StreamMessage::Disconnected("eof".to_string()));

        assert!(!tracker.state().executing);
        assert_eq!(tracker.current().unwrap().status, PipelineStatus::Failed);
        assert_eq!(
            tracker.state().error.as_deref(),
            Some(PIPELINE_CONNECTION_LOST_MESSAGE)
        );
        assert_eq!(tracker.subscription_id(), None);
    }

    #[tokio::test]
    async fn test_cancel_pause_resume() {
        let (mut tracker, api, connector, _rx) =
            tracker(MockApi::new().with_pipeline(detail(&[StepStatus::Pending])));
        tracker.load_pipeline("p1").await.unwrap();
        let sub = tracker.execute("p1", None);

        tracker.pause().await.unwrap();
        assert_eq!(tracker.current().unwrap().status, PipelineStatus::Paused);
        assert_eq!(tracker.subscription_id(), Some(sub));

        tracker.resume().await.unwrap();
        assert_eq!(tracker.current().unwrap().status, PipelineStatus::Running);

        tracker.cancel();
        assert_eq!(tracker.current().unwrap().status, PipelineStatus::Failed);
        assert!(!tracker.state().executing);
        assert_eq!(connector.closed(), vec![sub]);

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(api.call_count(ApiOp::CancelPipeline), 1);
        assert_eq!(api.pipeline_status("p1"), Some(PipelineStatus::Failed));
    }

    #[tokio::test]
    async fn test_rejected_pause_and_resume_keep_status() {
        let api = MockApi::new()
            .with_pipeline(detail(&[StepStatus::Pending]))
            .failing(ApiOp::PausePipeline);
        let (mut tracker, api, _, _rx) = tracker(api);
        tracker.load_pipeline("p1").await.unwrap();
        tracker.execute("p1", None);
        tracker.handle_event(&PipelineEvent::new(
            "p1",
            PipelineEventKind::PipelineStarted { steps_total: None },
        ));

        assert!(tracker.pause().await.is_err());
        assert_eq!(tracker.current().unwrap().status, PipelineStatus::Running);

        api.set_failing(ApiOp::PausePipeline, false);
        api.set_failing(ApiOp::ResumePipeline, true);
        tracker.pause().await.unwrap();
        assert_eq!(tracker.current().unwrap().status, PipelineStatus::Paused);

        assert!(tracker.resume().await.is_err());
        assert_eq!(tracker.current().unwrap().status, PipelineStatus::Paused);
        assert_eq!(api.pipeline_status("p1"), Some(PipelineStatus::Paused));
    }

    #[tokio::test]
    async fn test_cancel_targets_executed_pipeline() {
        let (mut tracker, api, connector, _rx) =
            tracker(MockApi::new().with_pipeline(detail(&[StepStatus::Pending])));
        tracker.load_pipeline("p1").await.unwrap();

        let sub = tracker.execute("p9", None);
        tracker.cancel();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert!(api
            .calls()
            .contains(&ApiCall::CancelPipeline("p9".to_string())));
        assert_eq!(api.call_count(ApiOp::CancelPipeline), 1);
        assert_eq!(tracker.current().unwrap().status, PipelineStatus::Ready);
        assert!(!tracker.state().executing);
        assert!(connector.is_closed(sub));
    }

    #[tokio::test]
    async fn test_load_agents_returns_routing_targets() {
        let agents = vec![
            AgentRouteInfo {
                name: "frontend".to_string(),
                keywords: vec!["ui".to_string(), "css".to_string()],
            },
            AgentRouteInfo {
                name: "backend".to_string(),
                keywords: Vec::new(),
            },
        ];
        let (mut tracker, _, _, _rx) = tracker(MockApi::new().with_agents(agents.clone()));

        assert_eq!(tracker.load_agents().await, agents.as_slice());
        assert_eq!(tracker.state().agents, agents);
    }

    #[tokio::test]
    async fn test_crud_and_agents() {
        let (mut tracker, api, _, _rx) =
            tracker(MockApi::new().failing(ApiOp::FetchAgents));

        let id = tracker.create("w1", "Empty", None).await.unwrap();
        let generated = tracker
            .generate(GeneratePipelineRequest {
                workspace_id: "w1".to_string(),
                name: "Generated".to_string(),
                description: None,
                spec: Some("build it".to_string()),
                milestone_number: Some(1),
            })
            .await
            .unwrap();
        assert_eq!(tracker.current().unwrap().id, generated);

        tracker.load_pipelines(Some("w1")).await.unwrap();
        assert_eq!(tracker.state().pipelines.len(), 2);

        tracker.remove(&generated).await.unwrap();
        assert_eq!(tracker.state().pipelines.len(), 1);
        assert_eq!(tracker.state().pipelines[0].id, id);
        assert!(tracker.current().is_none());
        assert!(api
            .calls()
            .contains(&ApiCall::DeletePipeline(generated.clone())));

        assert!(tracker.load_agents().await.is_empty());
    }

    #[tokio::test]
    async fn test_reset_equals_fresh() {
        let (mut tracker, _, connector, _rx) =
            tracker(MockApi::new().with_pipeline(detail(&[StepStatus::Completed])));
        tracker.load_pipeline("p1").await.unwrap();
        let sub = tracker.execute("p1", None);

        tracker.reset();

        assert_eq!(tracker.state(), &PipelineState::default());
        assert!(connector.is_closed(sub));
    }
}
