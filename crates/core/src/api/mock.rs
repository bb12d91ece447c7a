//! In-memory collaborator API for testing.
//!
//! `MockApi` answers from canned data, records every call it receives, and
//! can be told to fail specific operations.

use crate::api::error::{ApiError, ApiResult};
use crate::api::DccApi;
use async_trait::async_trait;
use dcc_protocol::{
    AgentRouteInfo, CreatePipelineRequest, CreateSessionRequest, CreateSessionResponse,
    GeneratePipelineRequest, MonitorTask, Pipeline, PipelineDetail, PipelineStatus, StoredEvent,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Kind of operation, used to select failures and filter recorded calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOp {
    CreateSession,
    CancelSession,
    FetchSessionEvents,
    FetchMonitorTasks,
    FetchPipelines,
    FetchPipeline,
    CreatePipeline,
    GeneratePipeline,
    DeletePipeline,
    CancelPipeline,
    PausePipeline,
    ResumePipeline,
    FetchAgents,
}

/// A recorded call with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    CreateSession(CreateSessionRequest),
    CancelSession(String),
    FetchSessionEvents(String),
    FetchMonitorTasks(String),
    FetchPipelines(Option<String>),
    FetchPipeline(String),
    CreatePipeline(CreatePipelineRequest),
    GeneratePipeline(GeneratePipelineRequest),
    DeletePipeline(String),
    CancelPipeline(String),
    PausePipeline(String),
    ResumePipeline(String),
    FetchAgents,
}

impl ApiCall {
    pub fn op(&self) -> ApiOp {
        match self {
            Self::CreateSession(_) => ApiOp::CreateSession,
            Self::CancelSession(_) => ApiOp::CancelSession,
            Self::FetchSessionEvents(_) => ApiOp::FetchSessionEvents,
            Self::FetchMonitorTasks(_) => ApiOp::FetchMonitorTasks,
            Self::FetchPipelines(_) => ApiOp::FetchPipelines,
            Self::FetchPipeline(_) => ApiOp::FetchPipeline,
            Self::CreatePipeline(_) => ApiOp::CreatePipeline,
            Self::GeneratePipeline(_) => ApiOp::GeneratePipeline,
            Self::DeletePipeline(_) => ApiOp::DeletePipeline,
            Self::CancelPipeline(_) => ApiOp::CancelPipeline,
            Self::PausePipeline(_) => ApiOp::PausePipeline,
            Self::ResumePipeline(_) => ApiOp::ResumePipeline,
            Self::FetchAgents => ApiOp::FetchAgents,
        }
    }
}

#[derive(Default)]
struct MockState {
    calls: Vec<ApiCall>,
    failing: HashSet<ApiOp>,
    next_id: u64,
    session_events: HashMap<String, Vec<StoredEvent>>,
    monitor_tasks: HashMap<String, Vec<MonitorTask>>,
    pipelines: Vec<PipelineDetail>,
    agents: Vec<AgentRouteInfo>,
}

#[derive(Default)]
pub struct MockApi {
    state: Mutex<MockState>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of `op` fail with a 500 status.
    pub fn failing(self, op: ApiOp) -> Self {
        self.lock().failing.insert(op);
        self
    }

    pub fn with_session_events(self, session_id: &str, events: Vec<StoredEvent>) -> Self {
        self.lock()
            .session_events
            .insert(session_id.to_string(), events);
        self
    }

    pub fn with_monitor_tasks(self, session_id: &str, tasks: Vec<MonitorTask>) -> Self {
        self.lock()
            .monitor_tasks
            .insert(session_id.to_string(), tasks);
        self
    }

    pub fn with_pipeline(self, detail: PipelineDetail) -> Self {
        self.lock().pipelines.push(detail);
        self
    }

    pub fn with_agents(self, agents: Vec<AgentRouteInfo>) -> Self {
        self.lock().agents = agents;
        self
    }

    /// Toggle failure of `op` after construction.
    pub fn set_failing(&self, op: ApiOp, failing: bool) {
        let mut state = self.lock();
        if failing {
            state.failing.insert(op);
        } else {
            state.failing.remove(&op);
        }
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, op: ApiOp) -> usize {
        self.lock().calls.iter().filter(|c| c.op() == op).count()
    }

    /// Current stored status of a pipeline.
    pub fn pipeline_status(&self, pipeline_id: &str) -> Option<PipelineStatus> {
        self.lock()
            .pipelines
            .iter()
            .find(|d| d.pipeline.id == pipeline_id)
            .map(|d| d.pipeline.status)
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `call` and return the guarded state, or the configured failure.
    fn record(&self, call: ApiCall) -> ApiResult<MutexGuard<'_, MockState>> {
        let mut state = self.lock();
        let op = call.op();
        state.calls.push(call);
        if state.failing.contains(&op) {
            return Err(ApiError::status(500, format!("mock failure: {op:?}")));
        }
        Ok(state)
    }

    fn set_status(&self, call: ApiCall, pipeline_id: &str, status: PipelineStatus) -> ApiResult<()> {
        let mut state = self.record(call)?;
        let detail = state
            .pipelines
            .iter_mut()
            .find(|d| d.pipeline.id == pipeline_id)
            .ok_or_else(|| ApiError::status(404, "Pipeline not found"))?;
        detail.pipeline.status = status;
        Ok(())
    }
}

fn new_pipeline(id: String, workspace_id: &str, name: &str, description: Option<String>) -> Pipeline {
    Pipeline {
        id,
        workspace_id: Some(workspace_id.to_string()),
        name: name.to_string(),
        description,
        status: PipelineStatus::Draft,
        total_cost: None,
        total_duration_ms: None,
        created_at: None,
    }
}

#[async_trait]
impl DccApi for MockApi {
    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> ApiResult<CreateSessionResponse> {
        let mut state = self.record(ApiCall::CreateSession(request.clone()))?;
        state.next_id += 1;
        Ok(CreateSessionResponse {
            session_id: format!("session-{}", state.next_id),
        })
    }

    async fn cancel_session(&self, session_id: &str) -> ApiResult<()> {
        self.record(ApiCall::CancelSession(session_id.to_string()))?;
        Ok(())
    }

    async fn fetch_session_events(&self, session_id: &str) -> ApiResult<Vec<StoredEvent>> {
        let state = self.record(ApiCall::FetchSessionEvents(session_id.to_string()))?;
        state
            .session_events
            .get(session_id)
            .cloned()
            .ok_or_else(|| ApiError::status(404, "Session not found"))
    }

    async fn fetch_monitor_tasks(&self, session_id: &str) -> ApiResult<Vec<MonitorTask>> {
        let state = self.record(ApiCall::FetchMonitorTasks(session_id.to_string()))?;
        Ok(state
            .monitor_tasks
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_pipelines(&self, workspace_id: Option<&str>) -> ApiResult<Vec<Pipeline>> {
        let state = self.record(ApiCall::FetchPipelines(workspace_id.map(str::to_string)))?;
        Ok(state
            .pipelines
            .iter()
            .map(|d| &d.pipeline)
            .filter(|p| workspace_id.is_none() || p.workspace_id.as_deref() == workspace_id)
            .cloned()
            .collect())
    }

    async fn fetch_pipeline(&self, pipeline_id: &str) -> ApiResult<PipelineDetail> {
        let state = self.record(ApiCall::FetchPipeline(pipeline_id.to_string()))?;
        state
            .pipelines
            .iter()
            .find(|d| d.pipeline.id == pipeline_id)
            .cloned()
            .ok_or_else(|| ApiError::status(404, "Pipeline not found"))
    }

    async fn create_pipeline(&self, request: &CreatePipelineRequest) -> ApiResult<String> {
        let mut state = self.record(ApiCall::CreatePipeline(request.clone()))?;
        state.next_id += 1;
        let id = format!("pipeline-{}", state.next_id);
        let pipeline = new_pipeline(
            id.clone(),
            &request.workspace_id,
            &request.name,
            request.description.clone(),
        );
        state.pipelines.push(PipelineDetail {
            pipeline,
            steps: Vec::new(),
        });
        Ok(id)
    }

    async fn generate_pipeline(
        &self,
        request: &GeneratePipelineRequest,
    ) -> ApiResult<PipelineDetail> {
        let mut state = self.record(ApiCall::GeneratePipeline(request.clone()))?;
        state.next_id += 1;
        let mut pipeline = new_pipeline(
            format!("pipeline-{}", state.next_id),
            &request.workspace_id,
            &request.name,
            request.description.clone(),
        );
        pipeline.status = PipelineStatus::Ready;
        let detail = PipelineDetail {
            pipeline,
            steps: Vec::new(),
        };
        state.pipelines.push(detail.clone());
        Ok(detail)
    }

    async fn delete_pipeline(&self, pipeline_id: &str) -> ApiResult<()> {
        let mut state = self.record(ApiCall::DeletePipeline(pipeline_id.to_string()))?;
        state.pipelines.retain(|d| d.pipeline.id != pipeline_id);
        Ok(())
    }

    async fn cancel_pipeline(&self, pipeline_id: &str) -> ApiResult<()> {
        self.set_status(
            ApiCall::CancelPipeline(pipeline_id.to_string()),
            pipeline_id,
            PipelineStatus::Failed,
        )
    }

    async fn pause_pipeline(&self, pipeline_id: &str) -> ApiResult<()> {
        self.set_status(
            ApiCall::PausePipeline(pipeline_id.to_string()),
            pipeline_id,
            PipelineStatus::Paused,
        )
    }

    async fn resume_pipeline(&self, pipeline_id: &str) -> ApiResult<()> {
        self.set_status(
            ApiCall::ResumePipeline(pipeline_id.to_string()),
            pipeline_id,
            PipelineStatus::Running,
        )
    }

    async fn fetch_available_agents(&self) -> ApiResult<Vec<AgentRouteInfo>> {
        let state = self.record(ApiCall::FetchAgents)?;
        Ok(state.agents.clone())
    }
}
