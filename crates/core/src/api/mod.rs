//! Collaborator API abstraction.
//!
//! Every engine reaches the server through the [`DccApi`] trait, so engines
//! can be driven by the HTTP client in production and by [`MockApi`] in
//! tests.
//!
//! ## Modules
//!
//! - [`error`]: `ApiError` and `ApiResult`
//! - [`http`]: `HttpApi`, the reqwest-backed implementation
//! - [`mock`]: `MockApi`, an in-memory implementation that records calls

pub mod error;
pub mod http;
pub mod mock;

pub use error::{ApiError, ApiResult};
pub use http::HttpApi;
pub use mock::{ApiCall, ApiOp, MockApi};

use async_trait::async_trait;
use dcc_protocol::{
    AgentRouteInfo, CreatePipelineRequest, CreateSessionRequest, CreateSessionResponse,
    GeneratePipelineRequest, MonitorTask, Pipeline, PipelineDetail, StoredEvent,
};
use std::future::Future;

/// Request/response operations offered by the server.
#[async_trait]
pub trait DccApi: Send + Sync {
    /// Create a run and return its session id.
    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> ApiResult<CreateSessionResponse>;

    /// Ask the server to stop a run. Advisory; the run may keep going briefly.
    async fn cancel_session(&self, session_id: &str) -> ApiResult<()>;

    /// Events persisted for a past run, in stream order.
    async fn fetch_session_events(&self, session_id: &str) -> ApiResult<Vec<StoredEvent>>;

    /// Task tree recorded for a past run.
    async fn fetch_monitor_tasks(&self, session_id: &str) -> ApiResult<Vec<MonitorTask>>;

    async fn fetch_pipelines(&self, workspace_id: Option<&str>) -> ApiResult<Vec<Pipeline>>;

    async fn fetch_pipeline(&self, pipeline_id: &str) -> ApiResult<PipelineDetail>;

    /// Create an empty pipeline and return its id.
    async fn create_pipeline(&self, request: &CreatePipelineRequest) -> ApiResult<String>;

    /// Create a pipeline whose steps the server plans from the request.
    async fn generate_pipeline(&self, request: &GeneratePipelineRequest)
        -> ApiResult<PipelineDetail>;

    async fn delete_pipeline(&self, pipeline_id: &str) -> ApiResult<()>;

    async fn cancel_pipeline(&self, pipeline_id: &str) -> ApiResult<()>;

    async fn pause_pipeline(&self, pipeline_id: &str) -> ApiResult<()>;

    async fn resume_pipeline(&self, pipeline_id: &str) -> ApiResult<()>;

    /// Routing targets pipeline steps may be assigned to.
    async fn fetch_available_agents(&self) -> ApiResult<Vec<AgentRouteInfo>>;
}

/// Run a request whose outcome nobody waits for.
///
/// Failures are logged and dropped. Outside a tokio runtime the request is
/// skipped with a warning.
pub fn spawn_best_effort<F>(what: &'static str, request: F)
where
    F: Future<Output = ApiResult<()>> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                if let Err(err) = request.await {
                    tracing::warn!(request = what, error = %err, "best-effort request failed");
                }
            });
        }
        Err(_) => {
            tracing::warn!(request = what, "no async runtime, request skipped");
        }
    }
}
