//! HTTP implementation of [`DccApi`] on top of reqwest.

use crate::api::error::{ApiError, ApiResult};
use crate::api::DccApi;
use async_trait::async_trait;
use dcc_protocol::{
    AgentListResponse, AgentRouteInfo, CreatePipelineRequest, CreatePipelineResponse,
    CreateSessionRequest, CreateSessionResponse, GeneratePipelineRequest, MonitorTask,
    MonitorTasksResponse, Pipeline, PipelineDetail, PipelineListResponse, SessionEventsResponse,
    StoredEvent,
};
use serde::de::DeserializeOwned;

/// Client for the collaborator API rooted at `base_url` (e.g. `http://host:8000/api`).
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Absolute URL for `path`, which must start with `/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> ApiResult<T> {
        let response = ensure_success(request.send().await?).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn send_unit(&self, request: reqwest::RequestBuilder) -> ApiResult<()> {
        ensure_success(request.send().await?).await?;
        Ok(())
    }
}

/// Turn a non-success response into `ApiError::Status` carrying its body.
pub(crate) async fn ensure_success(response: reqwest::Response) -> ApiResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::status(status.as_u16(), body))
}

#[async_trait]
impl DccApi for HttpApi {
    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> ApiResult<CreateSessionResponse> {
        self.send_json(self.client.post(self.url("/sessions")).json(request))
            .await
    }

    async fn cancel_session(&self, session_id: &str) -> ApiResult<()> {
        self.send_unit(
            self.client
                .post(self.url(&format!("/sessions/{session_id}/cancel"))),
        )
        .await
    }

    async fn fetch_session_events(&self, session_id: &str) -> ApiResult<Vec<StoredEvent>> {
        let response: SessionEventsResponse = self
            .send_json(
                self.client
                    .get(self.url(&format!("/sessions/{session_id}/events"))),
            )
            .await?;
        Ok(response.events)
    }

    async fn fetch_monitor_tasks(&self, session_id: &str) -> ApiResult<Vec<MonitorTask>> {
        let response: MonitorTasksResponse = self
            .send_json(
                self.client
                    .get(self.url(&format!("/sessions/{session_id}/monitor"))),
            )
            .await?;
        Ok(response.tasks)
    }

    async fn fetch_pipelines(&self, workspace_id: Option<&str>) -> ApiResult<Vec<Pipeline>> {
        let mut request = self.client.get(self.url("/pipelines"));
        if let Some(workspace_id) = workspace_id {
            request = request.query(&[("workspace_id", workspace_id)]);
        }
        let response: PipelineListResponse = self.send_json(request).await?;
        Ok(response.pipelines)
    }

    async fn fetch_pipeline(&self, pipeline_id: &str) -> ApiResult<PipelineDetail> {
        self.send_json(
            self.client
                .get(self.url(&format!("/pipelines/{pipeline_id}"))),
        )
        .await
    }

    async fn create_pipeline(&self, request: &CreatePipelineRequest) -> ApiResult<String> {
        let response: CreatePipelineResponse = self
            .send_json(self.client.post(self.url("/pipelines")).json(request))
            .await?;
        Ok(response.pipeline_id)
    }

    async fn generate_pipeline(
        &self,
        request: &GeneratePipelineRequest,
    ) -> ApiResult<PipelineDetail> {
        self.send_json(
            self.client
                .post(self.url("/pipelines/generate"))
                .json(request),
        )
        .await
    }

    async fn delete_pipeline(&self, pipeline_id: &str) -> ApiResult<()> {
        self.send_unit(
            self.client
                .delete(self.url(&format!("/pipelines/{pipeline_id}"))),
        )
        .await
    }

    async fn cancel_pipeline(&self, pipeline_id: &str) -> ApiResult<()> {
        self.send_unit(
            self.client
                .post(self.url(&format!("/pipelines/{pipeline_id}/cancel"))),
        )
        .await
    }

    async fn pause_pipeline(&self, pipeline_id: &str) -> ApiResult<()> {
        self.send_unit(
            self.client
                .post(self.url(&format!("/pipelines/{pipeline_id}/pause"))),
        )
        .await
    }

    async fn resume_pipeline(&self, pipeline_id: &str) -> ApiResult<()> {
        self.send_unit(
            self.client
                .post(self.url(&format!("/pipelines/{pipeline_id}/resume"))),
        )
        .await
    }

    async fn fetch_available_agents(&self) -> ApiResult<Vec<AgentRouteInfo>> {
        let response: AgentListResponse = self
            .send_json(self.client.get(self.url("/pipelines/agents")))
            .await?;
        Ok(response.agents)
    }
}
