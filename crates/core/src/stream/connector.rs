//! HTTP event subscriptions.

use crate::api::http::ensure_success;
use crate::api::HttpApi;
use crate::stream::sse::event_stream;
use crate::stream::{
    EventConnector, EventRoute, PipelineRoute, RunRoute, StreamMessage, Subscription,
    SubscriptionId,
};
use dcc_protocol::WireEvent;
use reqwest::header::ACCEPT;
use tokio_stream::StreamExt;

/// Opens subscriptions against the collaborator API's stream endpoints.
///
/// - runs: `GET /sessions/{id}/stream`
/// - pipelines: `POST /pipelines/{id}/execute?max_parallel=N`
#[derive(Debug, Clone)]
pub struct SseConnector {
    api: HttpApi,
}

impl SseConnector {
    pub fn new(api: HttpApi) -> Self {
        Self { api }
    }

    fn spawn_reader<E: WireEvent>(
        &self,
        request: reqwest::RequestBuilder,
        route: EventRoute<E>,
    ) -> Subscription {
        let id = SubscriptionId::next();

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                route.send(
                    id,
                    StreamMessage::Disconnected("no async runtime to read events on".to_string()),
                );
                return Subscription::detached(id);
            }
        };

        let task = handle.spawn(async move {
            let response = match request.header(ACCEPT, "text/event-stream").send().await {
                Ok(response) => response,
                Err(err) => {
                    route.send(id, StreamMessage::Disconnected(err.to_string()));
                    return;
                }
            };
            let response = match ensure_success(response).await {
                Ok(response) => response,
                Err(err) => {
                    route.send(id, StreamMessage::Disconnected(err.to_string()));
                    return;
                }
            };

            tracing::debug!(subscription = %id, "event stream open");
            let messages = event_stream::<E, _, _, _>(response.bytes_stream());
            tokio::pin!(messages);
            while let Some(message) = messages.next().await {
                if !route.send(id, message) {
                    break;
                }
            }
        });

        Subscription::new(id, move || task.abort())
    }
}

impl EventConnector for SseConnector {
    fn connect_session(&self, session_id: &str, route: RunRoute) -> Subscription {
        let url = self.api.url(&format!("/sessions/{session_id}/stream"));
        tracing::debug!(%url, "subscribing to run events");
        self.spawn_reader(self.api.client().get(url), route)
    }

    fn connect_pipeline(
        &self,
        pipeline_id: &str,
        max_parallel: u32,
        route: PipelineRoute,
    ) -> Subscription {
        let url = self.api.url(&format!("/pipelines/{pipeline_id}/execute"));
        tracing::debug!(%url, max_parallel, "subscribing to pipeline events");
        let request = self
            .api
            .client()
            .post(url)
            .query(&[("max_parallel", max_parallel)]);
        self.spawn_reader(request, route)
    }
}
