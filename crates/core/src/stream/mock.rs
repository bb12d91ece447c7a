//! In-process connector for testing.
//!
//! `MockConnector` opens no connections. It keeps the route of every
//! subscription it hands out so tests can push events into it, and records
//! which subscriptions have been closed.

use crate::stream::{
    EventConnector, PipelineRoute, RunRoute, StreamMessage, Subscription, SubscriptionId,
};
use dcc_protocol::{PipelineEvent, RunEvent};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct OpenedSession {
    session_id: String,
    id: SubscriptionId,
    route: RunRoute,
}

struct OpenedPipeline {
    pipeline_id: String,
    max_parallel: u32,
    id: SubscriptionId,
    route: PipelineRoute,
}

#[derive(Default)]
struct ConnectorState {
    sessions: Vec<OpenedSession>,
    pipelines: Vec<OpenedPipeline>,
}

#[derive(Default)]
pub struct MockConnector {
    state: Mutex<ConnectorState>,
    closed: Arc<Mutex<Vec<SubscriptionId>>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(session_id, subscription)` for every run subscription opened so far.
    pub fn session_connects(&self) -> Vec<(String, SubscriptionId)> {
        self.lock()
            .sessions
            .iter()
            .map(|s| (s.session_id.clone(), s.id))
            .collect()
    }

    /// `(pipeline_id, max_parallel, subscription)` for every pipeline subscription.
    pub fn pipeline_connects(&self) -> Vec<(String, u32, SubscriptionId)> {
        self.lock()
            .pipelines
            .iter()
            .map(|p| (p.pipeline_id.clone(), p.max_parallel, p.id))
            .collect()
    }

    /// Subscriptions closed so far, in close order.
    pub fn closed(&self) -> Vec<SubscriptionId> {
        self.closed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_closed(&self, id: SubscriptionId) -> bool {
        self.closed().contains(&id)
    }

    /// Push `message` into the most recent subscription for `session_id`.
    ///
    /// Returns `false` when no such subscription exists or its receiver is gone.
    pub fn send_session(&self, session_id: &str, message: StreamMessage<RunEvent>) -> bool {
        let state = self.lock();
        match state.sessions.iter().rev().find(|s| s.session_id == session_id) {
            Some(opened) => opened.route.send(opened.id, message),
            None => false,
        }
    }

    pub fn emit_session(&self, event: RunEvent) -> bool {
        let session_id = event.session_id.clone();
        self.send_session(&session_id, StreamMessage::Event(event))
    }

    /// Push `message` into the most recent subscription for `pipeline_id`.
    pub fn send_pipeline(&self, pipeline_id: &str, message: StreamMessage<PipelineEvent>) -> bool {
        let state = self.lock();
        match state
            .pipelines
            .iter()
            .rev()
            .find(|p| p.pipeline_id == pipeline_id)
        {
            Some(opened) => opened.route.send(opened.id, message),
            None => false,
        }
    }

    pub fn emit_pipeline(&self, pipeline_id: &str, event: PipelineEvent) -> bool {
        self.send_pipeline(pipeline_id, StreamMessage::Event(event))
    }

    fn lock(&self) -> MutexGuard<'_, ConnectorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn subscription(&self, id: SubscriptionId) -> Subscription {
        let closed = Arc::clone(&self.closed);
        Subscription::new(id, move || {
            closed
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(id);
        })
    }
}

impl EventConnector for MockConnector {
    fn connect_session(&self, session_id: &str, route: RunRoute) -> Subscription {
        let id = SubscriptionId::next();
        self.lock().sessions.push(OpenedSession {
            session_id: session_id.to_string(),
            id,
            route,
        });
        self.subscription(id)
    }

    fn connect_pipeline(
        &self,
        pipeline_id: &str,
        max_parallel: u32,
        route: PipelineRoute,
    ) -> Subscription {
        let id = SubscriptionId::next();
        self.lock().pipelines.push(OpenedPipeline {
            pipeline_id: pipeline_id.to_string(),
            max_parallel,
            id,
            route,
        });
        self.subscription(id)
    }
}
