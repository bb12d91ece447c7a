//! Application context.
//!
//! `Workbench` constructs the engines, hands them the shared API and
//! connector, and owns the receiving ends of both event routes. Messages are
//! dispatched one at a time, so the engines never need locks.

use crate::api::{DccApi, HttpApi};
use crate::config::ClientConfig;
use crate::pipeline::PipelineTracker;
use crate::stream::{EventConnector, EventRoute, Routed, SseConnector};
use crate::tabs::TabOrchestrator;
use dcc_protocol::{PipelineEvent, RunEvent};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// Where a dispatched message went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Run,
    Pipeline,
    /// The message's subscription had already been closed or replaced.
    Stale,
}

enum Incoming {
    Run(Routed<RunEvent>),
    Pipeline(Routed<PipelineEvent>),
}

#[derive(Debug)]
pub struct Workbench {
    pub tabs: TabOrchestrator,
    pub pipelines: PipelineTracker,
    run_rx: UnboundedReceiver<Routed<RunEvent>>,
    pipeline_rx: UnboundedReceiver<Routed<PipelineEvent>>,
}

impl Workbench {
    pub fn new(
        config: &ClientConfig,
        api: Arc<dyn DccApi>,
        connector: Arc<dyn EventConnector>,
    ) -> Self {
        let (run_route, run_rx) = EventRoute::channel();
        let (pipeline_route, pipeline_rx) = EventRoute::channel();
        Self {
            tabs: TabOrchestrator::new(
                Arc::clone(&api),
                Arc::clone(&connector),
                run_route,
                config,
            ),
            pipelines: PipelineTracker::new(api, connector, pipeline_route, config),
            run_rx,
            pipeline_rx,
        }
    }

    /// A workbench talking to the HTTP API at `config.api_base_url`.
    pub fn connect(config: &ClientConfig) -> Self {
        let http = HttpApi::new(config.api_base_url.clone());
        let connector = SseConnector::new(http.clone());
        Self::new(config, Arc::new(http), Arc::new(connector))
    }

    /// Wait for the next subscription message and dispatch it.
    ///
    /// Returns `None` once both routes are closed.
    pub async fn pump(&mut self) -> Option<Dispatched> {
        let incoming = tokio::select! {
            Some(routed) = self.run_rx.recv() => Incoming::Run(routed),
            Some(routed) = self.pipeline_rx.recv() => Incoming::Pipeline(routed),
            else => return None,
        };
        Some(self.dispatch(incoming))
    }

    /// Dispatch every message already queued, without waiting.
    pub fn pump_pending(&mut self) -> usize {
        let mut count = 0;
        while let Ok(routed) = self.run_rx.try_recv() {
            self.dispatch(Incoming::Run(routed));
            count += 1;
        }
        while let Ok(routed) = self.pipeline_rx.try_recv() {
            self.dispatch(Incoming::Pipeline(routed));
            count += 1;
        }
        count
    }

    fn dispatch(&mut self, incoming: Incoming) -> Dispatched {
        let (handled, target) = match incoming {
            Incoming::Run(routed) => (self.tabs.dispatch(routed), Dispatched::Run),
            Incoming::Pipeline(routed) => (self.pipelines.dispatch(routed), Dispatched::Pipeline),
        };
        if handled {
            target
        } else {
            Dispatched::Stale
        }
    }
}
