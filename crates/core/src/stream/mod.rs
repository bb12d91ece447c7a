//! Event subscriptions.
//!
//! A subscription is one open event stream plus the task reading it. Each
//! reader pushes [`Routed`] messages into an [`EventRoute`] shared by every
//! subscription of the same event kind; the owner of the receiving end
//! dispatches them one at a time.
//!
//! Every message carries the [`SubscriptionId`] it came from, so messages
//! from a subscription that has since been closed or replaced can be
//! recognised and ignored.
//!
//! ## Modules
//!
//! - [`sse`]: SSE frame decoding and the byte-stream reader
//! - [`connector`]: `SseConnector`, which opens subscriptions over HTTP
//! - [`mock`]: `MockConnector`, which hands routes to tests

pub mod connector;
pub mod mock;
pub mod sse;

pub use connector::SseConnector;
pub use mock::MockConnector;

use dcc_protocol::{DecodeError, PipelineEvent, RunEvent};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Identifies one subscription for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

impl SubscriptionId {
    /// Allocate a fresh, never reused id.
    pub fn next() -> Self {
        Self(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// What a subscription reports.
#[derive(Debug)]
pub enum StreamMessage<E> {
    /// A decoded event, in server-send order.
    Event(E),
    /// A frame that failed structural validation. The stream continues.
    Dropped(DecodeError),
    /// The connection failed or ended. Nothing follows this message.
    Disconnected(String),
}

/// A message tagged with the subscription it came from.
#[derive(Debug)]
pub struct Routed<E> {
    pub subscription: SubscriptionId,
    pub message: StreamMessage<E>,
}

/// Sending half of the channel subscriptions report into.
pub struct EventRoute<E> {
    tx: mpsc::UnboundedSender<Routed<E>>,
}

impl<E> Clone for EventRoute<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<E> fmt::Debug for EventRoute<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRoute")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl<E> EventRoute<E> {
    /// Create a route and the receiver its messages arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Routed<E>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Deliver `message`. Returns `false` once the receiver is gone.
    pub fn send(&self, subscription: SubscriptionId, message: StreamMessage<E>) -> bool {
        self.tx
            .send(Routed {
                subscription,
                message,
            })
            .is_ok()
    }
}

pub type RunRoute = EventRoute<RunEvent>;
pub type PipelineRoute = EventRoute<PipelineEvent>;

/// Handle to an open subscription.
///
/// Closing stops the reader. It happens exactly once: through
/// [`Subscription::close`] or, failing that, on drop.
pub struct Subscription {
    id: SubscriptionId,
    closer: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(id: SubscriptionId, closer: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id,
            closer: Some(Box::new(closer)),
        }
    }

    /// A subscription with nothing to stop, e.g. one that failed to open.
    pub fn detached(id: SubscriptionId) -> Self {
        Self { id, closer: None }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn close(mut self) {
        self.run_closer();
    }

    fn run_closer(&mut self) {
        if let Some(closer) = self.closer.take() {
            tracing::debug!(subscription = %self.id, "closing subscription");
            closer();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_closer();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("open", &self.closer.is_some())
            .finish()
    }
}

/// Opens event subscriptions.
///
/// Opening never blocks: the connection is established by the reader task,
/// and failures arrive on the route as [`StreamMessage::Disconnected`].
pub trait EventConnector: Send + Sync {
    /// Subscribe to the run events of `session_id`.
    fn connect_session(&self, session_id: &str, route: RunRoute) -> Subscription;

    /// Start executing `pipeline_id` and subscribe to its events.
    fn connect_pipeline(
        &self,
        pipeline_id: &str,
        max_parallel: u32,
        route: PipelineRoute,
    ) -> Subscription;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_subscription_closes_once() {
        let closes = Arc::new(AtomicUsize::new(0));
        let counter = closes.clone();
        let sub = Subscription::new(SubscriptionId::next(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        sub.close();

        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscription_closes_on_drop() {
        let closes = Arc::new(AtomicUsize::new(0));
        let counter = closes.clone();
        {
            let _sub = Subscription::new(SubscriptionId::next(), move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscription_ids_are_unique() {
        let a = SubscriptionId::next();
        let b = SubscriptionId::next();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_route_reports_closed_receiver() {
        let (route, rx) = EventRoute::<RunEvent>::channel();
        let id = SubscriptionId::next();
        assert!(route.send(id, StreamMessage::Disconnected("bye".to_string())));

        drop(rx);

        assert!(!route.send(id, StreamMessage::Disconnected("bye".to_string())));
    }
}
