//! Capability interfaces for asynchronous platform results.
//!
//! The coordinator receives two independent kinds of callbacks:
//!
//! - [`PositionUpdateSink`] - live samples and subscription failures
//! - [`AuthorizationResultSink`] - the answer to a permission prompt
//!
//! Both are implemented by the coordinator. The platform never holds the
//! coordinator itself; it holds an [`EventRoute`], which implements the same
//! traits by queueing [`PlatformEvent`]s onto a single channel. The owner of
//! the coordinator drains that channel and dispatches each event in order,
//! so every callback is serialized onto one logical queue.

use tokio::sync::mpsc;

use super::platform::{PermissionResponse, PlatformError, SubscriptionId};
use super::state::PositionSample;

/// Receives live position updates.
pub trait PositionUpdateSink {
    /// A subscription produced a sample.
    fn on_sample(&mut self, subscription: SubscriptionId, sample: PositionSample);

    /// A subscription failed and will deliver nothing further.
    fn on_subscription_error(&mut self, subscription: SubscriptionId, error: PlatformError);
}

/// Receives the result of a permission prompt.
pub trait AuthorizationResultSink {
    fn on_authorization_result(&mut self, response: PermissionResponse);
}

/// Asynchronous result queued by the platform.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    Sample {
        subscription: SubscriptionId,
        sample: PositionSample,
    },
    SubscriptionFailed {
        subscription: SubscriptionId,
        error: PlatformError,
    },
    AuthorizationResult(PermissionResponse),
}

impl PlatformEvent {
    /// Dispatch this event to a coordinator (or any sink pair).
    pub fn dispatch<S>(self, sink: &mut S)
    where
        S: PositionUpdateSink + AuthorizationResultSink,
    {
        match self {
            Self::Sample {
                subscription,
                sample,
            } => sink.on_sample(subscription, sample),
            Self::SubscriptionFailed {
                subscription,
                error,
            } => sink.on_subscription_error(subscription, error),
            Self::AuthorizationResult(response) => sink.on_authorization_result(response),
        }
    }
}

/// Receiving half of an [`EventRoute`].
pub type EventReceiver = mpsc::UnboundedReceiver<PlatformEvent>;

/// Registration handed to the platform for asynchronous delivery.
///
/// Cloning is cheap; every clone feeds the same queue. Deliveries after the
/// receiving side is gone are dropped silently.
#[derive(Debug, Clone)]
pub struct EventRoute {
    tx: mpsc::UnboundedSender<PlatformEvent>,
}

impl EventRoute {
    /// Create a route and the receiver that drains it.
    pub fn channel() -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Returns true once the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn deliver(&self, event: PlatformEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Event route closed, dropping platform event");
        }
    }
}

impl PositionUpdateSink for EventRoute {
    fn on_sample(&mut self, subscription: SubscriptionId, sample: PositionSample) {
        self.deliver(PlatformEvent::Sample {
            subscription,
            sample,
        });
    }

    fn on_subscription_error(&mut self, subscription: SubscriptionId, error: PlatformError) {
        self.deliver(PlatformEvent::SubscriptionFailed {
            subscription,
            error,
        });
    }
}

impl AuthorizationResultSink for EventRoute {
    fn on_authorization_result(&mut self, response: PermissionResponse) {
        self.deliver(PlatformEvent::AuthorizationResult(response));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::state::PositionSource;

    #[derive(Default)]
    struct Recorder {
        samples: Vec<(SubscriptionId, PositionSample)>,
        errors: Vec<(SubscriptionId, PlatformError)>,
        responses: Vec<PermissionResponse>,
    }

    impl PositionUpdateSink for Recorder {
        fn on_sample(&mut self, subscription: SubscriptionId, sample: PositionSample) {
            self.samples.push((subscription, sample));
        }

        fn on_subscription_error(&mut self, subscription: SubscriptionId, error: PlatformError) {
            self.errors.push((subscription, error));
        }
    }

    impl AuthorizationResultSink for Recorder {
        fn on_authorization_result(&mut self, response: PermissionResponse) {
            self.responses.push(response);
        }
    }

    #[test]
    fn test_route_preserves_delivery_order() {
        let (mut route, mut rx) = EventRoute::channel();
        let p1 = PositionSample::observed_now(PositionSource::Precise, 1.0, 1.0, 5.0);
        let n1 = PositionSample::observed_now(PositionSource::Approximate, 2.0, 2.0, 40.0);

        route.on_sample(SubscriptionId(1), p1);
        route.on_sample(SubscriptionId(2), n1);
        route.on_authorization_result(PermissionResponse::Dismissed);

        let mut recorder = Recorder::default();
        while let Ok(event) = rx.try_recv() {
            event.dispatch(&mut recorder);
        }

        assert_eq!(
            recorder.samples,
            vec![(SubscriptionId(1), p1), (SubscriptionId(2), n1)]
        );
        assert_eq!(recorder.responses, vec![PermissionResponse::Dismissed]);
    }

    #[test]
    fn test_route_dispatches_failures() {
        let (mut route, mut rx) = EventRoute::channel();
        route.on_subscription_error(SubscriptionId(3), PlatformError::AuthorizationRevoked);

        let mut recorder = Recorder::default();
        rx.try_recv().unwrap().dispatch(&mut recorder);

        assert_eq!(
            recorder.errors,
            vec![(SubscriptionId(3), PlatformError::AuthorizationRevoked)]
        );
    }

    #[test]
    fn test_closed_route_drops_silently() {
        let (mut route, rx) = EventRoute::channel();
        drop(rx);

        assert!(route.is_closed());
        route.on_authorization_result(PermissionResponse::granted());
    }
}
