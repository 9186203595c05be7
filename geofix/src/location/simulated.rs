//! In-memory platform for tests and the CLI.
//!
//! [`SimulatedPlatform`] implements [`LocationPlatform`] without any
//! operating system behind it. Clones share state, so a test can hand one
//! clone to the coordinator and keep another to flip switches, answer the
//! permission prompt and emit live samples.
//!
//! Live emission honours each subscription's [`UpdateThrottle`]: a sample is
//! delivered when enough time has elapsed since the last delivery **or** the
//! position moved far enough.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;

use super::platform::{
    LocationPlatform, PermissionResponse, PermissionStatus, PlatformError, SubscriptionId,
    UpdateThrottle,
};
use super::sink::{AuthorizationResultSink, EventRoute, PositionUpdateSink};
use super::state::{PositionSample, PositionSource};

struct Subscription {
    source: PositionSource,
    throttle: UpdateThrottle,
    route: EventRoute,
    last_delivered: Option<PositionSample>,
}

#[derive(Default)]
struct Inner {
    enabled: HashMap<PositionSource, bool>,
    permissions: HashMap<PositionSource, PermissionStatus>,
    last_known: HashMap<PositionSource, PositionSample>,

    prompt_count: usize,
    pending_prompt: Option<EventRoute>,
    prompt_failure: Option<PlatformError>,
    auto_response: Option<PermissionResponse>,

    next_subscription: u64,
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
    retired: BTreeMap<SubscriptionId, Subscription>,
    subscribe_failures: HashMap<PositionSource, PlatformError>,
    revoked: bool,
}

/// Shared, scriptable platform.
#[derive(Clone, Default)]
pub struct SimulatedPlatform {
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for SimulatedPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("SimulatedPlatform")
            .field("enabled", &inner.enabled)
            .field("permissions", &inner.permissions)
            .field("subscriptions", &inner.subscriptions.len())
            .field("revoked", &inner.revoked)
            .finish()
    }
}

impl SimulatedPlatform {
    /// Every source disabled, every permission denied, no cached samples.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_enabled(&self, source: PositionSource, enabled: bool) {
        self.inner.lock().enabled.insert(source, enabled);
    }

    pub fn set_permission(&self, capability: PositionSource, status: PermissionStatus) {
        let mut inner = self.inner.lock();
        inner.permissions.insert(capability, status);
        if status == PermissionStatus::Granted {
            inner.revoked = false;
        }
    }

    /// Grant both capability classes up front (no prompt needed).
    pub fn grant_all(&self) {
        for capability in PositionSource::ALL {
            self.set_permission(capability, PermissionStatus::Granted);
        }
    }

    pub fn set_last_known(&self, sample: PositionSample) {
        self.inner.lock().last_known.insert(sample.source(), sample);
    }

    /// Make the next prompt fail to show.
    pub fn fail_prompt(&self, error: PlatformError) {
        self.inner.lock().prompt_failure = Some(error);
    }

    /// Answer every future prompt immediately with `response`.
    pub fn respond_automatically(&self, response: PermissionResponse) {
        self.inner.lock().auto_response = Some(response);
    }

    /// Number of prompts shown so far.
    pub fn prompt_count(&self) -> usize {
        self.inner.lock().prompt_count
    }

    pub fn has_pending_prompt(&self) -> bool {
        self.inner.lock().pending_prompt.is_some()
    }

    /// Answer the pending prompt. Returns false if no prompt is showing.
    pub fn respond_to_prompt(&self, response: PermissionResponse) -> bool {
        let mut inner = self.inner.lock();
        let Some(mut route) = inner.pending_prompt.take() else {
            return false;
        };
        apply_response(&mut inner, response);
        route.on_authorization_result(response);
        true
    }

    /// Make subscribing to `source` fail.
    pub fn fail_subscribe(&self, source: PositionSource, error: PlatformError) {
        self.inner.lock().subscribe_failures.insert(source, error);
    }

    /// Withdraw permission while subscriptions are live.
    ///
    /// Subsequent emissions fail each affected subscription, and removing
    /// subscriptions reports [`PlatformError::AuthorizationRevoked`].
    pub fn revoke_authorization(&self) {
        let mut inner = self.inner.lock();
        inner.revoked = true;
        for capability in PositionSource::ALL {
            inner.permissions.insert(capability, PermissionStatus::Denied);
        }
    }

    /// Active subscriptions in creation order.
    pub fn active_subscriptions(&self) -> Vec<(SubscriptionId, PositionSource)> {
        self.inner
            .lock()
            .subscriptions
            .iter()
            .map(|(id, sub)| (*id, sub.source))
            .collect()
    }

    pub fn subscription_count(&self) -> usize {
        self.inner.lock().subscriptions.len()
    }

    /// Emit a live sample from its source to every matching subscription.
    ///
    /// Returns the number of subscriptions that received it (after
    /// throttling). When authorization has been revoked, each matching
    /// subscription receives a failure instead and is torn down.
    pub fn emit(&self, sample: PositionSample) -> usize {
        let mut inner = self.inner.lock();

        if inner.revoked {
            let failed: Vec<SubscriptionId> = inner
                .subscriptions
                .iter()
                .filter(|(_, sub)| sub.source == sample.source())
                .map(|(id, _)| *id)
                .collect();
            for id in failed {
                if let Some(mut sub) = inner.subscriptions.remove(&id) {
                    sub.route
                        .on_subscription_error(id, PlatformError::AuthorizationRevoked);
                    inner.retired.insert(id, sub);
                }
            }
            return 0;
        }

        let mut delivered = 0;
        for (id, sub) in inner.subscriptions.iter_mut() {
            if sub.source != sample.source() {
                continue;
            }
            let due = match &sub.last_delivered {
                None => true,
                Some(previous) => sub.throttle.is_due_after(previous, &sample),
            };
            if due {
                sub.route.on_sample(*id, sample);
                sub.last_delivered = Some(sample);
                delivered += 1;
            }
        }
        delivered
    }

    /// Deliver a sample through a subscription that has already been
    /// removed, as a lagging platform might. Returns false for unknown ids.
    pub fn deliver_late(&self, subscription: SubscriptionId, sample: PositionSample) -> bool {
        let mut inner = self.inner.lock();
        match inner.retired.get_mut(&subscription) {
            Some(sub) => {
                sub.route.on_sample(subscription, sample);
                true
            }
            None => false,
        }
    }
}

fn apply_response(inner: &mut Inner, response: PermissionResponse) {
    if let PermissionResponse::Answered {
        precise,
        approximate,
    } = response
    {
        inner.permissions.insert(PositionSource::Precise, precise);
        inner
            .permissions
            .insert(PositionSource::Approximate, approximate);
        if precise == PermissionStatus::Granted && approximate == PermissionStatus::Granted {
            inner.revoked = false;
        }
    }
}

impl LocationPlatform for SimulatedPlatform {
    fn is_enabled(&self, source: PositionSource) -> bool {
        self.inner
            .lock()
            .enabled
            .get(&source)
            .copied()
            .unwrap_or(false)
    }

    fn permission(&self, capability: PositionSource) -> PermissionStatus {
        self.inner
            .lock()
            .permissions
            .get(&capability)
            .copied()
            .unwrap_or(PermissionStatus::Denied)
    }

    fn request_permission(&mut self, mut route: EventRoute) -> Result<(), PlatformError> {
        let mut inner = self.inner.lock();
        if let Some(error) = inner.prompt_failure.take() {
            return Err(error);
        }

        inner.prompt_count += 1;
        let auto_response = inner.auto_response;
        match auto_response {
            Some(response) => {
                apply_response(&mut inner, response);
                route.on_authorization_result(response);
            }
            None => inner.pending_prompt = Some(route),
        }
        Ok(())
    }

    fn last_known(&self, source: PositionSource) -> Result<Option<PositionSample>, PlatformError> {
        let inner = self.inner.lock();
        if inner.revoked {
            return Err(PlatformError::AuthorizationRevoked);
        }
        Ok(inner.last_known.get(&source).copied())
    }

    fn request_updates(
        &mut self,
        source: PositionSource,
        throttle: UpdateThrottle,
        route: EventRoute,
    ) -> Result<SubscriptionId, PlatformError> {
        let mut inner = self.inner.lock();
        if inner.revoked {
            return Err(PlatformError::AuthorizationRevoked);
        }
        if let Some(error) = inner.subscribe_failures.get(&source) {
            return Err(error.clone());
        }
        if !inner.enabled.get(&source).copied().unwrap_or(false) {
            return Err(PlatformError::SourceUnavailable(source));
        }

        inner.next_subscription += 1;
        let id = SubscriptionId(inner.next_subscription);
        inner.subscriptions.insert(
            id,
            Subscription {
                source,
                throttle,
                route,
                last_delivered: None,
            },
        );
        Ok(id)
    }

    fn remove_updates(&mut self, subscription: SubscriptionId) -> Result<(), PlatformError> {
        let mut inner = self.inner.lock();
        if inner.revoked {
            return Err(PlatformError::AuthorizationRevoked);
        }
        match inner.subscriptions.remove(&subscription) {
            Some(sub) => {
                inner.retired.insert(subscription, sub);
                Ok(())
            }
            None => Err(PlatformError::Failure(format!(
                "unknown subscription {}",
                subscription
            ))),
        }
    }
}
