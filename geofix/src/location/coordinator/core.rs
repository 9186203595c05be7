//! Core location coordinator state machine.
//!
//! This module contains the synchronous [`LocationCoordinator`]. It performs
//! no I/O of its own and never blocks: platform results arrive as
//! [`PlatformEvent`]s that the owner feeds to
//! [`handle_event`](LocationCoordinator::handle_event) one at a time. The
//! async actor in [`super::runner`] does exactly that, and tests do it by
//! hand for deterministic ordering.
//!
//! # States
//!
//! ```text
//!   Idle ──start──▶ CheckingSources ──all disabled──────────────▶ Idle
//!                        │
//!                        ├──granted──────────────────────────▶ Acquiring
//!                        │
//!                        └──prompt──▶ AwaitingAuthorization ──granted──▶ Acquiring
//!                                             │
//!                                             └──denied──▶ Idle
//!
//!   Acquiring ──stop / last subscription lost──▶ Idle
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

use crate::location::authorization::{AuthorizationError, AuthorizationGate};
use crate::location::availability::AvailabilitySnapshot;
use crate::location::merger::{MergeDecision, UpdateMerger};
use crate::location::platform::{
    LocationPlatform, PermissionResponse, PlatformError, SubscriptionId,
};
use crate::location::presentation::{Fix, LocationEvent, PresentationSink, SettingsLauncher};
use crate::location::sink::{
    AuthorizationResultSink, EventReceiver, EventRoute, PlatformEvent, PositionUpdateSink,
};
use crate::location::state::{
    AuthorizationState, CurrentLocation, PositionSample, PositionSource,
};

use super::config::CoordinatorConfig;
use super::status::CoordinatorStatus;

/// Position of the coordinator state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinatorState {
    #[default]
    Idle,
    CheckingSources,
    AwaitingAuthorization,
    Acquiring,
}

impl std::fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::CheckingSources => write!(f, "CheckingSources"),
            Self::AwaitingAuthorization => write!(f, "AwaitingAuthorization"),
            Self::Acquiring => write!(f, "Acquiring"),
        }
    }
}

/// Result of a [`start`](LocationCoordinator::start) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// No source enabled; back to idle.
    AllSourcesDisabled,
    /// Prompt shown; acquisition continues when the answer arrives.
    AwaitingAuthorization,
    /// Prompt could not be shown; back to idle.
    AuthorizationDenied,
    /// Subscriptions are live.
    Acquiring,
    /// Every subscription attempt failed; back to idle.
    SubscriptionFailed,
}

/// Errors returned to callers of the coordinator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinatorError {
    /// `start` while a session is already running.
    #[error("Location acquisition already active (state: {0})")]
    AlreadyActive(CoordinatorState),

    /// Authorization could not be requested.
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    /// The coordinator task is gone.
    #[error("Location coordinator has shut down")]
    Shutdown,
}

/// Location acquisition coordinator.
///
/// Owns the platform handle, the presentation sink, both live
/// subscriptions and the [`CurrentLocation`]. Nothing is shared with other
/// instances.
pub struct LocationCoordinator<P, S> {
    platform: P,
    presentation: S,
    settings: Option<Box<dyn SettingsLauncher>>,

    /// Route registered with the platform for asynchronous results.
    route: EventRoute,

    config: CoordinatorConfig,
    gate: AuthorizationGate,
    merger: UpdateMerger,

    state: CoordinatorState,

    /// Availability decided at the start of the current attempt.
    availability: Option<AvailabilitySnapshot>,

    /// Live subscriptions, keyed by platform id.
    subscriptions: BTreeMap<SubscriptionId, PositionSource>,

    current: CurrentLocation,

    /// The last attempt ended with every source disabled.
    settings_offered: bool,
}

impl<P, S> std::fmt::Debug for LocationCoordinator<P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationCoordinator")
            .field("state", &self.state)
            .field("authorization", &self.gate.state())
            .field("subscriptions", &self.subscriptions)
            .field("current", &self.current)
            .field("has_settings_launcher", &self.settings.is_some())
            .finish()
    }
}

impl<P, S> LocationCoordinator<P, S>
where
    P: LocationPlatform,
    S: PresentationSink,
{
    /// Create a coordinator and the receiver for its platform events.
    ///
    /// The receiver must be drained into [`handle_event`](Self::handle_event)
    /// (the async runner does this).
    pub fn new(platform: P, presentation: S, config: CoordinatorConfig) -> (Self, EventReceiver) {
        let (route, events) = EventRoute::channel();
        let coordinator = Self {
            platform,
            presentation,
            settings: None,
            route,
            config,
            gate: AuthorizationGate::new(),
            merger: UpdateMerger::new(),
            state: CoordinatorState::Idle,
            availability: None,
            subscriptions: BTreeMap::new(),
            current: CurrentLocation::NoFix,
            settings_offered: false,
        };
        (coordinator, events)
    }

    /// Register the settings escape hatch.
    pub fn with_settings_launcher(mut self, launcher: Box<dyn SettingsLauncher>) -> Self {
        self.settings = Some(launcher);
        self
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn current_location(&self) -> &CurrentLocation {
        &self.current
    }

    pub fn authorization(&self) -> AuthorizationState {
        self.gate.state()
    }

    /// Sources with a live subscription, in subscription order.
    pub fn active_sources(&self) -> Vec<PositionSource> {
        self.subscriptions.values().copied().collect()
    }

    pub fn status(&self) -> CoordinatorStatus {
        CoordinatorStatus {
            state: self.state,
            authorization: self.gate.state(),
            current: self.current,
            active_sources: self.active_sources(),
        }
    }

    /// Begin an acquisition attempt.
    ///
    /// Probes availability, then either starts acquiring immediately (already
    /// authorized) or shows the permission prompt and parks in
    /// [`CoordinatorState::AwaitingAuthorization`].
    pub fn start(&mut self) -> Result<StartOutcome, CoordinatorError> {
        if self.state != CoordinatorState::Idle {
            return Err(CoordinatorError::AlreadyActive(self.state));
        }

        self.settings_offered = false;
        self.state = CoordinatorState::CheckingSources;

        let availability = AvailabilitySnapshot::probe(&self.platform);
        if availability.all_disabled() {
            tracing::info!("All location sources disabled");
            self.presentation.present(LocationEvent::AllSourcesDisabled);
            self.reset();
            self.settings_offered = true;
            return Ok(StartOutcome::AllSourcesDisabled);
        }
        self.availability = Some(availability);

        if self.gate.check_authorization(&self.platform).is_granted() {
            return Ok(if self.begin_acquisition() {
                StartOutcome::Acquiring
            } else {
                StartOutcome::SubscriptionFailed
            });
        }

        match self
            .gate
            .request_authorization(&mut self.platform, self.route.clone())
        {
            Ok(()) => {
                self.state = CoordinatorState::AwaitingAuthorization;
                Ok(StartOutcome::AwaitingAuthorization)
            }
            Err(AuthorizationError::Prompt(error)) => {
                tracing::warn!(%error, "Authorization prompt failed, treating as denied");
                self.deny();
                Ok(StartOutcome::AuthorizationDenied)
            }
            Err(error) => {
                self.reset();
                Err(error.into())
            }
        }
    }

    /// Stop acquisition and clear the current location.
    ///
    /// Unsubscription is best-effort: failures are logged, never returned.
    pub fn stop(&mut self) {
        let subscriptions = std::mem::take(&mut self.subscriptions);
        for (subscription, source) in subscriptions {
            match self.platform.remove_updates(subscription) {
                Ok(()) => {
                    tracing::debug!(%source, %subscription, "Removed location updates");
                }
                Err(PlatformError::AuthorizationRevoked) => {
                    tracing::debug!(
                        %source,
                        %subscription,
                        "Authorization revoked, ignoring unsubscribe failure"
                    );
                }
                Err(error) => {
                    tracing::warn!(%source, %subscription, %error, "Failed to remove location updates");
                }
            }
        }

        if self.state != CoordinatorState::Idle {
            tracing::info!(state = %self.state, "Location acquisition stopped");
        }
        self.settings_offered = false;
        self.reset();
    }

    /// Open platform location settings.
    ///
    /// Only honoured right after an attempt ended with
    /// [`LocationEvent::AllSourcesDisabled`]. Returns true if the launcher
    /// was invoked.
    pub fn open_location_settings(&mut self) -> bool {
        if !self.settings_offered {
            tracing::debug!("Settings not offered, ignoring request");
            return false;
        }

        match self.settings.as_mut() {
            Some(launcher) => {
                launcher.open_location_settings();
                true
            }
            None => {
                tracing::debug!("No settings launcher registered");
                false
            }
        }
    }

    /// Dispatch one queued platform event.
    pub fn handle_event(&mut self, event: PlatformEvent) {
        event.dispatch(self);
    }

    /// Subscribe to enabled sources and try a last-known read.
    ///
    /// Returns false, back in Idle, when no subscription could be made.
    fn begin_acquisition(&mut self) -> bool {
        let Some(availability) = self.availability else {
            tracing::warn!("No availability snapshot, abandoning acquisition");
            self.reset();
            return false;
        };

        self.state = CoordinatorState::Acquiring;
        self.current.clear();

        for source in availability.enabled_sources() {
            match self
                .platform
                .request_updates(source, self.config.throttle, self.route.clone())
            {
                Ok(subscription) => {
                    tracing::debug!(
                        %source,
                        provider = source.provider_name(),
                        %subscription,
                        "Subscribed to live updates"
                    );
                    self.subscriptions.insert(subscription, source);
                }
                Err(error) => {
                    tracing::warn!(%source, %error, "Failed to subscribe to live updates");
                    self.presentation.present(LocationEvent::SubscriptionError {
                        source,
                        reason: error.to_string(),
                    });
                }
            }
        }

        if self.subscriptions.is_empty() {
            tracing::warn!("Every subscription failed, abandoning acquisition");
            self.reset();
            return false;
        }

        let initial = availability.enabled_sources().find_map(|source| {
            tracing::debug!(%source, "Trying last known location");
            match self.platform.last_known(source) {
                Ok(sample) => sample,
                Err(error) => {
                    tracing::debug!(%source, %error, "Last known location unavailable");
                    None
                }
            }
        });

        match initial {
            Some(sample) => {
                tracing::debug!(source = %sample.source(), "Initial location found");
                self.accept(sample);
            }
            None => {
                tracing::info!("No initial location available, searching");
                self.presentation.present(LocationEvent::Searching);
            }
        }
        true
    }

    fn accept(&mut self, incoming: PositionSample) {
        match self.merger.merge(&self.current, incoming) {
            MergeDecision::Accept(sample) => {
                self.current.replace(sample);
                tracing::debug!(
                    source = %sample.source(),
                    latitude = sample.latitude(),
                    longitude = sample.longitude(),
                    accuracy_m = sample.accuracy_meters(),
                    "Location updated"
                );
                self.presentation
                    .present(LocationEvent::Fix(Fix::from(&sample)));
            }
        }
    }

    fn deny(&mut self) {
        tracing::info!("Location permission denied");
        self.presentation.present(LocationEvent::AuthorizationDenied);
        self.reset();
    }

    /// Return to a clean idle state. An outstanding prompt stays outstanding.
    fn reset(&mut self) {
        self.state = CoordinatorState::Idle;
        self.availability = None;
        self.current.clear();
        self.gate.reset();
    }
}

impl<P, S> PositionUpdateSink for LocationCoordinator<P, S>
where
    P: LocationPlatform,
    S: PresentationSink,
{
    fn on_sample(&mut self, subscription: SubscriptionId, sample: PositionSample) {
        if self.state != CoordinatorState::Acquiring || !self.gate.state().is_granted() {
            tracing::trace!(%subscription, state = %self.state, "Discarding sample outside acquisition");
            return;
        }
        if !self.subscriptions.contains_key(&subscription) {
            tracing::trace!(%subscription, "Discarding sample from inactive subscription");
            return;
        }

        self.accept(sample);
    }

    fn on_subscription_error(&mut self, subscription: SubscriptionId, error: PlatformError) {
        let Some(source) = self.subscriptions.remove(&subscription) else {
            tracing::debug!(%subscription, %error, "Ignoring failure from inactive subscription");
            return;
        };

        tracing::warn!(%source, %subscription, %error, "Subscription failed");
        if let Err(remove_error) = self.platform.remove_updates(subscription) {
            tracing::debug!(%subscription, error = %remove_error, "Cleanup after subscription failure");
        }

        self.presentation.present(LocationEvent::SubscriptionError {
            source,
            reason: error.to_string(),
        });

        if self.subscriptions.is_empty() && self.state == CoordinatorState::Acquiring {
            tracing::warn!("No live subscription left, stopping acquisition");
            self.stop();
        }
    }
}

impl<P, S> AuthorizationResultSink for LocationCoordinator<P, S>
where
    P: LocationPlatform,
    S: PresentationSink,
{
    fn on_authorization_result(&mut self, response: PermissionResponse) {
        // The attempt that showed this prompt has ended; a newer attempt may
        // already hold a fresh authorization check.
        if self.state != CoordinatorState::AwaitingAuthorization {
            if self.gate.discard(response) {
                tracing::debug!(state = %self.state, "Authorization result arrived after stop, ignoring");
            }
            return;
        }

        let Some(result) = self.gate.complete(response) else {
            return;
        };

        if result.is_granted() {
            self.begin_acquisition();
        } else {
            self.deny();
        }
    }
}
