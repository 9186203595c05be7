//! Platform location provider interface.
//!
//! The coordinator never talks to an operating system directly. Everything
//! it needs from the platform goes through [`LocationPlatform`]:
//!
//! - per-source enabled state
//! - permission state and the permission prompt
//! - best-effort last-known samples
//! - throttled live subscriptions
//!
//! Asynchronous results (live samples, subscription failures, prompt
//! answers) are pushed back through the [`EventRoute`] the coordinator
//! registers with each call.

use std::time::Duration;

use thiserror::Error;

use super::sink::EventRoute;
use super::state::{PositionSample, PositionSource};

/// Mean earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Errors reported by platform operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlatformError {
    /// Location permission was withdrawn after it had been granted.
    #[error("Location authorization was revoked")]
    AuthorizationRevoked,

    /// The source cannot serve requests (switched off or missing).
    #[error("{0} source is unavailable")]
    SourceUnavailable(PositionSource),

    /// Any other platform-level failure.
    #[error("Platform failure: {0}")]
    Failure(String),
}

/// Permission state for one capability class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Answer to a permission prompt.
///
/// Capability classes mirror the sources: `precise` covers satellite
/// positioning, `approximate` covers network positioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionResponse {
    /// The user answered for both capability classes.
    Answered {
        precise: PermissionStatus,
        approximate: PermissionStatus,
    },
    /// The prompt closed without a definitive answer.
    Dismissed,
}

impl PermissionResponse {
    /// Both capabilities granted.
    pub fn granted() -> Self {
        Self::Answered {
            precise: PermissionStatus::Granted,
            approximate: PermissionStatus::Granted,
        }
    }

    /// Both capabilities denied.
    pub fn denied() -> Self {
        Self::Answered {
            precise: PermissionStatus::Denied,
            approximate: PermissionStatus::Denied,
        }
    }
}

/// Handle for one live subscription, assigned by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Minimum reporting interval for live subscriptions.
///
/// A new sample is due when **either** threshold is crossed: enough time
/// has elapsed **or** the position moved far enough.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateThrottle {
    /// Minimum time between deliveries.
    pub min_interval: Duration,

    /// Minimum displacement between deliveries, in meters.
    pub min_distance_meters: f64,
}

impl UpdateThrottle {
    /// Default minimum interval (1 second).
    pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1000);

    /// Default minimum displacement (1 meter).
    pub const DEFAULT_MIN_DISTANCE_METERS: f64 = 1.0;

    pub fn new(min_interval: Duration, min_distance_meters: f64) -> Self {
        Self {
            min_interval,
            min_distance_meters,
        }
    }

    /// Whether a sample is due, given the time and distance since the last delivery.
    pub fn is_due(&self, elapsed: Duration, displacement_meters: f64) -> bool {
        elapsed >= self.min_interval || displacement_meters >= self.min_distance_meters
    }

    /// Whether `next` is due after `previous` was delivered.
    ///
    /// Elapsed time comes from the samples' observation timestamps; a
    /// sample observed before `previous` counts as zero elapsed.
    pub fn is_due_after(&self, previous: &PositionSample, next: &PositionSample) -> bool {
        let elapsed = next
            .observed_at()
            .signed_duration_since(previous.observed_at())
            .to_std()
            .unwrap_or(Duration::ZERO);
        self.is_due(elapsed, displacement_meters(previous, next))
    }
}

impl Default for UpdateThrottle {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_MIN_INTERVAL,
            Self::DEFAULT_MIN_DISTANCE_METERS,
        )
    }
}

/// Great-circle distance between two samples in meters (haversine).
pub fn displacement_meters(from: &PositionSample, to: &PositionSample) -> f64 {
    let lat1 = from.latitude().to_radians();
    let lat2 = to.latitude().to_radians();
    let d_lat = (to.latitude() - from.latitude()).to_radians();
    let d_lon = (to.longitude() - from.longitude()).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Platform location provider.
///
/// Implementations deliver asynchronous results through the [`EventRoute`]
/// passed to [`request_permission`](Self::request_permission) and
/// [`request_updates`](Self::request_updates). The route feeds the
/// coordinator's serialized event queue, so implementations may call it
/// from any thread.
pub trait LocationPlatform: Send {
    /// Is the source currently switched on? Never cached by callers.
    fn is_enabled(&self, source: PositionSource) -> bool;

    /// Current permission for one capability class.
    fn permission(&self, capability: PositionSource) -> PermissionStatus;

    /// Show the permission prompt for both capability classes.
    ///
    /// Exactly one [`PermissionResponse`] must later be delivered through
    /// `route`.
    fn request_permission(&mut self, route: EventRoute) -> Result<(), PlatformError>;

    /// Cached sample from an earlier acquisition, if the platform has one.
    fn last_known(&self, source: PositionSource) -> Result<Option<PositionSample>, PlatformError>;

    /// Start live updates for `source`, throttled by `throttle`.
    fn request_updates(
        &mut self,
        source: PositionSource,
        throttle: UpdateThrottle,
        route: EventRoute,
    ) -> Result<SubscriptionId, PlatformError>;

    /// Stop live updates for a subscription.
    fn remove_updates(&mut self, subscription: SubscriptionId) -> Result<(), PlatformError>;
}
