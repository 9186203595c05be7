//! Core state types for location acquisition.
//!
//! This module defines the fundamental types used throughout the coordinator:
//!
//! - [`PositionSource`] - Which platform provider produced a sample
//! - [`SourceAvailability`] - Is a provider switched on?
//! - [`AuthorizationState`] - Does the caller hold location permission?
//! - [`PositionSample`] - Immutable position snapshot from one provider
//! - [`CurrentLocation`] - The single accepted fix (or none)

use chrono::{DateTime, Utc};

/// Platform position provider.
///
/// Sources are listed in fallback priority order: [`PositionSource::ALL`]
/// always yields `Precise` before `Approximate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionSource {
    /// High accuracy, higher power (satellite based).
    Precise,
    /// Lower accuracy, derived from network infrastructure.
    Approximate,
}

impl PositionSource {
    /// All sources in subscription and fallback order.
    pub const ALL: [PositionSource; 2] = [PositionSource::Precise, PositionSource::Approximate];

    /// Platform provider name (`gps` / `network`).
    pub fn provider_name(&self) -> &'static str {
        match self {
            Self::Precise => "gps",
            Self::Approximate => "network",
        }
    }
}

impl std::fmt::Display for PositionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Precise => write!(f, "Precise"),
            Self::Approximate => write!(f, "Approximate"),
        }
    }
}

/// Platform-reported availability of a single source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceAvailability {
    Enabled,
    #[default]
    Disabled,
}

impl SourceAvailability {
    #[inline]
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled)
    }
}

impl From<bool> for SourceAvailability {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }
}

/// Location authorization held by the caller.
///
/// Only changes through an explicit request-and-result round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorizationState {
    /// No round trip has completed yet.
    #[default]
    Unknown,
    Granted,
    Denied,
}

impl AuthorizationState {
    #[inline]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

impl std::fmt::Display for AuthorizationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::Granted => write!(f, "Granted"),
            Self::Denied => write!(f, "Denied"),
        }
    }
}

/// Position sample produced by one source.
///
/// Samples are values: fields are only readable, so a sample is never
/// mutated after the platform creates it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    source: PositionSource,
    latitude: f64,
    longitude: f64,
    accuracy_meters: f64,
    observed_at: DateTime<Utc>,
}

impl PositionSample {
    /// Create a sample observed at the given instant.
    ///
    /// # Arguments
    ///
    /// * `source` - Provider that produced the sample
    /// * `latitude` - Latitude in degrees (-90 to 90)
    /// * `longitude` - Longitude in degrees (-180 to 180)
    /// * `accuracy_meters` - Reported horizontal accuracy radius
    /// * `observed_at` - When the provider measured the position
    pub fn new(
        source: PositionSource,
        latitude: f64,
        longitude: f64,
        accuracy_meters: f64,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            source,
            latitude,
            longitude,
            accuracy_meters,
            observed_at,
        }
    }

    /// Create a sample observed now.
    pub fn observed_now(
        source: PositionSource,
        latitude: f64,
        longitude: f64,
        accuracy_meters: f64,
    ) -> Self {
        Self::new(source, latitude, longitude, accuracy_meters, Utc::now())
    }

    pub fn source(&self) -> PositionSource {
        self.source
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn accuracy_meters(&self) -> f64 {
        self.accuracy_meters
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// Position as (latitude, longitude).
    pub fn position(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// The accepted location for one acquisition session.
///
/// Starts as [`CurrentLocation::NoFix`]. Each accepted sample replaces the
/// previous one wholesale; values are never merged across samples.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CurrentLocation {
    #[default]
    NoFix,
    Fix(PositionSample),
}

impl CurrentLocation {
    pub fn is_fix(&self) -> bool {
        matches!(self, Self::Fix(_))
    }

    /// The accepted sample, if any.
    pub fn sample(&self) -> Option<&PositionSample> {
        match self {
            Self::Fix(sample) => Some(sample),
            Self::NoFix => None,
        }
    }

    /// Replace the current fix, returning the superseded one.
    pub(crate) fn replace(&mut self, sample: PositionSample) -> Option<PositionSample> {
        match std::mem::replace(self, Self::Fix(sample)) {
            Self::Fix(previous) => Some(previous),
            Self::NoFix => None,
        }
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::NoFix;
    }
}
