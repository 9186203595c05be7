//! Source availability check.
//!
//! Probes each source exactly once per acquisition attempt. The resulting
//! [`AvailabilitySnapshot`] is the only availability information the
//! coordinator uses for the rest of the session; it never re-polls.

use super::platform::LocationPlatform;
use super::state::{PositionSource, SourceAvailability};

/// Availability of every source at the start of an acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AvailabilitySnapshot {
    precise: SourceAvailability,
    approximate: SourceAvailability,
}

impl AvailabilitySnapshot {
    pub fn new(precise: SourceAvailability, approximate: SourceAvailability) -> Self {
        Self {
            precise,
            approximate,
        }
    }

    /// Query the platform once per source.
    pub fn probe<P>(platform: &P) -> Self
    where
        P: LocationPlatform + ?Sized,
    {
        let snapshot = Self::new(
            platform.is_enabled(PositionSource::Precise).into(),
            platform.is_enabled(PositionSource::Approximate).into(),
        );

        tracing::debug!(
            precise = ?snapshot.precise,
            approximate = ?snapshot.approximate,
            "Probed source availability"
        );
        snapshot
    }

    pub fn availability(&self, source: PositionSource) -> SourceAvailability {
        match source {
            PositionSource::Precise => self.precise,
            PositionSource::Approximate => self.approximate,
        }
    }

    pub fn is_enabled(&self, source: PositionSource) -> bool {
        self.availability(source).is_enabled()
    }

    /// Enabled sources in priority order (`Precise` first).
    pub fn enabled_sources(&self) -> impl Iterator<Item = PositionSource> + '_ {
        PositionSource::ALL
            .into_iter()
            .filter(move |source| self.is_enabled(*source))
    }

    pub fn all_disabled(&self) -> bool {
        self.enabled_sources().next().is_none()
    }
}
