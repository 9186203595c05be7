//! Presentation interface.
//!
//! The coordinator reports everything the display surface needs as a
//! [`LocationEvent`]. How events are drawn is up to the [`PresentationSink`];
//! the `Display` impl on [`LocationEvent`] provides a plain-text rendering
//! for simple consumers such as the CLI.

use tokio::sync::mpsc;

use super::state::{PositionSample, PositionSource};

/// Accepted location values handed to the display surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: f64,
    pub source: PositionSource,
}

impl From<&PositionSample> for Fix {
    fn from(sample: &PositionSample) -> Self {
        Self {
            latitude: sample.latitude(),
            longitude: sample.longitude(),
            accuracy_meters: sample.accuracy_meters(),
            source: sample.source(),
        }
    }
}

impl std::fmt::Display for Fix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Latitude: {:.6}\nLongitude: {:.6}\nAccuracy: {:.1} meters\nProvider: {}",
            self.latitude,
            self.longitude,
            self.accuracy_meters,
            self.source.provider_name()
        )
    }
}

/// Everything the coordinator ever presents.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    /// Subscribed, but no fix yet.
    Searching,
    /// A sample was accepted as the current location.
    Fix(Fix),
    /// No source is switched on; the settings escape hatch may be offered.
    AllSourcesDisabled,
    /// The permission prompt was denied or dismissed.
    AuthorizationDenied,
    /// One subscription failed; others keep running.
    SubscriptionError {
        source: PositionSource,
        reason: String,
    },
}

impl std::fmt::Display for LocationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Searching => write!(
                f,
                "Acquiring location...\nPlease wait or move to an open area"
            ),
            Self::Fix(fix) => write!(f, "{}", fix),
            Self::AllSourcesDisabled => write!(
                f,
                "Location is disabled. Please enable GPS or network location in settings to obtain location."
            ),
            Self::AuthorizationDenied => write!(f, "Location permission denied."),
            Self::SubscriptionError { source, reason } => {
                write!(f, "Error: {} location updates failed: {}", source, reason)
            }
        }
    }
}

/// Display surface receiving location events.
pub trait PresentationSink: Send {
    fn present(&mut self, event: LocationEvent);
}

impl PresentationSink for mpsc::UnboundedSender<LocationEvent> {
    fn present(&mut self, event: LocationEvent) {
        if self.send(event).is_err() {
            tracing::debug!("Presentation receiver dropped, event discarded");
        }
    }
}

impl<S: PresentationSink + ?Sized> PresentationSink for Box<S> {
    fn present(&mut self, event: LocationEvent) {
        (**self).present(event)
    }
}

/// Opens the platform's location settings.
///
/// Only invoked in response to [`LocationEvent::AllSourcesDisabled`].
pub trait SettingsLauncher: Send {
    fn open_location_settings(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_display_matches_device_format() {
        let fix = Fix {
            latitude: 53.630278,
            longitude: 9.988333,
            accuracy_meters: 12.34,
            source: PositionSource::Precise,
        };

        assert_eq!(
            fix.to_string(),
            "Latitude: 53.630278\nLongitude: 9.988333\nAccuracy: 12.3 meters\nProvider: gps"
        );
    }

    #[test]
    fn test_fix_from_sample() {
        let sample = PositionSample::observed_now(PositionSource::Approximate, 43.6, 1.4, 800.0);
        let fix = Fix::from(&sample);

        assert_eq!(fix.latitude, 43.6);
        assert_eq!(fix.longitude, 1.4);
        assert_eq!(fix.accuracy_meters, 800.0);
        assert_eq!(fix.source, PositionSource::Approximate);
    }

    #[test]
    fn test_event_display() {
        assert!(LocationEvent::Searching
            .to_string()
            .starts_with("Acquiring location..."));
        assert_eq!(
            LocationEvent::AuthorizationDenied.to_string(),
            "Location permission denied."
        );
        assert!(LocationEvent::AllSourcesDisabled
            .to_string()
            .contains("settings"));

        let err = LocationEvent::SubscriptionError {
            source: PositionSource::Approximate,
            reason: "revoked".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Error: Approximate location updates failed: revoked"
        );
    }

    #[test]
    fn test_channel_sink_forwards_in_order() {
        let (mut tx, mut rx) = mpsc::unbounded_channel();
        tx.present(LocationEvent::Searching);
        tx.present(LocationEvent::AuthorizationDenied);

        assert_eq!(rx.try_recv().unwrap(), LocationEvent::Searching);
        assert_eq!(rx.try_recv().unwrap(), LocationEvent::AuthorizationDenied);
    }

    #[test]
    fn test_channel_sink_tolerates_closed_receiver() {
        let (mut tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        tx.present(LocationEvent::Searching);
    }
}
