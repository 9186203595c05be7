//! Update merger - decides which sample becomes the current location.
//!
//! The policy is last writer wins: every sample that reaches the merger is
//! accepted and fully replaces the previous fix, regardless of source,
//! accuracy or observation time. Samples are applied in delivery order.
//!
//! This can replace a precise fix with a coarser one that simply arrived
//! later. The merger logs that case at debug level but still accepts it.

use super::state::{CurrentLocation, PositionSample};

/// Outcome of a merge decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MergeDecision {
    /// Replace the current location with this sample.
    Accept(PositionSample),
}

impl MergeDecision {
    /// The sample that becomes the current location.
    pub fn into_sample(self) -> PositionSample {
        match self {
            Self::Accept(sample) => sample,
        }
    }
}

/// Last-writer-wins merger. Pure: the caller applies the decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateMerger;

impl UpdateMerger {
    pub fn new() -> Self {
        Self
    }

    /// Decide on `incoming` given the currently accepted location.
    pub fn merge(&self, current: &CurrentLocation, incoming: PositionSample) -> MergeDecision {
        if let Some(previous) = current.sample() {
            if incoming.accuracy_meters() > previous.accuracy_meters() {
                tracing::debug!(
                    previous_source = %previous.source(),
                    previous_accuracy_m = previous.accuracy_meters(),
                    incoming_source = %incoming.source(),
                    incoming_accuracy_m = incoming.accuracy_meters(),
                    "Accepting less accurate sample (last writer wins)"
                );
            }
        }

        MergeDecision::Accept(incoming)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::state::PositionSource;
    use chrono::{Duration, Utc};

    #[test]
    fn test_first_sample_accepted() {
        let merger = UpdateMerger::new();
        let s = PositionSample::observed_now(PositionSource::Approximate, 43.6, 1.4, 40.0);

        assert_eq!(
            merger.merge(&CurrentLocation::NoFix, s),
            MergeDecision::Accept(s)
        );
    }

    #[test]
    fn test_less_accurate_sample_still_wins() {
        let merger = UpdateMerger::new();
        let precise = PositionSample::observed_now(PositionSource::Precise, 43.6, 1.4, 4.0);
        let coarse = PositionSample::observed_now(PositionSource::Approximate, 43.7, 1.5, 900.0);

        let decision = merger.merge(&CurrentLocation::Fix(precise), coarse);
        assert_eq!(decision.into_sample(), coarse);
    }

    #[test]
    fn test_older_sample_still_wins() {
        let merger = UpdateMerger::new();
        let now = Utc::now();
        let fresh = PositionSample::new(PositionSource::Precise, 1.0, 1.0, 5.0, now);
        let stale = PositionSample::new(
            PositionSource::Precise,
            2.0,
            2.0,
            5.0,
            now - Duration::minutes(10),
        );

        let decision = merger.merge(&CurrentLocation::Fix(fresh), stale);
        assert_eq!(decision.into_sample(), stale);
    }

    #[test]
    fn test_sequence_ends_with_last_sample() {
        let merger = UpdateMerger::new();
        let mut current = CurrentLocation::NoFix;
        let samples: Vec<_> = (0..5)
            .map(|i| {
                let source = if i % 2 == 0 {
                    PositionSource::Precise
                } else {
                    PositionSource::Approximate
                };
                PositionSample::observed_now(source, 50.0 + i as f64, 8.0, 10.0 * i as f64)
            })
            .collect();

        for s in &samples {
            let accepted = merger.merge(&current, *s).into_sample();
            current.replace(accepted);
        }

        assert_eq!(current.sample(), samples.last());
    }
}
