//! Status snapshot for coordinator queries.

use crate::location::state::{AuthorizationState, CurrentLocation, PositionSource};

use super::core::CoordinatorState;

/// Point-in-time view of a coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorStatus {
    /// State machine position.
    pub state: CoordinatorState,

    /// Last observed authorization.
    pub authorization: AuthorizationState,

    /// Accepted location (cleared on stop).
    pub current: CurrentLocation,

    /// Sources with a live subscription, in subscription order.
    pub active_sources: Vec<PositionSource>,
}

impl CoordinatorStatus {
    /// Whether a fix is currently held.
    pub fn has_fix(&self) -> bool {
        self.current.is_fix()
    }
}
