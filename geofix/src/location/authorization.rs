//! Authorization gate.
//!
//! Decides whether acquisition may proceed and drives the permission prompt
//! round trip. Location permission is split into two capability classes
//! (precise and approximate); the gate only reports
//! [`AuthorizationState::Granted`] when **both** are granted. There is no
//! degraded single-capability mode.
//!
//! At most one prompt is outstanding at a time. The in-flight flag is only
//! cleared by the prompt's answer, so a coordinator that is stopped while
//! waiting cannot trigger a second prompt before the first one resolves.

use thiserror::Error;

use super::platform::{LocationPlatform, PermissionResponse, PermissionStatus, PlatformError};
use super::sink::EventRoute;
use super::state::{AuthorizationState, PositionSource};

/// Errors raised when requesting authorization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthorizationError {
    /// A prompt is already showing; its answer has not arrived yet.
    #[error("An authorization request is already in flight")]
    RequestInFlight,

    /// The platform could not show the prompt.
    #[error("Failed to show authorization prompt: {0}")]
    Prompt(#[source] PlatformError),
}

/// Collapse a prompt answer into an authorization state.
///
/// Partial grants and dismissed prompts are both `Denied`.
pub fn resolve_response(response: PermissionResponse) -> AuthorizationState {
    match response {
        PermissionResponse::Answered {
            precise: PermissionStatus::Granted,
            approximate: PermissionStatus::Granted,
        } => AuthorizationState::Granted,
        PermissionResponse::Answered { .. } | PermissionResponse::Dismissed => {
            AuthorizationState::Denied
        }
    }
}

/// Authorization gate for one coordinator.
#[derive(Debug, Default)]
pub struct AuthorizationGate {
    /// Last known authorization state.
    state: AuthorizationState,

    /// A prompt has been shown and not yet answered.
    in_flight: bool,
}

impl AuthorizationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last authorization state observed by a check or a completed prompt.
    pub fn state(&self) -> AuthorizationState {
        self.state
    }

    pub fn is_request_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Query the platform's current permission for both capability classes.
    pub fn check_authorization<P>(&mut self, platform: &P) -> AuthorizationState
    where
        P: LocationPlatform + ?Sized,
    {
        let all_granted = PositionSource::ALL
            .iter()
            .all(|capability| platform.permission(*capability) == PermissionStatus::Granted);

        self.state = if all_granted {
            AuthorizationState::Granted
        } else {
            AuthorizationState::Denied
        };
        self.state
    }

    /// Show the permission prompt.
    ///
    /// The answer arrives later through `route` and must be passed to
    /// [`complete`](Self::complete).
    pub fn request_authorization<P>(
        &mut self,
        platform: &mut P,
        route: EventRoute,
    ) -> Result<(), AuthorizationError>
    where
        P: LocationPlatform + ?Sized,
    {
        if self.in_flight {
            return Err(AuthorizationError::RequestInFlight);
        }

        platform
            .request_permission(route)
            .map_err(AuthorizationError::Prompt)?;
        self.in_flight = true;

        tracing::debug!("Authorization prompt requested");
        Ok(())
    }

    /// Record the answer to the outstanding prompt.
    ///
    /// Returns `None` when no prompt was outstanding (the answer is stale
    /// or unsolicited and is ignored).
    pub fn complete(&mut self, response: PermissionResponse) -> Option<AuthorizationState> {
        if !self.in_flight {
            tracing::debug!(?response, "Ignoring unsolicited authorization result");
            return None;
        }

        self.in_flight = false;
        self.state = resolve_response(response);

        tracing::info!(state = %self.state, "Authorization result received");
        Some(self.state)
    }

    /// Drop the answer to a prompt whose attempt has ended.
    ///
    /// Clears the in-flight flag but keeps the recorded state, which may
    /// already reflect a newer check. Returns false if no prompt was
    /// outstanding.
    pub fn discard(&mut self, response: PermissionResponse) -> bool {
        if !self.in_flight {
            tracing::debug!(?response, "Ignoring unsolicited authorization result");
            return false;
        }

        self.in_flight = false;
        tracing::debug!(?response, state = %self.state, "Discarded stale authorization result");
        true
    }

    /// Forget the last observed state. An outstanding prompt stays outstanding.
    pub fn reset(&mut self) {
        self.state = AuthorizationState::Unknown;
    }
}
