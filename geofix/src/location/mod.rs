//! Location acquisition.
//!
//! Obtains the device's geographic position from two independent sources
//! (a precise satellite source and an approximate network source), gated on
//! user authorization, and keeps a single **current location** that is
//! presented to a display surface.
//!
//! # Flow
//!
//! 1. Probe which sources are switched on. If none are, report it and stop.
//! 2. Check authorization; prompt the user if needed and wait for the answer.
//! 3. Subscribe to every enabled source, `Precise` before `Approximate`.
//! 4. Present a cached last-known sample if one exists, else "searching".
//! 5. Every live sample replaces the current location (last writer wins).
//!
//! # Usage
//!
//! ```ignore
//! use geofix::location::{CoordinatorConfig, LocationCoordinator, SimulatedPlatform};
//!
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let (coordinator, events) =
//!     LocationCoordinator::new(SimulatedPlatform::new(), tx, CoordinatorConfig::default());
//! let (handle, _task) = coordinator.spawn(events);
//!
//! handle.start().await?;
//! while let Some(event) = rx.recv().await {
//!     println!("{event}");
//! }
//! ```
//!
//! # Components
//!
//! - [`state`] - Core types: `PositionSource`, `PositionSample`, `CurrentLocation`
//! - [`platform`] - `LocationPlatform` trait and update throttling
//! - [`sink`] - Callback capability traits and the `EventRoute` queue
//! - [`availability`] - One-shot source availability probe
//! - [`authorization`] - `AuthorizationGate` and the prompt round trip
//! - [`merger`] - Last-writer-wins `UpdateMerger`
//! - [`presentation`] - `LocationEvent` and the display/settings traits
//! - [`coordinator`] - `LocationCoordinator` state machine and async handle
//! - [`simulated`] - In-memory `SimulatedPlatform`

pub mod authorization;
pub mod availability;
pub mod coordinator;
pub mod merger;
pub mod platform;
pub mod presentation;
pub mod simulated;
pub mod sink;
pub mod state;

pub use authorization::{AuthorizationError, AuthorizationGate};
pub use availability::AvailabilitySnapshot;
pub use coordinator::{
    CoordinatorConfig, CoordinatorError, CoordinatorHandle, CoordinatorState, CoordinatorStatus,
    LocationCoordinator, StartOutcome,
};
pub use merger::{MergeDecision, UpdateMerger};
pub use platform::{
    LocationPlatform, PermissionResponse, PermissionStatus, PlatformError, SubscriptionId,
    UpdateThrottle,
};
pub use presentation::{Fix, LocationEvent, PresentationSink, SettingsLauncher};
pub use simulated::SimulatedPlatform;
pub use sink::{
    AuthorizationResultSink, EventReceiver, EventRoute, PlatformEvent, PositionUpdateSink,
};
pub use state::{
    AuthorizationState, CurrentLocation, PositionSample, PositionSource, SourceAvailability,
};
