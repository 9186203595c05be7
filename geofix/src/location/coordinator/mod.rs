//! Location acquisition coordinator.
//!
//! The coordinator orchestrates every other component:
//!
//! - Probes source availability once per attempt
//! - Gates acquisition on authorization, prompting when needed
//! - Subscribes to every enabled source (`Precise` first, both concurrently)
//! - Feeds a best-effort last-known sample before live data arrives
//! - Routes every sample through the merger and presents accepted fixes
//!
//! # Module Structure
//!
//! - [`core`] - Synchronous state machine ([`LocationCoordinator`])
//! - [`runner`] - Async actor wrapping the state machine ([`CoordinatorHandle`])
//! - [`status`] - Status snapshot for queries
//! - [`config`] - Coordinator configuration
//!
//! # Example
//!
//! ```ignore
//! use geofix::location::{CoordinatorConfig, LocationCoordinator, SimulatedPlatform};
//!
//! let (events_tx, mut events_rx) = tokio::sync::mpsc::unbounded_channel();
//! let (coordinator, platform_events) =
//!     LocationCoordinator::new(SimulatedPlatform::new(), events_tx, CoordinatorConfig::default());
//! let (handle, task) = coordinator.spawn(platform_events);
//!
//! handle.start().await?;
//! while let Some(event) = events_rx.recv().await {
//!     println!("{}", event);
//! }
//! ```

mod config;
mod core;
mod runner;
mod status;

pub use self::config::CoordinatorConfig;
pub use self::core::{CoordinatorError, CoordinatorState, LocationCoordinator, StartOutcome};
pub use self::runner::CoordinatorHandle;
pub use self::status::CoordinatorStatus;
