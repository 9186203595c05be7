//! geofix - device location acquisition
//!
//! This library coordinates obtaining the device's position from a precise
//! (satellite) source and an approximate (network) source, gated on user
//! authorization, and presents a single current location.
//!
//! # High-Level API
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
//! ```

pub mod config;
pub mod location;
pub mod logging;

/// Version of the geofix library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
