//! Front-End Module Control Library
//!
//! This library provides the PA/LNA sequencing engine for radios with an
//! external front-end module (FEM) on nRF52-class platforms. It binds
//! abstract activate/deactivate triggers to amplifier control outputs so
//! that, once armed, the amplifiers toggle autonomously through the
//! hardware event-routing fabric with no CPU involvement at trigger time.
//!
//! # Architecture
//!
//! The engine is organized in layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CONTROLLER                              │
//! │  FemController: owned context, public operation surface      │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     ENGINE CORE                              │
//! │  Resolver │ Config Store │ Sequencer │ Abort │ Power Split   │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   HARDWARE SEAMS                             │
//! │  EventFabric  │  CompareTimer  │  FemOutputs                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │              BOARD SUPPORT / RTOS (external)                 │
//! │        routing fabric, timers, radio, embassy-rs             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **No hidden globals**: one [`fem::controller::FemController`] per
//!   physical front-end module, passed explicitly
//! - **Type-driven design**: custom types enforce invariants at compile time
//! - **No unsafe in application code**: hardware access stays behind seams
//! - **Functional core, imperative shell**: pure logic separated from I/O
//! - **Explicit error handling**: all fallible operations return `Result`

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_nrf;
#[cfg(feature = "embedded")]
pub use embassy_time;

/// Hardware Abstraction Layer
///
/// Trait seams over the routing fabric, the compare timer, and the
/// amplifier control outputs.
pub mod hal;

/// Sequencing Engine
///
/// Event resolution, configuration store, activation sequencing, abort
/// path, and power split.
pub mod fem;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
#[cfg(feature = "embedded")]
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::fem::controller::{FemCapabilities, FemController};
    pub use crate::types::*;

    // Embassy
    pub use embassy_time::{Duration, Instant, Timer};

    // Error handling
    pub use core::result::Result;

    // Logging
    pub use defmt::{debug, error, info, trace, warn};
}
