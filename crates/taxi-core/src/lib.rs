//! # taxi-core: Pure Trip Logic for the Taximeter
//!
//! This crate is the **heart** of the taximeter. It holds the trip state
//! machine and the fare formula with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Taximeter Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Front End (apps/cli)                         │   │
//! │  │    start ──► move / stop ──► show ──► finish ──► history        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ command functions                      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ taxi-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   fare    │  │   meter   │  │   clock   │  │   │
//! │  │   │ RateTable │  │   Fare    │  │ TripMeter │  │  Clock    │  │   │
//! │  │   │ TripRecord│  │  formula  │  │ TripState │  │ MockClock │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO FILES • TIME IS INJECTED                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 taxi-store (Persistence Layer)                  │   │
//! │  │              rates.json, history.txt                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Phase, RateTable, TripRecord, TripSnapshot)
//! - [`fare`] - Fare amount and the fare formula
//! - [`meter`] - The single-trip state machine
//! - [`clock`] - Injectable time source
//! - [`error`] - Domain error types
//! - [`validation`] - Rate input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use std::time::Duration;
//! use taxi_core::{MockClock, Phase, RateTable, TripMeter};
//!
//! let clock = MockClock::default();
//! let mut meter = TripMeter::new(clock.clone());
//! let rates = RateTable::default(); // 0.02 stopped, 0.05 moving
//!
//! meter.start().unwrap();
//! clock.advance(Duration::from_secs(5));
//! meter.set_phase(Phase::Moving).unwrap();
//! clock.advance(Duration::from_secs(3));
//!
//! let record = meter.finish(&rates).unwrap();
//! assert!((record.total_fare.amount() - 0.25).abs() < 1e-9);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod error;
pub mod fare;
pub mod meter;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use clock::{Clock, MockClock, SystemClock};
pub use error::{CoreError, CoreResult, ValidationError};
pub use fare::{calculate_fare, Fare};
pub use meter::{ActiveTrip, TripMeter, TripState};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Built-in price per second while the taxi is stopped.
pub const DEFAULT_STOPPED_RATE: f64 = 0.02;

/// Built-in price per second while the taxi is moving.
pub const DEFAULT_MOVING_RATE: f64 = 0.05;
