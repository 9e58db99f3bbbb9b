//! # Domain Types
//!
//! Core domain types used throughout the taximeter.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Phase       │   │   RateTable     │   │   TripRecord    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Stopped        │   │  stopped (€/s)  │   │  stopped_seconds│       │
//! │  │  Moving         │   │  moving  (€/s)  │   │  moving_seconds │       │
//! │  └─────────────────┘   └─────────────────┘   │  total_fare     │       │
//! │                                              │  finished_at    │       │
//! │  ┌─────────────────┐   ┌─────────────────┐   └─────────────────┘       │
//! │  │   RateField     │   │  TripSnapshot   │                             │
//! │  │  ─────────────  │   │  ─────────────  │   Snapshot = live view of   │
//! │  │  Stopped        │   │  phase, seconds │   an active trip; Record =  │
//! │  │  Moving         │   │  fare so far    │   frozen summary of a       │
//! │  └─────────────────┘   └─────────────────┘   finished one.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreResult, ValidationError};
use crate::fare::Fare;
use crate::validation::validate_rate;
use crate::{DEFAULT_MOVING_RATE, DEFAULT_STOPPED_RATE};

// =============================================================================
// Phase
// =============================================================================

/// The taxi's current motion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Waiting at a light, in traffic, or for the passenger.
    Stopped,

    /// Driving.
    Moving,
}

impl Phase {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Phase::Stopped => "stopped",
            Phase::Moving => "moving",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stopped" | "stop" => Ok(Phase::Stopped),
            "moving" | "move" => Ok(Phase::Moving),
            other => Err(ValidationError::UnknownPhase {
                value: other.to_string(),
            }),
        }
    }
}

// =============================================================================
// Rates
// =============================================================================

/// Names one of the two entries of a [`RateTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateField {
    Stopped,
    Moving,
}

impl RateField {
    pub const ALL: [RateField; 2] = [RateField::Stopped, RateField::Moving];
}

impl fmt::Display for RateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateField::Stopped => f.write_str("stopped"),
            RateField::Moving => f.write_str("moving"),
        }
    }
}

/// Price per second for each phase.
///
/// ## Invariant
/// Both rates are always present, finite, and not negative. The fields
/// are private so every mutation goes through [`RateTable::set`].
///
/// ## Persisted Form
/// ```json
/// {"stopped": 0.02, "moving": 0.05}
/// ```
/// Deserialization fails if either key is missing. Values read from disk
/// are not range-checked by serde, so loaders call [`RateTable::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    stopped: f64,
    moving: f64,
}

impl RateTable {
    /// Creates a validated rate table.
    pub fn new(stopped: f64, moving: f64) -> CoreResult<Self> {
        let table = RateTable { stopped, moving };
        table.validate()?;
        Ok(table)
    }

    /// Price per second while stopped.
    #[inline]
    pub const fn stopped(&self) -> f64 {
        self.stopped
    }

    /// Price per second while moving.
    #[inline]
    pub const fn moving(&self) -> f64 {
        self.moving
    }

    /// Replaces one rate. The table is untouched if `value` is rejected.
    pub fn set(&mut self, field: RateField, value: f64) -> CoreResult<()> {
        validate_rate(field, value)?;
        match field {
            RateField::Stopped => self.stopped = value,
            RateField::Moving => self.moving = value,
        }
        Ok(())
    }

    /// Checks both rates against the table invariant.
    pub fn validate(&self) -> CoreResult<()> {
        validate_rate(RateField::Stopped, self.stopped)?;
        validate_rate(RateField::Moving, self.moving)?;
        Ok(())
    }
}

impl Default for RateTable {
    /// The built-in tariff: 0.02/s stopped, 0.05/s moving.
    fn default() -> Self {
        RateTable {
            stopped: DEFAULT_STOPPED_RATE,
            moving: DEFAULT_MOVING_RATE,
        }
    }
}

// =============================================================================
// Trip Record
// =============================================================================

/// Immutable summary of one finished trip.
///
/// Produced exactly once per [`TripMeter::finish`](crate::TripMeter::finish)
/// and appended to the history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    /// Seconds spent stopped.
    pub stopped_seconds: f64,

    /// Seconds spent moving.
    pub moving_seconds: f64,

    /// Fare charged at the rates in force when the trip finished.
    pub total_fare: Fare,

    /// When the trip was finished.
    pub finished_at: DateTime<Utc>,
}

impl TripRecord {
    /// Total billed duration of the trip.
    pub fn total_seconds(&self) -> f64 {
        self.stopped_seconds + self.moving_seconds
    }
}

// =============================================================================
// Trip Snapshot
// =============================================================================

/// Live view of an active trip, including the phase still open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TripSnapshot {
    pub phase: Phase,
    pub stopped_seconds: f64,
    pub moving_seconds: f64,
    pub fare: Fare,
    /// Wall time since the trip started.
    pub elapsed_seconds: f64,
}

impl TripSnapshot {
    pub fn total_seconds(&self) -> f64 {
        self.stopped_seconds + self.moving_seconds
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
