//! # Error Types
//!
//! Domain-specific error types for taxi-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  taxi-core errors (this file)                                          │
//! │  ├── CoreError        - Trip state machine violations                  │
//! │  └── ValidationError  - Rate / phase input failures                    │
//! │                                                                         │
//! │  taxi-store errors (separate crate)                                    │
//! │  └── StoreError       - File read/write failures                       │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── ApiError         - What the front end shows                       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → ApiError → Display   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error in this file is raised *before* any mutation, so the meter
//! and the rate table are untouched whenever one is returned.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Trip and rate errors raised by the pure core.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// `start` was called while a trip is already running.
    #[error("A trip is already in progress")]
    TripAlreadyActive,

    /// `set_phase`, `peek` or `finish` was called with no trip running.
    #[error("No active trip")]
    NoActiveTrip,

    /// A rate value was rejected.
    #[error("Invalid rate: {0}")]
    InvalidRate(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors for rates and phase names.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Input could not be parsed as a number.
    #[error("{field} rate '{value}' is not a number")]
    NotANumber { field: String, value: String },

    /// Value parsed but is below zero.
    #[error("{field} rate must not be negative")]
    Negative { field: String },

    /// Value parsed to NaN or infinity.
    #[error("{field} rate must be a finite number")]
    NotFinite { field: String },

    /// Phase name is neither stopped nor moving.
    #[error("unknown phase '{value}': expected stopped or moving")]
    UnknownPhase { value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
