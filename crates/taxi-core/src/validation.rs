//! # Validation Module
//!
//! Input validation for per-second rates.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end                                                    │
//! │  └── Empty input means "keep the current rate"                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── parse_rate: text → f64                                            │
//! │  └── validate_rate: finite and >= 0                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: RateTable                                                    │
//! │  └── Only ever holds values that passed layer 2                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use taxi_core::validation::parse_rate;
//! use taxi_core::RateField;
//!
//! assert_eq!(parse_rate(RateField::Stopped, " 0.03 ").unwrap(), 0.03);
//! assert!(parse_rate(RateField::Moving, "abc").is_err());
//! ```

use crate::error::ValidationError;
use crate::types::RateField;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Parses and validates a rate typed by the operator.
///
/// ## Rules
/// - Surrounding whitespace is ignored
/// - Must parse as a decimal number
/// - Must be finite and not negative (zero is allowed: a free phase)
pub fn parse_rate(field: RateField, input: &str) -> ValidationResult<f64> {
    let input = input.trim();

    let value: f64 = input.parse().map_err(|_| ValidationError::NotANumber {
        field: field.to_string(),
        value: input.to_string(),
    })?;

    validate_rate(field, value)?;
    Ok(value)
}

/// Validates an already-numeric rate.
///
/// Used for values that did not come from text, such as a rate table
/// read back from disk.
pub fn validate_rate(field: RateField, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
