//! # Fare Module
//!
//! The `Fare` amount type and the fare formula.
//!
//! ## The Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  total = stopped_seconds × rates.stopped + moving_seconds × rates.moving│
//! │                                                                         │
//! │  • Pure: same seconds + same rates = same fare                         │
//! │  • Rates are read when the fare is computed, never when the trip       │
//! │    started, so a rate edit mid-trip reprices the WHOLE trip            │
//! │  • No rounding here; two decimals is a display concern                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use taxi_core::{calculate_fare, RateTable};
//!
//! let fare = calculate_fare(10.0, 20.0, &RateTable::default());
//! assert!((fare.amount() - 1.2).abs() < 1e-9);
//! assert_eq!(fare.to_string(), "1.20");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::RateTable;

// =============================================================================
// Fare Type
// =============================================================================

/// A currency amount charged for (part of) a trip.
///
/// ## Design Decisions
/// - **f64**: rates are fractional cents per second, so the accumulated
///   amount is inherently fractional. Sub-cent rounding is out of scope.
/// - **No currency**: the symbol is chosen by the front end.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fare(f64);

impl Fare {
    #[inline]
    pub const fn new(amount: f64) -> Self {
        Fare(amount)
    }

    #[inline]
    pub const fn zero() -> Self {
        Fare(0.0)
    }

    /// The raw amount in currency units.
    #[inline]
    pub const fn amount(&self) -> f64 {
        self.0
    }

    /// Formats the amount with a currency prefix, e.g. `€1.20`.
    ///
    /// ```rust
    /// use taxi_core::Fare;
    ///
    /// assert_eq!(Fare::new(0.25).with_symbol("€"), "€0.25");
    /// assert_eq!(Fare::new(12.0).with_symbol("$"), "$12.00");
    /// ```
    pub fn with_symbol(&self, symbol: &str) -> String {
        format!("{}{:.2}", symbol, self.0)
    }
}

/// Two decimals, no symbol.
impl fmt::Display for Fare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

// =============================================================================
// Fare Formula
// =============================================================================

/// Prices a trip from its per-phase durations.
///
/// ## User Workflow
/// ```text
/// show / finish
///      │
///      ▼
/// meter flushes open phase into a copy (show) or the real accumulators (finish)
///      │
///      ▼
/// calculate_fare(stopped, moving, current rates) ← THIS FUNCTION
///      │
///      ▼
/// "Current fare: €0.25"
/// ```
pub fn calculate_fare(stopped_seconds: f64, moving_seconds: f64, rates: &RateTable) -> Fare {
    Fare(stopped_seconds * rates.stopped() + moving_seconds * rates.moving())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Fare, expected: f64) {
        assert!(
            (actual.amount() - expected).abs() < 1e-9,
            "expected {expected}, got {}",
            actual.amount()
        );
    }

    #[test]
    fn test_formula_default_rates() {
        let fare = calculate_fare(10.0, 20.0, &RateTable::default());
        assert_close(fare, 10.0 * 0.02 + 20.0 * 0.05);
        assert_close(fare, 1.2);
    }

    #[test]
    fn test_formula_zero_durations() {
        assert_close(calculate_fare(0.0, 0.0, &RateTable::default()), 0.0);
    }

    #[test]
    fn test_formula_uses_given_rates() {
        let rates = RateTable::new(0.1, 1.0).unwrap();
        assert_close(calculate_fare(5.0, 3.0, &rates), 3.5);

        let free_waiting = RateTable::new(0.0, 1.0).unwrap();
        assert_close(calculate_fare(100.0, 2.0, &free_waiting), 2.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Fare::new(1.2).to_string(), "1.20");
        assert_eq!(Fare::new(0.0).to_string(), "0.00");
        assert_eq!(Fare::new(0.256).with_symbol("€"), "€0.26");
        assert_eq!(Fare::zero().with_symbol("€"), "€0.00");
    }

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Fare::new(1.5)).unwrap(), "1.5");
    }
}
