//! # Meter State
//!
//! Holds the one trip meter of the session.
//!
//! ## Thread Safety
//! The meter is wrapped in `Arc<Mutex<T>>`. Every meter operation reads the
//! clock and then updates the trip, and those two steps must not interleave
//! with another command's.

use std::sync::{Arc, Mutex};

use taxi_core::{Clock, SystemClock, TripMeter};

/// Clock shared between the meter and whoever drives it.
///
/// Production uses [`SystemClock`]; tests hand in a `MockClock` and keep a
/// clone to advance time.
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// Session-wide trip meter.
#[derive(Clone)]
pub struct MeterState {
    meter: Arc<Mutex<TripMeter<SharedClock>>>,
}

impl MeterState {
    /// Creates an idle meter reading the given clock.
    pub fn new(clock: SharedClock) -> Self {
        MeterState {
            meter: Arc::new(Mutex::new(TripMeter::new(clock))),
        }
    }

    /// Creates an idle meter reading the wall clock.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Executes a function with read access to the meter.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let fare = meter_state.with_meter(|m| m.peek(&rates))?;
    /// ```
    pub fn with_meter<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&TripMeter<SharedClock>) -> R,
    {
        let meter = self.meter.lock().expect("Meter mutex poisoned");
        f(&meter)
    }

    /// Executes a function with write access to the meter.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let left = meter_state.with_meter_mut(|m| m.set_phase(Phase::Moving))?;
    /// ```
    pub fn with_meter_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut TripMeter<SharedClock>) -> R,
    {
        let mut meter = self.meter.lock().expect("Meter mutex poisoned");
        f(&mut meter)
    }
}
