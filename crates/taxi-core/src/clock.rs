//! # Clock Module
//!
//! Injectable time source for the trip meter.
//!
//! ## Why a Trait?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Clock Implementations                           │
//! │                                                                         │
//! │            ┌──────────────────────────────────┐                         │
//! │            │ trait Clock { fn now() }         │                         │
//! │            └────────────────┬─────────────────┘                         │
//! │                  ┌──────────┴───────────┐                               │
//! │                  ▼                      ▼                               │
//! │        ┌──────────────────┐   ┌──────────────────────┐                  │
//! │        │ SystemClock      │   │ MockClock            │                  │
//! │        │ Utc::now()       │   │ advanced by hand     │                  │
//! │        │ (production)     │   │ (tests, no sleeping) │                  │
//! │        └──────────────────┘   └──────────────────────┘                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reading the system clock is the only "I/O" the meter needs, and it is
//! confined to [`SystemClock`].

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Source of wall-clock instants.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

// =============================================================================
// System Clock
// =============================================================================

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// =============================================================================
// Mock Clock
// =============================================================================

/// A clock that only moves when told to.
///
/// Clones share the same instant, so a test keeps one handle and gives the
/// other to the meter.
///
/// ## Usage
/// ```rust
/// use std::time::Duration;
/// use taxi_core::{Clock, MockClock};
///
/// let clock = MockClock::default();
/// let meter_handle = clock.clone();
/// let before = meter_handle.now();
///
/// clock.advance(Duration::from_secs(5));
/// assert_eq!((meter_handle.now() - before).num_seconds(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// Creates a mock clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        MockClock {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("MockClock mutex poisoned");
        *now += to_delta(by);
    }

    /// Moves the clock backward, simulating a wall-clock correction.
    pub fn rewind(&self, by: Duration) {
        let mut now = self.now.lock().expect("MockClock mutex poisoned");
        *now -= to_delta(by);
    }

    /// Jumps to an absolute instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().expect("MockClock mutex poisoned") = instant;
    }
}

impl Default for MockClock {
    /// Starts at the Unix epoch so tests never depend on the real time.
    fn default() -> Self {
        MockClock::new(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("MockClock mutex poisoned")
    }
}

fn to_delta(duration: Duration) -> chrono::Duration {
    chrono::Duration::microseconds(duration.as_micros().min(i64::MAX as u128) as i64)
}

// =============================================================================
// Unit Tests
// =============================================================================
