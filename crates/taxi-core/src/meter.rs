//! # Trip Meter
//!
//! The single-trip state machine.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         TripMeter States                                │
//! │                                                                         │
//! │                 start()                                                 │
//! │     ┌──────┐ ───────────────► ┌──────────────────┐                      │
//! │     │ Idle │                  │ Active(Stopped)  │◄──┐                  │
//! │     └──────┘ ◄─────────────── └────────┬─────────┘   │ set_phase        │
//! │        ▲         finish()              │ set_phase   │ (Stopped)        │
//! │        │                               ▼ (Moving)    │                  │
//! │        │                      ┌──────────────────┐   │                  │
//! │        └───────────────────── │ Active(Moving)   │───┘                  │
//! │               finish()        └──────────────────┘                      │
//! │                                                                         │
//! │  Idle:   set_phase / peek / finish  → NoActiveTrip                      │
//! │  Active: start                      → TripAlreadyActive                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Time Accounting
//! Each phase change flushes `now - phase_started_at` into the accumulator
//! of the phase being *left*, then restarts the phase clock. The open
//! interval is never stored, so every instant between `start` and
//! `finish` lands in exactly one accumulator.
//!
//! Rates are passed in on every `peek`/`finish`; the meter never keeps a
//! copy, so an edit made mid-trip applies to the next computation and
//! reprices the whole trip.

use chrono::{DateTime, Utc};

use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, CoreResult};
use crate::fare::{calculate_fare, Fare};
use crate::types::{Phase, RateTable, TripRecord, TripSnapshot};

// =============================================================================
// Trip State
// =============================================================================

/// Bookkeeping for the trip in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTrip {
    phase: Phase,
    phase_started_at: DateTime<Utc>,
    accumulated_stopped: f64,
    accumulated_moving: f64,
    started_at: DateTime<Utc>,
}

impl ActiveTrip {
    fn begin(now: DateTime<Utc>) -> Self {
        ActiveTrip {
            phase: Phase::Stopped,
            phase_started_at: now,
            accumulated_stopped: 0.0,
            accumulated_moving: 0.0,
            started_at: now,
        }
    }

    /// The phase currently being timed.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// When the current phase was last entered.
    pub fn phase_started_at(&self) -> DateTime<Utc> {
        self.phase_started_at
    }

    /// When the trip started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Seconds accrued in completed `Stopped` intervals.
    pub fn accumulated_stopped(&self) -> f64 {
        self.accumulated_stopped
    }

    /// Seconds accrued in completed `Moving` intervals.
    pub fn accumulated_moving(&self) -> f64 {
        self.accumulated_moving
    }

    /// Per-phase totals as of `now`, with the open interval included.
    fn totals_at(&self, now: DateTime<Utc>) -> (f64, f64) {
        let open = elapsed_seconds(self.phase_started_at, now);
        match self.phase {
            Phase::Stopped => (self.accumulated_stopped + open, self.accumulated_moving),
            Phase::Moving => (self.accumulated_stopped, self.accumulated_moving + open),
        }
    }

    /// Closes the open interval into its accumulator and restarts the
    /// phase clock at `now`.
    fn roll_forward(&mut self, now: DateTime<Utc>) {
        let open = elapsed_seconds(self.phase_started_at, now);
        match self.phase {
            Phase::Stopped => self.accumulated_stopped += open,
            Phase::Moving => self.accumulated_moving += open,
        }
        self.phase_started_at = now;
    }
}

/// Whether a trip is running.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TripState {
    #[default]
    Idle,
    Active(ActiveTrip),
}

/// Seconds from `from` to `to`. A clock that jumped backwards yields zero
/// rather than negative time.
fn elapsed_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from)
        .to_std()
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}

// =============================================================================
// Trip Meter
// =============================================================================

/// Tracks at most one trip and prices it on demand.
///
/// ## Usage
/// ```rust
/// use taxi_core::{CoreError, Phase, RateTable, TripMeter};
///
/// let mut meter = TripMeter::system();
/// assert_eq!(meter.peek(&RateTable::default()), Err(CoreError::NoActiveTrip));
///
/// meter.start().unwrap();
/// assert_eq!(meter.start(), Err(CoreError::TripAlreadyActive));
/// meter.set_phase(Phase::Moving).unwrap();
/// let record = meter.finish(&RateTable::default()).unwrap();
/// assert!(record.total_seconds() >= 0.0);
/// assert!(!meter.is_active());
/// ```
#[derive(Debug)]
pub struct TripMeter<C = SystemClock> {
    clock: C,
    state: TripState,
}

impl TripMeter<SystemClock> {
    /// A meter on the real wall clock.
    pub fn system() -> Self {
        TripMeter::new(SystemClock)
    }
}

impl<C: Clock> TripMeter<C> {
    /// Creates an idle meter reading time from `clock`.
    pub fn new(clock: C) -> Self {
        TripMeter {
            clock,
            state: TripState::Idle,
        }
    }

    /// Current state, for display and inspection.
    pub fn state(&self) -> &TripState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, TripState::Active(_))
    }

    /// The open phase, or `None` when idle.
    pub fn phase(&self) -> Option<Phase> {
        match &self.state {
            TripState::Active(trip) => Some(trip.phase),
            TripState::Idle => None,
        }
    }

    /// Begins a new trip in the `Stopped` phase with empty accumulators.
    ///
    /// ## Errors
    /// [`CoreError::TripAlreadyActive`] if a trip is running; that trip is
    /// left exactly as it was.
    pub fn start(&mut self) -> CoreResult<()> {
        if self.is_active() {
            return Err(CoreError::TripAlreadyActive);
        }

        self.state = TripState::Active(ActiveTrip::begin(self.clock.now()));
        Ok(())
    }

    /// Switches to `target`, charging the elapsed interval to the phase
    /// being left. Returns that phase.
    ///
    /// `target` may equal the current phase: the elapsed time is flushed
    /// into the same accumulator and the phase clock restarts.
    ///
    /// ## Errors
    /// [`CoreError::NoActiveTrip`] when idle.
    pub fn set_phase(&mut self, target: Phase) -> CoreResult<Phase> {
        let TripState::Active(trip) = &mut self.state else {
            return Err(CoreError::NoActiveTrip);
        };

        let left = trip.phase;
        trip.roll_forward(self.clock.now());
        trip.phase = target;
        Ok(left)
    }

    /// Fare so far at `rates`, counting the open interval. Mutates nothing.
    ///
    /// ## Errors
    /// [`CoreError::NoActiveTrip`] when idle.
    pub fn peek(&self, rates: &RateTable) -> CoreResult<Fare> {
        self.snapshot(rates).map(|snapshot| snapshot.fare)
    }

    /// Live per-phase breakdown and fare so far at `rates`. Mutates nothing.
    ///
    /// ## Errors
    /// [`CoreError::NoActiveTrip`] when idle.
    pub fn snapshot(&self, rates: &RateTable) -> CoreResult<TripSnapshot> {
        let TripState::Active(trip) = &self.state else {
            return Err(CoreError::NoActiveTrip);
        };

        let now = self.clock.now();
        let (stopped_seconds, moving_seconds) = trip.totals_at(now);
        Ok(TripSnapshot {
            phase: trip.phase,
            stopped_seconds,
            moving_seconds,
            fare: calculate_fare(stopped_seconds, moving_seconds, rates),
            elapsed_seconds: elapsed_seconds(trip.started_at, now),
        })
    }

    /// Ends the trip: flushes the final interval, prices the trip at
    /// `rates`, and returns to idle.
    ///
    /// ## Errors
    /// [`CoreError::NoActiveTrip`] when idle.
    pub fn finish(&mut self, rates: &RateTable) -> CoreResult<TripRecord> {
        let TripState::Active(trip) = &mut self.state else {
            return Err(CoreError::NoActiveTrip);
        };

        let now = self.clock.now();
        trip.roll_forward(now);

        let record = TripRecord {
            stopped_seconds: trip.accumulated_stopped,
            moving_seconds: trip.accumulated_moving,
            total_fare: calculate_fare(trip.accumulated_stopped, trip.accumulated_moving, rates),
            finished_at: now,
        };

        self.state = TripState::Idle;
        Ok(record)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
