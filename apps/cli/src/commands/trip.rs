//! # Trip Commands
//!
//! Driving the meter through one trip.
//!
//! ## Trip Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Trip Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐  start_trip  ┌──────────┐  set_phase  ┌──────────┐       │
//! │  │   Idle   │─────────────►│ Stopped  │◄───────────►│  Moving  │       │
//! │  └──────────┘              └──────────┘             └──────────┘       │
//! │       ▲                         │                        │              │
//! │       │                         └──────────┬─────────────┘              │
//! │       │                                    │ finish_trip                │
//! │       │                                    ▼                            │
//! │       │                          TripRecord ──► history append          │
//! │       └────────────────────────────────────┘                            │
//! │                                                                         │
//! │  peek_fare / trip_status: read-only, any time during a trip            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locking
//! Commands that need rates copy them first and release the rates lock
//! before taking the meter lock. `finish_trip` appends to the history after
//! the meter lock is released.

use chrono::{DateTime, Utc};
use serde::Serialize;
use taxi_core::{Fare, Phase, TripRecord, TripSnapshot};
use tracing::{debug, error, info};

use crate::error::ApiError;
use crate::state::{HistoryState, MeterState, RatesState};

/// Result of a phase change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseChange {
    /// Phase that was just charged and closed
    pub from: Phase,
    /// Phase now being charged
    pub to: Phase,
}

/// What the meter shows right now.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripStatus {
    pub active: bool,
    /// `None` while idle
    pub phase: Option<Phase>,
    pub stopped_seconds: f64,
    pub moving_seconds: f64,
    pub fare: Fare,
    /// Wall time since `start`
    pub elapsed_seconds: f64,
}

impl TripStatus {
    fn idle() -> Self {
        TripStatus {
            active: false,
            phase: None,
            stopped_seconds: 0.0,
            moving_seconds: 0.0,
            fare: Fare::zero(),
            elapsed_seconds: 0.0,
        }
    }
}

impl From<TripSnapshot> for TripStatus {
    fn from(snapshot: TripSnapshot) -> Self {
        TripStatus {
            active: true,
            phase: Some(snapshot.phase),
            stopped_seconds: snapshot.stopped_seconds,
            moving_seconds: snapshot.moving_seconds,
            fare: snapshot.fare,
            elapsed_seconds: snapshot.elapsed_seconds,
        }
    }
}

/// Summary shown when a trip ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    pub stopped_seconds: f64,
    pub moving_seconds: f64,
    pub total_fare: Fare,
    pub finished_at: DateTime<Utc>,
    /// False when the history append failed. The trip is over either way.
    pub saved_to_history: bool,
}

impl TripSummary {
    fn new(record: &TripRecord, saved_to_history: bool) -> Self {
        TripSummary {
            stopped_seconds: record.stopped_seconds,
            moving_seconds: record.moving_seconds,
            total_fare: record.total_fare,
            finished_at: record.finished_at,
            saved_to_history,
        }
    }
}

/// Starts a new trip in the stopped phase.
///
/// ## Errors
/// - `TRIP_ALREADY_ACTIVE`: the running trip is left untouched
pub fn start_trip(meter: &MeterState) -> Result<Phase, ApiError> {
    debug!("start_trip command");
    meter.with_meter_mut(|m| m.start())?;
    info!("Trip started");
    Ok(Phase::Stopped)
}

/// Charges the elapsed time to the current phase and switches to `target`.
///
/// Selecting the phase already in effect is allowed: the elapsed time is
/// still charged and the phase clock restarts.
///
/// ## Errors
/// - `NO_ACTIVE_TRIP`
pub fn set_phase(meter: &MeterState, target: Phase) -> Result<PhaseChange, ApiError> {
    debug!(%target, "set_phase command");
    let from = meter.with_meter_mut(|m| m.set_phase(target))?;
    info!(%from, to = %target, "Phase changed");
    Ok(PhaseChange { from, to: target })
}

/// Fare so far at the current rates. Changes nothing.
///
/// ## Errors
/// - `NO_ACTIVE_TRIP`
pub fn peek_fare(meter: &MeterState, rates: &RatesState) -> Result<Fare, ApiError> {
    debug!("peek_fare command");
    let table = rates.current();
    Ok(meter.with_meter(|m| m.peek(&table))?)
}

/// Current phase, durations and fare, or an idle status between trips.
pub fn trip_status(meter: &MeterState, rates: &RatesState) -> TripStatus {
    debug!("trip_status command");
    let table = rates.current();
    meter.with_meter(|m| {
        m.snapshot(&table)
            .map(TripStatus::from)
            .unwrap_or_else(|_| TripStatus::idle())
    })
}

/// Ends the trip and records it in the history.
///
/// The meter is idle once this returns `Ok`, even when the history append
/// failed. In that case the summary has `saved_to_history == false`.
///
/// ## Errors
/// - `NO_ACTIVE_TRIP`: nothing is written
pub fn finish_trip(
    meter: &MeterState,
    rates: &RatesState,
    history: &HistoryState,
) -> Result<TripSummary, ApiError> {
    debug!("finish_trip command");
    let table = rates.current();
    let record = meter.with_meter_mut(|m| m.finish(&table))?;

    info!(
        stopped = record.stopped_seconds,
        moving = record.moving_seconds,
        fare = record.total_fare.amount(),
        "Trip finished"
    );

    let saved = match history.with_sink_mut(|sink| sink.append(&record)) {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, "Trip finished but could not be saved to history");
            false
        }
    };

    Ok(TripSummary::new(&record, saved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::history::read_history;
    use crate::commands::rates::update_rates;
    use crate::error::ErrorCode;
    use chrono::TimeZone;
    use std::sync::Arc;
    use std::time::Duration;
    use taxi_core::MockClock;
    use taxi_store::{HistoryEntry, HistoryLog, MemoryHistory, MemoryRates};
    use tempfile::TempDir;

    struct Fixture {
        clock: MockClock,
        meter: MeterState,
        rates: RatesState,
        history: HistoryState,
    }

    fn fixture_with_history(history: HistoryState) -> Fixture {
        let clock = MockClock::new(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap());
        Fixture {
            meter: MeterState::new(Arc::new(clock.clone())),
            clock,
            rates: RatesState::load(MemoryRates::new()),
            history,
        }
    }

    fn fixture() -> Fixture {
        fixture_with_history(HistoryState::new(MemoryHistory::new()))
    }

    #[test]
    fn test_start_trip_twice() {
        let f = fixture();
        assert_eq!(start_trip(&f.meter).unwrap(), Phase::Stopped);

        f.clock.advance(Duration::from_secs(4));
        let err = start_trip(&f.meter).unwrap_err();
        assert_eq!(err.code, ErrorCode::TripAlreadyActive);

        // the running trip kept its accumulated time
        let status = trip_status(&f.meter, &f.rates);
        assert_eq!(status.stopped_seconds, 4.0);
    }

    #[test]
    fn test_idle_commands_fail() {
        let f = fixture();

        assert_eq!(
            set_phase(&f.meter, Phase::Moving).unwrap_err().code,
            ErrorCode::NoActiveTrip
        );
        assert_eq!(
            peek_fare(&f.meter, &f.rates).unwrap_err().code,
            ErrorCode::NoActiveTrip
        );
        assert_eq!(
            finish_trip(&f.meter, &f.rates, &f.history).unwrap_err().code,
            ErrorCode::NoActiveTrip
        );
        assert!(read_history(&f.history).unwrap().is_empty());
    }

    #[test]
    fn test_idle_status() {
        let f = fixture();
        let status = trip_status(&f.meter, &f.rates);
        assert!(!status.active);
        assert_eq!(status.phase, None);
        assert_eq!(status.fare, Fare::zero());
        assert_eq!(status.elapsed_seconds, 0.0);
    }

    #[test]
    fn test_set_phase_reports_transition() {
        let f = fixture();
        start_trip(&f.meter).unwrap();

        let change = set_phase(&f.meter, Phase::Moving).unwrap();
        assert_eq!(
            change,
            PhaseChange {
                from: Phase::Stopped,
                to: Phase::Moving
            }
        );

        let change = set_phase(&f.meter, Phase::Moving).unwrap();
        assert_eq!(change.from, Phase::Moving);
    }

    #[test]
    fn test_peek_uses_current_rates() {
        let f = fixture();
        start_trip(&f.meter).unwrap();
        f.clock.advance(Duration::from_secs(10));

        assert!((peek_fare(&f.meter, &f.rates).unwrap().amount() - 0.2).abs() < 1e-9);

        update_rates(&f.rates, Some("0.1"), None).unwrap();
        assert!((peek_fare(&f.meter, &f.rates).unwrap().amount() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_end_to_end_trip() {
        let f = fixture();

        start_trip(&f.meter).unwrap();
        f.clock.advance(Duration::from_secs(5));
        set_phase(&f.meter, Phase::Moving).unwrap();
        f.clock.advance(Duration::from_secs(3));

        let status = trip_status(&f.meter, &f.rates);
        assert_eq!(status.phase, Some(Phase::Moving));
        assert_eq!(status.moving_seconds, 3.0);
        assert_eq!(status.elapsed_seconds, 8.0);

        let summary = finish_trip(&f.meter, &f.rates, &f.history).unwrap();
        assert_eq!(summary.stopped_seconds, 5.0);
        assert_eq!(summary.moving_seconds, 3.0);
        assert!((summary.total_fare.amount() - 0.25).abs() < 1e-9);
        assert!(summary.saved_to_history);

        let entries = read_history(&f.history).unwrap();
        assert_eq!(entries.len(), 1);
        match &entries[0] {
            HistoryEntry::Trip { record, .. } => {
                assert_eq!(record.stopped_seconds, 5.0);
                assert_eq!(record.moving_seconds, 3.0);
            }
            other => panic!("expected a trip entry, got {other:?}"),
        }

        assert!(!trip_status(&f.meter, &f.rates).active);
    }

    #[test]
    fn test_end_to_end_trip_on_disk() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("history.txt");
        let f = fixture_with_history(HistoryState::new(HistoryLog::new(&log, "€")));

        start_trip(&f.meter).unwrap();
        f.clock.advance(Duration::from_secs(5));
        set_phase(&f.meter, Phase::Moving).unwrap();
        f.clock.advance(Duration::from_secs(3));
        finish_trip(&f.meter, &f.rates, &f.history).unwrap();

        let contents = std::fs::read_to_string(&log).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.ends_with("| Stopped: 5.0s | Moving: 3.0s | Total: €0.25\n"));
    }

    #[test]
    fn test_history_failure_still_ends_trip() {
        let f = fixture_with_history(HistoryState::new(MemoryHistory::failing()));

        start_trip(&f.meter).unwrap();
        f.clock.advance(Duration::from_secs(2));
        let summary = finish_trip(&f.meter, &f.rates, &f.history).unwrap();

        assert!(!summary.saved_to_history);
        assert_eq!(summary.stopped_seconds, 2.0);
        assert!(!trip_status(&f.meter, &f.rates).active);
        assert!(start_trip(&f.meter).is_ok());
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let f = fixture();
        start_trip(&f.meter).unwrap();
        f.clock.advance(Duration::from_secs(10));
        let summary = finish_trip(&f.meter, &f.rates, &f.history).unwrap();

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["stoppedSeconds"], 10.0);
        assert_eq!(json["movingSeconds"], 0.0);
        assert_eq!(json["savedToHistory"], true);
        assert!(json["totalFare"].is_number());
    }
}
