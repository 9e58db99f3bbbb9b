//! # Trip History
//!
//! Append-only log of finished trips.
//!
//! ## Line Format
//! ```text
//! Sat Oct 17 14:03:09 2026 | Stopped: 5.0s | Moving: 3.0s | Total: €0.25
//! └──────────┬───────────┘   └─────┬─────┘   └────┬─────┘   └─────┬────┘
//!   local time, ctime layout   1 decimal       1 decimal     symbol + 2 decimals
//! ```
//!
//! Lines are only ever appended, in finish order. Reading is tolerant:
//! lines that do not match the format come back as [`HistoryEntry::Raw`]
//! instead of failing the whole read. Logs written by the Spanish
//! form-based front end (`Parado` / `Moviendo`) parse as trips too.
//!
//! Every entry keeps the line as stored, so a trip recorded in euros is
//! still shown in euros after the configured symbol changes.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use taxi_core::{Fare, TripRecord};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";
const FIELD_SEPARATOR: &str = " | ";

const STOPPED_LABELS: [&str; 2] = ["Stopped", "Parado"];
const MOVING_LABELS: [&str; 2] = ["Moving", "Moviendo"];
const TOTAL_LABELS: [&str; 1] = ["Total"];

// =============================================================================
// Sink Trait
// =============================================================================

/// One entry of the history as read back.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    /// A line in the trip format.
    Trip {
        record: TripRecord,
        /// The line as stored, labels and currency symbol included.
        line: String,
    },

    /// A line that could not be parsed, kept verbatim.
    Raw(String),
}

impl HistoryEntry {
    /// The text exactly as it appears in the log.
    pub fn line(&self) -> &str {
        match self {
            HistoryEntry::Trip { line, .. } => line,
            HistoryEntry::Raw(line) => line,
        }
    }

    /// The parsed trip, if the line was one.
    pub fn record(&self) -> Option<&TripRecord> {
        match self {
            HistoryEntry::Trip { record, .. } => Some(record),
            HistoryEntry::Raw(_) => None,
        }
    }
}

/// Where finished trips are recorded.
pub trait HistorySink {
    /// Records one finished trip. A failure is reported once; nothing is
    /// retried.
    fn append(&mut self, record: &TripRecord) -> StoreResult<()>;

    /// All entries in append order.
    fn read(&self) -> StoreResult<Vec<HistoryEntry>>;
}

impl<S: HistorySink + ?Sized> HistorySink for Box<S> {
    fn append(&mut self, record: &TripRecord) -> StoreResult<()> {
        (**self).append(record)
    }

    fn read(&self) -> StoreResult<Vec<HistoryEntry>> {
        (**self).read()
    }
}

// =============================================================================
// Line Format
// =============================================================================

/// Renders a record as one history line (without the newline).
pub fn format_line(record: &TripRecord, currency_symbol: &str) -> String {
    format!(
        "{} | Stopped: {:.1}s | Moving: {:.1}s | Total: {}",
        record.finished_at.with_timezone(&Local).format(TIMESTAMP_FORMAT),
        record.stopped_seconds,
        record.moving_seconds,
        record.total_fare.with_symbol(currency_symbol),
    )
}

/// Parses a history line back into a record.
///
/// Precision is what the line holds: whole seconds for the timestamp, one
/// decimal for durations, two for the fare.
pub fn parse_line(line: &str) -> Option<TripRecord> {
    let mut fields = line.trim_end().split(FIELD_SEPARATOR);
    let timestamp = fields.next()?;
    let stopped = fields.next()?;
    let moving = fields.next()?;
    let total = fields.next()?;
    if fields.next().is_some() {
        return None;
    }

    // ctime pads single-digit days with a space
    let timestamp = timestamp.split_whitespace().collect::<Vec<_>>().join(" ");
    let naive = NaiveDateTime::parse_from_str(&timestamp, TIMESTAMP_FORMAT).ok()?;
    let finished_at: DateTime<Utc> = naive
        .and_local_timezone(Local)
        .earliest()?
        .with_timezone(&Utc);

    let stopped_seconds = labelled(stopped, &STOPPED_LABELS)?
        .strip_suffix('s')?
        .parse()
        .ok()?;
    let moving_seconds = labelled(moving, &MOVING_LABELS)?
        .strip_suffix('s')?
        .parse()
        .ok()?;
    let total_fare: f64 = labelled(total, &TOTAL_LABELS)?
        .trim_start_matches(|c: char| !c.is_ascii_digit() && c != '-')
        .parse()
        .ok()?;

    Some(TripRecord {
        stopped_seconds,
        moving_seconds,
        total_fare: Fare::new(total_fare),
        finished_at,
    })
}

/// Returns the value of a `Label: value` field if the label is one of
/// `labels`.
fn labelled<'a>(field: &'a str, labels: &[&str]) -> Option<&'a str> {
    let (label, value) = field.split_once(':')?;
    labels
        .contains(&label.trim())
        .then_some(value.trim())
}

fn parse_entries(text: &str) -> Vec<HistoryEntry> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(|line| match parse_line(line) {
            Some(record) => HistoryEntry::Trip {
                record,
                line: line.to_string(),
            },
            None => HistoryEntry::Raw(line.to_string()),
        })
        .collect()
}

// =============================================================================
// File Log
// =============================================================================

/// History kept as a text file, one line per trip.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
    currency_symbol: String,
}

impl HistoryLog {
    /// A log at `path` writing fares prefixed with `currency_symbol`.
    /// The file is created on the first append.
    pub fn new(path: impl Into<PathBuf>, currency_symbol: impl Into<String>) -> Self {
        HistoryLog {
            path: path.into(),
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistorySink for HistoryLog {
    fn append(&mut self, record: &TripRecord) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::write_failed(parent, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::write_failed(&self.path, e))?;

        // line and newline go out in a single write
        let mut line = format_line(record, &self.currency_symbol);
        line.push('\n');
        file.write_all(line.as_bytes())
            .map_err(|e| StoreError::write_failed(&self.path, e))?;

        info!(
            path = %self.path.display(),
            fare = record.total_fare.amount(),
            "Trip appended to history"
        );
        Ok(())
    }

    fn read(&self) -> StoreResult<Vec<HistoryEntry>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(parse_entries(&text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No history yet");
                Ok(Vec::new())
            }
            Err(e) => Err(StoreError::read_failed(&self.path, e)),
        }
    }
}

// =============================================================================
// Memory Sink
// =============================================================================

/// History kept in memory, for tests and throwaway sessions.
///
/// Lines are rendered with `€` when read back.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    records: Vec<TripRecord>,
    fail_writes: bool,
}

impl MemoryHistory {
    const CURRENCY_SYMBOL: &'static str = "€";

    pub fn new() -> Self {
        MemoryHistory::default()
    }

    /// A sink whose every append fails.
    pub fn failing() -> Self {
        MemoryHistory {
            fail_writes: true,
            ..MemoryHistory::default()
        }
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }
}

impl HistorySink for MemoryHistory {
    fn append(&mut self, record: &TripRecord) -> StoreResult<()> {
        if self.fail_writes {
            return Err(StoreError::Unavailable("history storage is read-only".to_string()));
        }
        self.records.push(record.clone());
        Ok(())
    }

    fn read(&self) -> StoreResult<Vec<HistoryEntry>> {
        Ok(self
            .records
            .iter()
            .map(|record| HistoryEntry::Trip {
                record: record.clone(),
                line: format_line(record, Self::CURRENCY_SYMBOL),
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
