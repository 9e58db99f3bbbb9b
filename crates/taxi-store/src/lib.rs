//! # taxi-store: Persistence Layer for the Taximeter
//!
//! This crate persists the two things that outlive a session: the rate
//! table and the trip history.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Taximeter Data Flow                              │
//! │                                                                         │
//! │  Command (update_rates / finish_trip / read_history)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    taxi-store (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────────────┐        ┌─────────────────────────┐  │   │
//! │  │   │ RateStore<P>         │        │ HistorySink             │  │   │
//! │  │   │  P: RatePersistence  │        │  ├── HistoryLog (file)  │  │   │
//! │  │   │  ├── JsonRateFile    │        │  └── MemoryHistory      │  │   │
//! │  │   │  └── MemoryRates     │        │                         │  │   │
//! │  │   └──────────────────────┘        └─────────────────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                     │                           │
//! │       ▼                                     ▼                           │
//! │  rates.json  {"stopped":0.02,"moving":0.05}                             │
//! │                                    history.txt (one line per trip)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`rates`] - Rate table persistence and updates
//! - [`history`] - Append-only trip log
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use taxi_store::{HistoryLog, HistorySink, JsonRateFile, RateStore};
//!
//! let mut rates = RateStore::load(JsonRateFile::new("rates.json"));
//! rates.update_rates(Some("0.03"), None)?;
//!
//! let history = HistoryLog::new("history.txt", "€");
//! for entry in history.read()? {
//!     println!("{entry:?}");
//! }
//! # Ok::<(), taxi_store::StoreError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod history;
pub mod rates;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use history::{HistoryEntry, HistoryLog, HistorySink, MemoryHistory};
pub use rates::{JsonRateFile, MemoryRates, RatePersistence, RateStore};
