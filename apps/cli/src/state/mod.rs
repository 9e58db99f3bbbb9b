//! # State Module
//!
//! Shared state for the taximeter front end.
//!
//! ## Separate State Types
//! Each concern gets its own state type and its own lock. A command
//! declares exactly which states it needs, and an idle history file never
//! blocks a fare readout.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐ │
//! │  │  MeterState  │  │  RatesState  │  │ HistoryState │  │ConfigState │ │
//! │  │              │  │              │  │              │  │            │ │
//! │  │  Arc<Mutex<  │  │  Arc<Mutex<  │  │  Arc<Mutex<  │  │ paths      │ │
//! │  │   TripMeter  │  │   RateStore  │  │   dyn        │  │ currency   │ │
//! │  │  >>          │  │  >>          │  │   HistorySink│  │ symbol     │ │
//! │  │              │  │              │  │  >>          │  │            │ │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └────────────┘ │
//! │                                                                         │
//! │  LOCK ORDER (finish_trip): rates (copy, release) → meter → history     │
//! │  No command holds two locks at once.                                    │
//! │                                                                         │
//! │  ConfigState is read-only after startup, so it has no lock.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod history;
mod meter;
mod rates;

pub use config::{ConfigError, ConfigState};
pub use history::HistoryState;
pub use meter::{MeterState, SharedClock};
pub use rates::RatesState;
