//! # Commands Module
//!
//! The driver-facing API. Every front end (the interactive loop today, a
//! reactive UI tomorrow) calls these functions and nothing below them.
//!
//! ## Command Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Organization                                 │
//! │                                                                         │
//! │  trip.rs                                                                │
//! │  ├── start_trip()     Idle → Active(Stopped)                           │
//! │  ├── set_phase()      Stopped ⇄ Moving                                 │
//! │  ├── peek_fare()      running fare, read-only                          │
//! │  ├── trip_status()    phase + durations + fare                         │
//! │  └── finish_trip()    Active → Idle, appends history                   │
//! │                                                                         │
//! │  rates.rs                                                               │
//! │  ├── get_rates()                                                        │
//! │  └── update_rates()   validate all, apply, persist                     │
//! │                                                                         │
//! │  history.rs                                                             │
//! │  └── read_history()                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod history;
pub mod rates;
pub mod trip;
