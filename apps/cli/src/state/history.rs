//! # History State
//!
//! Holds the trip history sink behind a lock so appends never interleave.

use std::sync::{Arc, Mutex};

use taxi_store::HistorySink;

type BoxedHistory = Box<dyn HistorySink + Send>;

/// Session-wide history sink.
#[derive(Clone)]
pub struct HistoryState {
    sink: Arc<Mutex<BoxedHistory>>,
}

impl HistoryState {
    /// Wraps a history sink.
    pub fn new<S>(sink: S) -> Self
    where
        S: HistorySink + Send + 'static,
    {
        let sink: BoxedHistory = Box::new(sink);
        HistoryState {
            sink: Arc::new(Mutex::new(sink)),
        }
    }

    /// Executes a function with read access to the sink.
    pub fn with_sink<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&BoxedHistory) -> R,
    {
        let sink = self.sink.lock().expect("History mutex poisoned");
        f(&sink)
    }

    /// Executes a function with write access to the sink.
    pub fn with_sink_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut BoxedHistory) -> R,
    {
        let mut sink = self.sink.lock().expect("History mutex poisoned");
        f(&mut sink)
    }
}
