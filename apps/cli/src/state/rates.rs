//! # Rates State
//!
//! Holds the session's rate store behind a lock.
//!
//! The backend is boxed so the same state type serves the JSON file in
//! production and the in-memory store in tests.

use std::sync::{Arc, Mutex};

use taxi_core::RateTable;
use taxi_store::{RatePersistence, RateStore};

type BoxedRates = Box<dyn RatePersistence + Send>;

/// Session-wide rate store.
#[derive(Clone)]
pub struct RatesState {
    store: Arc<Mutex<RateStore<BoxedRates>>>,
}

impl RatesState {
    /// Loads the rate table from `backend`, falling back to the defaults.
    pub fn load<P>(backend: P) -> Self
    where
        P: RatePersistence + Send + 'static,
    {
        let backend: BoxedRates = Box::new(backend);
        RatesState {
            store: Arc::new(Mutex::new(RateStore::load(backend))),
        }
    }

    /// Copy of the rates currently in effect.
    ///
    /// The lock is released before this returns, so callers can go on to
    /// lock the meter without holding both.
    pub fn current(&self) -> RateTable {
        self.with_store(|store| store.rates())
    }

    /// Executes a function with read access to the store.
    pub fn with_store<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&RateStore<BoxedRates>) -> R,
    {
        let store = self.store.lock().expect("Rates mutex poisoned");
        f(&store)
    }

    /// Executes a function with write access to the store.
    pub fn with_store_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut RateStore<BoxedRates>) -> R,
    {
        let mut store = self.store.lock().expect("Rates mutex poisoned");
        f(&mut store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxi_store::MemoryRates;

    #[test]
    fn test_load_uses_stored_rates() {
        let stored = RateTable::new(0.03, 0.07).unwrap();
        let state = RatesState::load(MemoryRates::with_stored(stored));
        assert_eq!(state.current(), stored);
    }

    #[test]
    fn test_load_defaults_when_nothing_stored() {
        let state = RatesState::load(MemoryRates::new());
        assert_eq!(state.current(), RateTable::default());
    }
}
