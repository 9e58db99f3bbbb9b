//! # Rate Store
//!
//! Owns the rate table for a session and keeps its persisted copy in sync.
//!
//! ## Rate Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Rate Lifecycle                                    │
//! │                                                                         │
//! │  1. LOAD                                                               │
//! │     └── RateStore::load(backend)                                       │
//! │         ├── nothing stored  → defaults (NOT written back)              │
//! │         ├── corrupt record  → defaults + warning                       │
//! │         └── valid record    → stored rates                             │
//! │                                                                         │
//! │  2. READ (every fare computation)                                      │
//! │     └── rates() → copy of the in-memory table                          │
//! │                                                                         │
//! │  3. UPDATE                                                             │
//! │     └── update_rates(stopped?, moving?)                                │
//! │         ├── any input invalid → InvalidRate, nothing changes           │
//! │         └── all valid → apply in memory → save()                       │
//! │                           └── save fails → error, memory keeps update  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Backends
//! Storage sits behind [`RatePersistence`] so tests and ephemeral sessions
//! can use [`MemoryRates`] instead of a file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use taxi_core::validation::parse_rate;
use taxi_core::{CoreError, RateField, RateTable};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Backends
// =============================================================================

/// Durable storage for one rate table.
pub trait RatePersistence {
    /// Reads the stored table. `Ok(None)` means nothing has been stored yet.
    fn load(&self) -> StoreResult<Option<RateTable>>;

    /// Replaces the stored table.
    fn save(&mut self, rates: &RateTable) -> StoreResult<()>;
}

impl<P: RatePersistence + ?Sized> RatePersistence for Box<P> {
    fn load(&self) -> StoreResult<Option<RateTable>> {
        (**self).load()
    }

    fn save(&mut self, rates: &RateTable) -> StoreResult<()> {
        (**self).save(rates)
    }
}

/// Rates kept as a JSON object in a file, e.g. `rates.json`.
///
/// ## File Format
/// ```json
/// {"stopped":0.02,"moving":0.05}
/// ```
#[derive(Debug, Clone)]
pub struct JsonRateFile {
    path: PathBuf,
}

impl JsonRateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonRateFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RatePersistence for JsonRateFile {
    fn load(&self) -> StoreResult<Option<RateTable>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No rates file, using defaults");
                return Ok(None);
            }
            Err(e) => return Err(StoreError::read_failed(&self.path, e)),
        };

        let rates: RateTable = serde_json::from_str(&text)
            .map_err(|e| StoreError::corrupt(&self.path, e.to_string()))?;
        rates
            .validate()
            .map_err(|e| StoreError::corrupt(&self.path, e.to_string()))?;

        Ok(Some(rates))
    }

    fn save(&mut self, rates: &RateTable) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::write_failed(parent, e))?;
        }

        let json = serde_json::to_string(rates)
            .map_err(|e| StoreError::corrupt(&self.path, e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| StoreError::write_failed(&self.path, e))?;

        debug!(path = %self.path.display(), "Rates saved");
        Ok(())
    }
}

/// In-memory backend for tests and sessions that should not touch disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryRates {
    stored: Option<RateTable>,
    saves: usize,
    fail_writes: bool,
}

impl MemoryRates {
    pub fn new() -> Self {
        MemoryRates::default()
    }

    /// Starts with `rates` already stored.
    pub fn with_stored(rates: RateTable) -> Self {
        MemoryRates {
            stored: Some(rates),
            ..MemoryRates::default()
        }
    }

    /// A backend whose every save fails, as a full disk would.
    pub fn failing() -> Self {
        MemoryRates {
            fail_writes: true,
            ..MemoryRates::default()
        }
    }

    /// The table as last saved.
    pub fn stored(&self) -> Option<RateTable> {
        self.stored
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl RatePersistence for MemoryRates {
    fn load(&self) -> StoreResult<Option<RateTable>> {
        Ok(self.stored)
    }

    fn save(&mut self, rates: &RateTable) -> StoreResult<()> {
        if self.fail_writes {
            return Err(StoreError::Unavailable("rate storage is read-only".to_string()));
        }
        self.stored = Some(*rates);
        self.saves += 1;
        Ok(())
    }
}

// =============================================================================
// Rate Store
// =============================================================================

/// The session's rate table plus the backend that persists it.
#[derive(Debug)]
pub struct RateStore<P> {
    rates: RateTable,
    backend: P,
}

impl<P: RatePersistence> RateStore<P> {
    /// Creates a store holding the default rates. Nothing is read or written.
    pub fn new(backend: P) -> Self {
        RateStore {
            rates: RateTable::default(),
            backend,
        }
    }

    /// Creates a store from whatever `backend` holds.
    ///
    /// Never fails: missing storage yields the defaults, and unreadable or
    /// corrupt storage is logged and also yields the defaults. The defaults
    /// are not written back.
    pub fn load(backend: P) -> Self {
        let mut store = RateStore::new(backend);
        if let Err(e) = store.reload() {
            warn!(error = %e, "Could not load saved rates, using defaults");
        }
        store
    }

    /// Re-reads the backend. On error the in-memory table is unchanged.
    pub fn reload(&mut self) -> StoreResult<RateTable> {
        if let Some(rates) = self.backend.load()? {
            self.rates = rates;
            info!(stopped = rates.stopped(), moving = rates.moving(), "Rates loaded");
        }
        Ok(self.rates)
    }

    /// Current rates, read fresh for every fare computation.
    pub fn rates(&self) -> RateTable {
        self.rates
    }

    pub fn backend(&self) -> &P {
        &self.backend
    }

    /// Persists the in-memory table, overwriting the stored one.
    pub fn save(&mut self) -> StoreResult<()> {
        self.backend.save(&self.rates)
    }

    /// Parses `raw` into `field`, then saves.
    ///
    /// ## Errors
    /// - [`StoreError::Core`] with [`CoreError::InvalidRate`]: nothing changed
    /// - Any other variant: the new rate is live in memory but not saved
    pub fn update(&mut self, field: RateField, raw: &str) -> StoreResult<RateTable> {
        let value = parse_rate(field, raw).map_err(CoreError::from)?;
        self.rates.set(field, value)?;
        info!(%field, value, "Rate updated");
        self.save()?;
        Ok(self.rates)
    }

    /// Updates either or both rates from operator input.
    ///
    /// `None` or blank input keeps the current value. Every provided value
    /// is validated before any is applied, so a bad moving rate never
    /// leaves a new stopped rate half-applied. Nothing is saved when no
    /// value was provided.
    ///
    /// ## Errors
    /// Same contract as [`RateStore::update`].
    pub fn update_rates(
        &mut self,
        stopped: Option<&str>,
        moving: Option<&str>,
    ) -> StoreResult<RateTable> {
        let mut next = self.rates;
        let mut changed = false;

        for (field, raw) in RateField::ALL.into_iter().zip([stopped, moving]) {
            let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
                continue;
            };
            let value = parse_rate(field, raw).map_err(CoreError::from)?;
            next.set(field, value)?;
            changed = true;
        }

        if !changed {
            debug!("Rate update with no new values");
            return Ok(self.rates);
        }

        self.rates = next;
        info!(
            stopped = next.stopped(),
            moving = next.moving(),
            "Rates updated"
        );
        self.save()?;
        Ok(self.rates)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use taxi_core::ValidationError;
    use tempfile::TempDir;

    #[test]
    fn test_load_without_storage_uses_defaults_and_writes_nothing() {
        let store = RateStore::load(MemoryRates::new());
        assert_eq!(store.rates(), RateTable::default());
        assert_eq!(store.backend().saves(), 0);
        assert_eq!(store.backend().stored(), None);
    }

    #[test]
    fn test_load_uses_stored_rates() {
        let stored = RateTable::new(0.01, 0.09).unwrap();
        let store = RateStore::load(MemoryRates::with_stored(stored));
        assert_eq!(store.rates(), stored);
    }

    #[test]
    fn test_update_single_field_saves() {
        let mut store = RateStore::load(MemoryRates::new());
        let rates = store.update(RateField::Moving, "0.07").unwrap();

        assert_eq!(rates.moving(), 0.07);
        assert_eq!(rates.stopped(), 0.02);
        assert_eq!(store.backend().stored(), Some(rates));
        assert_eq!(store.backend().saves(), 1);
    }

    #[test]
    fn test_update_rejects_text_without_saving() {
        let mut store = RateStore::load(MemoryRates::new());
        let err = store.update(RateField::Stopped, "abc").unwrap_err();

        assert!(matches!(
            err,
            StoreError::Core(CoreError::InvalidRate(ValidationError::NotANumber { .. }))
        ));
        assert!(!err.is_persistence());
        assert_eq!(store.rates(), RateTable::default());
        assert_eq!(store.backend().saves(), 0);
    }

    #[test]
    fn test_update_rates_is_all_or_nothing() {
        let mut store = RateStore::load(MemoryRates::new());
        let err = store.update_rates(Some("0.04"), Some("-1")).unwrap_err();

        assert!(matches!(err, StoreError::Core(CoreError::InvalidRate(_))));
        assert_eq!(store.rates(), RateTable::default());
        assert_eq!(store.backend().saves(), 0);
    }

    #[test]
    fn test_update_rates_blank_keeps_value() {
        let mut store = RateStore::load(MemoryRates::new());

        let rates = store.update_rates(Some(""), Some(" 0.06 ")).unwrap();
        assert_eq!(rates.stopped(), 0.02);
        assert_eq!(rates.moving(), 0.06);
        assert_eq!(store.backend().saves(), 1);

        let rates = store.update_rates(None, Some("   ")).unwrap();
        assert_eq!(rates.moving(), 0.06);
        assert_eq!(store.backend().saves(), 1);
    }

    #[test]
    fn test_failed_save_keeps_update_in_memory() {
        let mut store = RateStore::load(MemoryRates::failing());
        let err = store.update_rates(Some("0.1"), None).unwrap_err();

        assert!(err.is_persistence());
        assert_eq!(store.rates().stopped(), 0.1);
        assert_eq!(store.backend().stored(), None);
    }

    #[test]
    fn test_json_file_missing_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let file = JsonRateFile::new(dir.path().join("rates.json"));
        assert_eq!(file.load().unwrap(), None);

        let store = RateStore::load(file);
        assert_eq!(store.rates(), RateTable::default());
        assert!(!store.backend().path().exists());
    }

    #[test]
    fn test_json_file_round_trip_through_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("rates.json");

        let mut store = RateStore::load(JsonRateFile::new(&path));
        store.update_rates(Some("0.03"), Some("0.08")).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, r#"{"stopped":0.03,"moving":0.08}"#);

        let reopened = RateStore::load(JsonRateFile::new(&path));
        assert_eq!(reopened.rates(), RateTable::new(0.03, 0.08).unwrap());
    }

    #[test]
    fn test_json_file_corrupt_is_reported_and_defaults_used() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rates.json");

        fs::write(&path, r#"{"stopped": 0.5}"#).unwrap();
        let file = JsonRateFile::new(&path);
        assert!(matches!(file.load(), Err(StoreError::Corrupt { .. })));
        assert_eq!(RateStore::load(file).rates(), RateTable::default());

        fs::write(&path, r#"{"stopped": -0.5, "moving": 0.1}"#).unwrap();
        assert!(matches!(
            JsonRateFile::new(&path).load(),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_json_file_unreadable_is_reported_and_defaults_used() {
        let dir = TempDir::new().unwrap();
        let file = JsonRateFile::new(dir.path());

        let err = file.load().unwrap_err();
        assert!(matches!(err, StoreError::ReadFailed { .. }));
        assert!(err.is_persistence());

        let store = RateStore::load(file);
        assert_eq!(store.rates(), RateTable::default());
    }

    #[test]
    fn test_json_file_unwritable_is_persistence_error() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be overwritten with a file
        let mut file = JsonRateFile::new(dir.path());
        let err = file.save(&RateTable::default()).unwrap_err();
        assert!(matches!(err, StoreError::WriteFailed { .. }));
    }
}
