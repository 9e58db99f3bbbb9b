//! # Rate Commands
//!
//! Reading and changing the per-second rates.

use taxi_core::RateTable;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::RatesState;

/// Gets the rates currently in effect.
pub fn get_rates(rates: &RatesState) -> RateTable {
    debug!("get_rates command");
    rates.current()
}

/// Updates either or both rates.
///
/// `None` or blank input keeps the current value. Both values are checked
/// before either is applied, so a bad moving rate also discards a good
/// stopped rate.
///
/// ## Errors
/// - `INVALID_RATE`: non-numeric, negative or non-finite input; nothing
///   changes
/// - `PERSISTENCE_ERROR`: the new rates apply to this session but could
///   not be saved
pub fn update_rates(
    rates: &RatesState,
    stopped: Option<&str>,
    moving: Option<&str>,
) -> Result<RateTable, ApiError> {
    debug!(?stopped, ?moving, "update_rates command");

    rates
        .with_store_mut(|store| store.update_rates(stopped, moving))
        .map_err(|err| {
            if err.is_persistence() {
                warn!("Rates updated in memory but not saved: {}", err);
                ApiError::persistence(format!(
                    "Rates changed for this session but were not saved: {err}"
                ))
            } else {
                ApiError::from(err)
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use taxi_store::{JsonRateFile, MemoryRates, RatePersistence};
    use tempfile::TempDir;

    #[test]
    fn test_get_rates_defaults() {
        let rates = RatesState::load(MemoryRates::new());
        assert_eq!(get_rates(&rates), RateTable::default());
    }

    #[test]
    fn test_update_one_rate_keeps_the_other() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rates.json");
        let rates = RatesState::load(JsonRateFile::new(&path));

        let updated = update_rates(&rates, Some("0.03"), Some("")).unwrap();
        assert_eq!(updated, RateTable::new(0.03, 0.05).unwrap());
        assert_eq!(get_rates(&rates), updated);
        assert_eq!(JsonRateFile::new(&path).load().unwrap(), Some(updated));
    }

    #[test]
    fn test_non_numeric_rate_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rates.json");
        let rates = RatesState::load(JsonRateFile::new(&path));

        let err = update_rates(&rates, Some("abc"), None).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRate);
        assert_eq!(get_rates(&rates), RateTable::default());
        assert!(!path.exists());
    }

    #[test]
    fn test_bad_second_value_discards_first() {
        let rates = RatesState::load(MemoryRates::new());

        let err = update_rates(&rates, Some("0.04"), Some("-1")).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRate);
        assert_eq!(get_rates(&rates), RateTable::default());
    }

    #[test]
    fn test_save_failure_keeps_session_rates() {
        let rates = RatesState::load(MemoryRates::failing());

        let err = update_rates(&rates, None, Some("0.08")).unwrap_err();
        assert_eq!(err.code, ErrorCode::PersistenceError);
        assert!(err.message.contains("not saved"));
        assert_eq!(get_rates(&rates).moving(), 0.08);
    }
}
