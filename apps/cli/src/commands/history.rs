//! # History Commands

use taxi_store::HistoryEntry;
use tracing::debug;

use crate::error::ApiError;
use crate::state::HistoryState;

/// Reads every finished trip in the order they were recorded.
///
/// Lines that do not parse come back as [`HistoryEntry::Raw`] so nothing
/// the driver wrote is hidden.
pub fn read_history(history: &HistoryState) -> Result<Vec<HistoryEntry>, ApiError> {
    debug!("read_history command");
    Ok(history.with_sink(|sink| sink.read())?)
}
