//! # Taximeter CLI Library
//!
//! Wires configuration, storage and the trip meter together and runs the
//! interactive loop.
//!
//! ## Module Organization
//! ```text
//! taxi_cli/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── meter.rs    ◄─── Trip meter behind a lock
//! │   ├── rates.rs    ◄─── Rate store behind a lock
//! │   ├── history.rs  ◄─── History sink behind a lock
//! │   └── config.rs   ◄─── Paths and currency symbol
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── trip.rs     ◄─── start / set_phase / peek / status / finish
//! │   ├── rates.rs    ◄─── get_rates / update_rates
//! │   └── history.rs  ◄─── read_history
//! ├── repl.rs         ◄─── Interactive loop on stdin/stdout
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (stderr, so it never mixes with the prompt)
//! 2. Resolve configuration
//! 3. Load the rate table (defaults if missing or unreadable)
//! 4. Open the history log
//! 5. Run the loop until `exit` or end of input

pub mod commands;
pub mod error;
pub mod repl;
pub mod state;

use anyhow::Context;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use repl::Repl;
use state::{ConfigState, HistoryState, MeterState, RatesState};
use taxi_store::{HistoryLog, JsonRateFile};

/// Runs the taximeter on stdin/stdout.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    let config = ConfigState::from_env().context("Failed to load configuration")?;
    info!(
        rates = %config.rates_path.display(),
        history = %config.history_path.display(),
        "Starting taximeter"
    );

    let rates = RatesState::load(JsonRateFile::new(&config.rates_path));
    let history = HistoryState::new(HistoryLog::new(
        &config.history_path,
        &config.currency_symbol,
    ));
    let repl = Repl::new(MeterState::system(), rates, history, config);

    repl.run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .context("Terminal I/O failed")?;

    info!("Taximeter stopped");
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,taxi=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
