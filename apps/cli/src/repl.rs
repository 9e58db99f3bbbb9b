//! # Interactive Loop
//!
//! Text front end over the command layer.
//!
//! ## Session
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  > start                                                               │
//! │  Trip started. Current state: 'stopped'.                               │
//! │  > move                                                                │
//! │  State changed to 'moving'.                                            │
//! │  > show                                                                │
//! │  Current fare: €0.15                                                   │
//! │  > finish                                                              │
//! │  --- Trip Summary ---                                                  │
//! │  Stopped time : 5.0 seconds                                            │
//! │  Moving time  : 3.0 seconds                                            │
//! │  Total fare   : €0.25                                                  │
//! │  --------------------                                                  │
//! │  > exit                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop is generic over the reader and writer so tests can drive it
//! with byte buffers. End of input behaves like `exit`.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

use taxi_core::Phase;

use crate::commands::{history, rates, trip};
use crate::error::{ApiError, ErrorCode};
use crate::state::{ConfigState, HistoryState, MeterState, RatesState};

const COMMAND_LIST: &str = "start, stop, move, show, status, finish, rates, history, help, exit";

const HELP: &str = "\
Commands:
  start    Start a new trip (the taxi starts stopped)
  stop     Charge the stopped rate from now on
  move     Charge the moving rate from now on
  show     Show the fare so far
  status   Show the phase, times and fare so far
  finish   End the trip, show the summary and save it to the history
  rates    Show and change the per-second rates
  history  Show every recorded trip
  help     Show this list
  exit     Leave the program";

/// One line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Phase(Phase),
    Show,
    Status,
    Finish,
    Rates,
    History,
    Help,
    Exit,
    Unknown(String),
}

impl Command {
    /// Parses a command word. Case and surrounding space are ignored.
    pub fn parse(input: &str) -> Self {
        let word = input.trim().to_lowercase();
        match word.as_str() {
            "start" => Command::Start,
            "show" => Command::Show,
            "status" => Command::Status,
            "finish" => Command::Finish,
            "rates" => Command::Rates,
            "history" => Command::History,
            "help" | "?" => Command::Help,
            "exit" | "quit" => Command::Exit,
            // stop / stopped / move / moving
            other => match other.parse::<Phase>() {
                Ok(phase) => Command::Phase(phase),
                Err(_) => Command::Unknown(other.to_string()),
            },
        }
    }
}

/// The interactive taximeter.
pub struct Repl {
    meter: MeterState,
    rates: RatesState,
    history: HistoryState,
    config: ConfigState,
}

impl Repl {
    pub fn new(
        meter: MeterState,
        rates: RatesState,
        history: HistoryState,
        config: ConfigState,
    ) -> Self {
        Repl {
            meter,
            rates,
            history,
            config,
        }
    }

    /// Reads commands until `exit` or end of input.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();

        write_line(&mut output, "Welcome to the digital taximeter.").await?;
        write_line(&mut output, &format!("Available commands: {COMMAND_LIST}")).await?;

        loop {
            let Some(line) = prompt(&mut lines, &mut output, "> ").await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let command = Command::parse(&line);
            tracing::debug!(?command, "Operator command");

            let reply = match command {
                Command::Start => self.start(),
                Command::Phase(phase) => self.set_phase(phase),
                Command::Show => self.show(),
                Command::Status => self.status(),
                Command::Finish => self.finish(),
                Command::Rates => self.change_rates(&mut lines, &mut output).await?,
                Command::History => self.history(),
                Command::Help => HELP.to_string(),
                Command::Exit => break,
                Command::Unknown(_) => format!("Unknown command. Use: {COMMAND_LIST}"),
            };
            write_line(&mut output, &reply).await?;
        }

        write_line(&mut output, "Exiting program. Goodbye!").await
    }

    fn start(&self) -> String {
        match trip::start_trip(&self.meter) {
            Ok(phase) => format!("Trip started. Current state: '{phase}'."),
            Err(e) => describe(&e),
        }
    }

    fn set_phase(&self, phase: Phase) -> String {
        match trip::set_phase(&self.meter, phase) {
            Ok(change) => format!("State changed to '{}'.", change.to),
            Err(e) => describe(&e),
        }
    }

    fn show(&self) -> String {
        match trip::peek_fare(&self.meter, &self.rates) {
            Ok(fare) => format!("Current fare: {}", self.config.format_fare(fare)),
            Err(e) => describe(&e),
        }
    }

    fn status(&self) -> String {
        let status = trip::trip_status(&self.meter, &self.rates);
        match status.phase {
            Some(phase) => format!(
                "State: {} | Stopped: {:.1}s | Moving: {:.1}s | Fare: {} | Elapsed: {:.1}s",
                phase,
                status.stopped_seconds,
                status.moving_seconds,
                self.config.format_fare(status.fare),
                status.elapsed_seconds
            ),
            None => "No active trip.".to_string(),
        }
    }

    fn finish(&self) -> String {
        match trip::finish_trip(&self.meter, &self.rates, &self.history) {
            Ok(summary) => {
                let mut text = format!(
                    "--- Trip Summary ---\n\
                     Stopped time : {:.1} seconds\n\
                     Moving time  : {:.1} seconds\n\
                     Total fare   : {}\n\
                     --------------------",
                    summary.stopped_seconds,
                    summary.moving_seconds,
                    self.config.format_fare(summary.total_fare)
                );
                if !summary.saved_to_history {
                    text.push_str("\nWarning: the trip could not be saved to the history.");
                }
                text
            }
            Err(e) => describe(&e),
        }
    }

    async fn change_rates<R, W>(
        &self,
        lines: &mut Lines<R>,
        output: &mut W,
    ) -> std::io::Result<String>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let current = rates::get_rates(&self.rates);
        write_line(
            output,
            &format!(
                "Current rates:\n  Stopped: {} per second\n  Moving : {} per second",
                self.config.format_rate(current.stopped()),
                self.config.format_rate(current.moving())
            ),
        )
        .await?;

        let stopped = prompt(lines, output, "New stopped rate (ENTER to keep): ").await?;
        let moving = prompt(lines, output, "New moving rate (ENTER to keep): ").await?;

        Ok(
            match rates::update_rates(&self.rates, stopped.as_deref(), moving.as_deref()) {
                Ok(_) => "Rates updated.".to_string(),
                Err(e) => describe(&e),
            },
        )
    }

    fn history(&self) -> String {
        match history::read_history(&self.history) {
            Ok(entries) if entries.is_empty() => "No trips recorded yet.".to_string(),
            Ok(entries) => {
                let mut text = String::from("--- Trip History ---");
                // lines are shown as stored, not re-rendered with the
                // current symbol
                for entry in &entries {
                    text.push('\n');
                    text.push_str(entry.line());
                }
                text.push_str("\n--------------------");
                text
            }
            Err(e) => describe(&e),
        }
    }
}

/// Operator-facing wording for a failed command.
fn describe(err: &ApiError) -> String {
    match err.code {
        ErrorCode::TripAlreadyActive => "A trip is already in progress.".to_string(),
        ErrorCode::NoActiveTrip => "No active trip. Use 'start' first.".to_string(),
        ErrorCode::InvalidRate => format!("{}. Rates not updated.", err.message),
        ErrorCode::PersistenceError => format!("Warning: {}", err.message),
    }
}

async fn write_line<W>(output: &mut W, text: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}

async fn prompt<R, W>(
    lines: &mut Lines<R>,
    output: &mut W,
    text: &str,
) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(text.as_bytes()).await?;
    output.flush().await?;
    lines.next_line().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use taxi_core::MockClock;
    use taxi_store::{HistoryLog, MemoryHistory, MemoryRates};

    fn repl() -> Repl {
        Repl::new(
            MeterState::new(Arc::new(MockClock::default())),
            RatesState::load(MemoryRates::new()),
            HistoryState::new(MemoryHistory::new()),
            ConfigState::default(),
        )
    }

    async fn session(repl: &Repl, input: &str) -> String {
        let mut output = Vec::new();
        repl.run(input.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("start"), Command::Start);
        assert_eq!(Command::parse("  MOVE "), Command::Phase(Phase::Moving));
        assert_eq!(Command::parse("stop"), Command::Phase(Phase::Stopped));
        assert_eq!(Command::parse("moving"), Command::Phase(Phase::Moving));
        assert_eq!(Command::parse("quit"), Command::Exit);
        assert_eq!(Command::parse("fly"), Command::Unknown("fly".to_string()));
    }

    #[tokio::test]
    async fn test_trip_session() {
        let repl = repl();
        let out = session(&repl, "start\nstart\nmove\nshow\nstatus\nfinish\nexit\n").await;

        assert!(out.contains("Trip started. Current state: 'stopped'."));
        assert!(out.contains("A trip is already in progress."));
        assert!(out.contains("State changed to 'moving'."));
        assert!(out.contains("Current fare: €0.00"));
        assert!(out.contains(
            "State: moving | Stopped: 0.0s | Moving: 0.0s | Fare: €0.00 | Elapsed: 0.0s"
        ));
        assert!(out.contains("--- Trip Summary ---"));
        assert!(out.contains("Total fare   : €0.00"));
        assert!(!out.contains("Warning"));
        assert!(out.ends_with("Exiting program. Goodbye!\n"));
    }

    #[tokio::test]
    async fn test_commands_without_trip() {
        let repl = repl();
        let out = session(&repl, "show\nstop\nfinish\nstatus\n").await;

        assert_eq!(out.matches("No active trip. Use 'start' first.").count(), 3);
        assert!(out.contains("No active trip.\n"));
    }

    #[tokio::test]
    async fn test_unknown_command_lists_commands() {
        let repl = repl();
        let out = session(&repl, "fly\n\nexit\n").await;
        assert!(out.contains(&format!("Unknown command. Use: {COMMAND_LIST}")));
        assert_eq!(out.matches("Unknown command").count(), 1);
    }

    #[tokio::test]
    async fn test_rates_prompts_and_keeps_blank() {
        let repl = repl();
        let out = session(&repl, "rates\n0.03\n\nrates\n\n\nexit\n").await;

        assert!(out.contains("Stopped: €0.02 per second"));
        assert!(out.contains("New stopped rate (ENTER to keep): "));
        assert!(out.contains("Rates updated."));
        assert!(out.contains("Stopped: €0.03 per second"));
        assert!(out.contains("Moving : €0.05 per second"));
        assert_eq!(rates::get_rates(&repl.rates).stopped(), 0.03);
    }

    #[tokio::test]
    async fn test_invalid_rate_is_rejected() {
        let repl = repl();
        let out = session(&repl, "rates\nabc\n0.09\nexit\n").await;

        assert!(out.contains("Invalid rate: stopped rate 'abc' is not a number. Rates not updated."));
        assert_eq!(rates::get_rates(&repl.rates).moving(), 0.05);
    }

    #[tokio::test]
    async fn test_history_after_finish() {
        let repl = repl();
        let out = session(&repl, "history\nstart\nfinish\nhistory\n").await;

        assert!(out.contains("No trips recorded yet."));
        assert!(out.contains("--- Trip History ---"));
        assert!(out.contains("| Stopped: 0.0s | Moving: 0.0s | Total: €0.00"));
    }

    #[tokio::test]
    async fn test_history_shows_lines_as_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.txt");
        std::fs::write(
            &path,
            "Fri Mar 15 12:30:05 2024 | Parado: 5.0s | Moviendo: 3.0s | Total: €0.25\n\
             Fri Mar 15 12:45:00 2024 | Stopped: 1.0s | Moving: 0.0s | Total: €0.02\n",
        )
        .unwrap();

        let config = ConfigState {
            currency_symbol: "$".to_string(),
            ..ConfigState::default()
        };
        let repl = Repl::new(
            MeterState::new(Arc::new(MockClock::default())),
            RatesState::load(MemoryRates::new()),
            HistoryState::new(HistoryLog::new(&path, &config.currency_symbol)),
            config,
        );
        let out = session(&repl, "history\n").await;

        assert!(out.contains("| Parado: 5.0s | Moviendo: 3.0s | Total: €0.25"));
        assert!(out.contains("| Stopped: 1.0s | Moving: 0.0s | Total: €0.02"));
        assert!(!out.contains("$0.25"));
    }

    #[tokio::test]
    async fn test_end_of_input_exits() {
        let repl = repl();
        let out = session(&repl, "help").await;
        assert!(out.contains("finish   End the trip"));
        assert!(out.ends_with("Exiting program. Goodbye!\n"));
    }
}
