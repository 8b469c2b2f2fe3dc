//! Logging setup
//!
//! Log lines go to two places. The session log file receives everything at or
//! above the level given to `logger_init`, while the terminal only receives
//! `INFO` and above, so that the per-cycle debug output of the control loop
//! doesn't flood the console.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{info, Level};
use std::fmt;
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Most verbose level that is shown on the terminal.
const TERMINAL_LEVEL: LevelFilter = LevelFilter::Info;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The log file must record at least `INFO` messages, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Error opening the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("A logger has already been set: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// `file_level` is the most verbose level written to the session log file,
/// and must be `INFO` or more verbose. Only one logger can be set per process.
pub fn logger_init(
    file_level: LevelFilter,
    session: &Session
) -> Result<(), LoggerInitError> {

    if file_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(file_level))
    }

    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFileInitError)?;

    let terminal = fern::Dispatch::new()
        .level(TERMINAL_LEVEL)
        .chain(std::io::stdout());

    let file = fern::Dispatch::new()
        .level(file_level)
        .chain(log_file);

    fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!(
            "{}",
            LogLine {
                elapsed_s: session::get_elapsed_seconds(),
                level: record.level(),
                target: record.target(),
                message
            }
        )))
        .chain(terminal)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Ok(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    File log level: {:?}", file_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE
// ---------------------------------------------------------------------------

/// A single formatted log line.
///
/// Debug and trace lines include the target so the emitting module can be
/// found.
struct LogLine<'a, M> {
    elapsed_s: f64,
    level: Level,
    target: &'a str,
    message: M
}

impl<'a, M: fmt::Display> fmt::Display for LogLine<'a, M> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{:10.6} {}] ", self.elapsed_s, level_tag(self.level))?;

        if self.level > Level::Info {
            write!(f, "{}: ", self.target)?;
        }

        write!(f, "{}", self.message)
    }
}

/// Get the coloured tag of a log level
fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info  => "INF".normal(),
        Level::Warn  => "WRN".yellow(),
        Level::Error => "ERR".red().bold()
    }
}
