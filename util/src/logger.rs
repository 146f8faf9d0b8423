//! Logging to the terminal and the session log file
//!
//! The terminal and the log file are filtered separately. The terminal only
//! shows the run's progress, while the file can also capture the per-cycle
//! detail of individual modules through [`LogConfig::module_levels`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::Colorize;
use log::{self, info, Level, Record};
use std::fmt::Arguments;
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Levels for each output of the logger.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level of messages printed to the terminal, must include `Info`.
    pub console_level: LevelFilter,

    /// Default level of messages written to the log file.
    pub file_level: LevelFilter,

    /// Per-module levels for the log file, overriding `file_level`. Modules
    /// are given by their path, for example `drive_lib::traj_ctrl`.
    pub module_levels: Vec<(&'static str, LevelFilter)>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The console log level must include `INFO`, found `{0}`")]
    InvalidConsoleLevel(LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// Must only be called once, later calls return `FernInitError`.
pub fn logger_init(
    config: &LogConfig,
    session: &session::Session
) -> Result<(), LoggerInitError> {

    if config.console_level < Level::Info {
        return Err(LoggerInitError::InvalidConsoleLevel(config.console_level))
    }

    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFileInitError)?;

    let console = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("{}", format_line(message, record, true)))
        })
        .level(config.console_level)
        .chain(std::io::stdout());

    let mut file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("{}", format_line(message, record, false)))
        })
        .level(config.file_level);
    for &(module, level) in &config.module_levels {
        file = file.level_for(module, level);
    }

    fern::Dispatch::new()
        .chain(console)
        .chain(file.chain(log_file))
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Some(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Console level: {:?}", config.console_level);
    info!("    File level: {:?}", config.file_level);
    for (module, level) in &config.module_levels {
        info!("        {}: {:?}", module, level);
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Format one log line. Debug and trace lines include the module they came
/// from.
fn format_line(message: &Arguments, record: &Record, colour: bool) -> String {
    let level = level_to_str(record.level(), colour);

    if record.level() > Level::Info {
        format!(
            "[{:10.6} {}] {}: {}",
            session::get_elapsed_seconds(),
            level,
            record.target(),
            message
        )
    }
    else {
        format!("[{:10.6} {}] {}", session::get_elapsed_seconds(), level, message)
    }
}

/// Get the string representation of a log level. The log file is written
/// without colour codes.
fn level_to_str(level: Level, colour: bool) -> String {
    let tag = match level {
        Level::Trace => "TRC",
        Level::Debug => "DBG",
        Level::Info  => "INF",
        Level::Warn  => "WRN",
        Level::Error => "ERR"
    };

    if !colour {
        return tag.to_string()
    }

    match level {
        Level::Trace => tag.dimmed().italic(),
        Level::Debug => tag.dimmed(),
        Level::Info  => tag.normal(),
        Level::Warn  => tag.yellow(),
        Level::Error => tag.red().bold()
    }.to_string()
}
