//! Process-wide log bootstrap.
//!
//! Records go through the `log` facade. The webhook pipeline appends them to a
//! local text file and mirrors them on the console; the other pipelines only
//! write to the console.

use crate::error::AppError;
use flexi_logger::{DeferredNow, Duplicate, FileSpec, Logger, LoggerHandle};
use log::Record;
use once_cell::sync::OnceCell;
use std::io::Write;
use std::path::{Path, PathBuf};

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    destination: LogDestination,
    _logger: LoggerHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Console {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDestination {
    /// Appended to when set; every record is still mirrored on `console`.
    pub file: Option<PathBuf>,
    pub console: Console,
}

impl LogDestination {
    pub fn console(console: Console) -> Self {
        Self {
            file: None,
            console,
        }
    }

    pub fn file(path: impl Into<PathBuf>, console: Console) -> Self {
        Self {
            file: Some(path.into()),
            console,
        }
    }
}

/// `2025-01-01 09:30:00 | INFO     | message`
pub fn line_format(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} | {:<8} | {}",
        now.format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.args()
    )
}

/// Starts the logger once per process.
///
/// Repeated calls with the same level and destination are no-ops; any other
/// combination is rejected.
pub fn init_logging(level: &str, destination: LogDestination) -> Result<(), AppError> {
    let level = normalize_level(level)?;
    let destination = LogDestination {
        file: destination.file.as_deref().map(absolute).transpose()?,
        console: destination.console,
    };

    let state = LOGGING_STATE.get_or_try_init(|| start_logger(level, destination.clone()))?;

    if state.level != level || state.destination != destination {
        return Err(AppError::io(format!(
            "logging already initialized with level `{}` and {:?}",
            state.level, state.destination
        )));
    }

    Ok(())
}

fn start_logger(level: &'static str, destination: LogDestination) -> Result<LoggingState, AppError> {
    let logger = Logger::try_with_str(level)
        .map_err(|err| AppError::io(format!("invalid log level `{level}`: {err}")))?
        .format(line_format);

    let logger = match (&destination.file, destination.console) {
        (None, Console::Stdout) => logger.log_to_stdout(),
        (None, Console::Stderr) => logger.log_to_stderr(),
        (Some(path), console) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|err| {
                    AppError::io(format!(
                        "failed to create log directory `{}`: {err}",
                        parent.display()
                    ))
                })?;
            }
            let spec = FileSpec::try_from(path.as_path())
                .map_err(|err| AppError::io(format!("{}: {err}", path.display())))?
                .suppress_timestamp();
            let logger = logger.log_to_file(spec).append();
            match console {
                Console::Stdout => logger.duplicate_to_stdout(Duplicate::All),
                Console::Stderr => logger.duplicate_to_stderr(Duplicate::All),
            }
        }
    };

    let handle = logger
        .start()
        .map_err(|err| AppError::io(format!("failed to start logger: {err}")))?;

    Ok(LoggingState {
        level,
        destination,
        _logger: handle,
    })
}

pub fn normalize_level(level: &str) -> Result<&'static str, AppError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(AppError::configuration(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        ))),
    }
}

fn absolute(path: &Path) -> Result<PathBuf, AppError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|err| AppError::io(err.to_string()))?;
    Ok(cwd.join(path))
}
