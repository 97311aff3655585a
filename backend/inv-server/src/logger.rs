use crate::error::{Result as ServerErrorResult, ServerError};

use inv_config::LogLevel;

use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::{Record, info};

/// Initialize logger with fern
///
/// # Arguments
/// * `log_level` - Log level filter
/// * `log_file` - Optional path to log file. None = stdout, Some = file output
/// * `colored` - Enable colored output (ignored when logging to file)
pub fn initialize(
    log_level: LogLevel,
    log_file: Option<PathBuf>,
    colored: bool,
) -> ServerErrorResult<()> {
    let level_filter = *log_level;

    let colors = (colored && log_file.is_none()).then(|| {
        ColoredLevelConfig::new()
            .trace(Color::Magenta)
            .debug(Color::Blue)
            .info(Color::Green)
            .warn(Color::Yellow)
            .error(Color::Red)
    });

    let dispatch = Dispatch::new().format(move |out, message, record| {
        let line = match &colors {
            Some(colors) => format_line(colors.color(record.level()), message, record),
            None => format_line(record.level(), message, record),
        };
        out.finish(format_args!("{line}"))
    });

    let dispatch = match &log_file {
        Some(log_path) => {
            let file = fern::log_file(log_path).map_err(|e| ServerError::Logger {
                message: format!("Failed to open log file {}: {e}", log_path.display()),
            })?;
            dispatch.chain(file)
        }
        None => dispatch.chain(std::io::stdout()),
    };

    Dispatch::new()
        .level(level_filter)
        // sqlx logs every statement at info
        .level_for("sqlx", log::LevelFilter::Warn)
        .chain(dispatch)
        .apply()
        .map_err(|e| ServerError::Logger {
            message: format!("Failed to initialize logger: {e}"),
        })?;

    match &log_file {
        Some(path) => info!(
            "Logger initialized: level={level_filter:?}, file={}",
            path.display()
        ),
        None => info!("Logger initialized: level={level_filter:?}, stdout"),
    }

    // Bridge tracing to log
    tracing_log::LogTracer::init().ok();

    Ok(())
}

/// `[<rfc3339> - <LEVEL>] <message> [<file>:<line>]`
pub(crate) fn format_line(
    level: impl fmt::Display,
    message: &fmt::Arguments<'_>,
    record: &Record<'_>,
) -> String {
    format!(
        "[{date} - {level}] {message} [{file}:{line}]",
        date = humantime::format_rfc3339(SystemTime::now()),
        file = record.file().unwrap_or("unknown"),
        line = record.line().unwrap_or(0),
    )
}
