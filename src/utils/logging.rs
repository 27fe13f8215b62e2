//! Logging utilities
//!
//! Provides logging setup and configuration.

use env_logger::fmt::Formatter;
use env_logger::{Builder, Logger, Target};
use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::error::ServerError;

/// Size at which the log file is rotated.
pub const LOG_FILE_MAX_BYTES: usize = 1024;

/// Rotated files kept next to the live one (`server.log.1` .. `.3`).
pub const LOG_FILE_BACKUPS: usize = 3;

/// Setup logging for the server
///
/// Console output honours the configured level (`RUST_LOG` can refine it).
/// With a log file configured, every record of every level also goes to that
/// file, which rotates by size.
pub fn setup_logging(config: &AppConfig) -> Result<(), ServerError> {
    let logger = ServerLogger::new(config)?;
    let max_level = logger.max_level();

    // A logger installed earlier (tests) is not an error
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(max_level);
    }
    Ok(())
}

/// Log file names without an extension get `.log` appended.
pub fn log_file_path(name: &Path) -> PathBuf {
    let has_dot = name
        .file_name()
        .is_some_and(|file_name| file_name.to_string_lossy().contains('.'));

    if has_dot {
        name.to_path_buf()
    } else {
        let mut path = name.as_os_str().to_owned();
        path.push(".log");
        PathBuf::from(path)
    }
}

fn format_line(buf: &mut Formatter, record: &Record) -> io::Result<()> {
    writeln!(
        buf,
        "{} - [{}] - {} - ({}:{}) - {}",
        buf.timestamp_millis(),
        record.level(),
        record.target(),
        record.file().unwrap_or("?"),
        record.line().unwrap_or(0),
        record.args()
    )
}

/// Size-rotated writer for the log file.
///
/// The file is opened up front so a bad path fails startup.
fn rotating_file(path: &Path) -> Result<FileRotate<AppendCount>, ServerError> {
    let path = std::path::absolute(path).map_err(|source| ServerError::LogFile {
        path: path.to_path_buf(),
        source,
    })?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| ServerError::LogFile {
            path: path.clone(),
            source,
        })?;

    Ok(FileRotate::new(
        path,
        AppendCount::new(LOG_FILE_BACKUPS),
        ContentLimit::BytesSurpassed(LOG_FILE_MAX_BYTES),
        Compression::None,
        #[cfg(unix)]
        None,
    ))
}

/// Console logger filtered at the configured level, plus an unfiltered
/// file logger when a log file is set.
struct ServerLogger {
    console: Logger,
    file: Option<Logger>,
}

impl ServerLogger {
    fn new(config: &AppConfig) -> Result<Self, ServerError> {
        let console = Builder::new()
            .filter_level(config.log_level.to_level_filter())
            .parse_default_env()
            .format(format_line)
            .target(Target::Stdout)
            .build();

        let file = match &config.log_file {
            Some(name) => {
                let writer = rotating_file(&log_file_path(name))?;
                Some(
                    Builder::new()
                        .filter_level(LevelFilter::Trace)
                        .format(format_line)
                        .target(Target::Pipe(Box::new(writer)))
                        .build(),
                )
            }
            None => None,
        };

        Ok(Self { console, file })
    }

    fn max_level(&self) -> LevelFilter {
        match &self.file {
            Some(file) => self.console.filter().max(file.filter()),
            None => self.console.filter(),
        }
    }
}

impl Log for ServerLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console.enabled(metadata) || self.file.as_ref().is_some_and(|f| f.enabled(metadata))
    }

    fn log(&self, record: &Record) {
        self.console.log(record);
        if let Some(file) = &self.file {
            file.log(record);
        }
    }

    fn flush(&self) {
        self.console.flush();
        if let Some(file) = &self.file {
            file.flush();
        }
    }
}
