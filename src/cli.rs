//! Command line interface

use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Config file looked up when `--config` is not given; the extension is
/// detected (`config.ini`, `config.toml`, ...).
pub const DEFAULT_CONFIG_FILE: &str = "config";

/// Remote-controllable file manager over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "rax-file-server")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Working directory, absolute or relative to the launch directory (default: data)
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Log level for console output (default: warning)
    #[arg(short, long, alias = "log_level", value_enum)]
    pub log_level: Option<LogLevel>,

    /// Name of the log file
    #[arg(short = 'f', long, alias = "log_file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Port to listen on (default: 8080)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind (default: 127.0.0.1)
    #[arg(long)]
    pub host: Option<String>,

    /// Configuration file; only fills settings not given on the command line
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }

    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warning => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!(
                "unknown log level '{other}' (expected debug, info, warning or error)"
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
