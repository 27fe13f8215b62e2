//! Configuration management for RAX File Server
//!
//! Settings are layered, lowest precedence first: built-in defaults, the
//! config file, command line flags, environment overrides. The result is an
//! immutable [`AppConfig`] built once at startup.

use config::{Config, ConfigError, File, Source, Value, ValueKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::{Cli, LogLevel};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_DIR: &str = "data";
pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Warning;

/// Prefix of the variables environment overrides are read from.
pub const ENV_PREFIX: &str = "FILE_SERVER";

const KEYS: [&str; 5] = ["dir", "log_level", "log_file", "port", "host"];

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Initial working directory, always absolute
    pub dir: PathBuf,
    pub log_level: LogLevel,
    pub log_file: Option<PathBuf>,
    pub port: u16,
    pub host: String,
}

/// Shape of the merged settings before validation
#[derive(Debug, Deserialize)]
struct RawConfig {
    dir: String,
    log_level: String,
    log_file: Option<String>,
    port: u16,
    host: String,
}

impl AppConfig {
    /// Load configuration for this process
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let launch_dir = std::env::current_dir()
            .map_err(|e| ConfigError::Message(format!("Cannot read launch directory: {e}")))?;
        Self::load_with(cli, &launch_dir, |key| std::env::var(key).ok())
    }

    /// Load configuration with an explicit launch directory and environment
    pub fn load_with<F>(cli: &Cli, launch_dir: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder()
            .set_default("dir", DEFAULT_DIR)?
            .set_default("log_level", DEFAULT_LOG_LEVEL.as_str())?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("host", DEFAULT_HOST)?;

        // Keys under INI sections sit just above the defaults
        for (key, value) in section_values(&cli.config)? {
            builder = builder.set_default(key, value)?;
        }

        builder = builder.add_source(File::from(cli.config.as_path()).required(false));

        // Command line flags win over the config file
        if let Some(dir) = &cli.dir {
            builder = builder.set_override("dir", dir.to_string_lossy().to_string())?;
        }
        if let Some(level) = cli.log_level {
            builder = builder.set_override("log_level", level.as_str())?;
        }
        if let Some(log_file) = &cli.log_file {
            builder = builder.set_override("log_file", log_file.to_string_lossy().to_string())?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("port", i64::from(port))?;
        }
        if let Some(host) = &cli.host {
            builder = builder.set_override("host", host.as_str())?;
        }

        for (key, value) in env_overrides(&env)? {
            builder = builder.set_override(key, value)?;
        }

        let raw: RawConfig = builder.build()?.try_deserialize()?;
        let config = Self::from_raw(raw, launch_dir)?;
        config.validate()?;
        Ok(config)
    }

    fn from_raw(raw: RawConfig, launch_dir: &Path) -> Result<Self, ConfigError> {
        if raw.dir.trim().is_empty() {
            return Err(ConfigError::Message("dir cannot be empty".into()));
        }

        let dir = PathBuf::from(&raw.dir);
        let dir = if dir.is_absolute() {
            dir
        } else {
            launch_dir.join(dir)
        };

        let log_level = raw
            .log_level
            .parse::<LogLevel>()
            .map_err(ConfigError::Message)?;

        let log_file = raw
            .log_file
            .filter(|name| !name.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            dir,
            log_level,
            log_file,
            port: raw.port,
            host: raw.host,
        })
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.host.trim().is_empty() {
            return Err(ConfigError::Message("host cannot be empty".into()));
        }

        Ok(())
    }

    /// Get bind address and port as socket address
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Known keys found inside sections of the config file.
///
/// `[server]\nport = 9001` is read as `port`. Sections are merged in name
/// order, so a key repeated in a later section wins.
fn section_values(path: &Path) -> Result<Vec<(&'static str, Value)>, ConfigError> {
    let file = Config::builder()
        .add_source(File::from(path).required(false))
        .build()?;

    let mut sections: Vec<(String, Value)> = file
        .collect()?
        .into_iter()
        .filter(|(_, value)| matches!(value.kind, ValueKind::Table(_)))
        .collect();
    sections.sort_by(|a, b| a.0.cmp(&b.0));

    let mut values = Vec::new();
    for (_, section) in sections {
        let mut table = section.into_table()?;
        for key in KEYS {
            if let Some(value) = table.remove(key) {
                values.push((key, value));
            }
        }
    }

    Ok(values)
}

/// Collects environment overrides.
///
/// A key is overridden when a variable named exactly like the key (`dir`) is
/// set; the value itself is read from the prefixed variable (`FILE_SERVER_DIR`).
/// Deployments rely on this pairing, so a set key without its prefixed
/// counterpart is a configuration error.
fn env_overrides<F>(env: &F) -> Result<Vec<(&'static str, String)>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut overrides = Vec::new();

    for key in KEYS {
        if !env(key).is_some_and(|value| !value.is_empty()) {
            continue;
        }

        let source = format!("{}_{}", ENV_PREFIX, key.to_uppercase());
        match env(&source) {
            Some(value) => overrides.push((key, value)),
            None => return Err(ConfigError::NotFound(source)),
        }
    }

    Ok(overrides)
}
