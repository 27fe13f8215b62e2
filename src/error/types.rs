//! Error types
//!
//! Defines domain-specific error types for each module of the file server.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Storage module errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    /// Content read back after a write differs from what was written.
    #[error("Incorrect creation of file: {0}")]
    WriteVerificationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Navigate module errors
#[derive(Debug, Error)]
pub enum NavigateError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while turning an HTTP request into an operation
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    #[error("Method {method} not allowed on {path}")]
    MethodNotAllowed { method: String, path: String },

    #[error("Request body exceeds {0} bytes")]
    BodyTooLarge(u64),
}

/// Top-level server error
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Failed to bind to {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("Failed to open log file {path}: {source}")]
    LogFile { path: PathBuf, source: io::Error },

    #[error("Working directory error: {0}")]
    Navigate(#[from] NavigateError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
