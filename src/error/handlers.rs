//! Error handlers
//!
//! Maps domain errors to HTTP status codes and logs server-side failures.

use log::{error, warn};
use thiserror::Error;

use crate::error::types::{NavigateError, RequestError, StorageError};

/// Any error an API call can surface to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Navigate(#[from] NavigateError),

    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Convert an error to its HTTP status code
pub fn status_code(err: &ApiError) -> u16 {
    match err {
        ApiError::Storage(e) => match e {
            StorageError::InvalidPath(_) | StorageError::NotAFile(_) => 400,
            StorageError::NotFound(_) => 404,
            StorageError::AlreadyExists(_) => 409,
            StorageError::WriteVerificationFailed(_) | StorageError::Io(_) => 500,
        },
        ApiError::Navigate(e) => match e {
            NavigateError::InvalidPath(_) | NavigateError::NotADirectory(_) => 400,
            NavigateError::DirectoryNotFound(_) => 404,
            NavigateError::Io(_) => 500,
        },
        ApiError::Request(e) => match e {
            RequestError::MalformedBody(_) | RequestError::MissingParameter(_) => 400,
            RequestError::UnknownRoute(_) => 404,
            RequestError::MethodNotAllowed { .. } => 405,
            RequestError::BodyTooLarge(_) => 413,
        },
    }
}

/// Log an API error at a level matching who is at fault
pub fn handle_error(err: &ApiError) {
    if status_code(err) >= 500 {
        error!("Request failed: {err}");
    } else {
        warn!("Request rejected: {err}");
    }
}
