//! Error handling
//!
//! Defines error types and handling for the file server.

pub mod handlers;
pub mod types;

pub use handlers::{ApiError, handle_error, status_code};
pub use types::*;
