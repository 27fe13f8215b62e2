//! Navigate module
//!
//! Handles the working directory that file operations are scoped to,
//! including opening it at startup and changing it on request.

mod directory;
mod operations;

// Re-export public types and functions
pub use directory::WorkingDirectory;
pub use operations::change_directory;
