//! File system storage management
//!
//! Handles file operations, path validation and the records they return.

pub mod operations;
pub mod results;
pub mod validation;

// Re-export commonly used items
pub use operations::{create_file, delete_file, get_file_data, list_files};
pub use results::FileRecord;
pub use validation::{is_confined_name, is_valid_path};
