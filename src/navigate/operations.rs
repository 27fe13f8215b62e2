//! Navigation operations implementation

use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::NavigateError;
use crate::storage::validation::is_valid_path;

/// Resolves `target_path` against `current_dir` and makes sure it is an
/// existing directory, creating the final component when `autocreate` is set.
///
/// Returns the canonical absolute path of the new directory. Only the last
/// component is ever created; a missing parent is an error.
pub fn change_directory(
    current_dir: &Path,
    target_path: &str,
    autocreate: bool,
) -> Result<PathBuf, NavigateError> {
    if !is_valid_path(target_path) {
        return Err(NavigateError::InvalidPath(target_path.into()));
    }

    // Absolute targets replace the current directory on join
    let real_path = current_dir.join(target_path);

    match fs::metadata(&real_path) {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => return Err(NavigateError::NotADirectory(target_path.into())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if !autocreate {
                return Err(NavigateError::DirectoryNotFound(target_path.into()));
            }
            fs::create_dir(&real_path).map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => NavigateError::DirectoryNotFound(target_path.into()),
                _ => NavigateError::Io(e),
            })?;
            info!("Created directory {}", real_path.display());
        }
        Err(e) => return Err(NavigateError::Io(e)),
    }

    let canonical_path = real_path.canonicalize()?;
    Ok(canonical_path)
}
