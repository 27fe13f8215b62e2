//! The working directory every file operation is resolved against.

use log::info;
use std::path::{Path, PathBuf};

use crate::error::NavigateError;
use crate::navigate::operations::change_directory;

/// Absolute, canonical path of an existing directory.
///
/// Values are immutable: [`WorkingDirectory::change`] hands back a new one and
/// the owner swaps it in only on success, so a failed change never leaves a
/// half-updated root behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDirectory {
    path: PathBuf,
}

impl WorkingDirectory {
    /// Opens the initial working directory, resolving relative paths against
    /// the process launch directory.
    pub fn open(path: impl AsRef<Path>, autocreate: bool) -> Result<Self, NavigateError> {
        let launch_dir = std::env::current_dir()?;
        let target = path.as_ref().to_string_lossy();
        if target.is_empty() {
            return Err(NavigateError::InvalidPath(String::new()));
        }

        let path = change_directory(&launch_dir, &target, autocreate)?;
        info!("Working directory: {}", path.display());
        Ok(Self { path })
    }

    /// Resolves `path` against this directory.
    ///
    /// An empty `path` is a query and returns the current directory as is.
    pub fn change(&self, path: &str, autocreate: bool) -> Result<Self, NavigateError> {
        if path.is_empty() {
            return Ok(self.clone());
        }

        let path = change_directory(&self.path, path, autocreate)?;
        info!(
            "Changed working directory {} -> {}",
            self.path.display(),
            path.display()
        );
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Joins a (validated) file name onto the directory.
    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    pub fn display(&self) -> std::path::Display<'_> {
        self.path.display()
    }
}
