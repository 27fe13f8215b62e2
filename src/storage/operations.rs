//! Storage operations
//!
//! Handles file system operations for the API: list, read, create and delete,
//! all scoped to the working directory passed in by the caller.

use log::{error, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::navigate::WorkingDirectory;
use crate::storage::results::FileRecord;
use crate::storage::validation::{is_confined_name, is_valid_path};

/// Lists every entry of the working directory, metadata only.
///
/// An entry removed between enumeration and stat is still listed, with its
/// metadata fields left empty.
pub fn list_files(root: &WorkingDirectory) -> Result<Vec<FileRecord>, StorageError> {
    let entries = fs::read_dir(root.path()).map_err(|e| {
        error!("Failed to list directory {}: {}", root.display(), e);
        StorageError::from(e)
    })?;

    let mut records = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();

        match fs::metadata(entry.path()) {
            Ok(metadata) => records.push(FileRecord::from_metadata(name, &metadata)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Entry {name} vanished while listing {}", root.display());
                records.push(FileRecord::vanished(name));
            }
            Err(e) => return Err(StorageError::from(e)),
        }
    }

    records.sort_by(|a, b| a.name.cmp(&b.name));

    info!("Listed directory {} - {} entries", root.display(), records.len());

    Ok(records)
}

/// Reads a file's full content and metadata.
pub fn get_file_data(root: &WorkingDirectory, filename: &str) -> Result<FileRecord, StorageError> {
    let file_path = resolve_file_path(root, filename)?;

    let metadata = match fs::metadata(&file_path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(StorageError::NotFound(filename.into()));
        }
        Err(e) => return Err(StorageError::from(e)),
    };

    if metadata.is_dir() {
        return Err(StorageError::NotAFile(filename.into()));
    }

    let content = fs::read(&file_path)?;
    let metadata = fs::metadata(&file_path)?;

    info!("Read file {} ({} bytes)", file_path.display(), content.len());

    Ok(FileRecord::from_metadata(filename.into(), &metadata).with_content(content))
}

/// Creates (or overwrites) a file, then reads it back and checks the bytes.
pub fn create_file(
    root: &WorkingDirectory,
    filename: &str,
    content: &[u8],
    overwrite: bool,
) -> Result<FileRecord, StorageError> {
    let file_path = resolve_file_path(root, filename)?;

    match fs::symlink_metadata(&file_path) {
        Ok(_) if !overwrite => {
            return Err(StorageError::AlreadyExists(filename.into()));
        }
        Ok(_) if file_path.is_dir() => {
            return Err(StorageError::NotAFile(filename.into()));
        }
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(StorageError::from(e)),
    }

    fs::write(&file_path, content).map_err(|e| {
        error!("Failed to write file {}: {}", file_path.display(), e);
        StorageError::from(e)
    })?;

    let written = verify_written(&file_path, filename, content)?;
    let metadata = fs::metadata(&file_path)?;

    info!(
        "Created file {} ({} bytes, overwrite: {})",
        file_path.display(),
        written.len(),
        overwrite
    );

    Ok(FileRecord::from_metadata(filename.into(), &metadata).with_content(written))
}

/// Deletes a file, or a directory together with everything below it.
pub fn delete_file(root: &WorkingDirectory, filename: &str) -> Result<(), StorageError> {
    let file_path = resolve_file_path(root, filename)?;

    // Not following symlinks: a link is removed, never its target
    let metadata = match fs::symlink_metadata(&file_path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(StorageError::NotFound(filename.into()));
        }
        Err(e) => return Err(StorageError::from(e)),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(&file_path)
    } else {
        fs::remove_file(&file_path)
    };

    result.map_err(|e| {
        error!("Failed to delete {}: {}", file_path.display(), e);
        StorageError::from(e)
    })?;

    info!("Deleted {}", file_path.display());

    Ok(())
}

/// Reads `path` back and checks it holds exactly `expected`.
fn verify_written(path: &Path, filename: &str, expected: &[u8]) -> Result<Vec<u8>, StorageError> {
    let written = fs::read(path)?;
    if written != expected {
        error!(
            "Verification failed for {}: wrote {} bytes, read back {}",
            path.display(),
            expected.len(),
            written.len()
        );
        return Err(StorageError::WriteVerificationFailed(filename.into()));
    }
    Ok(written)
}

/// Validates a file name and joins it onto the working directory.
fn resolve_file_path(root: &WorkingDirectory, filename: &str) -> Result<PathBuf, StorageError> {
    if !is_confined_name(filename) {
        return Err(StorageError::InvalidPath(filename.into()));
    }

    let file_path = root.join(filename);
    if !is_valid_path(&file_path.to_string_lossy()) {
        return Err(StorageError::InvalidPath(filename.into()));
    }

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, status_code};
    use tempfile::TempDir;

    fn setup() -> (TempDir, WorkingDirectory) {
        let temp_dir = TempDir::new().unwrap();
        let root = WorkingDirectory::open(temp_dir.path(), false).unwrap();
        (temp_dir, root)
    }

    fn names(records: &[FileRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_list_empty_directory() {
        let (_temp_dir, root) = setup();
        assert!(list_files(&root).unwrap().is_empty());
    }

    #[test]
    fn test_list_returns_created_files_with_metadata() {
        let (_temp_dir, root) = setup();
        for name in ["c", "a", "b"] {
            create_file(&root, name, name.as_bytes(), false).unwrap();
        }

        let records = list_files(&root).unwrap();
        assert_eq!(names(&records), vec!["a", "b", "c"]);
        for record in &records {
            assert!(record.has_metadata());
            assert_eq!(record.size, Some(1));
            assert!(record.content.is_none());
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_list_keeps_entries_without_metadata() {
        let (temp_dir, root) = setup();
        // A dangling symlink fails the stat the same way a vanished entry does
        std::os::unix::fs::symlink(temp_dir.path().join("gone"), temp_dir.path().join("link"))
            .unwrap();

        let records = list_files(&root).unwrap();
        assert_eq!(records, vec![FileRecord::vanished("link".into())]);
    }

    #[test]
    fn test_create_then_read_round_trip() {
        let (_temp_dir, root) = setup();
        let content = b"New file content\r\nIn two lines!\x00\xff";

        let created = create_file(&root, "notes.txt", content, true).unwrap();
        assert_eq!(created.content.as_deref(), Some(&content[..]));
        assert_eq!(created.size, Some(content.len() as u64));
        assert!(created.has_metadata());

        let read = get_file_data(&root, "notes.txt").unwrap();
        assert_eq!(read.name, "notes.txt");
        assert_eq!(read.content.as_deref(), Some(&content[..]));
    }

    #[test]
    fn test_create_empty_file() {
        let (temp_dir, root) = setup();

        let created = create_file(&root, "empty.txt", b"", false).unwrap();
        assert_eq!(created.size, Some(0));
        assert_eq!(fs::read(temp_dir.path().join("empty.txt")).unwrap(), b"");
    }

    #[test]
    fn test_create_existing_without_overwrite() {
        let (temp_dir, root) = setup();
        create_file(&root, "a.txt", b"first", false).unwrap();

        let result = create_file(&root, "a.txt", b"second", false);
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
        assert_eq!(fs::read(temp_dir.path().join("a.txt")).unwrap(), b"first");

        create_file(&root, "a.txt", b"second", true).unwrap();
        assert_eq!(fs::read(temp_dir.path().join("a.txt")).unwrap(), b"second");
    }

    #[test]
    fn test_create_over_directory_fails() {
        let (temp_dir, root) = setup();
        fs::create_dir(temp_dir.path().join("dir")).unwrap();

        let result = create_file(&root, "dir", b"x", true);
        assert!(matches!(result, Err(StorageError::NotAFile(_))));
    }

    #[test]
    fn test_verify_written_detects_mismatch() {
        let (temp_dir, _root) = setup();
        let path = temp_dir.path().join("a.txt");
        fs::write(&path, b"truncated").unwrap();

        let err = verify_written(&path, "a.txt", b"truncated content").unwrap_err();
        assert!(matches!(&err, StorageError::WriteVerificationFailed(name) if name == "a.txt"));
        assert_eq!(status_code(&ApiError::from(err)), 500);

        assert_eq!(verify_written(&path, "a.txt", b"truncated").unwrap(), b"truncated");
    }

    #[test]
    fn test_read_missing_file() {
        let (_temp_dir, root) = setup();
        let result = get_file_data(&root, "test_no_file.txt");
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_read_directory_fails() {
        let (temp_dir, root) = setup();
        fs::create_dir(temp_dir.path().join("dir")).unwrap();

        let result = get_file_data(&root, "dir");
        assert!(matches!(result, Err(StorageError::NotAFile(_))));
    }

    #[test]
    fn test_delete_then_read_is_not_found() {
        let (_temp_dir, root) = setup();
        create_file(&root, "test_for_delete.txt", b"", true).unwrap();

        delete_file(&root, "test_for_delete.txt").unwrap();
        let result = get_file_data(&root, "test_for_delete.txt");
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_delete_missing_file() {
        let (_temp_dir, root) = setup();
        let result = delete_file(&root, "test_no_file.txt");
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_delete_directory_is_recursive() {
        let (temp_dir, root) = setup();
        let nested = temp_dir.path().join("tree/branch");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("leaf.txt"), "leaf").unwrap();
        create_file(&root, "keep.txt", b"", false).unwrap();

        delete_file(&root, "tree").unwrap();

        assert!(!temp_dir.path().join("tree").exists());
        assert_eq!(names(&list_files(&root).unwrap()), vec!["keep.txt"]);
    }

    #[test]
    fn test_invalid_names_never_touch_the_filesystem() {
        let (temp_dir, root) = setup();
        let long_name = format!("{}.txt", "n".repeat(300));

        for name in [long_name.as_str(), "", "../escape.txt", "/etc/hostname"] {
            assert!(matches!(
                create_file(&root, name, b"content", true),
                Err(StorageError::InvalidPath(_))
            ));
            assert!(matches!(
                get_file_data(&root, name),
                Err(StorageError::InvalidPath(_))
            ));
            assert!(matches!(
                delete_file(&root, name),
                Err(StorageError::InvalidPath(_))
            ));
        }

        assert!(list_files(&root).unwrap().is_empty());
        assert!(!temp_dir.path().parent().unwrap().join("escape.txt").exists());
    }

    #[cfg(windows)]
    #[test]
    fn test_reserved_characters_are_invalid_on_windows() {
        let (temp_dir, root) = setup();

        assert!(matches!(
            create_file(&root, "te?st.txt", b"content", true),
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            get_file_data(&root, "te?st.txt"),
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            delete_file(&root, "te?st.txt"),
            Err(StorageError::InvalidPath(_))
        ));
        assert!(fs::read_dir(temp_dir.path()).unwrap().next().is_none());
    }
}
