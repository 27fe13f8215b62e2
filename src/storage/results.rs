//! Storage result types
//!
//! Defines result structures returned by storage operations.

use chrono::{DateTime, Utc};
use std::fs::Metadata;

/// Descriptor of a filesystem entry inside the working directory.
///
/// `content` is only filled for single-file reads and creates. The metadata
/// fields are `None` when the entry vanished between listing and stat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub name: String,
    pub content: Option<Vec<u8>>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub size: Option<u64>,
}

impl FileRecord {
    /// A record for an entry whose metadata could not be read.
    pub fn vanished(name: String) -> Self {
        Self {
            name,
            content: None,
            created_at: None,
            modified_at: None,
            size: None,
        }
    }

    /// A metadata-only record.
    pub fn from_metadata(name: String, metadata: &Metadata) -> Self {
        // Birth time is not tracked by every filesystem
        let created = metadata.created().or_else(|_| metadata.modified()).ok();

        Self {
            name,
            content: None,
            created_at: created.map(DateTime::<Utc>::from),
            modified_at: metadata.modified().ok().map(DateTime::<Utc>::from),
            size: Some(metadata.len()),
        }
    }

    pub fn with_content(mut self, content: Vec<u8>) -> Self {
        self.content = Some(content);
        self
    }

    /// Returns true if every metadata field is populated.
    pub fn has_metadata(&self) -> bool {
        self.created_at.is_some() && self.modified_at.is_some() && self.size.is_some()
    }
}
