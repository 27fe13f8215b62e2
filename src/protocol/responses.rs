//! HTTP response handling
//!
//! Defines the response bodies and their JSON encoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use log::error;
use serde::Serialize;
use std::path::Path;

use crate::error::{ApiError, status_code};
use crate::storage::FileRecord;

pub const OK: u16 = 200;
pub const CREATED: u16 = 201;
pub const INTERNAL_ERROR: u16 = 500;

pub const JSON: &str = "application/json";
pub const TEXT: &str = "text/plain; charset=utf-8";

const LIVENESS_BODY: &str = "RAX File Server is running\n";

/// A response ready to be written to the client
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn liveness() -> Self {
        Self {
            status: OK,
            content_type: TEXT,
            body: LIVENESS_BODY.as_bytes().to_vec(),
        }
    }

    /// Serializes `value` as the JSON body
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status,
                content_type: JSON,
                body,
            },
            Err(e) => {
                error!("Failed to serialize response: {e}");
                Self::error_message(INTERNAL_ERROR, &format!("Failed to serialize response: {e}"))
            }
        }
    }

    pub fn error(err: &ApiError) -> Self {
        Self::error_message(status_code(err), &err.to_string())
    }

    fn error_message(status: u16, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string().into_bytes();
        Self {
            status,
            content_type: JSON,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// JSON shape of a [`FileRecord`]; `content` is standard base64
#[derive(Debug, Serialize)]
pub struct FileRecordBody<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub size: Option<u64>,
}

impl<'a> From<&'a FileRecord> for FileRecordBody<'a> {
    fn from(record: &'a FileRecord) -> Self {
        Self {
            name: &record.name,
            content: record.content.as_ref().map(|bytes| STANDARD.encode(bytes)),
            created_at: record.created_at,
            modified_at: record.modified_at,
            size: record.size,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DirectoryBody {
    pub path: String,
}

impl DirectoryBody {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_string_lossy().into_owned(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedBody<'a> {
    pub deleted: &'a str,
}
