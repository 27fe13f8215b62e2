//! Request parsing
//!
//! Turns a raw HTTP method, URL and body into an [`ApiRequest`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use std::collections::HashMap;
use tiny_http::Method;

use crate::error::RequestError;

/// An API call the server knows how to serve.
#[derive(Debug, PartialEq)]
pub enum ApiRequest {
    Liveness,
    CreateFile(CreateFileBody),
    ChangeDir(ChangeDirBody),
    GetFiles,
    GetFileData { filename: String },
    DeleteFile { filename: String },
}

/// Body of `POST /create_file`
#[derive(Debug, Deserialize, PartialEq)]
pub struct CreateFileBody {
    pub filename: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default)]
    pub encoding: ContentEncoding,
}

/// How `content` is encoded in a create request
#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentEncoding {
    #[default]
    #[serde(alias = "utf-8")]
    Utf8,
    Base64,
}

impl CreateFileBody {
    /// Raw bytes to write
    pub fn content_bytes(&self) -> Result<Vec<u8>, RequestError> {
        match self.encoding {
            ContentEncoding::Utf8 => Ok(self.content.as_bytes().to_vec()),
            ContentEncoding::Base64 => STANDARD
                .decode(self.content.as_bytes())
                .map_err(|e| RequestError::MalformedBody(format!("content is not base64: {e}"))),
        }
    }
}

/// Body of `POST /change_dir`; an empty body only queries the directory
#[derive(Debug, Deserialize, PartialEq)]
pub struct ChangeDirBody {
    #[serde(default)]
    pub path: String,
    #[serde(default = "default_autocreate")]
    pub autocreate: bool,
}

impl Default for ChangeDirBody {
    fn default() -> Self {
        Self {
            path: String::new(),
            autocreate: default_autocreate(),
        }
    }
}

fn default_autocreate() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct FilenameBody {
    filename: String,
}

/// Parses an incoming request.
pub fn parse_request(method: &Method, url: &str, body: &[u8]) -> Result<ApiRequest, RequestError> {
    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, parse_query(query)?),
        None => (url, HashMap::new()),
    };

    let expected = match path {
        "/" | "/get_files" | "/get_file_data" => Method::Get,
        "/create_file" | "/change_dir" => Method::Post,
        "/delete_file" => Method::Delete,
        _ => return Err(RequestError::UnknownRoute(path.to_string())),
    };

    if *method != expected {
        return Err(RequestError::MethodNotAllowed {
            method: method.to_string(),
            path: path.to_string(),
        });
    }

    match path {
        "/" => Ok(ApiRequest::Liveness),
        "/get_files" => Ok(ApiRequest::GetFiles),
        "/create_file" => Ok(ApiRequest::CreateFile(parse_json(body)?)),
        "/change_dir" => {
            if is_blank(body) {
                Ok(ApiRequest::ChangeDir(ChangeDirBody::default()))
            } else {
                Ok(ApiRequest::ChangeDir(parse_json(body)?))
            }
        }
        "/get_file_data" => {
            let filename = query
                .get("filename")
                .cloned()
                .ok_or(RequestError::MissingParameter("filename"))?;
            Ok(ApiRequest::GetFileData { filename })
        }
        _ => {
            let filename = match query.get("filename") {
                Some(filename) => filename.clone(),
                None if is_blank(body) => return Err(RequestError::MissingParameter("filename")),
                None => parse_json::<FilenameBody>(body)?.filename,
            };
            Ok(ApiRequest::DeleteFile { filename })
        }
    }
}

fn parse_json<'a, T: Deserialize<'a>>(body: &'a [u8]) -> Result<T, RequestError> {
    serde_json::from_slice(body).map_err(|e| RequestError::MalformedBody(e.to_string()))
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

fn parse_query(query: &str) -> Result<HashMap<String, String>, RequestError> {
    let mut params = HashMap::new();

    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(decode_component(key)?, decode_component(value)?);
    }

    Ok(params)
}

fn decode_component(raw: &str) -> Result<String, RequestError> {
    let raw = raw.replace('+', " ");
    urlencoding::decode(&raw)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| RequestError::MalformedBody(format!("bad query string: {e}")))
}
