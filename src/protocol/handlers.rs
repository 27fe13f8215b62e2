//! Request handlers for the file server API.
//!
//! Each handler runs one core operation against the working directory it is
//! handed and turns the outcome into an [`ApiResponse`]. The caller holds the
//! directory lock for the whole call.

use log::info;
use tiny_http::Method;

use crate::error::{ApiError, handle_error};
use crate::navigate::WorkingDirectory;
use crate::protocol::requests::{ApiRequest, ChangeDirBody, CreateFileBody, parse_request};
use crate::protocol::responses::{
    ApiResponse, CREATED, DeletedBody, DirectoryBody, FileRecordBody, OK,
};
use crate::storage;

/// Parses a raw request and serves it.
pub fn dispatch(method: &Method, url: &str, body: &[u8], cwd: &mut WorkingDirectory) -> ApiResponse {
    match parse_request(method, url, body) {
        Ok(request) => handle_request(request, cwd),
        Err(e) => {
            let err = ApiError::from(e);
            handle_error(&err);
            ApiResponse::error(&err)
        }
    }
}

/// Dispatches a parsed request to its handler.
pub fn handle_request(request: ApiRequest, cwd: &mut WorkingDirectory) -> ApiResponse {
    let result = match request {
        ApiRequest::Liveness => Ok(ApiResponse::liveness()),
        ApiRequest::CreateFile(body) => handle_create_file(&body, cwd),
        ApiRequest::ChangeDir(body) => handle_change_dir(&body, cwd),
        ApiRequest::GetFiles => handle_get_files(cwd),
        ApiRequest::GetFileData { filename } => handle_get_file_data(&filename, cwd),
        ApiRequest::DeleteFile { filename } => handle_delete_file(&filename, cwd),
    };

    result.unwrap_or_else(|err| {
        handle_error(&err);
        ApiResponse::error(&err)
    })
}

fn handle_create_file(
    body: &CreateFileBody,
    cwd: &WorkingDirectory,
) -> Result<ApiResponse, ApiError> {
    let content = body.content_bytes()?;
    let record = storage::create_file(cwd, &body.filename, &content, body.overwrite)?;
    Ok(ApiResponse::json(CREATED, &FileRecordBody::from(&record)))
}

/// Swaps the working directory only when the change succeeds.
fn handle_change_dir(
    body: &ChangeDirBody,
    cwd: &mut WorkingDirectory,
) -> Result<ApiResponse, ApiError> {
    let new_dir = cwd.change(&body.path, body.autocreate)?;
    *cwd = new_dir;
    Ok(ApiResponse::json(OK, &DirectoryBody::new(cwd.path())))
}

fn handle_get_files(cwd: &WorkingDirectory) -> Result<ApiResponse, ApiError> {
    let records = storage::list_files(cwd)?;
    let bodies: Vec<FileRecordBody> = records.iter().map(FileRecordBody::from).collect();
    Ok(ApiResponse::json(OK, &bodies))
}

fn handle_get_file_data(filename: &str, cwd: &WorkingDirectory) -> Result<ApiResponse, ApiError> {
    let record = storage::get_file_data(cwd, filename)?;
    Ok(ApiResponse::json(OK, &FileRecordBody::from(&record)))
}

fn handle_delete_file(filename: &str, cwd: &WorkingDirectory) -> Result<ApiResponse, ApiError> {
    storage::delete_file(cwd, filename)?;
    info!("Delete request for {filename} completed");
    Ok(ApiResponse::json(OK, &DeletedBody { deleted: filename }))
}
