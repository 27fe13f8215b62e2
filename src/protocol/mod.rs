//! HTTP API protocol
//!
//! Handles request parsing, dispatch to the file layer, and response encoding.

pub mod handlers;
pub mod requests;
pub mod responses;

pub use handlers::{dispatch, handle_request};
pub use requests::{ApiRequest, parse_request};
pub use responses::ApiResponse;
