//! Server core functionality
//!
//! This module contains the HTTP server: binding, the accept loop, and
//! per-request dispatch against the shared working directory.

pub mod core;

pub use core::Server;
