pub mod cli;
pub mod config;
pub mod error;
pub mod navigate;
pub mod protocol;
pub mod server;
pub mod storage;
pub mod utils;

pub use server::Server;
