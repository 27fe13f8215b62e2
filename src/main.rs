//! RAX File Server - Entry Point
//!
//! Serves list/read/create/delete operations on a working directory over HTTP.

use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use rax_file_server::Server;
use rax_file_server::cli::Cli;
use rax_file_server::config::AppConfig;
use rax_file_server::utils::setup_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = setup_logging(&config) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    info!("Launching file server...");

    let server = match Server::new(config) {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    tokio::select! {
        _ = server.start() => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to listen for shutdown signal: {e}");
            }
            info!("Shutdown requested");
            server.shutdown();
        }
    }

    ExitCode::SUCCESS
}
