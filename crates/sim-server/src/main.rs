//! Dog gatherer game server
//!
//! Run with: cargo run -p sim-server -- --config-file data/config.json --tick-period 50

use clap::Parser;
use sim_server::{bootstrap, logging, strand, ServerConfig, ServerError};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let config = ServerConfig::parse();

    if let Err(e) = logging::init(config.log_json) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => {
            tracing::info!("server exited");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("server exited with error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let game = bootstrap::load_game(&config)?;
    let (handle, task) = strand::spawn(game, config.strand_settings());
    tracing::info!("server started");

    tokio::signal::ctrl_c().await.map_err(ServerError::Signal)?;
    tracing::info!("shutdown requested");
    handle.shutdown().await?;
    task.await?
}
