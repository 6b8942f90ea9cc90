use sim_core::{ConfigError, GameError, PersistenceError};

/// Errors surfaced by the server runtime.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("game strand has stopped")]
    StrandClosed,
    #[error("strand answered with an unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error("manual ticks are disabled while the automatic ticker runs")]
    TickingDisabled,
    #[error("no state file configured")]
    NoStateFile,
    #[error("failed to install logging: {0}")]
    Logging(String),
    #[error("failed to listen for shutdown signal: {0}")]
    Signal(#[source] std::io::Error),
    #[error("strand task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
