//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::error::ServerError;

/// Installs the global subscriber. `RUST_LOG` overrides the default `info`
/// level.
pub fn init(json: bool) -> Result<(), ServerError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init()
    };
    result.map_err(|e| ServerError::Logging(e.to_string()))
}
