//! Game server runtime: the strand that owns the game, the ticker driving
//! it, periodic and final state saves, and startup wiring.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod logging;
pub mod strand;

pub use config::ServerConfig;
pub use error::ServerError;
pub use strand::{spawn, Request, Response, StrandHandle, StrandSettings};
