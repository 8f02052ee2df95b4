//! Error types for the runboard binary.

use crate::config::ConfigError;
use crate::rest::RestError;

#[derive(Debug, thiserror::Error)]
pub enum GridAppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Rest(#[from] RestError),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Failed to initialize tracing: {0}")]
    Telemetry(#[from] tracing_subscriber::util::TryInitError),
}
