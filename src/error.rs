/// Errors raised by the host side of the bridge.
///
/// `ConfigurationMissing`, `TransportUnavailable` and `InvalidArgument` abort
/// startup. `ConfigurationDegraded` is only ever logged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Configuration degraded: {0}")]
    ConfigurationDegraded(String),

    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
