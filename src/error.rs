use std::{error::Error, fmt};

/// Error taxonomy for configuration, integration, and session handling.
///
/// Kept as a manually-written enum in the style of the crate's other
/// error types rather than reached for a derive-macro crate, so each
/// variant's message stays explicit at the call site.
#[derive(Debug, Clone)]
pub enum SimError {
    ConfigInvalid(String),
    ConfigUnknownFrame(String),
    IntegrationDiverged(String),
    InvalidSampling(String),
    MalformedMessage(String),
    PeerDisconnected,
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::ConfigInvalid(msg) => write!(f, "invalid configuration: {}", msg),
            SimError::ConfigUnknownFrame(frame) => {
                write!(f, "unknown initial condition frame: {}", frame)
            }
            SimError::IntegrationDiverged(msg) => write!(f, "integration diverged: {}", msg),
            SimError::InvalidSampling(msg) => write!(f, "invalid sampling request: {}", msg),
            SimError::MalformedMessage(msg) => write!(f, "malformed message: {}", msg),
            SimError::PeerDisconnected => write!(f, "peer disconnected"),
        }
    }
}

impl Error for SimError {}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::MalformedMessage(err.to_string())
    }
}

impl From<serde_yaml::Error> for SimError {
    fn from(err: serde_yaml::Error) -> Self {
        SimError::ConfigInvalid(err.to_string())
    }
}
