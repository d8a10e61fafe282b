use thiserror::Error;

/// Failure while fetching the remote manifest
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Transport failure, timeout, or non-success HTTP status
    #[error("Network error: {0}")]
    Network(String),

    /// Body is not JSON or has no usable `version` field
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Network(e.to_string())
    }
}

/// Failure of a single update check round
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Local version is not set")]
    UnsetLocalVersion,

    #[error("Another check is already in flight")]
    Busy,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}
