use std::io;
use thiserror::Error;

/// Custom error type for hostpulse
#[derive(Error, Debug)]
pub enum HostPulseError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Command timed out after {0} ms")]
    CommandTimeout(u64),

    #[error("GPU not available: {0}")]
    GpuNotAvailable(String),

    #[error("Metric collection failed: {0}")]
    MetricCollection(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for hostpulse
pub type Result<T> = std::result::Result<T, HostPulseError>;

impl HostPulseError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        HostPulseError::Config(msg.into())
    }

    /// Create a source unavailable error
    pub fn source_unavailable<S: Into<String>>(msg: S) -> Self {
        HostPulseError::SourceUnavailable(msg.into())
    }

    /// Create a malformed payload error
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        HostPulseError::MalformedPayload(msg.into())
    }

    pub fn command_timeout(timeout_ms: u64) -> Self {
        HostPulseError::CommandTimeout(timeout_ms)
    }

    pub fn gpu_not_available<S: Into<String>>(msg: S) -> Self {
        HostPulseError::GpuNotAvailable(msg.into())
    }

    pub fn metric_collection<S: Into<String>>(msg: S) -> Self {
        HostPulseError::MetricCollection(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        HostPulseError::Other(msg.into())
    }
}
