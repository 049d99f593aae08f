//! Error types for mempush.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Stage of the agent that produced an error.
///
/// Errors leaving a stage are wrapped in [`MempushError::Stage`] so the
/// final diagnostic says where the failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Reading the local hostname.
    Hostname,
    /// Fetching the instance identity document.
    Identity,
    /// Building the ingestion client.
    Client,
    /// Refreshing memory counters on a tick.
    MemoryUpdate,
    /// Publishing a batch on a tick.
    Publish,
}

impl Stage {
    /// Short label used as the message prefix.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Hostname => "hostname get",
            Stage::Identity => "instance identity fetch",
            Stage::Client => "metrics client create",
            Stage::MemoryUpdate => "memory info update",
            Stage::Publish => "metrics put",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Main error type for mempush
#[derive(Error, Debug)]
pub enum MempushError {
    /// An error annotated with the stage it escaped from
    #[error("{stage}: {source}")]
    Stage {
        /// Stage that failed
        stage: Stage,
        /// Underlying error
        #[source]
        source: Box<MempushError>,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unparseable meminfo contents
    #[error("Malformed meminfo: {0}")]
    Meminfo(String),

    /// Instance metadata lookup errors
    #[error("Instance identity error: {0}")]
    Identity(String),

    /// Hostname lookup errors
    #[error("Hostname error: {0}")]
    Hostname(String),

    /// Network or transport errors
    #[error("Network error: {0}")]
    Network(String),

    /// Rejected credentials
    #[error("Authentication error: {0}")]
    Auth(String),

    /// 5xx from the ingestion endpoint
    #[error("Error received from ingestion endpoint: {0}")]
    Server(String),

    /// Any other non-success status from the ingestion endpoint
    #[error("Ingestion request failed (status {status}): {body}")]
    Http {
        /// Response status
        status: StatusCode,
        /// Response body
        body: String,
    },

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Deadline expiry
    #[error("Timeout error: operation took longer than {timeout_ms}ms")]
    Timeout {
        /// Deadline that passed, in milliseconds
        timeout_ms: u64,
    },
}

/// Result type alias for mempush operations
pub type Result<T> = std::result::Result<T, MempushError>;

impl From<reqwest::Error> for MempushError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network(format!("request timed out: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl MempushError {
    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new meminfo parse error
    pub fn meminfo<S: Into<String>>(msg: S) -> Self {
        Self::Meminfo(msg.into())
    }

    /// Creates a new identity error
    pub fn identity<S: Into<String>>(msg: S) -> Self {
        Self::Identity(msg.into())
    }

    /// Creates a new network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::Network(msg.into())
    }

    /// Wraps this error with the stage that produced it.
    pub fn in_stage(self, stage: Stage) -> Self {
        Self::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The stage label attached to this error, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Returns the error category for logging.
    ///
    /// Categories never drive control flow: every runtime error is fatal.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Stage { source, .. } => source.category(),
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Meminfo(_) | Self::Serialization(_) => "serialization",
            Self::Identity(_) | Self::Hostname(_) => "identity",
            Self::Network(_) | Self::Server(_) | Self::Http { .. } => "network",
            Self::Auth(_) => "auth",
            Self::Timeout { .. } => "timeout",
        }
    }

    /// True if this error, or the error it wraps, is a deadline expiry.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Stage { source, .. } => source.is_timeout(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

/// Attaches a [`Stage`] label to the error side of a result.
pub trait StageExt<T> {
    /// Wrap any error with `stage`.
    fn stage(self, stage: Stage) -> Result<T>;
}

impl<T, E: Into<MempushError>> StageExt<T> for std::result::Result<T, E> {
    fn stage(self, stage: Stage) -> Result<T> {
        self.map_err(|e| e.into().in_stage(stage))
    }
}
