use std::fmt;

use thiserror::Error;

/// Where a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Detecting the server version.
    Probe,
    /// Running a search request.
    Execute,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Probe => write!(f, "version probe"),
            Stage::Execute => write!(f, "search"),
        }
    }
}

/// Errors returned by the client, the backends and the version prober.
#[derive(Debug, Error)]
pub enum Error {
    /// The server could not be reached, or the connection failed mid-request.
    #[error("{stage} failed to reach the server: {source}")]
    Communication {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with something we could not interpret.
    #[error("{stage} got an unexpected response: {message}")]
    Protocol { stage: Stage, message: String },

    /// No backend is registered for the detected server version.
    #[error("Unsupported server version {0}")]
    UnsupportedVersion(String),

    /// The query or its options are malformed.
    #[error("Invalid query: {0}")]
    Validation(String),

    /// The deadline elapsed before the server answered.
    #[error("{stage} timed out")]
    Timeout { stage: Stage },
}

impl Error {
    pub(crate) fn communication(stage: Stage, source: reqwest::Error) -> Self {
        Error::Communication { stage, source }
    }

    pub(crate) fn protocol(stage: Stage, message: impl Into<String>) -> Self {
        Error::Protocol {
            stage,
            message: message.into(),
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Communication { stage, .. }
            | Error::Protocol { stage, .. }
            | Error::Timeout { stage } => Some(*stage),
            Error::UnsupportedVersion(_) | Error::Validation(_) => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
