//! Analytics error types.

use flight_domain::DomainError;
use std::path::PathBuf;
use thiserror::Error;

/// Analytics errors.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Filesystem access failed
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON document
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration document rejected
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Nothing to process
    #[error("No data found in {0}; run a simulation first")]
    NoData(PathBuf),

    /// Trajectories of one trial disagree in length
    #[error("Trajectory length mismatch: {first} has {first_len} samples, {second} has {second_len}")]
    LengthMismatch {
        first: String,
        first_len: usize,
        second: String,
        second_len: usize,
    },

    /// Archiving would overwrite an earlier trial
    #[error("Trial directory {0} already exists")]
    TrialExists(PathBuf),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl AnalyticsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Result type for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
