//! Probe error types.

use std::time::Duration;

use thiserror::Error;

/// Errors a probe can report while talking to its backend.
///
/// None of these ever reach a caller of the aggregator; each one is folded
/// into an unhealthy check result carrying its display text.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The relational database rejected or failed the query.
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    /// The cache client failed to complete the command.
    #[error("{0}")]
    Cache(#[from] redis::RedisError),

    /// The probe did not answer within its time budget.
    #[error("timed out after {}ms", .after.as_millis())]
    Timeout { after: Duration },

    /// A filesystem statistics call failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The probe cannot run on this platform.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The backend is unreachable for a reason reported as plain text.
    #[error("{0}")]
    Unavailable(String),
}

/// Result type for probe operations.
pub type Result<T> = std::result::Result<T, ProbeError>;
