//! Error types for the exporter.

use thiserror::Error;

/// Errors that can stop the exporter from starting or serving.
///
/// Filesystem problems while walking the spool are not represented here;
/// they are logged and the affected queue reads as empty.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// The HTTP listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Settings could not be loaded or deserialized.
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    /// The sampling interval must be at least one second.
    #[error("query interval must be a positive number of seconds, got {0}")]
    InvalidInterval(u64),

    /// I/O failure outside the spool walk (export file, accept loop).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Snapshot could not be encoded as JSON.
    #[error("failed to encode snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExporterError>;
