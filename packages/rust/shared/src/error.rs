//! Error types for kbpress.
//!
//! Library crates use [`PublishError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all kbpress operations.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Required environment configuration missing or invalid.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP failure fetching a tabular export.
    #[error("fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// A required column is absent from a fetched table.
    #[error("{table}: missing column {column}")]
    Schema { table: String, column: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failure contacting the bot refresh endpoint. Never fatal.
    #[error("refresh notification failed: {0}")]
    Notify(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PublishError>;

impl PublishError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a fetch error for a URL.
    pub fn fetch(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: msg.into(),
        }
    }

    /// Create a schema error naming the table and the missing column.
    pub fn schema(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Schema {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
