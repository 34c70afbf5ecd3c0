#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::PathBuf;

use thiserror::Error;

use crate::llm::RemoteError;

/// Errors surfaced by the review pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// A required setting or credential is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The backend failed in a way that is not worth retrying.
    #[error("The model backend returned an error that cannot be retried: {0}")]
    FatalRemote(#[source] RemoteError),
    /// Every attempt was rate limited.
    #[error("Gave up after {attempts} attempt(s); the last error was: {last}")]
    RetryExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The error returned by the final attempt.
        #[source]
        last:     RemoteError,
    },
    /// A local file could not be read, or a pattern matched nothing.
    #[error("Could not read `{}`: {source}", .path.display())]
    FileAccess {
        /// Path or pattern that failed.
        path:   PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
