//! Error types for the documentation builder.

use thiserror::Error;

/// Errors raised by the library layers of the builder.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Filesystem access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The docbuild.ini configuration could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for builder operations
pub type BuildResult<T> = Result<T, BuildError>;
