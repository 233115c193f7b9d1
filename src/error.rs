use std::io;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while building a [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric setting was present but is not a non-negative integer.
    #[error("{var} must be a non-negative integer, got {value:?}")]
    Format {
        var: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// The `.env` file could not be read or parsed.
    #[error("failed to read env file {}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenv::Error,
    },

    /// The working directory needed for `.env` discovery is unavailable.
    #[error("failed to resolve the current directory")]
    CurrentDir(#[source] io::Error),
}
