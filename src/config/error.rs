//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config file parsing error in `{0}`")]
    Toml(PathBuf, #[source] toml::de::Error),

    #[error("source directory `{0}` does not exist or is not a directory")]
    SourceDir(PathBuf),

    #[error("output directory `{0}` must not be or contain the source directory")]
    OutputIsSource(PathBuf),
}
