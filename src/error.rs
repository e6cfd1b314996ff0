//! Error types for gallery construction and configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a gallery from host content.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GalleryError {
    #[error("a gallery needs at least one item")]
    Empty,
}

/// Errors raised while reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
