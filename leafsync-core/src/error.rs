//! Error types for leafsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a [`crate::RemoteClient`] implementation.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Credentials were rejected or the session could not be established.
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// The service answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The request never produced a response (DNS, TLS, connection reset, ...).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading or validating [`crate::SyncConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, with the offending file.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required option was not supplied by file, flag or environment.
    #[error("missing required option `{field}`")]
    Missing { field: &'static str },

    /// `dirs::config_dir()` returned `None`.
    #[error("cannot determine config directory; pass --config explicitly")]
    ConfigDirNotFound,
}
