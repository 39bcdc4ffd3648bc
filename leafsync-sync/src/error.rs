//! Error types for leafsync-sync.
//!
//! [`SyncError`] aborts a run. [`ProjectSyncError`] and [`InviteAcceptError`]
//! are collected per item and reported alongside the run's result.

use std::path::PathBuf;

use thiserror::Error;

use leafsync_core::{InviteId, ProjectId, RemoteError};

/// Fatal errors: the run stops and no partial result is returned.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("authentication failed: {0}")]
    Authentication(#[source] RemoteError),

    #[error("failed to list projects: {0}")]
    ListProjects(#[source] RemoteError),

    #[error("run state error: {0}")]
    RunState(#[from] RunStateError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure while materializing a single project. The run continues.
#[derive(Debug, Error)]
pub enum ProjectSyncError {
    #[error("download failed: {0}")]
    Download(#[from] RemoteError),

    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another project in the same run already resolved to this directory.
    #[error("destination {path} is already used by project {other}")]
    DirectoryCollision { path: PathBuf, other: ProjectId },
}

/// Archive could not be unpacked.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("malformed archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Entry name is absolute or walks out of the destination with `..`.
    #[error("archive entry '{name}' escapes the destination directory")]
    UnsafeEntry { name: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One invite could not be accepted. Other invites are unaffected.
#[derive(Debug, Error)]
#[error("failed to accept invite {invite} to '{project_name}': {source}")]
pub struct InviteAcceptError {
    pub invite: InviteId,
    pub project_name: String,
    #[source]
    pub source: RemoteError,
}

/// Errors reading or writing the last-run marker.
#[derive(Debug, Error)]
pub enum RunStateError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("run state JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

impl ProjectSyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl ExtractionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl RunStateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
