//! leafsync core library — domain types, remote capability trait, config.
//!
//! - [`types`] — projects, invites and their identifiers
//! - [`remote`] — [`RemoteClient`], the interface to the collaboration service
//! - [`config`] — layered YAML/flag/env configuration
//! - [`error`] — [`RemoteError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod remote;
pub mod types;

pub use config::{ConfigFile, Credentials, SyncConfig};
pub use error::{ConfigError, RemoteError};
pub use remote::{ArchiveStream, RemoteClient};
pub use types::{Invite, InviteId, Project, ProjectId};
