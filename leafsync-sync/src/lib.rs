//! # leafsync-sync
//!
//! One-way sync of remote projects into a local directory tree.
//!
//! Call [`run`] with a [`leafsync_core::RemoteClient`] and a resolved
//! [`leafsync_core::SyncConfig`]. The building blocks are public for reuse
//! and testing: [`filter`], [`paths`], [`run_state`], [`extract`].

pub mod error;
pub mod extract;
pub mod filter;
pub mod orchestrator;
pub mod paths;
pub mod run_state;

pub use error::{ExtractionError, InviteAcceptError, ProjectSyncError, RunStateError, SyncError};
pub use filter::{Criterion, SyncFilterCriteria};
pub use orchestrator::{run, sync_project, ProjectFailure, SyncReport};
