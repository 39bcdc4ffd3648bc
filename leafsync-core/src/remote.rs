//! Capability interface of the remote document-collaboration service.
//!
//! The session is an explicit value handed to every call; implementations
//! keep no login state of their own. `end_session` consumes it.

use std::io::Read;

use crate::error::RemoteError;
use crate::types::{Invite, Project};

/// Byte stream of a project's zip archive.
pub type ArchiveStream = Box<dyn Read + Send>;

pub trait RemoteClient {
    type Session;

    /// Log in. Any failure here is fatal for the run.
    fn authenticate(&self, email: &str, password: &str) -> Result<Self::Session, RemoteError>;

    fn list_invites(&self, session: &Self::Session) -> Result<Vec<Invite>, RemoteError>;

    /// Accept one invite. Failures are independent per invite.
    fn accept_invite(&self, session: &Self::Session, invite: &Invite) -> Result<(), RemoteError>;

    fn list_projects(&self, session: &Self::Session) -> Result<Vec<Project>, RemoteError>;

    fn download_project_archive(
        &self,
        session: &Self::Session,
        project: &Project,
    ) -> Result<ArchiveStream, RemoteError>;

    /// Best-effort logout.
    fn end_session(&self, session: Self::Session) -> Result<(), RemoteError>;
}
