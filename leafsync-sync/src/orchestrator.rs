//! End-to-end sync run.
//!
//! ## Per-run sequence
//!
//! 1. Authenticate (fatal on failure).
//! 2. Accept pending invites, if enabled (failures logged per invite).
//! 3. List projects and apply the filter chain.
//! 4. For each selected project, one at a time:
//!    purge its directory → download the zip to a temp file inside it →
//!    extract → delete the temp file.
//! 5. Store the run timestamp (see [`run_state::should_write`]).
//! 6. End the session (best effort).
//!
//! A failing project is recorded in [`SyncReport::failures`], its directory
//! is removed so the next run treats it as never materialized, and the loop
//! moves on.

use std::collections::HashMap;
use std::io::{ErrorKind, Seek, SeekFrom};
use std::path::Path;

use chrono::{DateTime, Utc};

use leafsync_core::{Project, ProjectId, RemoteClient, SyncConfig};

use crate::error::{io_err, InviteAcceptError, ProjectSyncError, SyncError};
use crate::filter::{self, SyncFilterCriteria};
use crate::{extract, paths, run_state};

const ARCHIVE_PREFIX: &str = ".leafsync-download-";

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A project that could not be synced in this run.
#[derive(Debug)]
pub struct ProjectFailure {
    pub id: ProjectId,
    pub name: String,
    pub error: ProjectSyncError,
}

/// Outcome of a run.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Projects that passed the filter chain, whether or not they succeeded.
    pub synced: usize,
    /// Projects whose directory now holds a fresh copy of their archive.
    pub downloaded: usize,
    pub failures: Vec<ProjectFailure>,
    pub invites_accepted: usize,
    pub invite_failures: Vec<InviteAcceptError>,
    /// Timestamp written to the run state, if it was updated.
    pub recorded_at: Option<DateTime<Utc>>,
    /// Names of the selected projects, in processing order.
    pub selected: Vec<String>,
}

impl SyncReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty() || !self.invite_failures.is_empty()
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

/// Run one sync against `client`.
///
/// With `dry_run` the remote is queried and filtered but nothing is
/// downloaded, written or deleted locally; invites are not accepted.
pub fn run<C: RemoteClient>(
    client: &C,
    config: &SyncConfig,
    dry_run: bool,
) -> Result<SyncReport, SyncError> {
    let started_at = Utc::now();

    let session = client
        .authenticate(&config.credentials.email, &config.credentials.password)
        .map_err(SyncError::Authentication)?;
    tracing::info!(email = %config.credentials.email, "authenticated");

    let result = run_with_session(client, &session, config, dry_run, started_at);

    if let Err(err) = client.end_session(session) {
        tracing::warn!(error = %err, "logout failed");
    }
    result
}

fn run_with_session<C: RemoteClient>(
    client: &C,
    session: &C::Session,
    config: &SyncConfig,
    dry_run: bool,
    started_at: DateTime<Utc>,
) -> Result<SyncReport, SyncError> {
    let root = config.downloads_path.as_path();
    let mut report = SyncReport::default();

    if config.accept_invites && !dry_run {
        accept_invites(client, session, &mut report);
    }

    let last_run = match run_state::read(root) {
        Ok(last_run) => last_run,
        Err(err) => {
            tracing::warn!(error = %err, "ignoring unreadable run state; syncing everything");
            None
        }
    };

    let projects = client
        .list_projects(session)
        .map_err(SyncError::ListProjects)?;
    let criteria = SyncFilterCriteria::from_config(config, last_run);
    let selected = filter::filter(&projects, &criteria, |name| {
        paths::resolve(root, name).is_dir()
    });
    tracing::info!(
        listed = projects.len(),
        selected = selected.len(),
        since = ?last_run,
        "projects selected"
    );

    report.synced = selected.len();
    report.selected = selected.iter().map(|p| p.name.clone()).collect();

    if dry_run {
        for project in &selected {
            tracing::info!(
                project = %project.id,
                dest = %paths::resolve(root, &project.name).display(),
                "[dry-run] would sync {}",
                project.name
            );
        }
        return Ok(report);
    }

    std::fs::create_dir_all(root).map_err(|e| io_err(root, e))?;

    let mut claimed: HashMap<String, ProjectId> = HashMap::new();
    for project in &selected {
        let dest = paths::resolve(root, &project.name);

        if let Some(other) = claimed.get(&paths::collision_key(&dest)) {
            let error = ProjectSyncError::DirectoryCollision {
                path: dest.clone(),
                other: other.clone(),
            };
            tracing::warn!(project = %project.id, error = %error, "skipping project");
            report.failures.push(failure(project, error));
            continue;
        }
        claimed.insert(paths::collision_key(&dest), project.id.clone());

        tracing::info!(project = %project.id, name = %project.name, "syncing");
        match sync_project(client, session, project, &dest) {
            Ok(files) => {
                tracing::info!(project = %project.id, files, "synced");
                report.downloaded += 1;
            }
            Err(error) => {
                tracing::warn!(
                    project = %project.id,
                    name = %project.name,
                    error = %error,
                    "project sync failed"
                );
                discard_partial(&dest);
                report.failures.push(failure(project, error));
            }
        }
    }

    if run_state::should_write(report.downloaded, config.force_write_last_run) {
        run_state::write(root, started_at)?;
        report.recorded_at = Some(started_at);
    } else {
        tracing::info!("nothing downloaded; run state left unchanged");
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// Per-project pipeline
// ---------------------------------------------------------------------------

/// Replace the contents of `dest` with the project's current archive.
/// Returns the number of files extracted.
pub fn sync_project<C: RemoteClient>(
    client: &C,
    session: &C::Session,
    project: &Project,
    dest: &Path,
) -> Result<usize, ProjectSyncError> {
    purge_dir(dest)?;

    let mut stream = client.download_project_archive(session, project)?;
    let mut archive = tempfile::Builder::new()
        .prefix(ARCHIVE_PREFIX)
        .suffix(".zip")
        .tempfile_in(dest)
        .map_err(|e| ProjectSyncError::io(dest, e))?;
    let bytes = std::io::copy(&mut stream, archive.as_file_mut())
        .map_err(|e| ProjectSyncError::io(archive.path(), e))?;
    drop(stream);
    tracing::debug!(project = %project.id, bytes, "archive downloaded");

    archive
        .as_file_mut()
        .seek(SeekFrom::Start(0))
        .map_err(|e| ProjectSyncError::io(archive.path(), e))?;
    let files = extract::extract(archive.as_file_mut(), dest)?;

    let archive_path = archive.path().to_path_buf();
    archive
        .close()
        .map_err(|e| ProjectSyncError::io(archive_path, e))?;

    Ok(files.len())
}

/// Remove `dest` and everything in it, then recreate it empty.
fn purge_dir(dest: &Path) -> Result<(), ProjectSyncError> {
    match std::fs::remove_dir_all(dest) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(ProjectSyncError::io(dest, e)),
    }
    std::fs::create_dir_all(dest).map_err(|e| ProjectSyncError::io(dest, e))
}

fn discard_partial(dest: &Path) {
    match std::fs::remove_dir_all(dest) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            path = %dest.display(),
            error = %e,
            "could not remove partially synced directory"
        ),
    }
}

fn failure(project: &Project, error: ProjectSyncError) -> ProjectFailure {
    ProjectFailure {
        id: project.id.clone(),
        name: project.name.clone(),
        error,
    }
}

// ---------------------------------------------------------------------------
// Invites
// ---------------------------------------------------------------------------

fn accept_invites<C: RemoteClient>(client: &C, session: &C::Session, report: &mut SyncReport) {
    let invites = match client.list_invites(session) {
        Ok(invites) => invites,
        Err(err) => {
            tracing::warn!(error = %err, "could not list invites");
            return;
        }
    };

    for invite in invites {
        match client.accept_invite(session, &invite) {
            Ok(()) => {
                tracing::info!(invite = %invite.id, project = %invite.project_name, "invite accepted");
                report.invites_accepted += 1;
            }
            Err(source) => {
                let error = InviteAcceptError {
                    invite: invite.id.clone(),
                    project_name: invite.project_name.clone(),
                    source,
                };
                tracing::warn!(error = %error, "invite not accepted");
                report.invite_failures.push(error);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
