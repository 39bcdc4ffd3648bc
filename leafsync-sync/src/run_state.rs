//! Run state — the timestamp of the last completed run.
//!
//! Persists a [`RunState`] JSON document at
//! `<downloads_path>/.leafsync-last-run.json`.
//! Writes go to a `.tmp` sibling and are renamed into place.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RunStateError;

pub const RUN_STATE_FILE: &str = ".leafsync-last-run.json";

/// On-disk run state payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunState {
    pub last_synced_at: DateTime<Utc>,
}

/// `<root>/.leafsync-last-run.json`
pub fn state_path_at(root: &Path) -> PathBuf {
    root.join(RUN_STATE_FILE)
}

/// Read the previous run's timestamp. `None` on the first run.
pub fn read(root: &Path) -> Result<Option<DateTime<Utc>>, RunStateError> {
    let path = state_path_at(root);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| RunStateError::io(&path, e))?;
    let state: RunState = serde_json::from_str(&contents)?;
    Ok(Some(state.last_synced_at))
}

/// Overwrite the stored timestamp atomically. Creates `root` if needed.
pub fn write(root: &Path, at: DateTime<Utc>) -> Result<(), RunStateError> {
    std::fs::create_dir_all(root).map_err(|e| RunStateError::io(root, e))?;

    let path = state_path_at(root);
    let json = serde_json::to_string_pretty(&RunState { last_synced_at: at })?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| RunStateError::io(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(RunStateError::io(&path, e));
    }
    Ok(())
}

/// A run with no successful download leaves the stored timestamp alone
/// unless `force` is set.
pub fn should_write(downloaded: usize, force: bool) -> bool {
    downloaded > 0 || force
}
