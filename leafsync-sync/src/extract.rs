//! Zip extraction into a project directory.
//!
//! Entries are written one at a time, in archive order, each through its own
//! file handle that is closed before the next entry is opened. Entry names
//! that would resolve outside the destination are rejected before anything
//! is written for them.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Component, Path, PathBuf};

use zip::ZipArchive;

use crate::error::ExtractionError;

/// Extract every entry of `archive` under `dest`.
///
/// Returns the relative paths of the files written, in archive order.
pub fn extract<R: Read + Seek>(archive: R, dest: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
    let mut archive = ZipArchive::new(archive)?;
    let mut written = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let Some(enclosed) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
            return Err(ExtractionError::UnsafeEntry {
                name: entry.name().to_string(),
            });
        };
        let relative = normalize(&enclosed);
        if relative.as_os_str().is_empty() {
            continue;
        }
        let target = dest.join(&relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| ExtractionError::io(&target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ExtractionError::io(parent, e))?;
        }
        let mut out = File::create(&target).map_err(|e| ExtractionError::io(&target, e))?;
        let bytes =
            std::io::copy(&mut entry, &mut out).map_err(|e| ExtractionError::io(&target, e))?;
        tracing::debug!(path = %relative.display(), bytes, "extracted");
        written.push(relative);
    }

    Ok(written)
}

/// Collapse `.` and inner `..` components of an already-enclosed path.
fn normalize(enclosed: &Path) -> PathBuf {
    let mut path = PathBuf::new();
    for component in enclosed.components() {
        match component {
            Component::Normal(segment) => path.push(segment),
            Component::ParentDir => {
                path.pop();
            }
            _ => {}
        }
    }
    path
}
