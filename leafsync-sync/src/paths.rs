//! Destination directory naming.
//!
//! ```text
//! <downloads_path>/
//!   .leafsync-last-run.json      (run state, see crate::run_state)
//!   <sanitized project name>/    (one per project)
//! ```

use std::path::{Path, PathBuf};

/// Characters rejected by at least one common filesystem.
const ILLEGAL: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Device names Windows reserves regardless of extension.
const RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Most filesystems cap a single path component at 255 bytes.
const MAX_SEGMENT_BYTES: usize = 255;

/// `<root>/<sanitized name>` — pure, no I/O.
pub fn resolve(root: &Path, display_name: &str) -> PathBuf {
    root.join(sanitize_name(display_name))
}

/// Turn a display name into a single safe path segment.
///
/// Illegal and control characters become `_`, surrounding whitespace and
/// trailing dots are dropped, a leading dot is replaced so projects never
/// produce hidden entries (`.git`), and reserved device names get a `_`
/// prefix. Never returns an empty string.
pub fn sanitize_name(display_name: &str) -> String {
    let mut out: String = display_name
        .trim()
        .chars()
        .map(|c| if c.is_control() || ILLEGAL.contains(&c) { '_' } else { c })
        .collect();

    truncate_to_boundary(&mut out, MAX_SEGMENT_BYTES);
    trim_tail(&mut out);
    if out.starts_with('.') {
        out.replace_range(..1, "_");
    }
    if out.is_empty() {
        return "_".to_string();
    }

    let stem = out.split('.').next().unwrap_or_default();
    if RESERVED.iter().any(|r| r.eq_ignore_ascii_case(stem.trim_end())) {
        out.insert(0, '_');
        truncate_to_boundary(&mut out, MAX_SEGMENT_BYTES);
        trim_tail(&mut out);
    }
    out
}

/// Key used to detect two projects landing in the same directory: the
/// sanitized path itself, compared exactly.
pub fn collision_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Trailing dots and spaces are stripped by Windows and confuse shells.
fn trim_tail(s: &mut String) {
    while s.ends_with('.') || s.ends_with(' ') {
        s.pop();
    }
}

fn truncate_to_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
