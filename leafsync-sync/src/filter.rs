//! Project selection.
//!
//! Stage order (each stage sees only the survivors of the previous one):
//! 1. liveness — archived or trashed projects are always dropped
//! 2. identity — id or display name in the allow-list
//! 3. tags — at least one tag in the allow-list
//! 4. staleness — updated since the cutoff, or never materialized locally
//!
//! Stages 2–4 are [`Criterion::Off`] unless configured. Every stage is a pure
//! predicate; [`filter`] never reorders or mutates its input.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use leafsync_core::{Project, SyncConfig};

/// One filtering axis: either disabled or active with its parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion<T> {
    Off,
    Active(T),
}

impl<T> Default for Criterion<T> {
    fn default() -> Self {
        Criterion::Off
    }
}

impl<T> Criterion<T> {
    /// `true` when the criterion is off, otherwise the result of `check`.
    pub fn admits(&self, check: impl FnOnce(&T) -> bool) -> bool {
        match self {
            Criterion::Off => true,
            Criterion::Active(value) => check(value),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Criterion::Active(_))
    }
}

impl<T> From<Option<T>> for Criterion<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Criterion::Off, Criterion::Active)
    }
}

/// Per-run selection policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncFilterCriteria {
    /// Project ids or display names to keep.
    pub identity: Criterion<BTreeSet<String>>,
    /// Tag names; a project needs at least one of them.
    pub tags: Criterion<BTreeSet<String>>,
    /// Previous run's timestamp.
    pub updated_since: Criterion<DateTime<Utc>>,
}

impl SyncFilterCriteria {
    /// Build the criteria for a run. `force_download` turns the staleness
    /// stage off regardless of `last_run`.
    pub fn from_config(config: &SyncConfig, last_run: Option<DateTime<Utc>>) -> Self {
        let cutoff = if config.force_download { None } else { last_run };
        Self {
            identity: to_set(config.projects.as_deref()).into(),
            tags: to_set(config.tags.as_deref()).into(),
            updated_since: cutoff.into(),
        }
    }
}

/// An empty list means no filter on that axis.
fn to_set(list: Option<&[String]>) -> Option<BTreeSet<String>> {
    list.filter(|items| !items.is_empty())
        .map(|items| items.iter().cloned().collect())
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

pub fn is_live(project: &Project) -> bool {
    project.is_live()
}

pub fn matches_identity(project: &Project, allowed: &BTreeSet<String>) -> bool {
    allowed.contains(&project.id.0) || allowed.contains(&project.name)
}

pub fn matches_tags(project: &Project, allowed: &BTreeSet<String>) -> bool {
    project.tags.iter().any(|tag| allowed.contains(tag))
}

/// A project with no known modification time, or without a local directory,
/// is always fresh.
pub fn is_fresh(project: &Project, cutoff: &DateTime<Utc>, has_local_dir: bool) -> bool {
    match project.last_updated {
        None => true,
        Some(updated) => updated >= *cutoff || !has_local_dir,
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Apply the filter chain. `has_local_dir` is asked (by display name) only
/// for projects that would otherwise be excluded as stale.
pub fn filter<F>(
    projects: &[Project],
    criteria: &SyncFilterCriteria,
    has_local_dir: F,
) -> Vec<Project>
where
    F: Fn(&str) -> bool,
{
    projects
        .iter()
        .filter(|p| keep(p, criteria, &has_local_dir))
        .cloned()
        .collect()
}

fn keep<F>(project: &Project, criteria: &SyncFilterCriteria, has_local_dir: &F) -> bool
where
    F: Fn(&str) -> bool,
{
    if !is_live(project) {
        tracing::debug!(project = %project.id, "skipping archived or trashed project");
        return false;
    }
    if !criteria
        .identity
        .admits(|allowed| matches_identity(project, allowed))
    {
        tracing::debug!(project = %project.id, "not in project allow-list");
        return false;
    }
    if !criteria.tags.admits(|allowed| matches_tags(project, allowed)) {
        tracing::debug!(project = %project.id, "no matching tag");
        return false;
    }
    let fresh = criteria.updated_since.admits(|cutoff| {
        // Cheap check first; only touch the filesystem for stale candidates.
        is_fresh(project, cutoff, true) || is_fresh(project, cutoff, has_local_dir(&project.name))
    });
    if !fresh {
        tracing::debug!(project = %project.id, "unchanged since last run");
    }
    fresh
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::PathBuf;

    use chrono::Duration;
    use leafsync_core::config::ConfigFile;

    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn ids(projects: &[Project]) -> Vec<&str> {
        projects.iter().map(|p| p.id.0.as_str()).collect()
    }

    fn config() -> SyncConfig {
        ConfigFile {
            email: Some("me@example.com".into()),
            password: Some("pw".into()),
            downloads_path: Some(PathBuf::from("/tmp/out")),
            ..ConfigFile::default()
        }
        .resolve()
        .expect("config")
    }

    #[test]
    fn default_criteria_keep_every_live_project() {
        let mut trashed = Project::new("2", "b");
        trashed.trashed = true;
        let projects = vec![Project::new("1", "a"), trashed, Project::new("3", "c")];
        let kept = filter(&projects, &SyncFilterCriteria::default(), |_| true);
        assert_eq!(ids(&kept), vec!["1", "3"]);
    }

    #[test]
    fn identity_matches_id_or_name() {
        let projects = vec![
            Project::new("aa", "Thesis"),
            Project::new("bb", "Notes"),
            Project::new("cc", "Slides"),
        ];
        let criteria = SyncFilterCriteria {
            identity: Criterion::Active(set(&["Thesis", "cc"])),
            ..SyncFilterCriteria::default()
        };
        assert_eq!(ids(&filter(&projects, &criteria, |_| true)), vec!["aa", "cc"]);
    }

    #[test]
    fn tags_need_one_overlap() {
        let projects = vec![
            Project::new("1", "a").with_tags(["work", "draft"]),
            Project::new("2", "b").with_tags(["personal"]),
            Project::new("3", "c"),
        ];
        let criteria = SyncFilterCriteria {
            tags: Criterion::Active(set(&["draft", "other"])),
            ..SyncFilterCriteria::default()
        };
        assert_eq!(ids(&filter(&projects, &criteria, |_| true)), vec!["1"]);
    }

    #[test]
    fn staleness_keeps_recent_unknown_and_unmaterialized() {
        let cutoff = Utc::now();
        let old = cutoff - Duration::days(3);
        let projects = vec![
            Project::new("recent", "recent").with_last_updated(cutoff + Duration::seconds(1)),
            Project::new("exact", "exact").with_last_updated(cutoff),
            Project::new("unknown", "unknown"),
            Project::new("old-local", "old-local").with_last_updated(old),
            Project::new("old-missing", "old-missing").with_last_updated(old),
        ];
        let criteria = SyncFilterCriteria {
            updated_since: Criterion::Active(cutoff),
            ..SyncFilterCriteria::default()
        };
        let kept = filter(&projects, &criteria, |name| name == "old-local");
        assert_eq!(ids(&kept), vec!["recent", "exact", "unknown", "old-missing"]);
    }

    #[test]
    fn directory_probe_only_for_stale_candidates() {
        let cutoff = Utc::now();
        let projects = vec![
            Project::new("1", "fresh").with_last_updated(cutoff + Duration::hours(1)),
            Project::new("2", "stale").with_last_updated(cutoff - Duration::hours(1)),
        ];
        let criteria = SyncFilterCriteria {
            updated_since: Criterion::Active(cutoff),
            ..SyncFilterCriteria::default()
        };
        let probed = RefCell::new(Vec::new());
        filter(&projects, &criteria, |name| {
            probed.borrow_mut().push(name.to_string());
            true
        });
        assert_eq!(probed.into_inner(), vec!["stale".to_string()]);
    }

    #[test]
    fn from_config_maps_lists_and_cutoff() {
        let mut cfg = config();
        cfg.tags = Some(vec!["t".into()]);
        let last = Utc::now();
        let criteria = SyncFilterCriteria::from_config(&cfg, Some(last));
        assert_eq!(criteria.identity, Criterion::Off);
        assert_eq!(criteria.tags, Criterion::Active(set(&["t"])));
        assert_eq!(criteria.updated_since, Criterion::Active(last));
    }

    #[test]
    fn empty_lists_filter_nothing() {
        let mut cfg = config();
        cfg.projects = Some(Vec::new());
        cfg.tags = Some(Vec::new());
        let criteria = SyncFilterCriteria::from_config(&cfg, None);
        assert_eq!(criteria.identity, Criterion::Off);
        assert_eq!(criteria.tags, Criterion::Off);

        let projects = vec![Project::new("1", "Thesis")];
        assert_eq!(ids(&filter(&projects, &criteria, |_| true)), vec!["1"]);
    }

    #[test]
    fn force_download_disables_staleness() {
        let mut cfg = config();
        cfg.force_download = true;
        let criteria = SyncFilterCriteria::from_config(&cfg, Some(Utc::now()));
        assert!(!criteria.updated_since.is_active());
    }

    #[test]
    fn first_run_has_no_cutoff() {
        let criteria = SyncFilterCriteria::from_config(&config(), None);
        assert!(!criteria.updated_since.is_active());
    }
}
