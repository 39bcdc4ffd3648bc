//! `leafsync status` — last run and local project directories.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use leafsync_core::ConfigFile;
use leafsync_sync::run_state;

/// Arguments for `leafsync status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// YAML config file to read `downloads_path` from.
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Root directory for project folders.
    #[arg(long, short = 'd', value_name = "DIR")]
    pub downloads_path: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let flags = ConfigFile {
            downloads_path: self.downloads_path,
            ..ConfigFile::default()
        };
        let root = super::layered_config(self.config.as_deref(), flags)?
            .downloads_path
            .context("no downloads path; pass --downloads-path or set downloads_path in the config")?;

        let report = build_report(&root)?;
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize status JSON")?
            );
            return Ok(());
        }
        print_table(report);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    downloads_path: PathBuf,
    last_run_at: Option<DateTime<Utc>>,
    last_run_age: String,
    projects: Vec<ProjectDirStatus>,
}

#[derive(Debug, Serialize, Tabled)]
struct ProjectDirStatus {
    #[tabled(rename = "directory")]
    directory: String,
    #[tabled(rename = "files")]
    files: usize,
}

fn build_report(root: &Path) -> Result<StatusReport> {
    let last_run_at = run_state::read(root)
        .with_context(|| format!("failed to read run state under {}", root.display()))?;
    let last_run_age = last_run_at.map_or_else(|| "never".to_string(), format_age);

    let mut projects = Vec::new();
    if root.is_dir() {
        for entry in std::fs::read_dir(root)
            .with_context(|| format!("failed to list {}", root.display()))?
        {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || !entry.file_type()?.is_dir() {
                continue;
            }
            projects.push(ProjectDirStatus {
                files: count_files(&entry.path())?,
                directory: name,
            });
        }
    }
    projects.sort_by(|a, b| a.directory.cmp(&b.directory));

    Ok(StatusReport {
        downloads_path: root.to_path_buf(),
        last_run_at,
        last_run_age,
        projects,
    })
}

fn count_files(dir: &Path) -> Result<usize> {
    let mut count = 0;
    let mut stack = vec![dir.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                stack.push(entry.path());
            } else {
                count += 1;
            }
        }
    }
    Ok(count)
}

fn format_age(at: DateTime<Utc>) -> String {
    let seconds = Utc::now().signed_duration_since(at).num_seconds().max(0);
    if seconds < 60 {
        return format!("{seconds}s ago");
    }
    if seconds < 60 * 60 {
        return format!("{}m ago", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h ago", seconds / (60 * 60));
    }
    format!("{}d ago", seconds / (60 * 60 * 24))
}

fn print_table(report: StatusReport) {
    let last_run = match report.last_run_at {
        Some(at) => format!("{} ({})", at.to_rfc3339(), report.last_run_age),
        None => report.last_run_age.yellow().to_string(),
    };
    println!(
        "leafsync v{} | {} | last run: {}",
        env!("CARGO_PKG_VERSION"),
        report.downloads_path.display(),
        last_run
    );

    if report.projects.is_empty() {
        println!("No project directories yet.");
        return;
    }
    let mut table = Table::new(report.projects);
    table.with(Style::rounded());
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    #[test]
    fn report_lists_project_dirs_and_skips_hidden() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join("Thesis/figs")).unwrap();
        std::fs::write(root.path().join("Thesis/main.tex"), "x").unwrap();
        std::fs::write(root.path().join("Thesis/figs/a.png"), "x").unwrap();
        std::fs::create_dir_all(root.path().join(".git")).unwrap();
        run_state::write(root.path(), Utc::now()).unwrap();

        let report = build_report(root.path()).unwrap();

        assert_eq!(report.projects.len(), 1);
        assert_eq!(report.projects[0].directory, "Thesis");
        assert_eq!(report.projects[0].files, 2);
        assert!(report.last_run_at.is_some());
    }

    #[test]
    fn missing_root_reports_never() {
        let root = TempDir::new().unwrap();
        let report = build_report(&root.path().join("absent")).unwrap();
        assert!(report.projects.is_empty());
        assert_eq!(report.last_run_age, "never");
    }

    #[test]
    fn ages_are_compact() {
        assert_eq!(format_age(Utc::now()), "0s ago");
        assert_eq!(format_age(Utc::now() - Duration::minutes(5)), "5m ago");
        assert_eq!(format_age(Utc::now() - Duration::days(3)), "3d ago");
    }
}
