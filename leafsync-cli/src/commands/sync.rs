//! `leafsync sync` — download selected projects into the downloads directory.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use leafsync_core::ConfigFile;
use leafsync_sync::SyncReport;

use crate::http::HttpClient;

/// Arguments for `leafsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// YAML config file (default: <config dir>/leafsync/config.yaml if present).
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Base URL of the service.
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    /// Prefer $LEAFSYNC_PASSWORD or the config file over this flag.
    #[arg(long)]
    pub password: Option<String>,

    /// Only sync this project (id or name). Repeatable.
    #[arg(long = "project", short = 'p', value_name = "ID_OR_NAME")]
    pub projects: Vec<String>,

    /// Only sync projects carrying this tag. Repeatable.
    #[arg(long = "tag", short = 't', value_name = "TAG")]
    pub tags: Vec<String>,

    /// Root directory for project folders.
    #[arg(long, short = 'd', value_name = "DIR")]
    pub downloads_path: Option<PathBuf>,

    /// Accept pending project invites before syncing.
    #[arg(long)]
    pub accept_invites: bool,

    /// Download every selected project, even if unchanged since the last run.
    #[arg(long)]
    pub force_download: bool,

    /// Record this run's timestamp even if nothing was downloaded.
    #[arg(long)]
    pub force_write_last_run: bool,

    /// List what would be synced without touching the filesystem.
    #[arg(long)]
    pub dry_run: bool,

    /// Exit non-zero if any project or invite failed.
    #[arg(long)]
    pub strict: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let (explicit, flags, dry_run, strict) = self.into_layer();
        let config = super::layered_config(explicit.as_deref(), flags)?
            .resolve()
            .context("incomplete configuration")?;

        let client = HttpClient::new(&config.host);
        let report = leafsync_sync::run(&client, &config, dry_run)
            .with_context(|| format!("sync against {} failed", config.host))?;

        print_report(&report, dry_run);

        if strict && report.has_failures() {
            bail!(
                "{} project(s) and {} invite(s) failed",
                report.failures.len(),
                report.invite_failures.len()
            );
        }
        Ok(())
    }

    /// Split into the explicit config path, the flag layer, and run switches.
    fn into_layer(self) -> (Option<PathBuf>, ConfigFile, bool, bool) {
        let layer = ConfigFile {
            host: self.host,
            email: self.email,
            password: self.password,
            projects: non_empty(self.projects),
            tags: non_empty(self.tags),
            downloads_path: self.downloads_path,
            accept_invites: self.accept_invites.then_some(true),
            force_download: self.force_download.then_some(true),
            force_write_last_run: self.force_write_last_run.then_some(true),
        };
        (self.config, layer, self.dry_run, self.strict)
    }
}

fn non_empty(list: Vec<String>) -> Option<Vec<String>> {
    (!list.is_empty()).then_some(list)
}

fn print_report(report: &SyncReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };

    if dry_run {
        for name in &report.selected {
            println!("  ~  {name}");
        }
    }

    let mark = if report.failures.is_empty() {
        "✓".green()
    } else {
        "!".yellow()
    };
    println!(
        "{prefix}{mark} {} project(s) synced ({} downloaded, {} failed)",
        report.synced,
        report.downloaded,
        report.failures.len()
    );

    if report.invites_accepted > 0 {
        println!("  +  {} invite(s) accepted", report.invites_accepted);
    }
    for failure in &report.invite_failures {
        println!("  {}  {failure}", "✗".red());
    }
    for failure in &report.failures {
        println!(
            "  {}  '{}' ({}): {}",
            "✗".red(),
            failure.name,
            failure.id,
            failure.error
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: SyncArgs,
    }

    #[test]
    fn unset_switches_do_not_override_file() {
        let h = Harness::parse_from(["leafsync", "--downloads-path", "/tmp/x"]);
        let (_, layer, dry_run, strict) = h.args.into_layer();
        assert_eq!(layer.accept_invites, None);
        assert_eq!(layer.force_download, None);
        assert_eq!(layer.projects, None);
        assert_eq!(layer.downloads_path, Some(PathBuf::from("/tmp/x")));
        assert!(!dry_run && !strict);
    }

    #[test]
    fn repeated_filters_collect() {
        let h = Harness::parse_from([
            "leafsync", "-p", "Thesis", "-p", "64a1", "--tag", "phd", "--force-download",
        ]);
        let (_, layer, _, _) = h.args.into_layer();
        assert_eq!(
            layer.projects,
            Some(vec!["Thesis".to_string(), "64a1".to_string()])
        );
        assert_eq!(layer.tags, Some(vec!["phd".to_string()]));
        assert_eq!(layer.force_download, Some(true));
    }
}
