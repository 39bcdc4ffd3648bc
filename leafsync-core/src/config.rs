//! Run configuration.
//!
//! # Sources
//!
//! ```text
//! <config_dir>/leafsync/config.yaml   (or --config <path>)
//!   overridden by CLI flags
//!   password falls back to $LEAFSYNC_PASSWORD
//! ```
//!
//! Every source is parsed into a [`ConfigFile`] where all fields are optional;
//! sources are layered with [`ConfigFile::merge`] and the result is validated
//! once by [`ConfigFile::resolve`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_HOST: &str = "https://www.overleaf.com";
pub const PASSWORD_ENV: &str = "LEAFSYNC_PASSWORD";

// ---------------------------------------------------------------------------
// 1. Partial (layerable) config
// ---------------------------------------------------------------------------

/// One configuration layer. `None` means "not set by this layer".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub host: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub projects: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub downloads_path: Option<PathBuf>,
    pub accept_invites: Option<bool>,
    pub force_download: Option<bool>,
    pub force_write_last_run: Option<bool>,
}

impl ConfigFile {
    /// Layer `over` on top of `self`; fields set in `over` win.
    pub fn merge(self, over: ConfigFile) -> ConfigFile {
        ConfigFile {
            host: over.host.or(self.host),
            email: over.email.or(self.email),
            password: over.password.or(self.password),
            projects: over.projects.or(self.projects),
            tags: over.tags.or(self.tags),
            downloads_path: over.downloads_path.or(self.downloads_path),
            accept_invites: over.accept_invites.or(self.accept_invites),
            force_download: over.force_download.or(self.force_download),
            force_write_last_run: over.force_write_last_run.or(self.force_write_last_run),
        }
    }

    /// Validate required fields and apply defaults.
    pub fn resolve(self) -> Result<SyncConfig, ConfigError> {
        let email = self.email.ok_or(ConfigError::Missing { field: "email" })?;
        let password = self
            .password
            .ok_or(ConfigError::Missing { field: "password" })?;
        let downloads_path = self
            .downloads_path
            .ok_or(ConfigError::Missing { field: "downloads_path" })?;

        Ok(SyncConfig {
            host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            credentials: Credentials { email, password },
            projects: non_empty(self.projects),
            tags: non_empty(self.tags),
            downloads_path,
            accept_invites: self.accept_invites.unwrap_or(false),
            force_download: self.force_download.unwrap_or(false),
            force_write_last_run: self.force_write_last_run.unwrap_or(false),
        })
    }
}

fn non_empty(list: Option<Vec<String>>) -> Option<Vec<String>> {
    list.filter(|l| !l.is_empty())
}

// ---------------------------------------------------------------------------
// 2. Resolved config
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Fully resolved options for one sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub host: String,
    pub credentials: Credentials,
    /// Identifier/name allow-list. `None` disables the identity filter.
    pub projects: Option<Vec<String>>,
    /// Tag allow-list. `None` disables the tag filter.
    pub tags: Option<Vec<String>>,
    pub downloads_path: PathBuf,
    pub accept_invites: bool,
    /// Skip the staleness filter entirely.
    pub force_download: bool,
    /// Write the run-state timestamp even when nothing was downloaded.
    pub force_write_last_run: bool,
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// `<config_dir>/leafsync/config.yaml` — pure, no I/O.
pub fn default_path_at(config_dir: &Path) -> PathBuf {
    config_dir.join("leafsync").join("config.yaml")
}

/// `default_path_at` using `dirs::config_dir()`.
pub fn default_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| default_path_at(&dir))
        .ok_or(ConfigError::ConfigDirNotFound)
}

/// Parse a YAML config layer from `path`.
pub fn load_at(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Like [`load_at`], but an absent file is an empty layer.
pub fn load_optional_at(path: &Path) -> Result<ConfigFile, ConfigError> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    load_at(path)
}

/// Environment layer (currently only the password).
pub fn from_env() -> ConfigFile {
    ConfigFile {
        password: std::env::var(PASSWORD_ENV).ok().filter(|p| !p.is_empty()),
        ..ConfigFile::default()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
