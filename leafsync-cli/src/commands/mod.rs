pub mod status;
pub mod sync;

use std::path::Path;

use anyhow::{Context, Result};
use leafsync_core::config::{self, ConfigFile};

/// Environment, then config file, then `flags` — later layers win.
///
/// Without `--config`, the default location is read if it exists.
pub(crate) fn layered_config(explicit: Option<&Path>, flags: ConfigFile) -> Result<ConfigFile> {
    let file = match explicit {
        Some(path) => config::load_at(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => match config::default_path() {
            Ok(path) => config::load_optional_at(&path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            Err(_) => ConfigFile::default(),
        },
    };
    Ok(config::from_env().merge(file).merge(flags))
}
