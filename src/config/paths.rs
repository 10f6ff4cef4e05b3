//! Locations of aether's config and readline history files.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::types::Config;
use crate::constants::{APP_NAME, CONFIG_FILENAME, HISTORY_FILENAME, PROJECT_CONFIG_FILENAME};

impl Config {
    /// `~/.config/aether/config.toml` on Linux (`XDG_CONFIG_HOME/aether`).
    pub fn config_path() -> Result<PathBuf> {
        Ok(app_dir(dirs::config_dir(), "config")?.join(CONFIG_FILENAME))
    }

    /// Readline history for `aether chat`, under the XDG cache directory.
    ///
    /// Only typed input lives here; conversations themselves are never written to disk.
    pub fn history_path() -> Result<PathBuf> {
        Ok(app_dir(dirs::cache_dir(), "cache")?.join(HISTORY_FILENAME))
    }

    /// Nearest `aether.toml` from `start` upwards, stopping at the git root.
    pub(super) fn find_project_config(start: &Path) -> Option<PathBuf> {
        let mut dir = start.to_path_buf();
        loop {
            let candidate = dir.join(PROJECT_CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if dir.join(".git").exists() || !dir.pop() {
                return None;
            }
        }
    }
}

fn app_dir(base: Option<PathBuf>, kind: &str) -> Result<PathBuf> {
    base.map(|dir| dir.join(APP_NAME))
        .with_context(|| format!("Could not determine {} directory", kind))
}
