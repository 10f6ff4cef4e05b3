//! Configuration types and path resolution for aether.
//!
//! Aether stores its settings as TOML at the platform's XDG config path
//! (e.g. `~/.config/aether/config.toml` on Linux). A project-level
//! `aether.toml` found between the working directory and the git root is
//! layered on top.

mod loader;
mod paths;
mod resolve;
mod types;

pub use types::{AssistantMode, Config};
#[allow(unused_imports)]
pub use types::{AssistantConfig, LimitsConfig, ProviderConfig, ProviderEntry, SearchConfig};

use anyhow::Result;

impl Config {
    /// Load config with precedence: project > global > defaults.
    /// Creates default config file if none exists.
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project()?;

        let mut config = global;
        if let Some(proj) = project {
            config = Self::merge(config, proj);
        }

        config.resolve_substitutions();
        Ok(config)
    }
}
