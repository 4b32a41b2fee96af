//! Configuration for springwire.
//!
//! Loads settings from `.springwire.toml` in the project root, then from
//! `SPRINGWIRE_*` environment variables (`SPRINGWIRE_DETECTORS__LOMBOK=false`).
//! Uses figment for layered configuration with provenance tracking.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the per-project config file.
pub const CONFIG_FILE: &str = ".springwire.toml";

/// Default directories to exclude from scanning (build output and tool state).
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    "target",
    "build",
    "out",
    ".git",
    ".idea",
    ".gradle",
    "node_modules",
];

/// Which injection detectors run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DetectorSettings {
    #[serde(default = "enabled")]
    pub field: bool,
    #[serde(default = "enabled")]
    pub constructor: bool,
    #[serde(default = "enabled")]
    pub setter: bool,
    #[serde(default = "enabled")]
    pub lombok: bool,
    #[serde(default = "enabled")]
    pub bean_method: bool,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            field: true,
            constructor: true,
            setter: true,
            lombok: true,
            bean_method: true,
        }
    }
}

fn enabled() -> bool {
    true
}

/// springwire configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Additional directories to exclude from scanning (merged with defaults).
    #[serde(default)]
    pub exclude_dirs: Vec<String>,

    /// Whether to respect .gitignore files when scanning (default: true).
    #[serde(default = "default_respect_gitignore")]
    pub respect_gitignore: bool,

    #[serde(default)]
    pub detectors: DetectorSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude_dirs: Vec::new(),
            respect_gitignore: default_respect_gitignore(),
            detectors: DetectorSettings::default(),
        }
    }
}

fn default_respect_gitignore() -> bool {
    true
}

impl Config {
    /// Load configuration for the workspace rooted at `root`.
    ///
    /// Returns default config if the file doesn't exist.
    /// Invalid config is reported with provenance and replaced by defaults.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);

        // Build layered config: defaults <- toml file <- environment
        let figment = Figment::from(Serialized::defaults(Config::default()));

        let figment = if config_path.exists() {
            figment.merge(Toml::file(&config_path))
        } else {
            figment
        };
        let figment = figment.merge(Env::prefixed("SPRINGWIRE_").split("__"));

        match figment.extract() {
            Ok(config) => {
                if config_path.exists() {
                    tracing::info!("Loaded config from {:?}", config_path);
                }
                config
            }
            Err(e) => {
                tracing::warn!("Config error: {}", e);
                Self::default()
            }
        }
    }

    /// Get all directories to exclude (defaults + user-configured).
    pub fn excluded_dirs(&self) -> Vec<&str> {
        let mut dirs: Vec<&str> = DEFAULT_EXCLUDE_DIRS.to_vec();
        for dir in &self.exclude_dirs {
            if !dirs.contains(&dir.as_str()) {
                dirs.push(dir.as_str());
            }
        }
        dirs
    }
}
