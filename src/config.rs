// src/config.rs

//! Repo configuration
//!
//! The repo marker `treepack.config` doubles as the configuration file. It
//! is TOML and every key is optional, so an empty marker is a valid config.
//!
//! ```toml
//! [engine]
//! verbose = false
//! preflight = true
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Parsed contents of `treepack.config`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    pub engine: EngineSettings,
}

/// `[engine]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSettings {
    /// Announce every filesystem mutation through the tracing action log
    pub verbose: bool,
    /// Validate every entry of every block before mutating anything
    pub preflight: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            verbose: false,
            preflight: true,
        }
    }
}

impl RepoConfig {
    /// Load the config from `path`
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(path, &content)
    }

    /// Parse config text; `path` is only used for error messages
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Render the config as written by `treepack init`
    pub fn to_toml(&self) -> String {
        // Plain bools and tables always serialize
        toml::to_string(self).unwrap_or_default()
    }
}
