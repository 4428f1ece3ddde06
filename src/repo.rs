// src/repo.rs

//! Treepack repo layout
//!
//! A repo is any directory holding a `treepack.config` marker. Packages live
//! one per directory under `packs/`; the dependency graph and the pending
//! operation sit next to the marker.
//!
//! ```text
//! repo/
//!   treepack.config
//!   treepack.deps
//!   next_operation
//!   packs/<package>/...
//! ```

use crate::config::RepoConfig;
use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Marker (and config) file identifying a repo
pub const CONFIG_BASENAME: &str = "treepack.config";
/// Persisted dependency graph
pub const DEPSFILE_BASENAME: &str = "treepack.deps";
/// Pending operation consumed by the engine
pub const OPERATION_BASENAME: &str = "next_operation";
/// Directory holding one subdirectory per package
pub const PACKS_DIRNAME: &str = "packs";

/// `true` if `path` is a treepack repo
pub fn is_repo(path: &Path) -> bool {
    path.join(CONFIG_BASENAME).is_file()
}

/// Handle to a validated repo directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    root: PathBuf,
}

impl Repo {
    /// Open an existing repo, failing if the marker is missing
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        if !is_repo(&root) {
            return Err(Error::NotARepo { path: root });
        }
        Ok(Self { root })
    }

    /// Find the repo containing `start`, checking `start` and then each ancestor
    pub fn discover(start: impl AsRef<Path>) -> Option<Self> {
        start
            .as_ref()
            .ancestors()
            .find(|dir| is_repo(dir))
            .map(|root| Self {
                root: root.to_path_buf(),
            })
    }

    /// Create a new repo at `path` with a default config and an empty `packs/`
    pub fn init(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        if is_repo(&root) {
            return Err(Error::AlreadyRepo(root));
        }
        fs::create_dir_all(root.join(PACKS_DIRNAME))?;
        fs::write(root.join(CONFIG_BASENAME), RepoConfig::default().to_toml())?;
        debug!("Initialized treepack repo at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_BASENAME)
    }

    pub fn deps_path(&self) -> PathBuf {
        self.root.join(DEPSFILE_BASENAME)
    }

    pub fn operation_path(&self) -> PathBuf {
        self.root.join(OPERATION_BASENAME)
    }

    pub fn packs_dir(&self) -> PathBuf {
        self.root.join(PACKS_DIRNAME)
    }

    /// Directory of the package called `name`
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.packs_dir().join(name)
    }

    /// Load `treepack.config`
    pub fn config(&self) -> Result<RepoConfig> {
        RepoConfig::load(&self.config_path())
    }

    /// Create a fresh anonymous package and return its name and directory
    ///
    /// Probes `packs/0`, `packs/1`, ... and keeps the first directory that
    /// `mkdir` actually creates. Only an "already exists" failure moves on to
    /// the next index. There is no locking, so two writers on the same repo
    /// can race; callers must serialize runs.
    pub fn new_anon_package(&self) -> Result<(String, PathBuf)> {
        let mut index: u64 = 0;
        loop {
            let name = index.to_string();
            let dir = self.package_dir(&name);
            match fs::create_dir(&dir) {
                Ok(()) => {
                    debug!("Allocated anonymous package '{}'", name);
                    return Ok((name, dir));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!("Anonymous package '{}' taken, probing next", name);
                }
                Err(e) => return Err(e.into()),
            }
            index += 1;
        }
    }
}
