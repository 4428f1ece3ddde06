// src/engine/preflight.rs

//! Preflight validation
//!
//! Walks every block of an operation before anything is mutated and checks
//! that each entry can be applied. Earlier blocks can create or move files
//! that later blocks refer to, so the check runs against an overlay of the
//! planned changes on top of what is on disk.

use crate::error::{Error, Result};
use crate::filesystem::path::{lexists, sanitize_package_name, sanitize_relative};
use crate::operation::{OperationDescriptor, PackageOpKind};
use crate::repo::Repo;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Counts of what a validated operation will do
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreflightReport {
    pub files_to_install: usize,
    pub links_to_create: usize,
    pub files_to_move: usize,
    pub anon_packages: usize,
}

/// Planned presence of paths under `packs/`, falling back to the filesystem
struct Overlay {
    packs_root: PathBuf,
    planned: HashMap<PathBuf, bool>,
}

impl Overlay {
    fn new(packs_root: PathBuf) -> Self {
        Self {
            packs_root,
            planned: HashMap::new(),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.planned
            .get(path)
            .copied()
            .unwrap_or_else(|| lexists(path))
    }

    /// Plan `path` and every missing directory between it and `packs/`
    fn create(&mut self, path: PathBuf) {
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir == self.packs_root || !dir.starts_with(&self.packs_root) {
                break;
            }
            self.planned.insert(dir.to_path_buf(), true);
            current = dir.parent();
        }
        self.planned.insert(path, true);
    }

    fn remove(&mut self, path: PathBuf) {
        self.planned.insert(path, false);
    }

    fn has_planned_children(&self, dir: &Path) -> bool {
        self.planned
            .iter()
            .any(|(path, present)| *present && path.parent() == Some(dir))
    }

    /// `true` if `path` is, or will be, a directory
    fn is_dir(&self, path: &Path) -> bool {
        match self.planned.get(path) {
            Some(false) => false,
            _ => {
                path.symlink_metadata().map(|m| m.is_dir()).unwrap_or(false)
                    || self.has_planned_children(path)
            }
        }
    }

    fn is_empty_dir(&self, dir: &Path) -> bool {
        if self.has_planned_children(dir) {
            return false;
        }
        match fs::read_dir(dir) {
            Ok(entries) => !entries
                .filter_map(|entry| entry.ok())
                .any(|entry| self.exists(&entry.path())),
            Err(_) => true,
        }
    }

    /// Mirror of `PathMutator::clean_dir` after a file left `dir`
    fn prune(&mut self, dir: &Path) {
        let mut current = Some(dir);
        while let Some(dir) = current {
            if dir == self.packs_root || !dir.starts_with(&self.packs_root) {
                break;
            }
            if !self.is_empty_dir(dir) {
                break;
            }
            self.remove(dir.to_path_buf());
            current = dir.parent();
        }
    }

    /// Mirror of `Repo::new_anon_package`: the lowest free number under `packs/`
    fn allocate_anon(&mut self, repo: &Repo) -> PathBuf {
        let mut index: u64 = 0;
        loop {
            let dir = repo.package_dir(&index.to_string());
            if !self.exists(&dir) {
                self.create(dir.clone());
                return dir;
            }
            index += 1;
        }
    }
}

/// Validate `op` against `repo` without touching the filesystem
///
/// Fails with the first problem found, in block and entry order.
pub fn validate(repo: &Repo, op: &OperationDescriptor) -> Result<PreflightReport> {
    sanitize_package_name(&op.new_package)?;

    let mut overlay = Overlay::new(repo.packs_dir());
    let mut report = PreflightReport::default();
    let target_dir = repo.package_dir(&op.new_package);

    for block in &op.packages {
        sanitize_package_name(&block.name)?;
        let package_dir = repo.package_dir(&block.name);
        let move_to = match block.kind {
            PackageOpKind::Normal => None,
            PackageOpKind::Split => {
                report.anon_packages += 1;
                Some(overlay.allocate_anon(repo))
            }
            PackageOpKind::Superset => Some(target_dir.clone()),
        };

        for entry in &block.entries {
            let file = sanitize_relative(&entry.path)?;
            match &move_to {
                None => {
                    let dest = package_dir.join(&file);
                    if entry.link_target.is_some() {
                        if overlay.exists(&dest) {
                            return Err(Error::DestinationExists(dest));
                        }
                        report.links_to_create += 1;
                    } else {
                        if overlay.is_dir(&dest) {
                            return Err(Error::DestinationExists(dest));
                        }
                        let src = op.source.join(&file);
                        if !src.exists() {
                            return Err(Error::SourceMissing(src));
                        }
                        report.files_to_install += 1;
                    }
                    overlay.create(dest);
                }
                Some(new_dir) => {
                    let old = package_dir.join(&file);
                    if !overlay.exists(&old) {
                        return Err(Error::MissingFile {
                            package: block.name.clone(),
                            path: file,
                        });
                    }
                    overlay.remove(old.clone());
                    overlay.create(new_dir.join(&file));
                    if let Some(parent) = old.parent() {
                        overlay.prune(parent);
                    }
                    report.files_to_move += 1;
                }
            }
        }
    }

    Ok(report)
}
