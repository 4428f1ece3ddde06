// src/filesystem/mutator.rs

//! Primitive mutations on the package tree
//!
//! Files enter a package by copy or symlink, move between packages by
//! rename, and directories left empty by a move are pruned back up to
//! `packs/`. Each primitive is announced to the action log before it runs.

use crate::action_log::{Action, ActionLog};
use crate::error::{Error, Result};
use crate::repo::Repo;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Applies file-level mutations, reporting each one to an action log
pub struct PathMutator<'a> {
    log: &'a dyn ActionLog,
}

impl<'a> PathMutator<'a> {
    pub fn new(log: &'a dyn ActionLog) -> Self {
        Self { log }
    }

    /// Make sure `dir` and all of its ancestors exist
    ///
    /// Walks up to the nearest existing ancestor, then creates the missing
    /// directories from the top down.
    pub fn mkdirs(&self, dir: &Path) -> Result<()> {
        let mut missing = Vec::new();
        let mut current = dir;
        while !current.exists() {
            missing.push(current);
            match current.parent() {
                // Relative path whose first component is missing; cwd exists
                Some(parent) if parent.as_os_str().is_empty() => break,
                Some(parent) => current = parent,
                None => return Err(Error::RootMissing(current.to_path_buf())),
            }
        }

        for dir in missing.into_iter().rev() {
            self.log.record(&Action::Mkdir(dir.to_path_buf()));
            fs::create_dir(dir)?;
        }
        Ok(())
    }

    /// Copy `source/file` into `packs/<package>/file`, keeping its mode
    pub fn install_file(&self, source: &Path, repo: &Repo, package: &str, file: &Path) -> Result<()> {
        let src = source.join(file);
        if !src.exists() {
            return Err(Error::SourceMissing(src));
        }

        let dst = repo.package_dir(package).join(file);
        if let Some(parent) = dst.parent() {
            self.mkdirs(parent)?;
        }

        self.log.record(&Action::Copy {
            from: src.clone(),
            to: dst.clone(),
        });
        fs::copy(&src, &dst)?;
        let permissions = fs::metadata(&src)?.permissions();
        fs::set_permissions(&dst, permissions)?;

        debug!("Installed {} into package '{}'", file.display(), package);
        Ok(())
    }

    /// Create `packs/<package>/file` as a symlink to `target`
    ///
    /// The target is stored verbatim; it is never resolved or checked.
    pub fn install_link(&self, repo: &Repo, package: &str, file: &Path, target: &str) -> Result<()> {
        let link = repo.package_dir(package).join(file);
        if let Some(parent) = link.parent() {
            self.mkdirs(parent)?;
        }

        self.log.record(&Action::Symlink {
            link: link.clone(),
            target: target.to_string(),
        });
        symlink(target, &link)?;

        debug!("Linked {} -> {} in package '{}'", file.display(), target, package);
        Ok(())
    }

    /// Move `file` from one package directory to another
    ///
    /// After the rename, directories emptied under the old package are
    /// pruned up to (not including) `packs_root`.
    pub fn move_owner(
        &self,
        packs_root: &Path,
        old_package_dir: &Path,
        new_package_dir: &Path,
        file: &Path,
    ) -> Result<()> {
        let old = old_package_dir.join(file);
        let new = new_package_dir.join(file);
        if let Some(parent) = new.parent() {
            self.mkdirs(parent)?;
        }

        self.log.record(&Action::Rename {
            from: old.clone(),
            to: new.clone(),
        });
        fs::rename(&old, &new)?;

        if let Some(parent) = old.parent() {
            self.clean_dir(packs_root, parent)?;
        }
        Ok(())
    }

    /// Remove `dir` and its ancestors while they are empty and below `packs_root`
    pub fn clean_dir(&self, packs_root: &Path, dir: &Path) -> Result<()> {
        let floor = packs_root.components().count();
        let mut current = dir;
        while current.components().count() > floor && is_empty_dir(current)? {
            self.log.record(&Action::Rmdir(current.to_path_buf()));
            fs::remove_dir(current)?;
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        Ok(())
    }

    /// Delete a single file
    pub fn remove_file(&self, path: &Path) -> Result<()> {
        self.log.record(&Action::Remove(path.to_path_buf()));
        fs::remove_file(path)?;
        Ok(())
    }
}

fn is_empty_dir(dir: &Path) -> Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}

#[cfg(unix)]
fn symlink(target: &str, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn symlink(_target: &str, _link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "Symlinks not supported on this platform",
    ))
}
