// src/filesystem/path.rs

//! Path checks for names and entries read from operation files
//!
//! Entry paths are joined onto package directories and package names are
//! joined onto `packs/`, so neither may be allowed to climb out of the
//! directory it is joined to.

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Validate a file entry path and return it normalized
///
/// Rejects absolute paths, `..` components and paths that are empty once
/// `.` components are dropped.
///
/// # Examples
///
/// ```
/// use treepack::filesystem::path::sanitize_relative;
/// use std::path::PathBuf;
///
/// assert_eq!(sanitize_relative("usr/./bin/app").unwrap(), PathBuf::from("usr/bin/app"));
/// assert!(sanitize_relative("/usr/bin/app").is_err());
/// assert!(sanitize_relative("usr/../../etc/passwd").is_err());
/// ```
pub fn sanitize_relative(path: &str) -> Result<PathBuf> {
    let mut normalized = PathBuf::new();

    for component in Path::new(path).components() {
        match component {
            Component::Normal(c) => normalized.push(c),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::InvalidPath(path.to_string()));
            }
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(Error::InvalidPath(path.to_string()));
    }

    Ok(normalized)
}

/// Validate a package name (a single path component under `packs/`)
///
/// Nested names such as `lib/extra` are rejected so that every package
/// owns exactly one directory and pruning never crosses into another
/// package.
pub fn sanitize_package_name(name: &str) -> Result<&str> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(Error::InvalidPackageName(name.to_string()));
    }
    Ok(name)
}

/// `true` if something exists at `path`, without following a final symlink
pub fn lexists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}
