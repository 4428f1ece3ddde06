// src/operation/mod.rs

//! Pending operation descriptors
//!
//! A repo has at most one pending operation, stored in `next_operation`.
//! It names the package being built (`newpackage`), the tree its files come
//! from (`source`), and a list of package blocks:
//!
//! ```text
//! newpackage app-core
//! source /build/out
//! package bin
//!  usr/bin/app
//!  usr/bin/helper -> /opt/shared/helper
//! split legacy
//!  usr/lib/liba.so
//! ```

mod parser;

pub use parser::{parse, parse_file};

use crate::error::{Error, Result};
use crate::repo::Repo;
use std::fmt;
use std::path::PathBuf;

/// What a package block does with its entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageOpKind {
    /// Install entries from the source tree into the named package
    Normal,
    /// Carve entries out of the named package into a new anonymous package
    Split,
    /// Move entries out of the named package into `newpackage`
    Superset,
}

impl PackageOpKind {
    /// Directive keyword that opens a block of this kind
    pub fn directive(self) -> &'static str {
        match self {
            Self::Normal => "package",
            Self::Split => "split",
            Self::Superset => "superset",
        }
    }
}

impl fmt::Display for PackageOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.directive())
    }
}

/// One file line inside a package block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the source tree or package directory
    pub path: String,
    /// Symlink target; `None` means copy the file
    pub link_target: Option<String>,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, link_target: Option<String>) -> Self {
        Self {
            path: path.into(),
            link_target,
        }
    }
}

/// A `package`, `split` or `superset` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOperation {
    pub name: String,
    pub kind: PackageOpKind,
    pub entries: Vec<FileEntry>,
}

impl PackageOperation {
    pub fn new(name: impl Into<String>, kind: PackageOpKind) -> Self {
        Self {
            name: name.into(),
            kind,
            entries: Vec::new(),
        }
    }
}

/// A fully parsed pending operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// File the descriptor was read from
    pub file: PathBuf,
    /// Package being built; target of `superset` moves
    pub new_package: String,
    /// Root of the tree `package` entries are copied from
    pub source: PathBuf,
    /// Blocks in file order
    pub packages: Vec<PackageOperation>,
}

impl OperationDescriptor {
    /// Read the repo's pending operation
    pub fn load(repo: &Repo) -> Result<Self> {
        let path = repo.operation_path();
        if !path.exists() {
            return Err(Error::NoPendingOperation(path));
        }
        parse_file(&path)
    }

    /// Total number of file entries across all blocks
    pub fn entry_count(&self) -> usize {
        self.packages.iter().map(|op| op.entries.len()).sum()
    }
}
