// src/error.rs

//! Error types for treepack
//!
//! Every failure is fatal to the current run; the variants exist so callers
//! can tell syntax problems apart from missing inputs and I/O failures.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the treepack library
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed pending-operation or dependency file
    #[error("{}({line}) {message}", .file.display())]
    Syntax {
        file: PathBuf,
        line: usize,
        message: String,
    },

    /// A required directive never appeared in the operation file
    #[error("operation '{}' does not contain a '{directive}' directive", .file.display())]
    MissingDirective {
        file: PathBuf,
        directive: &'static str,
    },

    /// A file named by a `package` block is missing from the source tree
    #[error("source file '{}' does not exist", .0.display())]
    SourceMissing(PathBuf),

    /// A file named by a `split`/`superset` block is missing from its package
    #[error("package '{package}' does not contain '{}'", .path.display())]
    MissingFile { package: String, path: PathBuf },

    /// The repo has no pending operation to apply
    #[error("no pending operation, '{}' does not exist", .0.display())]
    NoPendingOperation(PathBuf),

    /// Directory is not a treepack repo
    #[error("'{}' is not a treepack repo, missing '{}'", .path.display(), crate::repo::CONFIG_BASENAME)]
    NotARepo { path: PathBuf },

    /// Directory is already a treepack repo
    #[error("'{}' is already a treepack repo", .0.display())]
    AlreadyRepo(PathBuf),

    /// Walked all the way up without finding an existing ancestor
    #[error("root '{}' does not exist", .0.display())]
    RootMissing(PathBuf),

    /// Something already occupies the path an entry would create
    #[error("destination '{}' already exists", .0.display())]
    DestinationExists(PathBuf),

    /// Entry path is absolute, empty, or escapes its package
    #[error("invalid path '{0}'")]
    InvalidPath(String),

    /// Package names map to one directory under `packs/`
    #[error("invalid package name '{0}', package names must be a single path component")]
    InvalidPackageName(String),

    /// Repo configuration could not be parsed
    #[error("invalid config '{}': {source}", .path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for treepack operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a syntax error for `file` at 1-based `line`
    pub(crate) fn syntax(file: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}
