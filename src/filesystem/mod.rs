// src/filesystem/mod.rs

//! Filesystem operations for treepack
//!
//! This module provides:
//! - Path validation for entries and package names read from operation files
//! - The primitive mutations (copy, symlink, move, prune) applied to `packs/`

mod mutator;
pub mod path;

pub use mutator::PathMutator;
