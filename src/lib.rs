// src/lib.rs

//! Treepack
//!
//! Reorganizes a file tree into named packages (directories under `packs/`
//! filled by copying or symlinking files from a source tree) and records
//! directed dependency edges between packages.
//!
//! # Architecture
//!
//! - Repo: a directory marked by `treepack.config`
//! - Operations: one pending `next_operation` file, applied at most once
//! - Packages: plain directories; anonymous ones are named by the smallest free integer
//! - Dependencies: an ordered append log in `treepack.deps`, rewritten on every run

pub mod action_log;
pub mod config;
pub mod dependencies;
pub mod engine;
mod error;
pub mod filesystem;
pub mod operation;
pub mod repo;

pub use action_log::{Action, ActionLog, RecordingActionLog, SilentActionLog, TracingActionLog};
pub use config::RepoConfig;
pub use dependencies::{DependencyGraph, PackageRelation};
pub use engine::{EngineConfig, EngineState, ExecutionEngine, RunSummary};
pub use error::{Error, Result};
pub use operation::{FileEntry, OperationDescriptor, PackageOpKind, PackageOperation};
pub use repo::Repo;
