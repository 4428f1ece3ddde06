// src/engine/mod.rs

//! Execution engine for pending operations
//!
//! Applies a repo's `next_operation` to its package tree and dependency
//! graph, then deletes the operation file so it is applied at most once.
//!
//! # Run Lifecycle
//!
//! ```text
//! IDLE -> PARSED -> DEPS_LOADED -> VALIDATED -> APPLYING(0..n) -> PERSISTED -> CONSUMED
//!                                                                 any failure -> ABORTED
//! ```
//!
//! There is no rollback: blocks applied before a failure stay applied. The
//! preflight pass exists so that the failures it can predict (missing
//! source files, missing files to move, bad paths) happen before the first
//! mutation. Runs assume exclusive access to the repo; nothing is locked.

mod preflight;

pub use preflight::{validate, PreflightReport};

use crate::action_log::{self, ActionLog, SilentActionLog};
use crate::config::RepoConfig;
use crate::dependencies::{self, DependencyGraph};
use crate::error::{Error, Result};
use crate::filesystem::path::{lexists, sanitize_package_name, sanitize_relative};
use crate::filesystem::PathMutator;
use crate::operation::{OperationDescriptor, PackageOpKind, PackageOperation};
use crate::repo::Repo;
use tracing::{debug, info, warn};

/// Engine configuration
pub struct EngineConfig {
    /// Validate every entry before the first mutation
    pub preflight: bool,
    /// Where mutations are announced
    pub action_log: Box<dyn ActionLog>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preflight: true,
            action_log: Box::new(SilentActionLog),
        }
    }
}

impl EngineConfig {
    /// Build a config from the repo's `[engine]` settings
    pub fn from_repo_config(config: &RepoConfig) -> Self {
        Self {
            preflight: config.engine.preflight,
            action_log: action_log::for_verbosity(config.engine.verbose),
        }
    }

    /// Announce mutations through tracing when `verbose` is set
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.action_log = action_log::for_verbosity(verbose);
        self
    }

    pub fn with_action_log(mut self, action_log: Box<dyn ActionLog>) -> Self {
        self.action_log = action_log;
        self
    }

    pub fn with_preflight(mut self, preflight: bool) -> Self {
        self.preflight = preflight;
        self
    }
}

/// Engine state machine phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing read yet
    Idle,
    /// Operation file parsed
    Parsed,
    /// Dependency graph loaded
    DepsLoaded,
    /// Preflight passed (or skipped)
    Validated,
    /// Applying the block at this index
    Applying(usize),
    /// Dependency graph written
    Persisted,
    /// Operation file deleted - run complete
    Consumed,
    /// Run failed; earlier mutations are not undone
    Aborted,
}

/// What a completed run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub new_package: String,
    pub blocks_applied: usize,
    pub files_installed: usize,
    pub links_created: usize,
    pub files_moved: usize,
    /// Anonymous packages allocated by `split` blocks, in order
    pub anon_packages: Vec<String>,
}

/// Applies pending operations
pub struct ExecutionEngine {
    config: EngineConfig,
    state: EngineState,
}

impl ExecutionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: EngineState::Idle,
        }
    }

    /// Current phase; after `run` this is `Consumed` or `Aborted`
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Apply the repo's pending operation
    pub fn run(&mut self, repo: &Repo) -> Result<RunSummary> {
        self.state = EngineState::Idle;
        match self.run_phases(repo) {
            Ok(summary) => Ok(summary),
            Err(e) => {
                warn!("Aborted in state {:?}: {}", self.state, e);
                self.state = EngineState::Aborted;
                Err(e)
            }
        }
    }

    fn run_phases(&mut self, repo: &Repo) -> Result<RunSummary> {
        let op = OperationDescriptor::load(repo)?;
        self.state = EngineState::Parsed;
        info!(
            "Applying operation for '{}': {} blocks, {} entries",
            op.new_package,
            op.packages.len(),
            op.entry_count()
        );

        let mut deps = dependencies::load(repo)?;
        self.state = EngineState::DepsLoaded;

        if self.config.preflight {
            let report = validate(repo, &op)?;
            debug!("Preflight passed: {:?}", report);
        } else {
            sanitize_package_name(&op.new_package)?;
        }
        self.state = EngineState::Validated;

        let mutator = PathMutator::new(self.config.action_log.as_ref());
        let mut summary = RunSummary {
            new_package: op.new_package.clone(),
            ..Default::default()
        };

        for (index, block) in op.packages.iter().enumerate() {
            self.state = EngineState::Applying(index);
            debug!("Applying {} block '{}'", block.kind, block.name);
            sanitize_package_name(&block.name)?;
            match block.kind {
                PackageOpKind::Normal => apply_normal(&mutator, repo, &op, block, &mut summary)?,
                PackageOpKind::Split => {
                    apply_split(&mutator, repo, &op, block, &mut deps, &mut summary)?
                }
                PackageOpKind::Superset => {
                    apply_superset(&mutator, repo, &op, block, &mut deps, &mut summary)?
                }
            }
            summary.blocks_applied += 1;
        }

        dependencies::persist(repo, &deps)?;
        self.state = EngineState::Persisted;

        mutator.remove_file(&op.file)?;
        self.state = EngineState::Consumed;

        info!(
            "Operation for '{}' complete: {} installed, {} linked, {} moved",
            summary.new_package, summary.files_installed, summary.links_created, summary.files_moved
        );
        Ok(summary)
    }
}

impl Default for ExecutionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Install each entry into the block's own package
fn apply_normal(
    mutator: &PathMutator<'_>,
    repo: &Repo,
    op: &OperationDescriptor,
    block: &PackageOperation,
    summary: &mut RunSummary,
) -> Result<()> {
    for entry in &block.entries {
        let file = sanitize_relative(&entry.path)?;
        match &entry.link_target {
            None => {
                mutator.install_file(&op.source, repo, &block.name, &file)?;
                summary.files_installed += 1;
            }
            Some(target) => {
                mutator.install_link(repo, &block.name, &file, target)?;
                summary.links_created += 1;
            }
        }
    }
    Ok(())
}

/// Move each entry out of the block's package into a new anonymous package
fn apply_split(
    mutator: &PathMutator<'_>,
    repo: &Repo,
    op: &OperationDescriptor,
    block: &PackageOperation,
    deps: &mut DependencyGraph,
    summary: &mut RunSummary,
) -> Result<()> {
    let (anon, anon_dir) = repo.new_anon_package()?;
    info!("Split '{}' into anonymous package '{}'", block.name, anon);

    let old_dir = repo.package_dir(&block.name);
    let packs_dir = repo.packs_dir();
    for entry in &block.entries {
        // Link targets have no meaning for a move
        let file = sanitize_relative(&entry.path)?;
        if !lexists(&old_dir.join(&file)) {
            return Err(Error::MissingFile {
                package: block.name.clone(),
                path: file,
            });
        }
        mutator.move_owner(&packs_dir, &old_dir, &anon_dir, &file)?;
        summary.files_moved += 1;
    }

    deps.add_edge(&block.name, &anon);
    deps.add_edge(&op.new_package, &anon);
    summary.anon_packages.push(anon);
    Ok(())
}

/// Move each entry out of the block's package into `newpackage`
fn apply_superset(
    mutator: &PathMutator<'_>,
    repo: &Repo,
    op: &OperationDescriptor,
    block: &PackageOperation,
    deps: &mut DependencyGraph,
    summary: &mut RunSummary,
) -> Result<()> {
    let old_dir = repo.package_dir(&block.name);
    let new_dir = repo.package_dir(&op.new_package);
    let packs_dir = repo.packs_dir();
    for entry in &block.entries {
        let file = sanitize_relative(&entry.path)?;
        if !lexists(&old_dir.join(&file)) {
            return Err(Error::MissingFile {
                package: block.name.clone(),
                path: file,
            });
        }
        mutator.move_owner(&packs_dir, &old_dir, &new_dir, &file)?;
        summary.files_moved += 1;
    }

    deps.add_edge(&block.name, &op.new_package);
    Ok(())
}
