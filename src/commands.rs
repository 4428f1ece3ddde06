// src/commands.rs
//! Command handlers for the treepack CLI

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::info;
use treepack::dependencies::{self, PackageRelation};
use treepack::engine::{self, EngineConfig, ExecutionEngine};
use treepack::operation::OperationDescriptor;
use treepack::Repo;

/// Open the repo at `path`, or find one above the current directory
fn resolve_repo(path: Option<&Path>) -> Result<Repo> {
    match path {
        Some(path) => Ok(Repo::open(path)?),
        None => {
            let cwd = env::current_dir().context("Failed to read current directory")?;
            Repo::discover(&cwd).ok_or_else(|| {
                anyhow::anyhow!(
                    "'{}' is not inside a treepack repo, missing '{}'",
                    cwd.display(),
                    treepack::repo::CONFIG_BASENAME
                )
            })
        }
    }
}

/// Create a new repo
pub fn cmd_init(path: &Path) -> Result<()> {
    let repo = Repo::init(path)
        .with_context(|| format!("Failed to initialize repo at {}", path.display()))?;
    println!("Initialized treepack repo at {}", repo.root().display());
    Ok(())
}

/// Apply (or with `dry_run`, only validate) the pending operation
pub fn cmd_apply(repo: Option<PathBuf>, dry_run: bool, verbose: bool) -> Result<()> {
    let repo = resolve_repo(repo.as_deref())?;
    let repo_config = repo.config()?;

    if dry_run {
        let op = OperationDescriptor::load(&repo)?;
        let graph = dependencies::load(&repo)?;
        let report = engine::validate(&repo, &op)?;
        println!("Operation for '{}' is valid:", op.new_package);
        println!("  Files to install: {}", report.files_to_install);
        println!("  Links to create: {}", report.links_to_create);
        println!("  Files to move: {}", report.files_to_move);
        println!("  Anonymous packages: {}", report.anon_packages);
        println!("  Recorded packages: {}", graph.len());
        return Ok(());
    }

    let mut config = EngineConfig::from_repo_config(&repo_config);
    if verbose {
        config = config.verbose(true);
    }

    info!("Applying pending operation in {}", repo.root().display());
    let summary = ExecutionEngine::new(config).run(&repo)?;

    println!("Applied operation for '{}'", summary.new_package);
    println!("  Blocks: {}", summary.blocks_applied);
    println!("  Installed: {}", summary.files_installed);
    println!("  Linked: {}", summary.links_created);
    println!("  Moved: {}", summary.files_moved);
    if !summary.anon_packages.is_empty() {
        println!("  New anonymous packages: {}", summary.anon_packages.join(", "));
    }
    Ok(())
}

/// Print the dependency graph, or one package's dependencies
pub fn cmd_deps(repo: Option<PathBuf>, package: Option<&str>) -> Result<()> {
    let repo = resolve_repo(repo.as_deref())?;
    let graph = dependencies::load(&repo)?;

    match package {
        Some(package) => {
            for dep in graph.deps(package) {
                println!("{}", dep);
            }
        }
        None => {
            if graph.is_empty() {
                println!("No dependencies recorded.");
                return Ok(());
            }
            print!("{}", dependencies::render(&graph));
        }
    }
    Ok(())
}

/// Print how two packages' direct dependencies relate
pub fn cmd_relation(repo: Option<PathBuf>, left: &str, right: &str) -> Result<()> {
    let repo = resolve_repo(repo.as_deref())?;
    let graph = dependencies::load(&repo)?;

    match graph.relation(left, right) {
        Some(PackageRelation::Equal) => println!("'{}' and '{}' have equal dependencies", left, right),
        Some(PackageRelation::LeftSupersetOfRight) => {
            println!("'{}' is a superset of '{}'", left, right)
        }
        Some(PackageRelation::RightSupersetOfLeft) => {
            println!("'{}' is a superset of '{}'", right, left)
        }
        None => println!("'{}' and '{}' are unrelated", left, right),
    }
    Ok(())
}
