// src/cli.rs
//! CLI definitions for treepack
//!
//! This module contains the command-line interface definitions using clap.
//! The command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "treepack")]
#[command(author = "Treepack Contributors")]
#[command(version)]
#[command(about = "Reorganize a file tree into packages and track their dependencies", long_about = None)]
pub struct Cli {
    /// Log at info level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new treepack repo
    Init {
        /// Directory to turn into a repo
        path: PathBuf,
    },

    /// Apply the repo's pending operation (next_operation)
    Apply {
        /// Repo root (default: search upward from the current directory)
        #[arg(short, long)]
        repo: Option<PathBuf>,

        /// Check the pending operation without changing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Show recorded package dependencies
    Deps {
        /// Only show this package's dependencies
        package: Option<String>,

        /// Repo root (default: search upward from the current directory)
        #[arg(short, long)]
        repo: Option<PathBuf>,
    },

    /// Compare the direct dependencies of two packages
    Relation {
        left: String,
        right: String,

        /// Repo root (default: search upward from the current directory)
        #[arg(short, long)]
        repo: Option<PathBuf>,
    },
}
