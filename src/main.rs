// src/main.rs

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;
use treepack::action_log::ACTION_TARGET;

/// Filter used when `RUST_LOG` is unset
///
/// Action lines always pass: they are only emitted when `-v` or the repo's
/// `[engine] verbose` setting selects the tracing action log.
fn default_filter(verbose: bool) -> EnvFilter {
    let level = if verbose { "info" } else { "warn" };
    EnvFilter::new(format!("{},{}=info", level, ACTION_TARGET))
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(cli.verbose)),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Init { path }) => commands::cmd_init(&path),
        Some(Commands::Apply { repo, dry_run }) => commands::cmd_apply(repo, dry_run, cli.verbose),
        Some(Commands::Deps { package, repo }) => commands::cmd_deps(repo, package.as_deref()),
        Some(Commands::Relation { left, right, repo }) => {
            commands::cmd_relation(repo, &left, &right)
        }
        None => {
            // No command provided, show help
            println!("treepack v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'treepack --help' for usage information");
            Ok(())
        }
    }
}
