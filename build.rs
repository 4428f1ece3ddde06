// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: repo root
fn repo_arg() -> Arg {
    Arg::new("repo")
        .short('r')
        .long("repo")
        .value_name("PATH")
        .help("Repo root (default: search upward from the current directory)")
}

fn build_cli() -> Command {
    Command::new("treepack")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Treepack Contributors")
        .about("Reorganize a file tree into packages and track their dependencies")
        .subcommand_required(false)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at info level (overridden by RUST_LOG)"),
        )
        .subcommand(
            Command::new("init")
                .about("Create a new treepack repo")
                .arg(Arg::new("path").required(true).help("Directory to turn into a repo")),
        )
        .subcommand(
            Command::new("apply")
                .about("Apply the repo's pending operation (next_operation)")
                .arg(repo_arg())
                .arg(
                    Arg::new("dry_run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Check the pending operation without changing anything"),
                ),
        )
        .subcommand(
            Command::new("deps")
                .about("Show recorded package dependencies")
                .arg(Arg::new("package").help("Only show this package's dependencies"))
                .arg(repo_arg()),
        )
        .subcommand(
            Command::new("relation")
                .about("Compare the direct dependencies of two packages")
                .arg(Arg::new("left").required(true))
                .arg(Arg::new("right").required(true))
                .arg(repo_arg()),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("treepack.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
