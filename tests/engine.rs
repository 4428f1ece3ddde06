// tests/engine.rs

//! End-to-end tests for applying pending operations.
//!
//! Each test builds a scratch repo and source tree, writes a
//! `next_operation`, runs the engine and checks the package tree and the
//! persisted dependency graph.

mod common;

use common::{package_names, seed_package_file, setup_repo, write_operation};
use std::fs;
use treepack::dependencies;
use treepack::{EngineConfig, EngineState, Error, ExecutionEngine, Repo};

fn run(repo: &Repo) -> treepack::Result<treepack::RunSummary> {
    ExecutionEngine::default().run(repo)
}

#[test]
fn test_install_copies_content_and_mode() {
    let fixture = setup_repo();
    write_operation(&fixture, "app-core", "package bin\n usr/bin/app\n usr/lib/liba.so\n");

    let summary = run(&fixture.repo).unwrap();
    assert_eq!(summary.files_installed, 2);

    for file in ["usr/bin/app", "usr/lib/liba.so"] {
        let installed = fixture.repo.package_dir("bin").join(file);
        let original = fixture.source.join(file);
        assert_eq!(fs::read(&installed).unwrap(), fs::read(&original).unwrap());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = |p: &std::path::Path| fs::metadata(p).unwrap().permissions().mode();
            assert_eq!(mode(installed.as_path()), mode(original.as_path()), "mode differs for {}", file);
        }
    }

    // Normal blocks install into the block's package, not newpackage
    assert!(!fixture.repo.package_dir("app-core").exists());
}

#[test]
#[cfg(unix)]
fn test_install_link_keeps_target_string() {
    let fixture = setup_repo();
    write_operation(
        &fixture,
        "app-core",
        "package bin\n usr/bin/helper -> /opt/shared/helper\n usr/bin/rel -> ../lib/liba.so\n",
    );

    let summary = run(&fixture.repo).unwrap();
    assert_eq!(summary.links_created, 2);

    let bin = fixture.repo.package_dir("bin");
    assert_eq!(
        fs::read_link(bin.join("usr/bin/helper")).unwrap(),
        std::path::PathBuf::from("/opt/shared/helper")
    );
    assert_eq!(
        fs::read_link(bin.join("usr/bin/rel")).unwrap(),
        std::path::PathBuf::from("../lib/liba.so")
    );
}

#[test]
fn test_split_moves_into_new_anon_package() {
    let fixture = setup_repo();
    let repo = &fixture.repo;
    seed_package_file(repo, "legacy", "usr/lib/liba.so", b"liba");
    seed_package_file(repo, "legacy", "usr/lib/libb.so", b"libb");
    seed_package_file(repo, "legacy", "usr/share/doc", b"doc");
    fs::create_dir(repo.package_dir("0")).unwrap();

    write_operation(
        &fixture,
        "app-core",
        "split legacy\n usr/lib/liba.so\n usr/lib/libb.so -> ignored\n",
    );
    let summary = run(repo).unwrap();
    assert_eq!(summary.anon_packages, vec!["1".to_string()]);
    assert_eq!(summary.files_moved, 2);

    let legacy = repo.package_dir("legacy");
    let anon = repo.package_dir("1");
    assert!(!legacy.join("usr/lib/liba.so").exists());
    assert!(!legacy.join("usr/lib/libb.so").exists());
    assert_eq!(fs::read(anon.join("usr/lib/liba.so")).unwrap(), b"liba");
    assert_eq!(fs::read(anon.join("usr/lib/libb.so")).unwrap(), b"libb");

    // usr/lib emptied and pruned; usr still holds share/doc
    assert!(!legacy.join("usr/lib").exists());
    assert!(legacy.join("usr/share/doc").is_file());

    let graph = dependencies::load(repo).unwrap();
    assert_eq!(graph.deps("legacy"), ["1"]);
    assert_eq!(graph.deps("app-core"), ["1"]);
}

#[test]
fn test_superset_moves_into_newpackage() {
    let fixture = setup_repo();
    let repo = &fixture.repo;
    seed_package_file(repo, "old", "etc/app.conf", b"conf");

    write_operation(&fixture, "app-core", "superset old\n etc/app.conf\n");
    run(repo).unwrap();

    assert_eq!(
        fs::read(repo.package_dir("app-core").join("etc/app.conf")).unwrap(),
        b"conf"
    );
    // The old package had nothing else, so its directory is pruned
    assert!(!repo.package_dir("old").exists());
    assert_eq!(package_names(repo), vec!["app-core".to_string()]);

    let graph = dependencies::load(repo).unwrap();
    assert_eq!(graph.deps("old"), ["app-core"]);
    assert!(graph.deps("app-core").is_empty());
}

#[test]
fn test_mixed_operation_and_existing_deps() {
    let fixture = setup_repo();
    let repo = &fixture.repo;
    fs::write(repo.deps_path(), "base\n libc\n").unwrap();
    seed_package_file(repo, "legacy", "usr/lib/liba.so", b"liba");
    seed_package_file(repo, "other", "usr/lib/libc.so", b"libc");

    write_operation(
        &fixture,
        "app-core",
        "package bin\n usr/bin/app\nsplit legacy\n usr/lib/liba.so\nsplit other\n usr/lib/libc.so\nsuperset bin\n usr/bin/app\n",
    );
    let summary = run(repo).unwrap();
    assert_eq!(summary.blocks_applied, 4);
    assert_eq!(summary.anon_packages, vec!["0".to_string(), "1".to_string()]);

    // Earlier block's install is visible to the later superset
    assert!(repo.package_dir("app-core").join("usr/bin/app").is_file());
    assert!(!repo.package_dir("bin").exists());

    let content = fs::read_to_string(repo.deps_path()).unwrap();
    assert_eq!(
        content,
        "base\n libc\nlegacy\n 0\napp-core\n 0\n 1\nother\n 1\nbin\n app-core\n"
    );
}

#[test]
fn test_anon_allocation_after_existing_packages() {
    let fixture = setup_repo();
    let repo = &fixture.repo;
    for i in 0..4 {
        fs::create_dir(repo.package_dir(&i.to_string())).unwrap();
    }
    seed_package_file(repo, "legacy", "f", b"f");

    write_operation(&fixture, "n", "split legacy\n f\n");
    let summary = run(repo).unwrap();
    assert_eq!(summary.anon_packages, vec!["4".to_string()]);
    assert!(repo.package_dir("4").join("f").is_file());
}

#[test]
fn test_operation_is_consumed_once() {
    let fixture = setup_repo();
    let repo = &fixture.repo;
    write_operation(&fixture, "app-core", "package bin\n usr/bin/app\n");

    run(repo).unwrap();
    assert!(!repo.operation_path().exists());

    let deps_before = fs::read_to_string(repo.deps_path()).unwrap();
    let packages_before = package_names(repo);

    let mut engine = ExecutionEngine::default();
    let err = engine.run(repo).unwrap_err();
    assert!(matches!(err, Error::NoPendingOperation(_)));
    assert!(err.to_string().contains("no pending operation"));
    assert_eq!(engine.state(), EngineState::Aborted);

    assert_eq!(fs::read_to_string(repo.deps_path()).unwrap(), deps_before);
    assert_eq!(package_names(repo), packages_before);
}

#[test]
fn test_syntax_error_aborts_without_changes() {
    let fixture = setup_repo();
    let repo = &fixture.repo;
    write_operation(&fixture, "app-core", "package bin\n usr/bin/app\nexplode now\n");

    let err = run(repo).unwrap_err();
    match err {
        Error::Syntax { line, ref message, .. } => {
            assert_eq!(line, 5);
            assert!(message.contains("unknown directive 'explode'"));
        }
        other => panic!("expected syntax error, got {other:?}"),
    }
    assert!(repo.operation_path().exists());
    assert!(package_names(repo).is_empty());
}

#[test]
fn test_corrupt_deps_file_aborts() {
    let fixture = setup_repo();
    let repo = &fixture.repo;
    fs::write(repo.deps_path(), " orphan\n").unwrap();
    write_operation(&fixture, "app-core", "package bin\n usr/bin/app\n");

    let err = run(repo).unwrap_err();
    assert!(matches!(err, Error::Syntax { line: 1, .. }));
    assert!(repo.operation_path().exists());
    assert!(!repo.package_dir("bin").exists());
}

#[test]
fn test_missing_file_to_move() {
    let fixture = setup_repo();
    let repo = &fixture.repo;
    write_operation(&fixture, "app-core", "package bin\n usr/bin/app\nsplit legacy\n nope\n");

    let err = run(repo).unwrap_err();
    assert!(matches!(err, Error::MissingFile { ref package, .. } if package == "legacy"));
    // Preflight stops the run before the install or the allocation
    assert!(package_names(repo).is_empty());
}

#[test]
fn test_superset_from_anon_package_created_by_earlier_split() {
    let fixture = setup_repo();
    let repo = &fixture.repo;
    seed_package_file(repo, "legacy", "f", b"f");

    write_operation(&fixture, "app-core", "split legacy\n f\nsuperset 0\n f\n");
    let summary = run(repo).unwrap();
    assert_eq!(summary.anon_packages, vec!["0".to_string()]);
    assert_eq!(summary.files_moved, 2);

    assert_eq!(fs::read(repo.package_dir("app-core").join("f")).unwrap(), b"f");
    assert!(!repo.package_dir("0").exists());
    assert!(!repo.package_dir("legacy").exists());

    let graph = dependencies::load(repo).unwrap();
    assert_eq!(graph.deps("legacy"), ["0"]);
    assert_eq!(graph.deps("app-core"), ["0"]);
    assert_eq!(graph.deps("0"), ["app-core"]);
}

#[test]
fn test_link_onto_existing_file_fails_before_any_install() {
    let fixture = setup_repo();
    let repo = &fixture.repo;
    seed_package_file(repo, "tools", "usr/bin/helper", b"old");

    write_operation(
        &fixture,
        "app-core",
        "package bin\n usr/bin/app\npackage tools\n usr/bin/helper -> /opt/x\n",
    );
    let err = run(repo).unwrap_err();
    assert!(matches!(err, Error::DestinationExists(ref p) if p.ends_with("usr/bin/helper")));

    assert!(!repo.package_dir("bin").exists());
    assert_eq!(
        fs::read(repo.package_dir("tools").join("usr/bin/helper")).unwrap(),
        b"old"
    );
    assert!(repo.operation_path().exists());
}

#[test]
fn test_repo_config_disables_preflight() {
    let fixture = setup_repo();
    let repo = &fixture.repo;
    fs::write(repo.config_path(), "[engine]\npreflight = false\n").unwrap();
    write_operation(&fixture, "app-core", "package bin\n usr/bin/app\nsplit legacy\n nope\n");

    let config = EngineConfig::from_repo_config(&repo.config().unwrap());
    let mut engine = ExecutionEngine::new(config);
    let err = engine.run(repo).unwrap_err();

    assert!(matches!(err, Error::MissingFile { .. }));
    // No rollback: the install and the allocation both happened
    assert!(repo.package_dir("bin").join("usr/bin/app").is_file());
    assert!(repo.package_dir("0").is_dir());
    assert!(repo.operation_path().exists());
}
