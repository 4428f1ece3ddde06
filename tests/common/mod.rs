// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use treepack::Repo;

/// A scratch repo plus a source tree next to it.
///
/// Keep the TempDir alive to prevent cleanup.
pub struct Fixture {
    pub temp_dir: TempDir,
    pub repo: Repo,
    pub source: PathBuf,
}

/// Create an empty repo and a source tree holding `usr/bin/app`,
/// `usr/bin/tool` and `usr/lib/liba.so`.
pub fn setup_repo() -> Fixture {
    let temp_dir = TempDir::new().unwrap();
    let repo = Repo::init(temp_dir.path().join("repo")).unwrap();
    let source = temp_dir.path().join("build/out");

    write_file(&source.join("usr/bin/app"), b"#!/bin/sh\necho app\n");
    write_file(&source.join("usr/bin/tool"), b"#!/bin/sh\necho tool\n");
    write_file(&source.join("usr/lib/liba.so"), b"\x7fELF liba");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(source.join("usr/bin/app"), fs::Permissions::from_mode(0o755))
            .unwrap();
        fs::set_permissions(source.join("usr/lib/liba.so"), fs::Permissions::from_mode(0o644))
            .unwrap();
    }

    Fixture {
        temp_dir,
        repo,
        source,
    }
}

/// Write `content` to `path`, creating parent directories
pub fn write_file(path: &Path, content: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Write the pending operation file with the fixture's newpackage/source header
pub fn write_operation(fixture: &Fixture, new_package: &str, body: &str) {
    fs::write(
        fixture.repo.operation_path(),
        format!(
            "newpackage {}\nsource {}\n{}",
            new_package,
            fixture.source.display(),
            body
        ),
    )
    .unwrap();
}

/// Put a file directly into a package, as if a previous run installed it
pub fn seed_package_file(repo: &Repo, package: &str, file: &str, content: &[u8]) {
    write_file(&repo.package_dir(package).join(file), content);
}

/// Sorted names of the directories under `packs/`
pub fn package_names(repo: &Repo) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(repo.packs_dir())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
