//! End-to-end tests for the local directory source: scan a temp repository
//! of generated zip packages, then install from it.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

use modvault_core::source::{InstallError, LocalPackageSource, PackageSource};
use modvault_schema::{DependencyId, GroupId, PackageVersionInfo};

/// Write a package archive with a manifest and a couple of payload files.
fn write_package(dir: &Path, file_name: &str, manifest_json: &str) -> PathBuf {
    let path = dir.join(file_name);
    let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
    let options = SimpleFileOptions::default();

    writer.add_directory("plugins/", options).unwrap();
    writer.start_file("manifest.json", options).unwrap();
    writer.write_all(manifest_json.as_bytes()).unwrap();
    writer.start_file("plugins/mod.dll", options).unwrap();
    writer.write_all(file_name.as_bytes()).unwrap();
    writer.start_file("README.md", options).unwrap();
    writer.write_all(b"readme").unwrap();
    writer.finish().unwrap();
    path
}

fn manifest(name: &str, version: &str) -> String {
    format!(r#"{{"name": "{name}", "version_number": "{version}", "description": "d"}}"#)
}

/// Digest every file under `root`, keyed by relative path.
fn tree_digest(root: &Path) -> Vec<(String, String)> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let rel = path.strip_prefix(root).unwrap().display().to_string();
                let digest = hex::encode(Sha256::digest(fs::read(&path).unwrap()));
                files.push((rel, digest));
            }
        }
    }
    files.sort();
    files
}

fn loaded_source(repo: &Path) -> LocalPackageSource {
    let mut source = LocalPackageSource::new(repo);
    source.load_packages().unwrap();
    source
}

#[test]
fn load_registers_one_group_per_archive() {
    let repo = TempDir::new().unwrap();
    write_package(repo.path(), "alice-foo-1.0.0.zip", &manifest("foo", "1.0.0"));
    write_package(repo.path(), "alice-bar-2.1.0.zip", &manifest("bar", "2.1.0"));

    let source = loaded_source(repo.path());

    assert_eq!(source.catalog().len(), 2);
    let foo = source.catalog().get(&GroupId::new("alice-foo")).unwrap();
    assert_eq!(foo.author(), "alice");
    assert_eq!(foo.name(), "foo");
    assert_eq!(foo.versions().len(), 1);
    assert_eq!(foo.versions()[0].version_number(), "1.0.0");
    assert_eq!(
        foo.versions()[0].dependency_id(),
        &DependencyId::new("alice-foo-1.0.0")
    );
    assert!(source.catalog().get(&GroupId::new("alice-bar")).is_some());
}

#[test]
fn same_author_different_names_stay_distinct() {
    let repo = TempDir::new().unwrap();
    write_package(repo.path(), "alice-foo.zip", &manifest("foo", "1.0.0"));
    write_package(repo.path(), "alice-bar.zip", &manifest("bar", "1.0.0"));

    let source = loaded_source(repo.path());

    let keys: Vec<_> = source
        .catalog()
        .groups()
        .map(|g| g.dependency_id().to_string())
        .collect();
    assert_eq!(keys, vec!["alice-bar", "alice-foo"]);
}

#[test]
fn reloading_is_idempotent() {
    let repo = TempDir::new().unwrap();
    write_package(repo.path(), "alice-foo-1.0.0.zip", &manifest("foo", "1.0.0"));
    write_package(repo.path(), "bob-baz-0.3.0.zip", &manifest("baz", "0.3.0"));

    let mut source = loaded_source(repo.path());
    let first: Vec<_> = source
        .catalog()
        .groups()
        .map(|g| (g.dependency_id().clone(), g.versions().to_vec()))
        .collect();

    source.load_packages().unwrap();
    let second: Vec<_> = source
        .catalog()
        .groups()
        .map(|g| (g.dependency_id().clone(), g.versions().to_vec()))
        .collect();

    assert_eq!(first, second);
}

#[test]
fn bad_archives_are_skipped_not_fatal() {
    let repo = TempDir::new().unwrap();
    write_package(repo.path(), "alice-good-1.0.0.zip", &manifest("good", "1.0.0"));
    // Malformed manifest.
    write_package(repo.path(), "bob-broken-1.0.0.zip", "not json {{{");
    // No manifest entry at all.
    let path = repo.path().join("carol-empty-1.0.0.zip");
    let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
    writer
        .start_file("icon.png", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"png").unwrap();
    writer.finish().unwrap();
    // Not a zip at all.
    fs::write(repo.path().join("dave-junk-1.0.0.zip"), b"garbage").unwrap();

    let source = loaded_source(repo.path());

    assert_eq!(source.catalog().len(), 1);
    assert!(source.catalog().get(&GroupId::new("alice-good")).is_some());
}

#[test]
fn install_extracts_matching_archive() {
    let repo = TempDir::new().unwrap();
    write_package(repo.path(), "alice-foo-1.0.0.zip", &manifest("foo", "1.0.0"));
    write_package(repo.path(), "bob-bar-1.0.0.zip", &manifest("bar", "1.0.0"));

    let source = loaded_source(repo.path());
    let version = source
        .catalog()
        .find_version(&DependencyId::new("alice-foo-1.0.0"))
        .unwrap()
        .clone();

    let dest = TempDir::new().unwrap();
    let target = dest.path().join("alice-foo");
    source.install_package_files(&version, &target).unwrap();

    assert_eq!(
        fs::read(target.join("plugins/mod.dll")).unwrap(),
        b"alice-foo-1.0.0.zip"
    );
    assert!(target.join("manifest.json").exists());
    assert!(target.join("README.md").exists());
}

#[test]
fn install_twice_is_idempotent() {
    let repo = TempDir::new().unwrap();
    write_package(repo.path(), "alice-foo-1.0.0.zip", &manifest("foo", "1.0.0"));

    let source = loaded_source(repo.path());
    let version = source
        .catalog()
        .find_version(&DependencyId::new("alice-foo-1.0.0"))
        .unwrap()
        .clone();

    let dest = TempDir::new().unwrap();
    let target = dest.path().join("out");
    source.install_package_files(&version, &target).unwrap();
    let first = tree_digest(&target);

    source.install_package_files(&version, &target).unwrap();
    let second = tree_digest(&target);

    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn install_unknown_group_fails_and_leaves_dest_absent() {
    let repo = TempDir::new().unwrap();
    write_package(repo.path(), "alice-foo-1.0.0.zip", &manifest("foo", "1.0.0"));

    let source = loaded_source(repo.path());
    let version = PackageVersionInfo::new(
        "9.9.9",
        DependencyId::new("ghost-pkg-9.9.9"),
        GroupId::new("ghost-pkg"),
        vec![],
        "",
    );

    let dest = TempDir::new().unwrap();
    let target = dest.path().join("never-created");
    let err = source.install_package_files(&version, &target).unwrap_err();

    match err {
        InstallError::PackageNotFound { group_id } => {
            assert_eq!(group_id, GroupId::new("ghost-pkg"));
        }
        other => panic!("expected PackageNotFound, got {other}"),
    }
    assert!(!target.exists());
}

#[test]
fn install_reflects_directory_changes_since_last_scan() {
    let repo = TempDir::new().unwrap();
    write_package(repo.path(), "alice-foo-1.0.0.zip", &manifest("foo", "1.0.0"));

    let source = loaded_source(repo.path());
    let version = source
        .catalog()
        .find_version(&DependencyId::new("alice-foo-1.0.0"))
        .unwrap()
        .clone();

    // The archive disappears after the scan; install must notice.
    fs::remove_file(repo.path().join("alice-foo-1.0.0.zip")).unwrap();

    let dest = TempDir::new().unwrap();
    let err = source
        .install_package_files(&version, &dest.path().join("out"))
        .unwrap_err();
    assert!(matches!(err, InstallError::PackageNotFound { .. }));
}

// Two archives resolving to the same group id is a repository authoring
// error; the pinned contract is first-match over the sorted listing.
#[test]
fn install_prefers_first_archive_in_sorted_order() {
    let repo = TempDir::new().unwrap();
    write_package(repo.path(), "alice-foo-1.0.0.zip", &manifest("foo", "1.0.0"));
    write_package(repo.path(), "alice-foo-2.0.0.zip", &manifest("foo", "2.0.0"));

    let source = loaded_source(repo.path());
    // Both archives produced the key "alice-foo"; the catalog kept the most
    // recently scanned (sorted order makes that the 2.0.0 archive).
    assert_eq!(source.catalog().len(), 1);
    let version = source.catalog().get(&GroupId::new("alice-foo")).unwrap().versions()[0].clone();
    assert_eq!(version.version_number(), "2.0.0");

    let dest = TempDir::new().unwrap();
    let target = dest.path().join("out");
    source.install_package_files(&version, &target).unwrap();

    // Install matches by group id and takes the first archive in sorted
    // order, which is the 1.0.0 one.
    assert_eq!(
        fs::read(target.join("plugins/mod.dll")).unwrap(),
        b"alice-foo-1.0.0.zip"
    );
}

#[tokio::test]
async fn reload_pages_completes_immediately_for_local_source() {
    let repo = TempDir::new().unwrap();
    write_package(repo.path(), "alice-foo-1.0.0.zip", &manifest("foo", "1.0.0"));

    let mut source = loaded_source(repo.path());
    let before = source.catalog().len();
    source.reload_pages().await.unwrap();
    assert_eq!(source.catalog().len(), before);
}
