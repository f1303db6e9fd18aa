//! Integration tests for reconciling a local tree with a local source tree

use super::test_utils::{local_engine, write_tree};
use dmanifest::error::{ManifestError, SyncError};
use dmanifest::fetch::Location;
use dmanifest::manifest::{store, DEFAULT_MANIFEST_NAME};
use dmanifest::sync::{self, ActionOutcome, Decision, SyncOptions};
use dmanifest::tree::builder::ManifestBuilder;
use dmanifest::tree::hasher::DigestAlgorithm;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write `entries` under `root` and publish its manifest
fn publish(root: &Path, tag: &str, entries: &[(&str, &str)]) {
    write_tree(root, entries);
    ManifestBuilder::new(root)
        .build_and_write(tag, "published")
        .unwrap();
}

#[test]
fn test_initial_sync_into_missing_directory() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("source");
    let local = temp.path().join("local");
    publish(
        &source,
        "genomes",
        &[("readme.txt", "hello"), ("chr/1.fa", "ACGT"), ("chr/2.fa", "GGCC")],
    );

    let report = local_engine()
        .sync(&local, &Location::LocalPath(source.clone()), &Decision::APPROVE_ALL)
        .unwrap();

    assert_eq!(report.download, ActionOutcome::Applied);
    assert_eq!(report.deletion, ActionOutcome::NothingToDo);
    assert_eq!(report.files_transferred, 3);
    assert_eq!(report.bytes_transferred, 13);
    assert!(report.manifest_regenerated);
    assert_eq!(fs::read_to_string(local.join("chr/2.fa")).unwrap(), "GGCC");

    let local_manifest = store::read_manifest(&local.join(DEFAULT_MANIFEST_NAME)).unwrap();
    assert_eq!(local_manifest.type_tag(), "genomes");
    assert!(local_manifest.message().starts_with("synced from"));
    assert!(sync::verify(&local, &SyncOptions::default()).unwrap().is_empty());
}

#[test]
fn test_second_sync_is_a_no_op() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("source");
    let local = temp.path().join("local");
    publish(&source, "genomes", &[("a.txt", "a")]);
    let source = Location::LocalPath(source);

    let engine = local_engine();
    engine.sync(&local, &source, &Decision::APPROVE_ALL).unwrap();
    let before = fs::read_to_string(local.join(DEFAULT_MANIFEST_NAME)).unwrap();

    let report = engine.sync(&local, &source, &Decision::APPROVE_ALL).unwrap();
    assert_eq!(report.download, ActionOutcome::NothingToDo);
    assert_eq!(report.deletion, ActionOutcome::NothingToDo);
    assert!(!report.manifest_regenerated);
    assert_eq!(report.diff.unchanged, 1);
    assert_eq!(
        fs::read_to_string(local.join(DEFAULT_MANIFEST_NAME)).unwrap(),
        before
    );
}

#[test]
fn test_downloads_approved_deletions_declined() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("source");
    let local = temp.path().join("local");
    publish(&source, "genomes", &[("a.txt", "new content"), ("b.txt", "bbb")]);
    publish(&local, "genomes", &[("a.txt", "old"), ("stale.txt", "stale")]);

    let decision = Decision {
        download: true,
        delete: false,
    };
    let report = local_engine()
        .sync(&local, &Location::LocalPath(source), &decision)
        .unwrap();

    assert_eq!(report.download, ActionOutcome::Applied);
    assert_eq!(report.deletion, ActionOutcome::Declined);
    assert_eq!(report.paths_removed, 0);
    assert_eq!(fs::read_to_string(local.join("a.txt")).unwrap(), "new content");
    assert_eq!(fs::read_to_string(local.join("b.txt")).unwrap(), "bbb");
    assert!(local.join("stale.txt").exists());

    let regenerated = store::read_manifest(&local.join(DEFAULT_MANIFEST_NAME)).unwrap();
    assert!(regenerated.get("stale.txt").is_some());
    assert!(regenerated.get("b.txt").is_some());
    assert_eq!(regenerated.get("a.txt").unwrap().size, 11);
}

#[test]
fn test_deletions_only() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("source");
    let local = temp.path().join("local");
    publish(&source, "genomes", &[("keep.txt", "k")]);
    publish(
        &local,
        "genomes",
        &[("keep.txt", "k"), ("old/x.txt", "x"), ("old/deep/y.txt", "y")],
    );

    let report = local_engine()
        .sync(&local, &Location::LocalPath(source), &Decision::APPROVE_ALL)
        .unwrap();

    assert_eq!(report.download, ActionOutcome::NothingToDo);
    assert_eq!(report.deletion, ActionOutcome::Applied);
    assert_eq!(report.paths_removed, 1);
    assert!(!local.join("old").exists());
    assert!(local.join("keep.txt").exists());

    let regenerated = store::read_manifest(&local.join(DEFAULT_MANIFEST_NAME)).unwrap();
    assert_eq!(regenerated.len(), 1);
}

#[test]
fn test_declined_sync_leaves_tree_untouched() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("source");
    let local = temp.path().join("local");
    publish(&source, "genomes", &[("a.txt", "new")]);
    publish(&local, "genomes", &[("a.txt", "old"), ("b.txt", "b")]);
    let manifest_before = fs::read_to_string(local.join(DEFAULT_MANIFEST_NAME)).unwrap();

    let report = local_engine()
        .sync(&local, &Location::LocalPath(source), &Decision::DECLINE_ALL)
        .unwrap();

    assert_eq!(report.download, ActionOutcome::Declined);
    assert_eq!(report.deletion, ActionOutcome::Declined);
    assert!(!report.manifest_regenerated);
    assert_eq!(fs::read_to_string(local.join("a.txt")).unwrap(), "old");
    assert_eq!(
        fs::read_to_string(local.join(DEFAULT_MANIFEST_NAME)).unwrap(),
        manifest_before
    );
}

#[test]
fn test_type_mismatch_aborts_before_changes() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("source");
    let local = temp.path().join("local");
    publish(&source, "proteins", &[("a.txt", "new")]);
    publish(&local, "genomes", &[("a.txt", "old")]);

    let err = local_engine()
        .sync(&local, &Location::LocalPath(source), &Decision::APPROVE_ALL)
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::Manifest(ManifestError::TypeMismatch { .. })
    ));
    assert_eq!(fs::read_to_string(local.join("a.txt")).unwrap(), "old");
}

#[test]
fn test_source_content_not_matching_manifest_fails() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("source");
    let local = temp.path().join("local");
    publish(&source, "genomes", &[("a.txt", "published")]);
    fs::write(source.join("a.txt"), "tampered after publishing").unwrap();

    let err = local_engine()
        .sync(&local, &Location::LocalPath(source), &Decision::APPROVE_ALL)
        .unwrap_err();

    match err {
        SyncError::Transfer { reason, .. } => assert!(reason.contains("digest mismatch")),
        other => panic!("expected transfer error, got {other:?}"),
    }
    assert!(!local.join("a.txt").exists());
    assert!(!local.join(DEFAULT_MANIFEST_NAME).exists());
}

#[test]
fn test_source_given_as_manifest_file() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("source");
    let local = temp.path().join("local");
    publish(&source, "genomes", &[("dir/a.txt", "a")]);

    let location = Location::resolve(&source.join(DEFAULT_MANIFEST_NAME).to_string_lossy());
    let report = local_engine()
        .sync(&local, &location, &Decision::APPROVE_ALL)
        .unwrap();

    assert_eq!(report.files_transferred, 1);
    assert_eq!(fs::read_to_string(local.join("dir/a.txt")).unwrap(), "a");
}

#[test]
fn test_unmanifested_local_tree_is_walked() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("source");
    let local = temp.path().join("local");
    publish(&source, "genomes", &[("a.txt", "a"), ("b.txt", "b")]);
    write_tree(&local, &[("a.txt", "a")]);

    let plan = local_engine()
        .plan(&local, &Location::LocalPath(source))
        .unwrap();

    assert!(plan.local_manifest_missing);
    assert_eq!(plan.local.type_tag(), "genomes");
    assert_eq!(plan.diff.unchanged, 1);
    assert_eq!(plan.diff.added_files.len(), 1);
}

#[test]
fn test_unresolved_source() {
    let temp = TempDir::new().unwrap();
    let err = local_engine()
        .sync(
            temp.path(),
            &Location::resolve("definitely/not/here"),
            &Decision::APPROVE_ALL,
        )
        .unwrap_err();
    assert!(matches!(err, SyncError::UnresolvedLocation(_)));
}

#[cfg(unix)]
#[test]
fn test_failed_deletion_aborts_without_regenerating() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let source = temp.path().join("source");
    let local = temp.path().join("local");
    publish(&source, "genomes", &[("keep.txt", "k"), ("new.txt", "n")]);
    publish(&local, "genomes", &[("keep.txt", "k"), ("locked/a.txt", "a")]);
    let manifest_before = fs::read(local.join(DEFAULT_MANIFEST_NAME)).unwrap();

    let locked = local.join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();
    // Privileged users ignore directory permissions
    if fs::write(locked.join("write-check"), "x").is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = local_engine().sync(
        &local,
        &Location::LocalPath(source),
        &Decision::APPROVE_ALL,
    );
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(matches!(result, Err(SyncError::Io { .. })));
    assert!(locked.join("a.txt").exists());
    assert!(!local.join("new.txt").exists());
    assert_eq!(
        fs::read(local.join(DEFAULT_MANIFEST_NAME)).unwrap(),
        manifest_before
    );
}

#[test]
fn test_declined_deletion_survives_directory_to_file_change() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("source");
    let local = temp.path().join("local");
    publish(&source, "genomes", &[("x", "now a file")]);
    publish(&local, "genomes", &[("x/precious.txt", "keep")]);

    let decision = Decision {
        download: true,
        delete: false,
    };
    let report = local_engine()
        .sync(&local, &Location::LocalPath(source), &decision)
        .unwrap();

    assert_eq!(report.deletion, ActionOutcome::Declined);
    assert_eq!(report.skipped, vec!["x".to_string()]);
    assert_eq!(
        fs::read_to_string(local.join("x/precious.txt")).unwrap(),
        "keep"
    );
}

#[test]
fn test_sync_from_blake3_source_into_sha256_tree() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("source");
    let local = temp.path().join("local");
    write_tree(&source, &[("a.txt", "same"), ("b.txt", "new")]);
    ManifestBuilder::new(&source)
        .with_digest(DigestAlgorithm::Blake3)
        .build_and_write("genomes", "published")
        .unwrap();
    publish(&local, "genomes", &[("a.txt", "same")]);

    let report = local_engine()
        .sync(&local, &Location::LocalPath(source), &Decision::APPROVE_ALL)
        .unwrap();

    assert_eq!(report.diff.unchanged, 1);
    assert_eq!(report.files_transferred, 1);
    let regenerated = store::read_manifest(&local.join(DEFAULT_MANIFEST_NAME)).unwrap();
    assert_eq!(regenerated.digest(), DigestAlgorithm::Blake3);
    assert!(sync::verify(&local, &SyncOptions::default()).unwrap().is_empty());
}
