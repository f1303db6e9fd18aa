//! Integration tests for diffing manifests of real trees

use super::test_utils::write_tree;
use dmanifest::error::ManifestError;
use dmanifest::manifest::{diff, format, EntryKind};
use dmanifest::tree::builder::ManifestBuilder;
use tempfile::TempDir;

fn build(root: &std::path::Path, tag: &str) -> dmanifest::Manifest {
    ManifestBuilder::new(root).build(tag, "").unwrap()
}

#[test]
fn test_modified_and_added_files() {
    let temp = TempDir::new().unwrap();
    let local = temp.path().join("local");
    let source = temp.path().join("source");
    write_tree(&local, &[("a.txt", "ten bytes!")]);
    write_tree(&source, &[("a.txt", "twelve bytes"), ("b.txt", "five!")]);

    let source_manifest = build(&source, "genomes");
    let result = diff(&build(&local, "genomes"), &source_manifest).unwrap();

    assert_eq!(result.modified.len(), 1);
    assert_eq!(result.modified[0].path, "a.txt");
    assert_eq!(result.modified[0].size, 12);
    assert_eq!(
        result.modified[0].digest,
        source_manifest.get("a.txt").unwrap().digest
    );
    assert_eq!(result.added_files.len(), 1);
    assert_eq!(result.added_files[0].path, "b.txt");
    assert_eq!(result.added_files[0].size, 5);
    assert!(result.deleted.is_empty());
    assert_eq!(result.download_bytes(), 17);
}

#[test]
fn test_removed_directory_lists_every_path() {
    let temp = TempDir::new().unwrap();
    let local = temp.path().join("local");
    let source = temp.path().join("source");
    write_tree(&local, &[("old/x.txt", "x"), ("keep.txt", "k")]);
    write_tree(&source, &[("keep.txt", "k")]);

    let result = diff(&build(&local, "genomes"), &build(&source, "genomes")).unwrap();

    assert_eq!(result.deleted, vec!["old".to_string(), "old/x.txt".to_string()]);
    assert_eq!(result.unchanged, 1);
    assert!(!result.has_downloads());
}

#[test]
fn test_new_directory_tree() {
    let temp = TempDir::new().unwrap();
    let local = temp.path().join("local");
    let source = temp.path().join("source");
    write_tree(&local, &[]);
    write_tree(&source, &[("set/", ""), ("set/part/", ""), ("set/part/r.dat", "r")]);

    let result = diff(&build(&local, "t"), &build(&source, "t")).unwrap();
    assert_eq!(result.added_directories, vec!["set".to_string(), "set/part".to_string()]);
    assert_eq!(result.added_files[0].path, "set/part/r.dat");
}

#[test]
fn test_file_replaced_by_directory() {
    let temp = TempDir::new().unwrap();
    let local = temp.path().join("local");
    let source = temp.path().join("source");
    write_tree(&local, &[("thing", "a file")]);
    write_tree(&source, &[("thing/inside.txt", "now a dir")]);

    let result = diff(&build(&local, "t"), &build(&source, "t")).unwrap();
    assert_eq!(result.modified.len(), 1);
    assert_eq!(result.modified[0].kind, EntryKind::Directory);
    assert_eq!(result.added_files[0].path, "thing/inside.txt");
}

#[test]
fn test_type_mismatch_rejected() {
    let temp = TempDir::new().unwrap();
    let local = temp.path().join("local");
    let source = temp.path().join("source");
    write_tree(&local, &[("a.txt", "a")]);
    write_tree(&source, &[("a.txt", "a")]);

    let err = diff(&build(&local, "genomes"), &build(&source, "proteins")).unwrap_err();
    match err {
        ManifestError::TypeMismatch {
            local_tag,
            source_tag,
        } => {
            assert_eq!(local_tag, "genomes");
            assert_eq!(source_tag, "proteins");
        }
        other => panic!("expected type mismatch, got {other:?}"),
    }
}

#[test]
fn test_diff_survives_text_roundtrip() {
    let temp = TempDir::new().unwrap();
    let local = temp.path().join("local");
    let source = temp.path().join("source");
    write_tree(&local, &[("a.txt", "1"), ("gone/", "")]);
    write_tree(&source, &[("a.txt", "2"), ("new.txt", "n")]);

    let local_manifest = build(&local, "t");
    let source_manifest = build(&source, "t");
    let direct = diff(&local_manifest, &source_manifest).unwrap();

    let reparsed_local = format::parse(&format::to_text(&local_manifest)).unwrap();
    let reparsed_source = format::parse(&format::to_text(&source_manifest)).unwrap();
    assert_eq!(direct, diff(&reparsed_local, &reparsed_source).unwrap());
}
