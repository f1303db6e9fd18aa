//! Properties of manifest serialization and comparison

use dmanifest::manifest::{diff, format, Manifest, ManifestEntry};
use dmanifest::tree::hasher::DigestAlgorithm;
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_][a-zA-Z0-9_. -]{0,11}"
        .prop_filter("dot segments are not paths", |s| s != "." && s != "..")
}

/// Path -> (digest, size) for a set of distinct files
fn file_set() -> impl Strategy<Value = BTreeMap<String, (String, u64)>> {
    btree_map(
        vec(segment(), 1..4).prop_map(|segments| segments.join("/")),
        ("[0-9a-f]{64}", 0u64..1 << 40),
        0..24,
    )
}

/// A manifest whose files are the given set (no directory entries, so any
/// path prefixes stay unambiguous)
fn manifest_of(tag: &str, files: &BTreeMap<String, (String, u64)>) -> Manifest {
    let entries = files
        .iter()
        .filter(|(path, _)| !files.keys().any(|other| other.starts_with(&format!("{path}/"))))
        .map(|(path, (digest, size))| ManifestEntry::file(path.clone(), digest.clone(), *size))
        .collect();
    Manifest::new(tag, "generated", entries).unwrap()
}

proptest! {
    #[test]
    fn prop_text_roundtrip_preserves_manifest(
        files in file_set(),
        message in "(digest=[a-z0-9]{0,7};)?[^\r\n]{0,40}",
        algorithm in prop_oneof![Just(DigestAlgorithm::Sha256), Just(DigestAlgorithm::Blake3)],
    ) {
        let manifest = manifest_of("generic", &files);
        let manifest = Manifest::new("generic", message, manifest.entries().to_vec())
            .unwrap()
            .with_digest(algorithm);
        let parsed = format::parse(&format::to_text(&manifest)).unwrap();
        prop_assert_eq!(parsed, manifest);
    }

    #[test]
    fn prop_self_diff_is_empty(files in file_set()) {
        let manifest = manifest_of("generic", &files);
        let result = diff(&manifest, &manifest).unwrap();
        prop_assert!(result.is_empty());
        prop_assert_eq!(result.unchanged, manifest.len());
    }

    #[test]
    fn prop_diff_partitions_paths(local in file_set(), source in file_set()) {
        let local = manifest_of("generic", &local);
        let source = manifest_of("generic", &source);
        let result = diff(&local, &source).unwrap();

        let mut seen = std::collections::HashSet::new();
        for path in result
            .added_files
            .iter()
            .map(|c| c.path.as_str())
            .chain(result.added_directories.iter().map(String::as_str))
            .chain(result.modified.iter().map(|c| c.path.as_str()))
            .chain(result.deleted.iter().map(String::as_str))
        {
            prop_assert!(seen.insert(path.to_string()), "path classified twice: {}", path);
        }

        // Every source path is added, modified, or unchanged
        prop_assert_eq!(
            result.added_files.len() + result.added_directories.len()
                + result.modified.len() + result.unchanged,
            source.len()
        );
        // Every local path is deleted, modified, or unchanged
        prop_assert_eq!(
            result.deleted.len() + result.modified.len() + result.unchanged,
            local.len()
        );
        for path in &result.deleted {
            prop_assert!(source.get(path).is_none());
            prop_assert!(local.get(path).is_some());
        }
    }

    #[test]
    fn prop_download_bytes_matches_changes(local in file_set(), source in file_set()) {
        let local = manifest_of("generic", &local);
        let source = manifest_of("generic", &source);
        let result = diff(&local, &source).unwrap();

        let expected: u64 = source
            .entries()
            .iter()
            .filter(|e| match local.get(&e.path) {
                Some(l) => l.digest != e.digest || l.kind != e.kind,
                None => true,
            })
            .map(|e| e.size)
            .sum();
        prop_assert_eq!(result.download_bytes(), expected);
    }
}
