//! Manifest presentation: create summaries and diff listings.

use crate::cli::presentation::shared::{human_size, push_path_section, summary_table, to_json};
use crate::error::SyncError;
use crate::manifest::{DiffResult, EntryKind, Manifest};
use crate::tree::hasher::DigestAlgorithm;
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::Path;

pub fn format_create_summary(manifest: &Manifest, path: &Path, digest: DigestAlgorithm) -> String {
    let title = format!("Wrote {}", path.display());
    let table = summary_table(vec![
        ("Type", manifest.type_tag().to_string()),
        ("Message", manifest.message().to_string()),
        (
            "Files",
            format!(
                "{} ({})",
                manifest.file_count(),
                human_size(manifest.total_size())
            ),
        ),
        ("Directories", manifest.directory_count().to_string()),
        ("Digest", digest.to_string()),
    ]);
    format!("{}\n\n{}", title.bold(), table)
}

pub fn format_diff_text(local: &str, source: &str, diff: &DiffResult) -> String {
    let mut out = format!(
        "{}\n  local:  {}\n  source: {}\n",
        "Manifest diff".bold().underline(),
        local,
        source
    );

    if diff.is_empty() {
        out.push_str(&format!(
            "\n{} ({} entries unchanged)",
            "Up to date".green(),
            diff.unchanged
        ));
        return out;
    }

    let table = summary_table(vec![
        ("Added files", diff.added_files.len().to_string()),
        ("Added directories", diff.added_directories.len().to_string()),
        ("Modified", diff.modified.len().to_string()),
        ("Deleted", diff.deleted.len().to_string()),
        ("Unchanged", diff.unchanged.to_string()),
        (
            "To download",
            format!(
                "{} files, {}",
                diff.download_count(),
                human_size(diff.download_bytes())
            ),
        ),
    ]);
    out.push('\n');
    out.push_str(&table.to_string());
    out.push('\n');

    push_path_section(
        &mut out,
        "Added directories",
        "+",
        diff.added_directories.iter().map(String::as_str),
    );
    push_path_section(
        &mut out,
        "Added files",
        "+",
        diff.added_files.iter().map(|c| c.path.as_str()),
    );
    let modified: Vec<String> = diff
        .modified
        .iter()
        .map(|c| match c.kind {
            EntryKind::Directory => format!("{}/", c.path),
            EntryKind::File => c.path.clone(),
        })
        .collect();
    push_path_section(&mut out, "Modified", "~", modified.iter().map(String::as_str));
    push_path_section(
        &mut out,
        "Deleted",
        "-",
        diff.deleted.iter().map(String::as_str),
    );

    out.trim_end().to_string()
}

pub fn format_diff_json(local: &str, source: &str, diff: &DiffResult) -> Result<String, SyncError> {
    to_json(&json!({
        "local": local,
        "source": source,
        "up_to_date": diff.is_empty(),
        "download_count": diff.download_count(),
        "download_bytes": diff.download_bytes(),
        "diff": diff,
    }))
}
