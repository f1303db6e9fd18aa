//! Sync and verify presentation.

use crate::cli::presentation::manifest::format_diff_text;
use crate::cli::presentation::shared::{human_size, push_path_section, summary_table, to_json};
use crate::error::SyncError;
use crate::manifest::DiffResult;
use crate::sync::{ActionOutcome, SyncReport};
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::Path;

fn outcome_label(outcome: ActionOutcome) -> String {
    match outcome {
        ActionOutcome::Applied => outcome.to_string().green().to_string(),
        ActionOutcome::Declined => outcome.to_string().yellow().to_string(),
        ActionOutcome::NothingToDo => outcome.to_string(),
    }
}

pub fn format_sync_report_text(report: &SyncReport) -> String {
    let title = format!("Sync {} <- {}", report.local_root.display(), report.source);
    let table = summary_table(vec![
        ("Type", report.type_tag.clone()),
        ("Downloads", outcome_label(report.download)),
        (
            "Transferred",
            format!(
                "{} files, {}",
                report.files_transferred,
                human_size(report.bytes_transferred)
            ),
        ),
        ("Deletions", outcome_label(report.deletion)),
        ("Removed", format!("{} paths", report.paths_removed)),
        ("Unchanged", report.diff.unchanged.to_string()),
        (
            "Manifest",
            if report.manifest_regenerated {
                "regenerated".to_string()
            } else {
                "unchanged".to_string()
            },
        ),
    ]);
    let mut out = format!("{}\n\n{}\n", title.bold().underline(), table);
    push_path_section(
        &mut out,
        "Kept directories (deletions declined)",
        "=",
        report.skipped.iter().map(String::as_str),
    );
    out.trim_end().to_string()
}

pub fn format_sync_report_json(report: &SyncReport) -> Result<String, SyncError> {
    to_json(report)
}

pub fn format_dry_run_text(local: &Path, source: &str, diff: &DiffResult) -> String {
    format!(
        "{}\n\n{}",
        format_diff_text(&local.display().to_string(), source, diff),
        "Dry run: no changes made".dimmed()
    )
}

/// Drift of a tree relative to its own manifest.
///
/// The stored manifest is the local side of the diff, so additions are
/// untracked paths and deletions are missing ones.
pub fn format_verify_text(root: &Path, drift: &DiffResult) -> String {
    let mut out = format!("{} {}\n", "Verify".bold().underline(), root.display());
    if drift.is_empty() {
        out.push_str(&format!(
            "\n{} ({} entries match)",
            "OK".green(),
            drift.unchanged
        ));
        return out;
    }

    out.push_str(&format!("\n{}\n", "Tree differs from its manifest".red()));
    push_path_section(
        &mut out,
        "Untracked",
        "?",
        drift
            .added_directories
            .iter()
            .map(String::as_str)
            .chain(drift.added_files.iter().map(|c| c.path.as_str())),
    );
    push_path_section(
        &mut out,
        "Missing",
        "!",
        drift.deleted.iter().map(String::as_str),
    );
    push_path_section(
        &mut out,
        "Changed",
        "~",
        drift.modified.iter().map(|c| c.path.as_str()),
    );
    out.trim_end().to_string()
}

pub fn format_verify_json(root: &Path, drift: &DiffResult) -> Result<String, SyncError> {
    let untracked: Vec<&str> = drift
        .added_directories
        .iter()
        .map(String::as_str)
        .chain(drift.added_files.iter().map(|c| c.path.as_str()))
        .collect();
    let changed: Vec<&str> = drift.modified.iter().map(|c| c.path.as_str()).collect();
    to_json(&json!({
        "root": root,
        "ok": drift.is_empty(),
        "untracked": untracked,
        "missing": drift.deleted,
        "changed": changed,
        "unchanged": drift.unchanged,
    }))
}
