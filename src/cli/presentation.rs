//! CLI presentation: text and json formatters per command family.

mod manifest;
mod shared;
mod sync;

pub use manifest::{format_create_summary, format_diff_json, format_diff_text};
pub use shared::human_size;
pub use sync::{
    format_dry_run_text, format_sync_report_json, format_sync_report_text, format_verify_json,
    format_verify_text,
};
