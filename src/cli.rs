//! CLI domain: parse, route, help, output, prompt, and presentation only.
//! No sync orchestration; a single route table dispatches to the engine.

mod help;
mod output;
mod parse;
mod presentation;
mod prompt;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, OutputFormat};
pub use presentation::{
    format_create_summary, format_diff_json, format_diff_text, format_dry_run_text,
    format_sync_report_json, format_sync_report_text, format_verify_json, format_verify_text,
    human_size,
};
pub use prompt::DialoguerConfirm;
pub use route::RunContext;
