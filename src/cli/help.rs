//! CLI command-name contract for log spans.

use crate::cli::parse::Commands;

/// Command name recorded on the command span (e.g. "sync", "verify").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Create { .. } => "create",
        Commands::Diff { .. } => "diff",
        Commands::Sync { .. } => "sync",
        Commands::Verify { .. } => "verify",
        Commands::Config => "config",
    }
}
