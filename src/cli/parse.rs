//! CLI parse: clap types for dmanifest. No behavior; definitions only.

use crate::tree::hasher::DigestAlgorithm;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// dmanifest - directory manifests for mirroring data trees
#[derive(Parser)]
#[command(name = "dmanifest")]
#[command(about = "Create, compare, and synchronize directory manifests")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (replaces global and project config files)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(long, short = 'v', global = true, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

/// Rendering of command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Walk a directory and write its manifest
    Create {
        /// Directory to describe
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Type tag written into the header
        #[arg(long = "type")]
        type_tag: Option<String>,
        /// Free-text header message (defaults to a timestamp)
        #[arg(long, short = 'm')]
        message: Option<String>,
        /// Manifest file name
        #[arg(long)]
        manifest_name: Option<String>,
        /// Digest algorithm (sha256, blake3)
        #[arg(long)]
        digest: Option<DigestAlgorithm>,
        /// Print the manifest instead of writing it
        #[arg(long)]
        print: bool,
    },
    /// Compare a local manifest against a source manifest
    Diff {
        /// Local tree (or manifest file)
        local: String,
        /// Source tree, manifest file, or URL
        source: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Bring a local tree in line with a source
    Sync {
        /// Local tree to update
        dir: PathBuf,
        /// Source tree or URL
        source: String,
        /// Approve downloads and deletions without prompting
        #[arg(long, short = 'y')]
        yes: bool,
        /// Show what would change and exit
        #[arg(long)]
        dry_run: bool,
        /// Never delete local paths
        #[arg(long)]
        no_delete: bool,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Check a tree against its own manifest
    Verify {
        /// Directory to check
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the effective configuration
    Config,
}
