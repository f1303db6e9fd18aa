//! CLI route: single route table and run context. Dispatches to the manifest
//! and sync services and to presentation.

use crate::cli::parse::{Commands, OutputFormat};
use crate::cli::presentation::{
    format_create_summary, format_diff_json, format_diff_text, format_dry_run_text,
    format_sync_report_json, format_sync_report_text, format_verify_json, format_verify_text,
};
use crate::cli::prompt::DialoguerConfirm;
use crate::cli::command_name;
use crate::config::{ConfigLoader, DmanifestConfig};
use crate::error::SyncError;
use crate::fetch::{DefaultFetcher, Location};
use crate::manifest::{store, Manifest};
use crate::sync::{self, Confirm, Decision, SyncEngine};
use crate::tree::builder::ManifestBuilder;
use crate::tree::hasher::DigestAlgorithm;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, info_span};

/// Runtime context for CLI execution: the effective configuration.
pub struct RunContext {
    config: DmanifestConfig,
}

impl RunContext {
    /// Load configuration for a run started in `project_dir`.
    ///
    /// An explicit `config_path` replaces the global and project files.
    pub fn new(project_dir: &Path, config_path: Option<&Path>) -> Result<Self, SyncError> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(project_dir)?,
        };
        Self::from_config(config)
    }

    pub fn from_config(config: DmanifestConfig) -> Result<Self, SyncError> {
        config.ensure_valid()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DmanifestConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, SyncError> {
        let span = info_span!("command", name = command_name(command));
        let _guard = span.enter();
        let started = Instant::now();

        let result = self.execute_inner(command);

        info!(
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis(),
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, SyncError> {
        match command {
            Commands::Create {
                dir,
                type_tag,
                message,
                manifest_name,
                digest,
                print,
            } => self.handle_create(
                dir,
                type_tag.as_deref(),
                message.as_deref(),
                manifest_name.as_deref(),
                *digest,
                *print,
            ),
            Commands::Diff {
                local,
                source,
                format,
            } => self.handle_diff(local, source, *format),
            Commands::Sync {
                dir,
                source,
                yes,
                dry_run,
                no_delete,
                format,
            } => {
                if *dry_run {
                    self.handle_dry_run(dir, source, *format)
                } else if *yes {
                    let decision = Decision {
                        download: true,
                        delete: !*no_delete,
                    };
                    self.handle_sync(dir, source, &decision, *format)
                } else {
                    self.handle_sync(dir, source, &DialoguerConfirm::new(!*no_delete), *format)
                }
            }
            Commands::Verify { dir, format } => self.handle_verify(dir, *format),
            Commands::Config => self.config.to_toml(),
        }
    }

    fn engine(&self) -> Result<SyncEngine<DefaultFetcher>, SyncError> {
        let fetcher = DefaultFetcher::new(&self.config.transfer.http_settings())?;
        Ok(SyncEngine::new(fetcher, self.config.sync_options()))
    }

    fn handle_create(
        &self,
        dir: &Path,
        type_tag: Option<&str>,
        message: Option<&str>,
        manifest_name: Option<&str>,
        digest: Option<DigestAlgorithm>,
        print: bool,
    ) -> Result<String, SyncError> {
        if !dir.is_dir() {
            return Err(SyncError::io(
                dir,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }

        let type_tag = type_tag.unwrap_or(&self.config.manifest.type_tag);
        let manifest_name = manifest_name.unwrap_or(&self.config.manifest.file_name);
        let digest = digest.unwrap_or(self.config.manifest.digest);
        let message = match message {
            Some(m) => m.to_string(),
            None => format!("created at {}", timestamp()),
        };

        let builder = ManifestBuilder::new(dir)
            .with_manifest_name(manifest_name)
            .with_digest(digest);

        if print {
            let manifest = builder.build(type_tag, &message)?;
            let mut buffer = Vec::new();
            store::print_manifest(&manifest, &mut buffer)?;
            return Ok(String::from_utf8_lossy(&buffer).trim_end().to_string());
        }

        let manifest = builder.build_and_write(type_tag, &message)?;
        let written = store::manifest_file(dir, manifest_name);
        Ok(format_create_summary(&manifest, &written, digest))
    }

    fn handle_diff(
        &self,
        local: &str,
        source: &str,
        format: OutputFormat,
    ) -> Result<String, SyncError> {
        let engine = self.engine()?;
        let source_location = Location::resolve(source);
        let local_location = Location::resolve(local);

        let source_manifest = engine.load_source_manifest(&source_location)?;
        let local_manifest = self.load_local_side(&engine, &local_location, &source_manifest)?;
        let result = crate::manifest::diff(&local_manifest, &source_manifest)?;

        let local_label = local_location.to_string();
        let source_label = source_location.to_string();
        match format {
            OutputFormat::Json => format_diff_json(&local_label, &source_label, &result),
            OutputFormat::Text => Ok(format_diff_text(&local_label, &source_label, &result)),
        }
    }

    /// A local directory without a manifest is described by walking it.
    fn load_local_side(
        &self,
        engine: &SyncEngine<DefaultFetcher>,
        local: &Location,
        source_manifest: &Manifest,
    ) -> Result<Manifest, SyncError> {
        match local {
            Location::LocalPath(path) if path.is_dir() => {
                let (manifest, walked) = engine.load_local_manifest(
                    path,
                    source_manifest.type_tag(),
                    source_manifest.digest(),
                )?;
                debug!(walked, "Loaded local side");
                Ok(manifest)
            }
            _ => engine.load_manifest(local, &self.config.manifest.file_name),
        }
    }

    fn handle_dry_run(
        &self,
        dir: &Path,
        source: &str,
        format: OutputFormat,
    ) -> Result<String, SyncError> {
        let engine = self.engine()?;
        let source_location = Location::resolve(source);
        let plan = engine.plan(dir, &source_location)?;
        let source_label = source_location.to_string();
        match format {
            OutputFormat::Json => {
                format_diff_json(&dir.display().to_string(), &source_label, &plan.diff)
            }
            OutputFormat::Text => Ok(format_dry_run_text(dir, &source_label, &plan.diff)),
        }
    }

    fn handle_sync(
        &self,
        dir: &Path,
        source: &str,
        confirm: &dyn Confirm,
        format: OutputFormat,
    ) -> Result<String, SyncError> {
        let engine = self.engine()?;
        let source_location = Location::resolve(source);
        let report = engine.sync(dir, &source_location, confirm)?;
        match format {
            OutputFormat::Json => format_sync_report_json(&report),
            OutputFormat::Text => Ok(format_sync_report_text(&report)),
        }
    }

    fn handle_verify(&self, dir: &Path, format: OutputFormat) -> Result<String, SyncError> {
        let drift = sync::verify(dir, &self.config.sync_options())?;
        let rendered = match format {
            OutputFormat::Json => format_verify_json(dir, &drift)?,
            OutputFormat::Text => format_verify_text(dir, &drift),
        };
        if drift.is_empty() {
            Ok(rendered)
        } else {
            Err(SyncError::Verification(rendered))
        }
    }
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
