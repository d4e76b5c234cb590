//! Implementation of the `batchwrite apply` command.
//!
//! Reads a manifest of appends and writes, queues every entry on one
//! writer and commits them as a single batch.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use batchwrite_core::{
    application::{BatchFileWriter, CommitReport},
    domain::{OperationKind, WriteOptions},
};

use crate::{
    cli::{ApplyArgs, OutputFormat},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// A batch as written on disk.
///
/// ```toml
/// [[append]]
/// path = "CHANGELOG.md"
/// content = "- entry\n"
///
/// [[write]]
/// path = "bin/run.sh"
/// content = "#!/bin/sh\n"
/// mode = 0o755
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub append: Vec<ManifestEntry>,
    #[serde(default)]
    pub write: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    /// Relative paths are taken relative to the manifest's directory.
    pub path: PathBuf,
    pub content: String,
    #[serde(default)]
    pub mode: Option<u32>,
}

/// One line of a `--dry-run --output-format json` plan.
#[derive(Debug, Serialize)]
struct PlannedOperation<'a> {
    kind: OperationKind,
    path: &'a Path,
    bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<u32>,
}

/// JSON rendering of a [`CommitReport`].
#[derive(Debug, Serialize)]
struct ReportView<'a> {
    appended: &'a [PathBuf],
    written: &'a [PathBuf],
    created: &'a [PathBuf],
    backups_taken: usize,
    leftover_backups: &'a [PathBuf],
}

impl<'a> From<&'a CommitReport> for ReportView<'a> {
    fn from(report: &'a CommitReport) -> Self {
        Self {
            appended: &report.appended,
            written: &report.written,
            created: &report.created,
            backups_taken: report.backups_taken,
            leftover_backups: &report.leftover_backups,
        }
    }
}

impl Manifest {
    /// Read and parse a manifest; the format follows the file extension.
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_cli_context(|| format!("Failed to read manifest '{}'", path.display()))?;

        let manifest_error = |message: String, source: Box<dyn std::error::Error + Send + Sync>| {
            CliError::ManifestError {
                path: path.to_path_buf(),
                message,
                source: Some(source),
            }
        };

        let mut manifest: Manifest = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&text)
                .map_err(|e| manifest_error("not valid TOML".into(), Box::new(e)))?,
            Some("json") => serde_json::from_str(&text)
                .map_err(|e| manifest_error("not valid JSON".into(), Box::new(e)))?,
            _ => {
                return Err(CliError::ManifestError {
                    path: path.to_path_buf(),
                    message: "expected a .toml or .json file".into(),
                    source: None,
                });
            }
        };

        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            manifest.rebase(base);
        }
        Ok(manifest)
    }

    pub fn len(&self) -> usize {
        self.append.len() + self.write.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Anchor relative entry paths at `base`.
    fn rebase(&mut self, base: &Path) {
        for entry in self.append.iter_mut().chain(self.write.iter_mut()) {
            if entry.path.is_relative() {
                entry.path = base.join(&entry.path);
            }
        }
    }

    /// Queue every entry on `writer`, appends and writes in manifest order.
    pub fn queue_into(self, writer: &mut BatchFileWriter) {
        for entry in self.append {
            let options = entry.options();
            writer.queue_append(entry.path, entry.content, options);
        }
        for entry in self.write {
            let options = entry.options();
            writer.queue_write(entry.path, entry.content, options);
        }
    }

    fn plan(&self) -> Vec<PlannedOperation<'_>> {
        let appends = self.append.iter().map(|e| e.planned(OperationKind::Append));
        let writes = self.write.iter().map(|e| e.planned(OperationKind::Write));
        appends.chain(writes).collect()
    }
}

impl ManifestEntry {
    fn options(&self) -> WriteOptions {
        match self.mode {
            Some(mode) => WriteOptions::new().with_mode(mode),
            None => WriteOptions::new(),
        }
    }

    fn planned(&self, kind: OperationKind) -> PlannedOperation<'_> {
        PlannedOperation {
            kind,
            path: &self.path,
            bytes: self.content.len(),
            mode: self.mode,
        }
    }
}

/// Execute the `batchwrite apply` command.
#[instrument(skip_all, fields(manifest = %args.manifest.display()))]
pub fn execute(args: ApplyArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let manifest = Manifest::load(&args.manifest)?;
    debug!(
        appends = manifest.append.len(),
        writes = manifest.write.len(),
        "Manifest loaded"
    );

    if manifest.is_empty() {
        output.warning("Manifest lists no operations; nothing to do")?;
        return Ok(());
    }

    if args.dry_run {
        return print_plan(&manifest, &output);
    }

    let mut writer = super::build_writer(&config);
    manifest.queue_into(&mut writer);

    let json = output.format() == OutputFormat::Json;
    if !json {
        output.info(&format!("Applying {} operation(s)...", writer.pending()))?;
    }
    let report = writer.commit()?;
    info!(operations = report.operation_count(), "Manifest applied");

    if json {
        output.json(&ReportView::from(&report))?;
        return Ok(());
    }

    output.success(&format!(
        "Applied {} operation(s) ({} file(s) created)",
        report.operation_count(),
        report.created.len()
    ))?;
    if !report.is_clean() {
        output.warning("Some temporary backups could not be removed:")?;
        for backup in &report.leftover_backups {
            output.item(&backup.display().to_string())?;
        }
    }

    Ok(())
}

fn print_plan(manifest: &Manifest, output: &OutputManager) -> CliResult<()> {
    let plan = manifest.plan();
    if output.format() == OutputFormat::Json {
        output.json(&plan)?;
        return Ok(());
    }

    output.header(&format!("Dry run: would apply {} operation(s)", plan.len()))?;
    for op in &plan {
        output.item(&format!("{} {} ({} bytes)", op.kind, op.path.display(), op.bytes))?;
    }
    Ok(())
}
