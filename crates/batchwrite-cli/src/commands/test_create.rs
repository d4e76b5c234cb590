//! Implementation of the `batchwrite test create` command.
//!
//! Generates `__tests__/<module>.test.js` next to a Lightning web component
//! and writes it through the batch writer.

use std::ffi::OsStr;

use tracing::{debug, info, instrument, warn};

use batchwrite_adapters::LocalFilesystem;
use batchwrite_core::{application::ports::Filesystem, domain::WriteOptions};

use crate::{
    cli::TestCreateArgs,
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    lwc::{self, TestLocation},
    output::OutputManager,
};

/// Execute the `batchwrite test create` command.
///
/// Dispatch sequence:
/// 1. Check the component file is an existing `.js` file inside a project
/// 2. Refuse to overwrite an existing test
/// 3. Create the test directory if needed
/// 4. Commit the generated suite; drop a directory this run created if the
///    commit fails
#[instrument(skip_all, fields(filepath = %args.filepath.display()))]
pub fn execute(args: TestCreateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let module_path = std::path::absolute(&args.filepath)
        .with_cli_context(|| format!("Failed to resolve '{}'", args.filepath.display()))?;

    if module_path.extension() != Some(OsStr::new("js")) {
        return Err(CliError::NotJavaScript {
            path: args.filepath,
        });
    }
    if !module_path.is_file() {
        return Err(CliError::FileNotFound {
            path: args.filepath,
        });
    }

    let marker = &config.test.project_marker;
    let root = lwc::find_project_root(&module_path, marker).ok_or_else(|| {
        CliError::NotInProject {
            path: module_path.clone(),
            marker: marker.clone(),
        }
    })?;
    debug!(root = %root.display(), "Project root found");

    let location = TestLocation::for_module(&module_path, &config.test.dir_name).ok_or_else(
        || CliError::InvalidInput {
            message: format!("cannot derive a module name from '{}'", args.filepath.display()),
            source: None,
        },
    )?;
    if location.file.exists() {
        return Err(CliError::TestExists {
            path: location.file,
        });
    }

    let fs = LocalFilesystem::new();
    let created_dir = !fs.exists(&location.dir);
    if created_dir {
        fs.create_dir_all(&location.dir)?;
    }

    let mut writer = super::build_writer(&config);
    writer.queue_write(
        &location.file,
        lwc::jest_suite(&location.module),
        WriteOptions::default(),
    );

    if let Err(e) = writer.commit() {
        if created_dir {
            if let Err(cleanup) = fs.remove_dir(&location.dir) {
                warn!(error = %cleanup, "Failed to remove test directory");
            }
        }
        return Err(e.into());
    }

    info!(test = %location.file.display(), "Test case created");
    output.success("Test case successfully created")?;
    output.item(&location.file.display().to_string())?;

    Ok(())
}
