//! Command handlers, one module per subcommand.
//!
//! Each handler translates parsed arguments into calls on the core
//! [`BatchFileWriter`] and reports the outcome. No batch logic lives here.

use tracing::debug;

use batchwrite_adapters::{CtrlcSignals, LocalFilesystem, ManualSignals};
use batchwrite_core::application::BatchFileWriter;

use crate::config::AppConfig;

pub mod apply;
pub mod completions;
pub mod init;
pub mod test_create;

/// Writer over the local filesystem.
///
/// With `writer.handle_signals` off, termination signals keep their default
/// behaviour and a batch cut short is not reverted.
pub fn build_writer(config: &AppConfig) -> BatchFileWriter {
    if config.writer.handle_signals {
        BatchFileWriter::new(Box::new(LocalFilesystem::new()), Box::new(CtrlcSignals::new()))
    } else {
        debug!("Signal handling disabled by configuration");
        BatchFileWriter::new(Box::new(LocalFilesystem::new()), Box::new(ManualSignals::new()))
    }
}
