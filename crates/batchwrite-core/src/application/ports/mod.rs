//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `batchwrite-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `SignalRegistry`: Termination signal delivery
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (`BatchFileWriter` is used directly by the CLI layer)

pub mod output;

pub use output::{Filesystem, SignalRegistry};

#[cfg(test)]
pub use output::{MockFilesystem, MockSignalRegistry};
