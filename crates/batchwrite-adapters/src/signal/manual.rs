//! Signal registry triggered by hand.

use std::sync::Arc;

use tracing::debug;

use batchwrite_core::{
    application::{
        ApplicationError, CancellationToken, RegistrationId, ports::SignalRegistry,
    },
    error::BatchResult,
};

use super::Registrations;

/// Registry that never touches process signal handlers.
///
/// Used by tests to deliver a "signal" at a chosen moment, and by embedders
/// that route termination through their own machinery. Clones share the
/// same registrations.
#[derive(Debug, Clone, Default)]
pub struct ManualSignals {
    registrations: Arc<Registrations>,
}

impl ManualSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Behave as if a termination signal arrived.
    ///
    /// Returns the number of commits notified.
    pub fn raise(&self) -> usize {
        let notified = self.registrations.cancel_all();
        debug!(notified, "Manual termination signal raised");
        notified
    }

    /// Number of live registrations.
    pub fn registered(&self) -> usize {
        self.registrations.len()
    }
}

impl SignalRegistry for ManualSignals {
    fn register(&self, token: CancellationToken) -> BatchResult<RegistrationId> {
        self.registrations
            .insert(token)
            .ok_or_else(|| ApplicationError::StoreLockError.into())
    }

    fn deregister(&self, id: RegistrationId) {
        self.registrations.remove(id);
    }
}
