//! Cancellation token and the scoped signal registration guarding a commit.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use crate::application::ports::SignalRegistry;
use crate::error::BatchResult;

/// Shared flag set when the running commit must stop.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Handle returned by [`SignalRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(u64);

impl RegistrationId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Scoped registration of a token with a [`SignalRegistry`].
///
/// [`release`](Self::release) deregisters; dropping an unreleased guard
/// deregisters too, so no exit path leaves the handler behind.
#[must_use = "dropping the guard deregisters the signal handler immediately"]
pub struct InterruptGuard<'a> {
    registry: &'a dyn SignalRegistry,
    id: Option<RegistrationId>,
}

impl<'a> InterruptGuard<'a> {
    /// Register `token` and return the guard owning the registration.
    pub fn arm(registry: &'a dyn SignalRegistry, token: CancellationToken) -> BatchResult<Self> {
        let id = registry.register(token)?;
        debug!(registration = %id, "Termination signal handler registered");
        Ok(Self {
            registry,
            id: Some(id),
        })
    }

    /// Deregister now. Later calls do nothing.
    pub fn release(&mut self) {
        if let Some(id) = self.id.take() {
            self.registry.deregister(id);
            debug!(registration = %id, "Termination signal handler deregistered");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.id.is_some()
    }
}

impl Drop for InterruptGuard<'_> {
    fn drop(&mut self) {
        if self.id.is_some() {
            trace!("Releasing signal guard on drop");
            self.release();
        }
    }
}
