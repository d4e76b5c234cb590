//! Process signal registry backed by `ctrlc`.

use std::sync::OnceLock;

use tracing::{debug, warn};

use batchwrite_core::{
    application::{
        ApplicationError, CancellationToken, RegistrationId, ports::SignalRegistry,
    },
    error::BatchResult,
};

use super::Registrations;

/// Exit status used when a signal arrives with no commit in flight.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

static REGISTRATIONS: OnceLock<Registrations> = OnceLock::new();
static INSTALLED: OnceLock<Result<(), String>> = OnceLock::new();

fn registrations() -> &'static Registrations {
    REGISTRATIONS.get_or_init(Registrations::default)
}

/// Forwards SIGINT, SIGTERM and SIGHUP to registered commits.
///
/// The process-wide handler is installed on the first registration and
/// stays for the life of the process; registering and deregistering only
/// edit the token table. When a signal arrives while no commit is
/// registered, the process exits with status 130.
#[derive(Debug, Clone, Copy, Default)]
pub struct CtrlcSignals;

impl CtrlcSignals {
    pub fn new() -> Self {
        Self
    }

    fn install() -> BatchResult<()> {
        let installed = INSTALLED.get_or_init(|| {
            ctrlc::set_handler(|| {
                let notified = registrations().cancel_all();
                if notified == 0 {
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
                warn!(notified, "Termination signal received");
            })
            .map_err(|e| e.to_string())
        });

        installed.clone().map_err(|reason| {
            ApplicationError::SignalRegistration { reason }.into()
        })
    }
}

impl SignalRegistry for CtrlcSignals {
    fn register(&self, token: CancellationToken) -> BatchResult<RegistrationId> {
        Self::install()?;
        let id = registrations()
            .insert(token)
            .ok_or(ApplicationError::StoreLockError)?;
        debug!(registration = %id, "Commit registered for termination signals");
        Ok(id)
    }

    fn deregister(&self, id: RegistrationId) {
        registrations().remove(id);
    }
}
