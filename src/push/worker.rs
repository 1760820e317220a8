use crate::error::{JournalError, Result};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Unregistered,
    Installing,
    Waiting,
    Active,
    /// Failed to install. Only a fresh registration leaves this state.
    Redundant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerEvent {
    Register,
    Installed,
    InstallFailed,
    /// The `SKIP_WAITING` message: activate the waiting worker now.
    SkipWaiting,
    /// Activation after every old client went away.
    Activated,
    Unregister,
}

impl WorkerState {
    pub fn transition(self, event: WorkerEvent) -> Result<WorkerState> {
        use WorkerEvent::*;
        use WorkerState::*;

        match (self, event) {
            (Unregistered, Register) | (Redundant, Register) => Ok(Installing),
            // An update installs a new worker next to the active one
            (Active, Register) => Ok(Installing),
            (Installing, Installed) => Ok(Waiting),
            (Installing, InstallFailed) => Ok(Redundant),
            (Waiting, SkipWaiting) | (Waiting, Activated) => Ok(Active),
            (_, Unregister) => Ok(Unregistered),
            (state, event) => Err(JournalError::PushError(format!(
                "invalid service worker transition: {:?} on {:?}",
                event, state
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Registration {
    /// State of the newest worker.
    newest: WorkerState,
    /// Whether some worker is controlling pushes. Stays set while an update
    /// installs next to it.
    active: bool,
}

/// Lifecycle of the background worker that receives pushes.
pub struct ServiceWorker {
    registration: watch::Sender<Registration>,
}

impl ServiceWorker {
    pub fn new() -> Self {
        let (registration, _) = watch::channel(Registration {
            newest: WorkerState::Unregistered,
            active: false,
        });
        Self { registration }
    }

    /// State of the newest worker.
    pub fn state(&self) -> WorkerState {
        self.registration.borrow().newest
    }

    /// Whether an active worker exists, even if an update is pending.
    pub fn is_active(&self) -> bool {
        self.registration.borrow().active
    }

    /// Apply a registration event. Invalid transitions leave the state as is.
    pub fn handle(&self, event: WorkerEvent) -> Result<WorkerState> {
        let current = *self.registration.borrow();
        let newest = current.newest.transition(event)?;
        let active = match (event, newest) {
            (WorkerEvent::Unregister, _) => false,
            (_, WorkerState::Active) => true,
            _ => current.active,
        };
        self.registration.send_replace(Registration { newest, active });
        Ok(newest)
    }

    pub fn skip_waiting(&self) -> Result<WorkerState> {
        self.handle(WorkerEvent::SkipWaiting)
    }

    /// Resolves once a worker is active. Callers bound this with a timeout.
    pub async fn wait_active(&self) -> Result<()> {
        let mut rx = self.registration.subscribe();
        rx.wait_for(|registration| registration.active)
            .await
            .map(|_| ())
            .map_err(|_| JournalError::PushError("service worker went away".to_string()))
    }
}

impl Default for ServiceWorker {
    fn default() -> Self {
        Self::new()
    }
}
