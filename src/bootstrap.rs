//! Mount-time reconciliation between the client session and the server. One
//! probe task runs per shell mount: it checks authentication once, then loads
//! the user profile for every new authenticated session it observes.

use crate::{api::AuthApi, notify::Notifier, session::SessionStore};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info_span, Instrument};

/// What the probe task is doing right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbePhase {
    Checking,
    Fetching,
    /// Waiting for the next session change.
    Idle,
}

pub struct BootstrapProbe;

impl BootstrapProbe {
    /// Starts the probe for a freshly mounted shell. Must be called from
    /// inside a Tokio runtime.
    pub fn mount<A: AuthApi, N: Notifier>(store: &SessionStore<A, N>) -> ShellMount {
        let store = store.clone();
        // Subscribe before the check so its transition is observed.
        let mut updates = store.subscribe();
        let (phase_tx, phase) = watch::channel(ProbePhase::Checking);

        let task = tokio::spawn(
            async move {
                store.check_authentication().await;

                // Keyed by generation: a logout and re-login that happen while
                // a fetch is in flight still count as a new login.
                let mut fetched_for = None;
                loop {
                    let generation = updates.borrow_and_update().generation();
                    if generation.is_some() && generation != fetched_for {
                        debug!(?generation, "session authenticated, fetching user access");
                        phase_tx.send_replace(ProbePhase::Fetching);
                        store.fetch_user_access().await;
                        fetched_for = generation;
                    }

                    if !updates.has_changed().unwrap_or(false) {
                        phase_tx.send_if_modified(|phase| {
                            let changed = *phase != ProbePhase::Idle;
                            *phase = ProbePhase::Idle;
                            changed
                        });
                    }

                    if updates.changed().await.is_err() {
                        break;
                    }
                }
            }
            .instrument(info_span!("bootstrap_probe")),
        );

        ShellMount { task, phase }
    }
}

/// Handle for a mounted shell. Dropping it unmounts the shell and stops the probe.
#[derive(Debug)]
pub struct ShellMount {
    task: JoinHandle<()>,
    phase: watch::Receiver<ProbePhase>,
}

impl ShellMount {
    pub fn phase(&self) -> ProbePhase {
        *self.phase.borrow()
    }

    /// Resolves once the probe has handled every session change it has seen.
    /// Returns immediately if the probe task has stopped.
    pub async fn idle(&mut self) {
        let _ = self.phase.wait_for(|phase| *phase == ProbePhase::Idle).await;
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn unmount(self) {}
}

impl Drop for ShellMount {
    fn drop(&mut self) {
        self.task.abort();
    }
}
