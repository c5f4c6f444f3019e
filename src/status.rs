//! Live worker status: shared snapshot state and the background poller.
//!
//! Exactly one poller task owns the refresh timer. Every other trigger
//! (post-dispatch, manual refresh, post-toggle re-poll) goes through the
//! same broadcast channel, so repeated panel opens never stack timers.

use std::sync::Arc;
use std::time::Duration;

use time::{format_description::well_known, OffsetDateTime};
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::{Backend, BackendError};
use crate::types::StatusSnapshot;

/// Phase of the current poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPhase {
    Idle,
    Fetching,
    Rendered,
    Errored,
}

/// Cross-component notification that worker status may have changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    Changed,
}

/// Outcome of a bulk start/stop fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkOutcome {
    pub requested: usize,
    pub succeeded: usize,
}

struct PanelState {
    phase: PanelPhase,
    snapshot: Option<StatusSnapshot>,
    error: Option<String>,
}

struct Inner {
    backend: Backend,
    state: RwLock<PanelState>,
    events: broadcast::Sender<StatusEvent>,
    interval: Duration,
}

/// Shared handle to the status poller and its latest snapshot.
#[derive(Clone)]
pub struct StatusHub {
    inner: Arc<Inner>,
}

impl StatusHub {
    pub fn new(backend: Backend, interval: Duration) -> Self {
        let (events, _) = broadcast::channel(16);
        StatusHub {
            inner: Arc::new(Inner {
                backend,
                state: RwLock::new(PanelState {
                    phase: PanelPhase::Idle,
                    snapshot: None,
                    error: None,
                }),
                events,
                interval,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.inner.events.subscribe()
    }

    /// Ask the poller to refresh soon. Fire and forget.
    pub fn poke(&self) {
        let _ = self.inner.events.send(StatusEvent::Changed);
    }

    /// Poke after a delay; the short re-poll scheduled behind a toggle.
    pub fn poke_after(&self, delay: Duration) {
        let hub = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            hub.poke();
        });
    }

    /// Post-dispatch side effect: refresh and notify every subscriber.
    pub fn announce(&self) {
        self.poke();
    }

    /// Current phase plus a clone of the rendered snapshot and error.
    pub async fn view(&self) -> (PanelPhase, Option<StatusSnapshot>, Option<String>) {
        let state = self.inner.state.read().await;
        (state.phase, state.snapshot.clone(), state.error.clone())
    }

    /// Run one fetch cycle now. A failure keeps the last good snapshot and
    /// records the error; a success replaces the snapshot wholesale.
    pub async fn refresh_once(&self) {
        {
            let mut state = self.inner.state.write().await;
            state.phase = PanelPhase::Fetching;
        }
        match self.inner.backend.fetch_status().await {
            Ok(mut snapshot) => {
                debug!(workers = snapshot.workers.len(), "status refreshed");
                snapshot.fetched_at = Some(now_rfc3339());
                let mut state = self.inner.state.write().await;
                state.phase = PanelPhase::Rendered;
                state.snapshot = Some(snapshot);
                state.error = None;
            }
            Err(error) => {
                warn!(%error, "status refresh failed");
                let mut state = self.inner.state.write().await;
                state.phase = PanelPhase::Errored;
                state.error = Some(error.to_string());
            }
        }
    }

    /// Set one worker's desired state. On success a short-delay re-poll is
    /// scheduled so the panel reconverges with the backend's view.
    pub async fn set_worker(&self, name: &str, enabled: bool) -> Result<(), BackendError> {
        self.inner.backend.set_worker(name, enabled).await?;
        self.poke_after(Duration::from_millis(300));
        Ok(())
    }

    /// Fetch the backend's current worker set, then fan out one toggle per
    /// worker and count the successes. Toggle failures settle like successes
    /// and never abort the batch; only the status fetch itself can fail the
    /// whole action.
    pub async fn bulk_set(&self, enable: bool) -> Result<BulkOutcome, BackendError> {
        let snapshot = self.inner.backend.fetch_status().await?;
        let requested = snapshot.workers.len();
        let mut tasks = JoinSet::new();
        for name in snapshot.workers.into_keys() {
            let backend = self.inner.backend.clone();
            tasks.spawn(async move { backend.set_worker(&name, enable).await.is_ok() });
        }
        let mut succeeded = 0;
        while let Some(joined) = tasks.join_next().await {
            if matches!(joined, Ok(true)) {
                succeeded += 1;
            }
        }
        self.poke_after(Duration::from_millis(400));
        Ok(BulkOutcome {
            requested,
            succeeded,
        })
    }

    /// Spawn the poller task. The interval tick fires immediately, so the
    /// first snapshot lands right after startup.
    pub fn spawn_poller(&self, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        let hub = self.clone();
        let mut events = self.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(hub.inner.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        debug!("status poller stopping");
                        break;
                    }
                    _ = ticker.tick() => {}
                    received = events.recv() => {
                        if matches!(received, Err(broadcast::error::RecvError::Closed)) {
                            break;
                        }
                    }
                }
                hub.refresh_once().await;
            }
        })
    }
}

fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
