// Per-session selection state for the Dashboard
//
// Each browser session owns its SelectionState and a broadcast channel that
// carries chart replacements to its SSE stream. The dataset and binder are
// shared read-only across sessions.

use crate::binder::{Binder, ChartSpec, InputValue, OutputId, OutputSink, SelectionState};
use crate::dataset::Dataset;
use crate::figure::Figure;
use crate::{DashError, Result};
use dashmap::DashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::info;

/// Chart replacement pushed to a session's stream
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputUpdate {
    pub target: OutputId,
    pub figure: Figure,
    /// Set when the selection matched no rows
    pub empty: bool,
}

impl OutputUpdate {
    fn new(target: OutputId, spec: &ChartSpec) -> Self {
        Self {
            target,
            figure: spec.to_figure(),
            empty: spec.is_empty(),
        }
    }
}

struct Session {
    state: tokio::sync::Mutex<SelectionState>,
    updates: broadcast::Sender<OutputUpdate>,
    last_active_ms: AtomicU64,
}

impl Session {
    fn touch(&self) {
        self.last_active_ms.store(now_ms(), Ordering::Relaxed);
    }
}

/// Forwards replacements into a session's broadcast channel
struct BroadcastSink<'a> {
    sender: &'a broadcast::Sender<OutputUpdate>,
}

impl OutputSink for BroadcastSink<'_> {
    fn replace_output(&self, target: OutputId, spec: ChartSpec) {
        // Ignore error if no stream is connected
        let _ = self.sender.send(OutputUpdate::new(target, &spec));
    }
}

/// Collects replacements for the initial paint of a stream
#[derive(Default)]
struct CollectSink {
    updates: Mutex<Vec<OutputUpdate>>,
}

impl CollectSink {
    fn into_updates(self) -> Vec<OutputUpdate> {
        self.updates
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl OutputSink for CollectSink {
    fn replace_output(&self, target: OutputId, spec: ChartSpec) {
        let mut updates = self
            .updates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        updates.push(OutputUpdate::new(target, &spec));
    }
}

/// All live dashboard sessions
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<Session>>,
    dataset: Arc<Dataset>,
    binder: Arc<Binder>,
    capacity: usize,
    ttl_ms: u64,
    seq: AtomicU64,
}

impl SessionRegistry {
    pub fn new(dataset: Arc<Dataset>, binder: Arc<Binder>, capacity: usize, ttl_secs: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            dataset,
            binder,
            capacity: capacity.max(1),
            ttl_ms: ttl_secs.saturating_mul(1000),
            seq: AtomicU64::new(0),
        }
    }

    /// Open a session seeded with the initial selection; returns its id.
    /// Ids end in a random 64-bit suffix.
    pub fn create(&self) -> String {
        let now = now_ms();
        let nonce: u64 = rand::thread_rng().gen();
        let id = format!(
            "s-{:x}-{}-{:016x}",
            now,
            self.seq.fetch_add(1, Ordering::Relaxed),
            nonce
        );
        let (updates, _) = broadcast::channel(self.capacity);
        let session = Session {
            state: tokio::sync::Mutex::new(SelectionState::initial(&self.dataset)),
            updates,
            last_active_ms: AtomicU64::new(now),
        };
        self.sessions.insert(id.clone(), Arc::new(session));
        info!(target: "dashboard", session_id = %id, active = self.sessions.len(), "Session created");
        id
    }

    fn get(&self, id: &str) -> Result<Arc<Session>> {
        self.sessions
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| DashError::UnknownSession(id.to_string()))
    }

    /// Store a control value and push every dependent chart to the session's stream
    pub async fn apply_input(&self, id: &str, value: InputValue) -> Result<Vec<OutputId>> {
        let session = self.get(id)?;
        session.touch();

        let mut state = session.state.lock().await;
        let changed = state.apply(value);
        let sink = BroadcastSink {
            sender: &session.updates,
        };
        Ok(self.binder.dispatch(&self.dataset, &state, changed, &sink))
    }

    /// Attach a stream: the full current render plus a receiver for later replacements
    pub async fn subscribe(
        &self,
        id: &str,
    ) -> Result<(Vec<OutputUpdate>, broadcast::Receiver<OutputUpdate>)> {
        let session = self.get(id)?;
        session.touch();

        // hold the state lock so no replacement slips between render and subscribe
        let state = session.state.lock().await;
        let rx = session.updates.subscribe();
        let sink = CollectSink::default();
        self.binder.render_all(&self.dataset, &state, &sink);
        Ok((sink.into_updates(), rx))
    }

    pub async fn selection(&self, id: &str) -> Result<SelectionState> {
        let session = self.get(id)?;
        let state = session.state.lock().await;
        Ok(state.clone())
    }

    pub fn remove(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions idle past the TTL with no connected stream
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(now_ms())
    }

    pub fn cleanup_at(&self, now_ms: u64) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|id, session| {
            let idle = now_ms.saturating_sub(session.last_active_ms.load(Ordering::Relaxed));
            let keep = session.updates.receiver_count() > 0 || idle <= self.ttl_ms;
            if !keep {
                info!(target: "dashboard", session_id = %id, idle_ms = idle, "Session expired");
            }
            keep
        });
        before - self.sessions.len()
    }
}

fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
