//! Application state and the live form-session registry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use feedback_core::{Authenticator, FormInputs, FormSession, RecordStore};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::{MAX_SESSIONS, SESSION_IDLE_TIMEOUT};

/// One respondent's form: the session plus the current widget values.
#[derive(Debug, Default)]
pub(crate) struct SessionSlot {
    pub(crate) session: FormSession,
    pub(crate) inputs: FormInputs,
}

pub(crate) type SharedSlot = Arc<Mutex<SessionSlot>>;

struct Entry {
    slot: SharedSlot,
    /// Milliseconds since the registry's epoch at the last access.
    touched: AtomicU64,
}

/// In-memory map of open form sessions.
///
/// Each slot has its own lock so a slow submission only blocks its own
/// respondent. Slots untouched for `idle_timeout` are swept whenever a new
/// session is opened.
pub(crate) struct SessionRegistry {
    slots: RwLock<HashMap<String, Entry>>,
    max_sessions: usize,
    idle_timeout: Duration,
    epoch: Instant,
}

impl SessionRegistry {
    pub(crate) fn new(max_sessions: usize, idle_timeout: Duration) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            max_sessions,
            idle_timeout,
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Open a fresh session on the start page.
    /// Returns `None` when the registry is still full after expiring idle
    /// sessions.
    pub(crate) async fn create(&self) -> Option<(String, SharedSlot)> {
        let now = self.now_ms();
        let timeout = u64::try_from(self.idle_timeout.as_millis()).unwrap_or(u64::MAX);
        let mut slots = self.slots.write().await;

        let before = slots.len();
        slots.retain(|_, e| now.saturating_sub(e.touched.load(Ordering::Relaxed)) < timeout);
        let expired = before - slots.len();
        if expired > 0 {
            tracing::debug!(expired, "expired idle sessions");
        }

        if slots.len() >= self.max_sessions {
            return None;
        }
        let id = Uuid::new_v4().to_string();
        let slot: SharedSlot = Arc::new(Mutex::new(SessionSlot::default()));
        slots.insert(
            id.clone(),
            Entry {
                slot: slot.clone(),
                touched: AtomicU64::new(now),
            },
        );
        Some((id, slot))
    }

    /// Look up a session and mark it as active.
    pub(crate) async fn get(&self, id: &str) -> Option<SharedSlot> {
        let slots = self.slots.read().await;
        let entry = slots.get(id)?;
        entry.touched.store(self.now_ms(), Ordering::Relaxed);
        Some(entry.slot.clone())
    }

    /// Drop a session and everything entered in it.
    pub(crate) async fn remove(&self, id: &str) -> bool {
        self.slots.write().await.remove(id).is_some()
    }

    pub(crate) async fn len(&self) -> usize {
        self.slots.read().await.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(MAX_SESSIONS, SESSION_IDLE_TIMEOUT)
    }
}

/// Application state shared across request handlers.
pub(crate) struct AppState {
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) sessions: SessionRegistry,
    pub(crate) authenticator: Arc<dyn Authenticator>,
}
