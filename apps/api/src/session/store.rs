use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::session::model::Session;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub type SessionHandle = Arc<Mutex<Session>>;

/// In-memory session registry. Nothing here outlives the process.
///
/// The map lock is only held to look up, insert, or remove handles; each
/// session has its own mutex, held by the caller for a whole action.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session and performs the page-load transition.
    pub async fn create(&self) -> SessionHandle {
        let mut session = Session::new();
        session.page_loaded();
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, handle.clone());
        info!(session_id = %id, "Session created");
        handle
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions idle longer than `ttl`. Busy sessions are skipped.
    pub async fn sweep_expired(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => session.idle_for() < ttl,
            Err(_) => true,
        });
        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, remaining = sessions.len(), "Expired idle sessions");
        }
        removed
    }
}

/// Runs `sweep_expired` every minute for the life of the process.
pub fn spawn_reaper(store: SessionStore, ttl: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let removed = store.sweep_expired(ttl).await;
            let remaining = store.len().await;
            debug!(removed, remaining, "Session sweep finished");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::model::SessionState;

    #[tokio::test]
    async fn test_create_registers_session_awaiting_upload() {
        let store = SessionStore::new();
        let handle = store.create().await;
        let id = handle.lock().await.id();

        let fetched = store.get(id).await.unwrap();
        assert_eq!(fetched.lock().await.state, SessionState::AwaitingUpload);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_forgets_session() {
        let store = SessionStore::new();
        let id = store.create().await.lock().await.id();

        assert!(store.remove(id).await);
        assert!(!store.remove(id).await);
        assert!(store.get(id).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_only_idle_sessions() {
        let store = SessionStore::new();
        let stale = store.create().await.lock().await.id();

        tokio::time::advance(Duration::from_secs(120)).await;
        let fresh = store.create().await.lock().await.id();

        let removed = store.sweep_expired(Duration::from_secs(60)).await;

        assert_eq!(removed, 1);
        assert!(store.get(stale).await.is_none());
        assert!(store.get(fresh).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_skips_busy_sessions() {
        let store = SessionStore::new();
        let handle = store.create().await;
        let _busy = handle.lock().await;

        tokio::time::advance(Duration::from_secs(120)).await;

        assert_eq!(store.sweep_expired(Duration::from_secs(60)).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_task_sweeps_on_interval() {
        let store = SessionStore::new();
        let id = store.create().await.lock().await.id();

        let reaper = spawn_reaper(store.clone(), Duration::from_secs(30));
        tokio::time::sleep(SWEEP_INTERVAL + Duration::from_secs(1)).await;

        assert!(store.get(id).await.is_none());
        assert_eq!(store.len().await, 0);
        reaper.abort();
    }
}
