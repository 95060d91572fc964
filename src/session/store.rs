use super::Session;
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

struct SessionEntry {
    session: Arc<Mutex<Session>>,
    last_accessed: Instant,
}

/// All live sessions. Each session sits behind its own lock so one user's
/// model call never blocks another's.
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
    upload_dir: PathBuf,
    timeout: Duration,
}

impl SessionStore {
    pub fn new(upload_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            upload_dir: upload_dir.into(),
            timeout,
        }
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let entry = SessionEntry {
            session: Arc::new(Mutex::new(Session::new(id, self.upload_dir.clone()))),
            last_accessed: Instant::now(),
        };
        self.sessions.lock().await.insert(id, entry);
        info!("Created session: {}", id);
        id
    }

    pub async fn get(&self, id: Uuid) -> Result<Arc<Mutex<Session>>> {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.get_mut(&id).ok_or_else(|| Error::SessionNotFound {
            session_id: id.to_string(),
        })?;
        entry.last_accessed = Instant::now();
        Ok(entry.session.clone())
    }

    pub async fn remove(&self, id: Uuid) -> Result<()> {
        let entry = self
            .sessions
            .lock()
            .await
            .remove(&id)
            .ok_or_else(|| Error::SessionNotFound {
                session_id: id.to_string(),
            })?;
        entry.session.lock().await.discard().await;
        info!("Removed session: {}", id);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops sessions idle longer than the timeout and removes their files.
    pub async fn cleanup_expired(&self) -> usize {
        let expired: Vec<(Uuid, Arc<Mutex<Session>>)> = {
            let mut sessions = self.sessions.lock().await;
            let ids: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, entry)| entry.last_accessed.elapsed() > self.timeout)
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| sessions.remove(&id).map(|entry| (id, entry.session)))
                .collect()
        };

        for (id, session) in &expired {
            debug!("Expiring session: {}", id);
            session.lock().await.discard().await;
        }

        if !expired.is_empty() {
            info!("Cleaned up {} expired sessions", expired.len());
        }
        expired.len()
    }
}
