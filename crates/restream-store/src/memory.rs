//! In-memory implementation of the SessionStore trait.
//!
//! All sessions are lost when the store is dropped. Thread-safe via RwLock.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use restream_core::ClientId;

use crate::error::Result;
use crate::traits::SessionStore;

/// In-memory session store with a sliding TTL.
///
/// Each `put` starts the TTL; each successful `get` restarts it, so a client
/// that keeps resuming keeps its session alive. A session is expired once
/// `now >= deadline`; a zero TTL therefore expires entries immediately.
/// Expired entries are removed lazily when observed by a `get`.
pub struct MemorySessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<ClientId, SessionEntry>>,
}

struct SessionEntry {
    sequence: Arc<Vec<i32>>,
    deadline: Instant,
}

impl MemorySessionStore {
    /// Create an empty store whose sessions live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Number of sessions currently held, including not-yet-observed
    /// expired ones.
    pub fn len(&self) -> usize {
        self.read_lock().len()
    }

    /// True when no sessions are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, HashMap<ClientId, SessionEntry>> {
        self.sessions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<ClientId, SessionEntry>> {
        self.sessions.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, client: &ClientId, sequence: Arc<Vec<i32>>) -> Result<()> {
        let mut sessions = self.write_lock();
        sessions.insert(
            client.clone(),
            SessionEntry {
                sequence,
                deadline: Instant::now() + self.ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, client: &ClientId) -> Result<Option<Arc<Vec<i32>>>> {
        // Write lock even on reads: a hit slides the deadline and a miss on
        // an expired entry removes it.
        let mut sessions = self.write_lock();
        match sessions.get_mut(client) {
            Some(entry) if Instant::now() < entry.deadline => {
                entry.deadline = Instant::now() + self.ttl;
                Ok(Some(Arc::clone(&entry.sequence)))
            }
            Some(_) => {
                tracing::debug!(client = %client, "session expired, removing");
                sessions.remove(client);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
