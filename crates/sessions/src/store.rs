//! Session storage.
//!
//! `MemorySessionStore` is the process-local backing used in production and
//! tests alike; the trait is the seam for a shared external store in a
//! multi-instance deployment.

use std::collections::HashMap;

use {async_trait::async_trait, tokio::sync::Mutex, tracing::debug};

use crate::Session;

/// Get/create/put operations over per-user sessions.
///
/// `get_or_create` is the commit point for lazy creation: the returned
/// session is already stored, so a pipeline failure after this call still
/// leaves the seeded session behind.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a session if one exists.
    async fn get(&self, user_id: &str) -> Option<Session>;

    /// Fetch the session for `user_id`, creating one seeded with `persona`
    /// on first contact. Returns the session and whether it was created.
    async fn get_or_create(&self, user_id: &str, persona: &str) -> (Session, bool);

    /// Store a mutated session back under its user id.
    async fn put(&self, session: Session);

    /// Number of distinct sessions currently held.
    async fn count(&self) -> usize;
}

/// In-memory session map. Grows unboundedly with distinct senders; there is
/// no eviction, matching the single-process lifetime of the relay.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, user_id: &str) -> Option<Session> {
        self.sessions.lock().await.get(user_id).cloned()
    }

    async fn get_or_create(&self, user_id: &str, persona: &str) -> (Session, bool) {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(user_id) {
            Some(existing) => (existing.clone(), false),
            None => {
                let session = Session::seeded(user_id, persona);
                sessions.insert(user_id.to_string(), session.clone());
                debug!(user_id, "created new session");
                (session, true)
            },
        }
    }

    async fn put(&self, session: Session) {
        self.sessions
            .lock()
            .await
            .insert(session.user_id.clone(), session);
    }

    async fn count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
