use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

use crate::session::Session;

/// In-memory session table. Expired entries are dropped on access or by
/// [`SessionStore::purge_expired`].
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        let ttl_secs = i64::try_from(ttl_secs).unwrap_or(i64::MAX / 1000);
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn create(&self) -> Session {
        self.create_at(Utc::now())
    }

    pub fn create_at(&self, now: DateTime<Utc>) -> Session {
        let session = Session::started_at(now, self.ttl);
        self.sessions.lock().insert(session.id.clone(), session.clone());
        debug!(session_id = %session.id, "Session created");
        session
    }

    pub fn get(&self, id: &str) -> Option<Session> {
        self.get_at(id, Utc::now())
    }

    pub fn get_at(&self, id: &str, now: DateTime<Utc>) -> Option<Session> {
        let mut sessions = self.sessions.lock();
        let session = sessions.get(id)?;
        if !session.is_expired_at(now) {
            return Some(session.clone());
        }
        sessions.remove(id);
        None
    }

    /// Returns the live session for `id`, or a fresh one. The flag is true
    /// when a new session was created and its cookie must be set.
    pub fn get_or_create(&self, id: Option<&str>) -> (Session, bool) {
        self.get_or_create_at(id, Utc::now())
    }

    pub fn get_or_create_at(&self, id: Option<&str>, now: DateTime<Utc>) -> (Session, bool) {
        match id.and_then(|id| self.get_at(id, now)) {
            Some(session) => (session, false),
            None => (self.create_at(now), true),
        }
    }

    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
