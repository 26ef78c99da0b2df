use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Server-side state behind the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    /// Per-session key that CSRF tokens are derived from.
    pub csrf_secret: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(ttl: Duration) -> Self {
        Self::started_at(Utc::now(), ttl)
    }

    pub fn started_at(now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            csrf_secret: Uuid::new_v4().simple().to_string(),
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
