//! Session management for conversation history

use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use dashmap::DashMap;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use uuid::Uuid;

use crate::models::HistoryEntry;

/// Default session time-to-live
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// One conversation with append-only history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub history: Vec<HistoryEntry>,
}

impl Session {
    pub fn new(ttl: chrono::Duration) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4().to_string(),
            created_at: now,
            expires_at: now + ttl,
            history: Vec::new(),
        }
    }

    /// Append one question/answer exchange with the current timestamp
    pub fn add_message(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.history.push(HistoryEntry {
            question: question.into(),
            answer: answer.into(),
            timestamp: Utc::now(),
        });
    }

    /// A session is usable only while `now <= expires_at`
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Manages chat sessions with TTL-based expiry.
///
/// Expired sessions are treated as absent by lookups and reclaimed by a
/// periodic sweep, so the session map does not grow without bound.
pub struct SessionManager {
    sessions: Arc<DashMap<String, Session>>,
    ttl: chrono::Duration,
}

impl SessionManager {
    pub fn new(ttl: chrono::Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Start the background sweep reclaiming expired sessions
    pub fn spawn_sweeper(&self, interval: Duration) {
        let sessions = self.sessions.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                Self::sweep_expired(&sessions);
            }
        });
    }

    /// Return the existing non-expired session for the id, or create a new
    /// one with a freshly generated id (also when the given id is unknown or
    /// expired). The caller receives a snapshot; mutations go through
    /// [`SessionManager::record_exchange`].
    pub fn get_or_create(&self, session_id: Option<&str>) -> Session {
        if let Some(id) = session_id {
            if let Some(existing) = self.sessions.get(id) {
                if !existing.is_expired() {
                    return existing.clone();
                }
            }
            // Expired entries are dropped here rather than waiting for the sweeper
            self.sessions.remove_if(id, |_, session| session.is_expired());
        }

        let session = Session::new(self.ttl);
        debug!("Created session {}", session.session_id);
        self.sessions
            .insert(session.session_id.clone(), session.clone());
        session
    }

    /// Append an exchange to a session's history. A miss (unknown or swept
    /// session) is silently ignored; the next `get_or_create` starts fresh.
    pub fn record_exchange(&self, session_id: &str, question: &str, answer: &str) {
        if let Some(mut session) = self.sessions.get_mut(session_id) {
            session.add_message(question, answer);
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn sweep_expired(sessions: &DashMap<String, Session>) {
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired());
        let swept = before - sessions.len();
        if swept > 0 {
            info!("Swept {} expired session(s)", swept);
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(chrono::Duration::hours(DEFAULT_TTL_HOURS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expired_session(id: &str) -> Session {
        let mut session = Session::new(chrono::Duration::hours(1));
        session.session_id = id.to_string();
        session.expires_at = Utc::now() - chrono::Duration::hours(1);
        session
    }

    #[test]
    fn test_get_or_create_without_id_generates_distinct_sessions() {
        let manager = SessionManager::default();
        let a = manager.get_or_create(None);
        let b = manager.get_or_create(None);
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(manager.session_count(), 2);
    }

    #[test]
    fn test_get_or_create_returns_existing_session_with_history() {
        let manager = SessionManager::default();
        let created = manager.get_or_create(None);
        manager.record_exchange(&created.session_id, "q1", "a1");

        let fetched = manager.get_or_create(Some(&created.session_id));
        assert_eq!(fetched.session_id, created.session_id);
        assert_eq!(fetched.history.len(), 1);
        assert_eq!(fetched.history[0].question, "q1");
        assert_eq!(fetched.history[0].answer, "a1");
    }

    #[test]
    fn test_expired_session_is_replaced() {
        let manager = SessionManager::default();
        manager
            .sessions
            .insert("stale".to_string(), expired_session("stale"));

        let fresh = manager.get_or_create(Some("stale"));
        assert_ne!(fresh.session_id, "stale");
        assert!(fresh.history.is_empty());
        // The stale entry is gone, not resurrected
        assert!(!manager.sessions.contains_key("stale"));
    }

    #[test]
    fn test_unknown_id_gets_fresh_id() {
        let manager = SessionManager::default();
        let session = manager.get_or_create(Some("never-seen"));
        assert_ne!(session.session_id, "never-seen");
    }

    #[test]
    fn test_record_exchange_appends_in_order() {
        let manager = SessionManager::default();
        let session = manager.get_or_create(None);
        manager.record_exchange(&session.session_id, "q1", "a1");
        manager.record_exchange(&session.session_id, "q2", "a2");

        let fetched = manager.get_or_create(Some(&session.session_id));
        assert_eq!(fetched.history.len(), 2);
        assert_eq!(fetched.history[1].question, "q2");
    }

    #[test]
    fn test_sweep_reclaims_expired_sessions() {
        let manager = SessionManager::default();
        manager
            .sessions
            .insert("old".to_string(), expired_session("old"));
        let live = manager.get_or_create(None);

        SessionManager::sweep_expired(&manager.sessions);
        assert_eq!(manager.session_count(), 1);
        assert!(manager.sessions.contains_key(&live.session_id));
    }
}
