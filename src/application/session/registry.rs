//! Directory of live sessions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use super::handler::Session;
use super::SessionId;
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Allocates session ids and looks sessions up. Ids start at 1 and are
/// never reused.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Arc<Session>>,
    next_id: AtomicU64,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a session under the next id.
    pub fn add(&self, session: Arc<Session>) -> SessionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        session.assign_id(id);
        self.sessions.insert(id, session);
        metrics::set_sessions_registered(self.sessions.len());

        tracing::debug!(session_id = id, "Session registered");
        id
    }

    pub fn get(&self, id: SessionId) -> Result<Arc<Session>, AppError> {
        self.sessions
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| AppError::NotFound(format!("Session {id}")))
    }

    pub fn remove(&self, id: SessionId) -> Option<Arc<Session>> {
        let removed = self.sessions.remove(&id).map(|(_, session)| session);
        if removed.is_some() {
            metrics::set_sessions_registered(self.sessions.len());
            tracing::debug!(session_id = id, "Session removed");
        }
        removed
    }

    /// Snapshot of all sessions, ordered by id.
    pub fn get_all(&self) -> Vec<Arc<Session>> {
        let mut sessions: Vec<_> = self
            .sessions
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        sessions.sort_by_key(|session| session.id());
        sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{GameConfig, OpponentType, Players, SideChoice};
    use crate::domain::value_objects::TimeControl;
    use crate::infrastructure::engine::ShakmatyEngine;

    fn session() -> Arc<Session> {
        let config = GameConfig {
            creator: "Bob".into(),
            opponent: OpponentType::Random,
            side_choice: SideChoice::Random,
            visible: false,
            time_control: TimeControl::from_secs(300, 0),
        };
        Session::new(
            config,
            Players::new(Some("Bob".into()), None),
            Box::new(ShakmatyEngine::new()),
            None,
            16,
        )
        .unwrap()
    }

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let registry = SessionRegistry::new();

        let first = registry.add(session());
        let second = registry.add(session());

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(registry.get(2).unwrap().id(), 2);
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let registry = SessionRegistry::new();
        assert!(matches!(registry.get(42), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_remove_keeps_ids_unique() {
        let registry = SessionRegistry::new();
        let first = registry.add(session());

        assert!(registry.remove(first).is_some());
        assert!(registry.remove(first).is_none());
        assert!(registry.is_empty());

        assert_eq!(registry.add(session()), 2);
    }

    #[test]
    fn test_get_all_is_a_snapshot() {
        let registry = SessionRegistry::new();
        registry.add(session());
        registry.add(session());

        let snapshot = registry.get_all();
        registry.remove(1);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_adds_get_distinct_ids() {
        let registry = Arc::new(SessionRegistry::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move { registry.add(session()) })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), 16);
        assert_eq!(registry.len(), 16);
    }
}
