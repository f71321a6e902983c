use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use redline_core::session::SessionState;
use redline_core::writing::Rewrite;

/// Per-browser-session state, keyed by an opaque session id.
///
/// Sessions live until the process exits. The lock is only held for map
/// access, never across a call to the generation service.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionState>>,
}

impl SessionStore {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionState>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create(&self) -> SessionState {
        let session = SessionState::new(uuid::Uuid::new_v4().to_string());
        self.lock().insert(session.id.clone(), session.clone());
        session
    }

    pub fn get(&self, id: &str) -> Option<SessionState> {
        self.lock().get(id).cloned()
    }

    /// Replace the session's result and call id with `rewrite`.
    /// Returns the updated state, or `None` for an unknown session.
    pub fn record_rewrite(&self, id: &str, rewrite: &Rewrite) -> Option<SessionState> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(id)?;
        session.record_rewrite(rewrite);
        Some(session.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(call_id: &str, text: &str) -> Rewrite {
        Rewrite {
            call_id: call_id.into(),
            improved_text: text.into(),
            commentary: None,
        }
    }

    #[test]
    fn create_and_get() {
        let store = SessionStore::default();
        assert!(store.is_empty());
        let s = store.create();
        assert_eq!(store.get(&s.id), Some(s.clone()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn sessions_are_isolated() {
        let store = SessionStore::default();
        let a = store.create();
        let b = store.create();
        assert_ne!(a.id, b.id);
        store.record_rewrite(&a.id, &rewrite("call-a", "A"));
        assert_eq!(store.get(&b.id).unwrap().last_call_id, None);
        assert_eq!(
            store.get(&a.id).unwrap().last_call_id.as_deref(),
            Some("call-a")
        );
    }

    #[test]
    fn record_rewrite_keeps_only_latest() {
        let store = SessionStore::default();
        let s = store.create();
        store.record_rewrite(&s.id, &rewrite("first", "one"));
        let updated = store.record_rewrite(&s.id, &rewrite("second", "two")).unwrap();
        assert_eq!(updated.last_call_id.as_deref(), Some("second"));
        assert_eq!(updated.improved_text.as_deref(), Some("two"));
    }

    #[test]
    fn record_rewrite_unknown_session() {
        let store = SessionStore::default();
        assert!(store.record_rewrite("nope", &rewrite("c", "t")).is_none());
        assert!(store.is_empty());
    }
}
