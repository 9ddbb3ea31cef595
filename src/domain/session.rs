use crate::domain::chat::ChatMessage;
use crate::domain::preferences::Preferences;
use std::collections::HashMap;
use uuid::Uuid;

/// One traveller's conversation: preferences plus chat memory.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub preferences: Preferences,
    pub history: Vec<ChatMessage>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            preferences: Preferences::new(),
            history: Vec::new(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Sessions keyed by id. Each session owns its own preferences, so
/// concurrent travellers never see each other's state.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<Uuid, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&mut self, id: Uuid) -> &mut Session {
        self.sessions.entry(id).or_insert_with(|| {
            tracing::info!("Starting new session {}", id);
            Session::with_id(id)
        })
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

    #[test]
    fn test_sessions_are_isolated() {
        let mut store = SessionStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store
            .get_or_create(alice)
            .preferences
            .update("interests", "surfing")
            .unwrap();
        store.get_or_create(bob);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get_or_create(alice).preferences.interests(), ["surfing"]);
        assert!(store.get_or_create(bob).preferences.interests().is_empty());
    }

    #[test]
    fn test_get_or_create_reuses_existing_session() {
        let mut store = SessionStore::new();
        assert!(store.is_empty());
        let id = Uuid::new_v4();
        store.get_or_create(id).history.push(ChatMessage::user("hola"));

        assert_eq!(store.get_or_create(id).history.len(), 1);
        assert_eq!(store.len(), 1);
    }
}
