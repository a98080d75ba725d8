use super::{SessionStore, SessionStoreError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Keeps sessions in process memory. Every session is lost on restart.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, token: &str, username: &str) -> Result<(), SessionStoreError> {
        self.sessions
            .write()
            .insert(token.to_owned(), username.to_owned());
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<String>, SessionStoreError> {
        Ok(self.sessions.read().get(token).cloned())
    }

    async fn remove(&self, token: &str) -> Result<bool, SessionStoreError> {
        Ok(self.sessions.write().remove(token).is_some())
    }

    async fn remove_all(&self, username: &str) -> Result<usize, SessionStoreError> {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, owner| owner != username);
        Ok(before - sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rocket::async_test]
    async fn test_insert_get_remove() {
        let store = MemorySessionStore::new();

        assert_eq!(store.get("token").await.unwrap(), None);

        store.insert("token", "ada").await.unwrap();
        assert_eq!(store.get("token").await.unwrap(), Some("ada".to_owned()));

        assert!(store.remove("token").await.unwrap());
        assert!(!store.remove("token").await.unwrap());
        assert_eq!(store.get("token").await.unwrap(), None);
    }

    #[rocket::async_test]
    async fn test_remove_all_only_touches_one_user() {
        let store = MemorySessionStore::new();

        store.insert("a1", "ada").await.unwrap();
        store.insert("a2", "ada").await.unwrap();
        store.insert("g1", "grace").await.unwrap();

        assert_eq!(store.remove_all("ada").await.unwrap(), 2);
        assert_eq!(store.get("a1").await.unwrap(), None);
        assert_eq!(store.get("a2").await.unwrap(), None);
        assert_eq!(store.get("g1").await.unwrap(), Some("grace".to_owned()));
        assert_eq!(store.remove_all("ada").await.unwrap(), 0);
    }
}
