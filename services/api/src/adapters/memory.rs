//! services/api/src/adapters/memory.rs
//!
//! A process-local `PersistenceStore`, used when no database is configured and
//! in tests. Nothing survives a restart.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use async_trait::async_trait;
use devotional_core::domain::{Bookmark, ConversationRecord, UserProgress};
use devotional_core::ports::{PersistenceStore, PortError, PortResult};
use uuid::Uuid;

const DEFAULT_CONVERSATION_LIMIT: usize = 10_000;

pub struct InMemoryStore {
    progress: RwLock<HashMap<Uuid, UserProgress>>,
    bookmarks: RwLock<HashMap<Uuid, Vec<Bookmark>>>,
    conversations: RwLock<VecDeque<ConversationRecord>>,
    max_conversations: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_conversation_limit(DEFAULT_CONVERSATION_LIMIT)
    }

    /// Keeps at most `max_conversations` log records, dropping the oldest.
    pub fn with_conversation_limit(max_conversations: usize) -> Self {
        Self {
            progress: RwLock::new(HashMap::new()),
            bookmarks: RwLock::new(HashMap::new()),
            conversations: RwLock::new(VecDeque::new()),
            max_conversations: max_conversations.max(1),
        }
    }

    /// Logged conversations for one user, oldest first.
    pub fn conversations_for(&self, user_id: Uuid) -> PortResult<Vec<ConversationRecord>> {
        let conversations = self.conversations.read().map_err(poisoned)?;
        Ok(conversations
            .iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> PortError {
    PortError::Unexpected(e.to_string())
}

#[async_trait]
impl PersistenceStore for InMemoryStore {
    async fn get_progress(&self, user_id: Uuid) -> PortResult<UserProgress> {
        let mut progress = self.progress.write().map_err(poisoned)?;
        Ok(progress
            .entry(user_id)
            .or_insert_with(|| UserProgress::new(user_id))
            .clone())
    }

    async fn put_progress(&self, user_id: Uuid, progress: &UserProgress) -> PortResult<()> {
        self.progress
            .write()
            .map_err(poisoned)?
            .insert(user_id, progress.clone());
        Ok(())
    }

    async fn list_bookmarks(&self, user_id: Uuid) -> PortResult<Vec<Bookmark>> {
        let bookmarks = self.bookmarks.read().map_err(poisoned)?;
        let mut found = bookmarks.get(&user_id).cloned().unwrap_or_default();
        // Later insertions come first on equal timestamps.
        found.reverse();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn add_bookmark(&self, user_id: Uuid, bookmark: &Bookmark) -> PortResult<()> {
        self.bookmarks
            .write()
            .map_err(poisoned)?
            .entry(user_id)
            .or_default()
            .push(bookmark.clone());
        Ok(())
    }

    async fn record_conversation(&self, record: &ConversationRecord) -> PortResult<()> {
        let mut conversations = self.conversations.write().map_err(poisoned)?;
        if conversations.len() >= self.max_conversations {
            conversations.pop_front();
        }
        conversations.push_back(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use devotional_core::domain::VerseReference;

    fn bookmark(user_id: Uuid, verse: u32, minutes: i64) -> Bookmark {
        Bookmark {
            id: Uuid::new_v4(),
            user_id,
            reference: VerseReference::verse("Romans", 8, verse),
            note: None,
            topic: None,
            created_at: Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    #[tokio::test]
    async fn first_access_creates_default_progress() {
        let store = InMemoryStore::new();
        let user = Uuid::new_v4();
        let progress = store.get_progress(user).await.unwrap();
        assert_eq!(progress, UserProgress::new(user));

        let mut moved = progress.clone();
        moved.current_plan_index = 3;
        store.put_progress(user, &moved).await.unwrap();
        assert_eq!(store.get_progress(user).await.unwrap().current_plan_index, 3);
    }

    #[tokio::test]
    async fn bookmarks_are_per_user_and_newest_first() {
        let store = InMemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        store.add_bookmark(alice, &bookmark(alice, 28, 0)).await.unwrap();
        store.add_bookmark(alice, &bookmark(alice, 38, 5)).await.unwrap();
        store.add_bookmark(bob, &bookmark(bob, 1, 1)).await.unwrap();

        let listed = store.list_bookmarks(alice).await.unwrap();
        let verses: Vec<_> = listed.iter().map(|b| b.reference.verse).collect();
        assert_eq!(verses, vec![Some(38), Some(28)]);
        assert_eq!(store.list_bookmarks(bob).await.unwrap().len(), 1);
        assert!(store.list_bookmarks(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn conversation_log_drops_the_oldest_past_the_limit() {
        let store = InMemoryStore::with_conversation_limit(2);
        let user = Uuid::new_v4();
        for message in ["one", "two", "three"] {
            let record = ConversationRecord {
                user_id: user,
                message: message.to_string(),
                response: "ok".to_string(),
                intent: "unknown".to_string(),
                created_at: Utc::now(),
            };
            store.record_conversation(&record).await.unwrap();
        }
        let logged: Vec<_> = store
            .conversations_for(user)
            .unwrap()
            .into_iter()
            .map(|r| r.message)
            .collect();
        assert_eq!(logged, vec!["two", "three"]);
    }
}
