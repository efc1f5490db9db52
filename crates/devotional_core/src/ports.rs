//! crates/devotional_core/src/ports.rs
//!
//! The collaborators the devotional core depends on: a store for per-user
//! state, a source of verse text, and a clock. The `api` service supplies the
//! concrete adapters.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{Bookmark, ConversationRecord, UserProgress, VerseReference, VerseText};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistent per-user state: reading progress, bookmarks and the conversation log.
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    /// Returns the user's progress, creating the default row if absent.
    async fn get_progress(&self, user_id: Uuid) -> PortResult<UserProgress>;

    async fn put_progress(&self, user_id: Uuid, progress: &UserProgress) -> PortResult<()>;

    /// All bookmarks for the user, newest first.
    async fn list_bookmarks(&self, user_id: Uuid) -> PortResult<Vec<Bookmark>>;

    async fn add_bookmark(&self, user_id: Uuid, bookmark: &Bookmark) -> PortResult<()>;

    async fn record_conversation(&self, record: &ConversationRecord) -> PortResult<()>;
}

#[async_trait]
pub trait VerseTextLookup: Send + Sync {
    /// Fetches the text of a verse, range or whole chapter.
    async fn fetch(&self, reference: &VerseReference) -> PortResult<VerseText>;
}

/// Source of the current time, so date-dependent rules can be tested.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
