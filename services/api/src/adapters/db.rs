//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `PersistenceStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use devotional_core::domain::{Bookmark, ConversationRecord, UserProgress, VerseReference};
use devotional_core::ports::{PersistenceStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `PersistenceStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn db_error(e: sqlx::Error) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(e.to_string()),
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            PortError::Unavailable(e.to_string())
        }
        other => PortError::Unexpected(other.to_string()),
    }
}

fn to_column(value: u32, column: &str) -> PortResult<i32> {
    i32::try_from(value)
        .map_err(|_| PortError::Unexpected(format!("{} out of range: {}", column, value)))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ProgressRecord {
    user_id: Uuid,
    current_plan_index: i32,
    completed_chapter_count: i32,
    last_read_date: Option<NaiveDate>,
    streak_days: i32,
}
impl ProgressRecord {
    fn to_domain(self) -> UserProgress {
        UserProgress {
            user_id: self.user_id,
            current_plan_index: self.current_plan_index.max(0) as usize,
            completed_chapter_count: self.completed_chapter_count.max(0) as u32,
            last_read_date: self.last_read_date,
            streak_days: self.streak_days.max(0) as u32,
        }
    }
}

#[derive(FromRow)]
struct BookmarkRecord {
    id: Uuid,
    user_id: Uuid,
    reference: String,
    note: Option<String>,
    topic: Option<String>,
    created_at: DateTime<Utc>,
}
impl BookmarkRecord {
    fn to_domain(self) -> PortResult<Bookmark> {
        let reference = self.reference.parse::<VerseReference>().map_err(|e| {
            PortError::Unexpected(format!(
                "stored bookmark {} has a bad reference '{}': {}",
                self.id, self.reference, e
            ))
        })?;
        Ok(Bookmark {
            id: self.id,
            user_id: self.user_id,
            reference,
            note: self.note,
            topic: self.topic,
            created_at: self.created_at,
        })
    }
}

//=========================================================================================
// `PersistenceStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl PersistenceStore for DbAdapter {
    async fn get_progress(&self, user_id: Uuid) -> PortResult<UserProgress> {
        sqlx::query("INSERT INTO user_progress (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        let record = sqlx::query_as::<_, ProgressRecord>(
            "SELECT user_id, current_plan_index, completed_chapter_count, last_read_date, streak_days \
             FROM user_progress WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(record.to_domain())
    }

    async fn put_progress(&self, user_id: Uuid, progress: &UserProgress) -> PortResult<()> {
        let plan_index = i32::try_from(progress.current_plan_index).map_err(|_| {
            PortError::Unexpected(format!(
                "current_plan_index out of range: {}",
                progress.current_plan_index
            ))
        })?;

        sqlx::query(
            "INSERT INTO user_progress \
                 (user_id, current_plan_index, completed_chapter_count, last_read_date, streak_days) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 current_plan_index = EXCLUDED.current_plan_index, \
                 completed_chapter_count = EXCLUDED.completed_chapter_count, \
                 last_read_date = EXCLUDED.last_read_date, \
                 streak_days = EXCLUDED.streak_days, \
                 updated_at = NOW()",
        )
        .bind(user_id)
        .bind(plan_index)
        .bind(to_column(progress.completed_chapter_count, "completed_chapter_count")?)
        .bind(progress.last_read_date)
        .bind(to_column(progress.streak_days, "streak_days")?)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn list_bookmarks(&self, user_id: Uuid) -> PortResult<Vec<Bookmark>> {
        let records = sqlx::query_as::<_, BookmarkRecord>(
            "SELECT id, user_id, reference, note, topic, created_at FROM bookmarks \
             WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        records.into_iter().map(BookmarkRecord::to_domain).collect()
    }

    async fn add_bookmark(&self, user_id: Uuid, bookmark: &Bookmark) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO bookmarks (id, user_id, reference, note, topic, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(bookmark.id)
        .bind(user_id)
        .bind(bookmark.reference.to_string())
        .bind(bookmark.note.as_deref())
        .bind(bookmark.topic.as_deref())
        .bind(bookmark.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn record_conversation(&self, record: &ConversationRecord) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO conversations (user_id, message, response, intent, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(record.user_id)
        .bind(&record.message)
        .bind(&record.response)
        .bind(&record.intent)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }
}
