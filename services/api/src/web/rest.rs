//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::ApiError;
use crate::web::middleware::UserId;
use crate::web::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use devotional_core::composer::format_bookmarks;
use devotional_core::domain::{Bookmark, VerseText};
use devotional_core::reading_plan::ProgressSnapshot;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        chat_handler,
        progress_handler,
        daily_reading_handler,
        bookmarks_handler,
        verse_of_day_handler,
        health_handler,
    ),
    components(
        schemas(
            ChatRequest,
            ChatResponse,
            ProgressResponse,
            ChapterView,
            DailyReadingResponse,
            BookmarkView,
            BookmarksResponse,
            VerseOfDayResponse,
        )
    ),
    tags(
        (name = "Devotional Chat API", description = "Chat-driven Bible reading plan, verse search and bookmarks.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// The user's free-text message.
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
    /// Snake-case label of the classified intent, e.g. `daily_reading`.
    pub intent: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProgressResponse {
    pub completed_chapters: u32,
    pub total_chapters: u32,
    pub percent: f64,
    /// Book of the next unread entry; absent once the plan is complete.
    pub current_book: Option<String>,
    pub current_chapter: Option<u32>,
    pub streak_days: u32,
    pub plan_complete: bool,
}

impl From<ProgressSnapshot> for ProgressResponse {
    fn from(snapshot: ProgressSnapshot) -> Self {
        Self {
            completed_chapters: snapshot.completed_chapters,
            total_chapters: snapshot.total_chapters,
            percent: snapshot.percent,
            current_book: snapshot.current_position.map(|(book, _)| book.to_string()),
            current_chapter: snapshot.current_position.map(|(_, chapter)| chapter),
            streak_days: snapshot.streak_days,
            plan_complete: snapshot.plan_complete,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChapterView {
    pub reference: String,
    pub text: String,
    pub translation: Option<String>,
}

impl From<VerseText> for ChapterView {
    fn from(verse: VerseText) -> Self {
        Self {
            reference: verse.reference.to_string(),
            text: verse.text,
            translation: verse.translation,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DailyReadingResponse {
    /// The reading rendered as a chat message.
    pub response: String,
    /// Chapters whose text could be fetched, in plan order.
    pub chapters: Vec<ChapterView>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookmarkView {
    pub id: Uuid,
    pub reference: String,
    pub note: Option<String>,
    pub topic: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Bookmark> for BookmarkView {
    fn from(bookmark: &Bookmark) -> Self {
        Self {
            id: bookmark.id,
            reference: bookmark.reference.to_string(),
            note: bookmark.note.clone(),
            topic: bookmark.topic.clone(),
            created_at: bookmark.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookmarksResponse {
    /// Newest first.
    pub bookmarks: Vec<BookmarkView>,
    /// The same list rendered as a chat message.
    pub formatted: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerseOfDayResponse {
    pub reference: String,
    pub text: String,
    pub translation: Option<String>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Send a chat message and receive the assistant's reply.
///
/// Failures of the verse source or the data store are reported inside the
/// reply text, never as an HTTP error.
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "The assistant's reply", body = ChatResponse),
        (status = 400, description = "Malformed user id")
    ),
    params(
        ("x-user-id" = Option<Uuid>, Header, description = "The caller's id; falls back to the user_id cookie.")
    )
)]
pub async fn chat_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    let reply = app_state.orchestrator.respond(user_id, &request.message).await;
    info!(%user_id, intent = reply.intent.label(), "Chat message handled");

    Json(ChatResponse {
        response: reply.text,
        intent: reply.intent.label().to_string(),
        timestamp: Utc::now(),
    })
}

/// Get the caller's reading plan progress.
#[utoipa::path(
    get,
    path = "/api/progress",
    responses(
        (status = 200, description = "Current progress", body = ProgressResponse),
        (status = 500, description = "Data store failure")
    )
)]
pub async fn progress_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let snapshot = app_state.orchestrator.progress_snapshot(user_id).await?;
    Ok(Json(snapshot.into()))
}

/// Preview the caller's next reading without marking it read.
#[utoipa::path(
    get,
    path = "/api/daily-reading",
    responses(
        (status = 200, description = "The next reading block", body = DailyReadingResponse),
        (status = 500, description = "Data store failure")
    )
)]
pub async fn daily_reading_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Result<Json<DailyReadingResponse>, ApiError> {
    let preview = app_state.orchestrator.peek_reading(user_id).await?;
    Ok(Json(DailyReadingResponse {
        response: preview.text,
        chapters: preview.chapters.into_iter().map(ChapterView::from).collect(),
    }))
}

/// List the caller's bookmarks, newest first.
#[utoipa::path(
    get,
    path = "/api/bookmarks",
    responses(
        (status = 200, description = "Saved bookmarks", body = BookmarksResponse),
        (status = 500, description = "Data store failure")
    )
)]
pub async fn bookmarks_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Result<Json<BookmarksResponse>, ApiError> {
    let bookmarks = app_state.store.list_bookmarks(user_id).await?;
    Ok(Json(BookmarksResponse {
        formatted: format_bookmarks(&bookmarks),
        bookmarks: bookmarks.iter().map(BookmarkView::from).collect(),
    }))
}

/// Today's featured verse.
#[utoipa::path(
    get,
    path = "/api/verse-of-day",
    responses(
        (status = 200, description = "Verse of the day", body = VerseOfDayResponse),
        (status = 502, description = "Verse source unavailable")
    )
)]
pub async fn verse_of_day_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<VerseOfDayResponse>, ApiError> {
    let verse = app_state
        .orchestrator
        .verse_of_the_day()
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;
    Ok(Json(VerseOfDayResponse {
        reference: verse.reference.to_string(),
        text: verse.text,
        translation: verse.translation,
    }))
}

/// Liveness check.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health_handler() -> &'static str {
    "ok"
}
