//! services/api/src/web/router.rs
//!
//! Router construction shared by the server binary and the integration tests.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::middleware::{identify_user, USER_ID_HEADER};
use crate::web::rest::{
    bookmarks_handler, chat_handler, daily_reading_handler, health_handler, progress_handler,
    verse_of_day_handler, ApiDoc,
};
use crate::web::state::AppState;

const MAX_BODY_BYTES: usize = 64 * 1024;

/// Builds the full application router with all routes and middleware.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    // Routes that act on behalf of a user
    let user_routes = Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/progress", get(progress_handler))
        .route("/api/daily-reading", get(daily_reading_handler))
        .route("/api/bookmarks", get(bookmarks_handler))
        .layer(axum_middleware::from_fn(identify_user));

    let api_router = Router::new()
        .merge(user_routes)
        .route("/api/verse-of-day", get(verse_of_day_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer(&app_state.config.cors_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            ACCEPT,
            HeaderName::from_static(USER_ID_HEADER),
        ]);
    match origin.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            warn!("CORS_ORIGIN '{}' is not a valid header value; cross-origin requests are disabled", origin);
            layer
        }
    }
}
