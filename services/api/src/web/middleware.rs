//! services/api/src/web/middleware.rs
//!
//! Resolves which user a request belongs to.

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ID_COOKIE: &str = "user_id";

const COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 365;

/// The caller's id, inserted into request extensions by `identify_user`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

/// Middleware that reads the user id from the `x-user-id` header or the
/// `user_id` cookie.
///
/// A first-time caller with neither gets a fresh id and a cookie to keep it.
/// An id that is present but not a UUID is rejected with 400 Bad Request.
pub async fn identify_user(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let (user_id, minted) = match presented_id(req.headers()) {
        Some(raw) => {
            let user_id = Uuid::parse_str(raw.trim()).map_err(|_| {
                warn!("Rejected malformed user id '{}'", raw);
                StatusCode::BAD_REQUEST
            })?;
            (user_id, false)
        }
        None => {
            let user_id = Uuid::new_v4();
            debug!(%user_id, "Assigned a new user id");
            (user_id, true)
        }
    };

    req.extensions_mut().insert(UserId(user_id));
    let mut response = next.run(req).await;

    if minted {
        let cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            USER_ID_COOKIE, user_id, COOKIE_MAX_AGE_SECS
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    Ok(response)
}

fn presented_id(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(USER_ID_HEADER) {
        return Some(value.to_str().unwrap_or_default());
    }
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|c| {
            let (name, value) = c.trim().split_once('=')?;
            (name == USER_ID_COOKIE).then_some(value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("from-header"));
        headers.insert(header::COOKIE, HeaderValue::from_static("user_id=from-cookie"));
        assert_eq!(presented_id(&headers), Some("from-header"));
    }

    #[test]
    fn cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; user_id=abc; lang=en"),
        );
        assert_eq!(presented_id(&headers), Some("abc"));
        assert_eq!(presented_id(&HeaderMap::new()), None);
    }
}
