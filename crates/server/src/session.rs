//! Cookie sessions holding the playback cursor.
//!
//! Each browser gets a `session_id` cookie on its first request. The session
//! keeps three values: the open game id, the current ply and the raw record.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use chess_core::cursor::Cursor;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;

pub const SESSION_COOKIE: &str = "session_id";

/// Session id attached to the request by [`session_layer`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionId>()
            .cloned()
            .ok_or(AppError::Internal("Missing session".into()))
    }
}

/// Per-session values. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionData {
    pub game_id: Option<i64>,
    pub current_move: Option<i64>,
    pub pgn: Option<String>,
}

impl SessionData {
    pub fn from_cursor(cursor: Cursor) -> Self {
        Self {
            game_id: Some(cursor.game_id),
            current_move: Some(cursor.ply),
            pgn: Some(cursor.pgn),
        }
    }

    pub fn has_game(&self) -> bool {
        self.pgn.is_some()
    }

    /// Rebuild the cursor, naming the first missing value.
    pub fn cursor(&self) -> Result<Cursor, AppError> {
        let pgn = self
            .pgn
            .clone()
            .ok_or_else(|| AppError::BadRequest("No PGN provided".into()))?;
        let ply = self
            .current_move
            .ok_or_else(|| AppError::BadRequest("No current move".into()))?;
        let game_id = self
            .game_id
            .ok_or_else(|| AppError::BadRequest("No game is open".into()))?;

        Ok(Cursor { game_id, ply, pgn })
    }
}

/// Idle time after which a session is forgotten
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct SessionEntry {
    data: SessionData,
    last_seen: Instant,
}

/// In-process session map shared by all handlers. Sessions idle for longer
/// than the TTL read back empty and are purged on the next write.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Current values for a session; touching it keeps it alive.
    pub async fn get(&self, id: &SessionId) -> SessionData {
        let mut sessions = self.inner.write().await;
        let now = Instant::now();

        match sessions.get_mut(&id.0) {
            Some(entry) if now.duration_since(entry.last_seen) <= self.ttl => {
                entry.last_seen = now;
                entry.data.clone()
            }
            Some(_) => {
                sessions.remove(&id.0);
                SessionData::default()
            }
            None => SessionData::default(),
        }
    }

    pub async fn set(&self, id: &SessionId, data: SessionData) {
        let mut sessions = self.inner.write().await;
        let now = Instant::now();

        sessions.retain(|_, entry| now.duration_since(entry.last_seen) <= self.ttl);
        sessions.insert(
            id.0.clone(),
            SessionEntry {
                data,
                last_seen: now,
            },
        );
    }

    pub async fn set_cursor(&self, id: &SessionId, cursor: Cursor) {
        self.set(id, SessionData::from_cursor(cursor)).await;
    }

    /// Number of live entries, expired ones included until purged
    pub async fn session_count(&self) -> usize {
        self.inner.read().await.len()
    }
}

/// Read `name` from the Cookie header
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Attach a [`SessionId`] to every request, issuing a cookie when the
/// client has none.
pub async fn session_layer(mut req: Request, next: Next) -> Response {
    let existing = cookie_value(req.headers(), SESSION_COOKIE);
    let issued = existing.is_none();
    let id = existing.unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(SessionId(id.clone()));
    let mut response = next.run(req).await;

    if issued {
        let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}

/// Log each request and its response status under a fresh request id.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    tracing::info!(%request_id, %method, %path, "Request");
    let response = next.run(req).await;
    tracing::info!(
        %request_id,
        %method,
        %path,
        status = response.status().as_u16(),
        "Response"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session_id=abc-123"),
        );
        assert_eq!(cookie_value(&headers, SESSION_COOKIE).as_deref(), Some("abc-123"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_empty_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session_id="));
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), None);
    }

    #[test]
    fn test_cursor_needs_every_key() {
        let empty = SessionData::default();
        assert!(matches!(empty.cursor(), Err(AppError::BadRequest(msg)) if msg == "No PGN provided"));

        let no_move = SessionData {
            pgn: Some("1. e4".into()),
            ..Default::default()
        };
        assert!(matches!(no_move.cursor(), Err(AppError::BadRequest(msg)) if msg == "No current move"));

        let full = SessionData::from_cursor(Cursor::open(5, "1. e4"));
        assert_eq!(full.cursor().unwrap(), Cursor::open(5, "1. e4"));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let a = SessionId("a".into());
        let b = SessionId("b".into());

        store.set_cursor(&a, Cursor::open(1, "1. e4")).await;

        assert!(store.get(&a).await.has_game());
        assert_eq!(store.get(&b).await, SessionData::default());
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let store = SessionStore::with_ttl(Duration::from_millis(50));
        let stale = SessionId("stale".into());
        let fresh = SessionId("fresh".into());

        store.set_cursor(&stale, Cursor::open(1, "1. e4")).await;
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(store.get(&stale).await, SessionData::default());
        assert_eq!(store.session_count().await, 0);

        store.set_cursor(&fresh, Cursor::open(2, "1. d4")).await;
        assert_eq!(store.get(&fresh).await.game_id, Some(2));
    }

    #[tokio::test]
    async fn test_writes_purge_expired_sessions() {
        let store = SessionStore::with_ttl(Duration::from_millis(50));
        for name in ["a", "b", "c"] {
            store
                .set_cursor(&SessionId(name.into()), Cursor::open(1, "1. e4"))
                .await;
        }
        tokio::time::sleep(Duration::from_millis(120)).await;

        store
            .set_cursor(&SessionId("d".into()), Cursor::open(2, "1. d4"))
            .await;
        assert_eq!(store.session_count().await, 1);
    }
}
