#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use annotator::analysis::{cp_to_expectation, Evaluation};
use annotator::analyzer::{AnalysisSettings, Analyzer};
use annotator::db::MemoryGameStore;
use annotator::engine::{EngineLauncher, EngineSession};
use annotator::error::AnalysisError;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use server::session::SessionStore;
use server::state::AppState;
use shakmaty::{Bitboard, Chess, Color, Position, Role};
use tower::ServiceExt;

/// Counts sessions opened and closed by a launcher.
#[derive(Debug, Default)]
pub struct SessionCounter {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub evaluations: AtomicUsize,
}

impl SessionCounter {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }
}

/// Deterministic stand-in engine scoring positions by material balance.
///
/// `fail_after` makes the session fail on that evaluation (0-based).
#[derive(Debug, Clone, Default)]
pub struct MaterialLauncher {
    pub counter: Arc<SessionCounter>,
    pub fail_after: Option<usize>,
}

impl MaterialLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(evaluation: usize) -> Self {
        Self {
            fail_after: Some(evaluation),
            ..Self::default()
        }
    }
}

pub struct MaterialSession {
    counter: Arc<SessionCounter>,
    fail_after: Option<usize>,
    calls: usize,
}

impl EngineLauncher for MaterialLauncher {
    type Session = MaterialSession;

    async fn open(&self) -> Result<MaterialSession, AnalysisError> {
        self.counter.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MaterialSession {
            counter: self.counter.clone(),
            fail_after: self.fail_after,
            calls: 0,
        })
    }
}

impl EngineSession for MaterialSession {
    async fn evaluate(&mut self, position: &Chess, _depth: u32) -> Result<Evaluation, AnalysisError> {
        let call = self.calls;
        self.calls += 1;
        if self.fail_after == Some(call) {
            return Err(AnalysisError::Evaluation("engine crashed".into()));
        }
        self.counter.evaluations.fetch_add(1, Ordering::SeqCst);
        Ok(Evaluation::new(cp_to_expectation(material_cp(position))))
    }

    async fn close(self) {
        self.counter.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// White material minus Black material, in centipawns
pub fn material_cp(position: &Chess) -> i32 {
    let board = position.board();
    let side = |color: Color| -> i32 {
        [
            (Role::Pawn, 100),
            (Role::Knight, 300),
            (Role::Bishop, 300),
            (Role::Rook, 500),
            (Role::Queen, 900),
        ]
        .into_iter()
        .map(|(role, value)| {
            let pieces: Bitboard = board.by_color(color) & board.by_role(role);
            pieces.count() as i32 * value
        })
        .sum()
    };
    side(Color::White) - side(Color::Black)
}

pub fn analyzer(launcher: MaterialLauncher) -> Analyzer<MaterialLauncher> {
    Analyzer::new(launcher, AnalysisSettings::default())
}

/// Router over an in-memory store
pub fn memory_app(launcher: MaterialLauncher) -> Router {
    let state = Arc::new(AppState::new(MemoryGameStore::new(), analyzer(launcher)));
    server::app(state, SessionStore::new())
}

/// Percent-encode a form value
pub fn form_encode(value: &str) -> String {
    let mut out = String::new();
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn get(path: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post(path: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_pgn(pgn: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/pgn/create")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(format!("PGN={}", form_encode(pgn))))
        .unwrap()
}

/// `session_id=...` pair from a Set-Cookie header
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    let value = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    value.split(';').next().map(|pair| pair.trim().to_string())
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn assert_redirect_home(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
}
