pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;

use std::sync::Arc;

use annotator::db::GameStore;
use annotator::engine::EngineLauncher;
use axum::{
    middleware,
    routing::{get, post},
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::session::SessionStore;
use crate::state::AppState;

/// Build the router over a store and engine launcher.
pub fn app<S, L>(state: Arc<AppState<S, L>>, sessions: SessionStore) -> Router
where
    S: GameStore + 'static,
    L: EngineLauncher + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::index::index::<S, L>))
        .route("/health", get(routes::health::health_check))
        .route("/error", get(routes::health::trigger_error))
        // Games
        .route("/pgn/create", post(routes::games::create_game::<S, L>))
        .route("/game/{game_id}", get(routes::games::open_game::<S, L>))
        // Cursor
        .route("/move/forward", post(routes::moves::move_forward))
        .route("/move/backward", post(routes::moves::move_backward))
        // Shared state
        .layer(Extension(state))
        .layer(Extension(sessions))
        .layer(middleware::from_fn(session::session_layer))
        .layer(middleware::from_fn(session::log_requests))
        .layer(cors)
}
