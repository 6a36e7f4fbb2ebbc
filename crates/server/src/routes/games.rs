use std::sync::Arc;

use annotator::db::{require_game, GameStore};
use annotator::engine::EngineLauncher;
use axum::{extract::Path, response::Redirect, Extension, Form};
use chess_core::cursor::Cursor;
use serde::Deserialize;

use super::replay_record;
use crate::error::AppError;
use crate::session::{SessionId, SessionStore};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateGameForm {
    #[serde(rename = "PGN")]
    pub pgn: Option<String>,
}

/// POST /pgn/create
///
/// Analyzes the submitted record, stores it and opens it in the session.
pub async fn create_game<S, L>(
    Extension(state): Extension<Arc<AppState<S, L>>>,
    Extension(sessions): Extension<SessionStore>,
    session: SessionId,
    Form(form): Form<CreateGameForm>,
) -> Result<Redirect, AppError>
where
    S: GameStore + 'static,
    L: EngineLauncher + 'static,
{
    let pgn = form
        .pgn
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("No PGN provided".into()))?;

    let (game_id, game) = state.analyzer.submit(&state.store, &pgn).await?;
    tracing::info!(game_id, name = %game.name, move_count = game.moves.len(), "Game created");

    sessions.set_cursor(&session, Cursor::open(game_id, pgn)).await;
    Ok(Redirect::to("/"))
}

/// GET /game/{game_id}
pub async fn open_game<S, L>(
    Extension(state): Extension<Arc<AppState<S, L>>>,
    Extension(sessions): Extension<SessionStore>,
    session: SessionId,
    Path(game_id): Path<i64>,
) -> Result<Redirect, AppError>
where
    S: GameStore + 'static,
    L: EngineLauncher + 'static,
{
    let game = require_game(&state.store, game_id).await?;
    replay_record(&game.pgn)?;

    sessions.set_cursor(&session, Cursor::open(game.id, game.pgn)).await;
    Ok(Redirect::to("/"))
}
