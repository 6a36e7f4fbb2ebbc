use std::sync::Arc;

use annotator::db::{require_game, GameStore};
use annotator::engine::EngineLauncher;
use axum::{Extension, Json};
use chess_core::game_data::{GameSummary, MoveAnnotation};
use chess_core::pgn::ParsedGame;
use serde::Serialize;

use super::replay_record;
use crate::error::AppError;
use crate::session::{SessionId, SessionStore};
use crate::state::AppState;

/// Player names and result from the record's headers
#[derive(Debug, Serialize)]
pub struct GameHeaders {
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>,
}

impl GameHeaders {
    fn from_game(game: &ParsedGame) -> Self {
        Self {
            white: game.header("White").map(str::to_string),
            black: game.header("Black").map(str::to_string),
            result: game.result().map(str::to_string),
        }
    }
}

/// Main page model. `current_game` is -1 when the session has no open game.
#[derive(Debug, Serialize)]
pub struct IndexView {
    pub games: Vec<GameSummary>,
    pub current_game: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<GameHeaders>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moves: Option<Vec<MoveAnnotation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_move: Option<i64>,
}

/// GET /
pub async fn index<S, L>(
    Extension(state): Extension<Arc<AppState<S, L>>>,
    Extension(sessions): Extension<SessionStore>,
    session: SessionId,
) -> Result<Json<IndexView>, AppError>
where
    S: GameStore + 'static,
    L: EngineLauncher + 'static,
{
    let games = state.store.list_all().await?;
    let data = sessions.get(&session).await;

    if !data.has_game() {
        return Ok(Json(IndexView {
            games,
            current_game: -1,
            headers: None,
            position: None,
            moves: None,
            current_move: None,
        }));
    }

    let cursor = data.cursor()?;
    let (game, tracker) = replay_record(&cursor.pgn)?;
    let stored = require_game(&state.store, cursor.game_id).await?;

    Ok(Json(IndexView {
        games,
        current_game: cursor.game_id,
        headers: Some(GameHeaders::from_game(&game)),
        // Out-of-range plies render the nearest end of the game
        position: Some(tracker.fen_at(cursor.ply)),
        moves: Some(stored.annotation.moves),
        current_move: Some(cursor.ply),
    }))
}
