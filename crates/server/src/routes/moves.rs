use axum::{response::Redirect, Extension};
use chess_core::cursor::{advance, retreat, Cursor};

use super::replay_record;
use crate::error::AppError;
use crate::session::{SessionId, SessionStore};

/// POST /move/forward
pub async fn move_forward(
    Extension(sessions): Extension<SessionStore>,
    session: SessionId,
) -> Result<Redirect, AppError> {
    step(&sessions, &session, advance).await
}

/// POST /move/backward
pub async fn move_backward(
    Extension(sessions): Extension<SessionStore>,
    session: SessionId,
) -> Result<Redirect, AppError> {
    step(&sessions, &session, retreat).await
}

async fn step(
    sessions: &SessionStore,
    session: &SessionId,
    op: fn(Cursor) -> Cursor,
) -> Result<Redirect, AppError> {
    let cursor = sessions.get(session).await.cursor()?;
    // The stored record must still replay before the cursor moves
    replay_record(&cursor.pgn)?;

    let cursor = op(cursor);
    tracing::debug!(game_id = cursor.game_id, ply = cursor.ply, "Cursor moved");
    sessions.set_cursor(session, cursor).await;

    Ok(Redirect::to("/"))
}
