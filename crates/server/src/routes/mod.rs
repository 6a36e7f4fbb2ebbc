pub mod games;
pub mod health;
pub mod index;
pub mod moves;

use chess_core::pgn::{parse_pgn, ParsedGame};
use chess_core::position::PositionTracker;

use crate::error::AppError;

/// Parse a session's record and replay it to every ply.
pub(crate) fn replay_record(pgn: &str) -> Result<(ParsedGame, PositionTracker), AppError> {
    let invalid =
        |e: &dyn std::fmt::Display| AppError::BadRequest(format!("Invalid PGN provided: {e}"));

    let game = parse_pgn(pgn).map_err(|e| invalid(&e))?;
    let tracker = PositionTracker::replay(&game).map_err(|e| invalid(&e))?;
    Ok((game, tracker))
}
