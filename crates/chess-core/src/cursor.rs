//! Playback cursor over a stored game.

use serde::{Deserialize, Serialize};

/// Which game is open and which ply is shown.
///
/// The ply is deliberately unbounded; it may go negative or past the last
/// move. Rendering clamps it through `PositionTracker::position_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub game_id: i64,
    pub ply: i64,
    /// Raw record kept alongside so the board can be rebuilt without a store lookup
    pub pgn: String,
}

impl Cursor {
    /// Cursor at the start of a freshly opened game.
    pub fn open(game_id: i64, pgn: impl Into<String>) -> Self {
        Self {
            game_id,
            ply: 0,
            pgn: pgn.into(),
        }
    }
}

/// Step one ply forward.
pub fn advance(cursor: Cursor) -> Cursor {
    Cursor {
        ply: cursor.ply.wrapping_add(1),
        ..cursor
    }
}

/// Step one ply back.
pub fn retreat(cursor: Cursor) -> Cursor {
    Cursor {
        ply: cursor.ply.wrapping_sub(1),
        ..cursor
    }
}
