//! Board state along a game's mainline.

use shakmaty::{
    fen::Fen,
    san::{San, SanPlus},
    Chess, EnPassantMode, Position,
};

use crate::error::IllegalMoveError;
use crate::pgn::ParsedGame;

/// Positions reached by applying mainline moves one at a time.
///
/// `positions[n]` is the board after the first `n` moves, so there is
/// always one more position than there are moves.
#[derive(Debug, Clone)]
pub struct PositionTracker {
    positions: Vec<Chess>,
    sans: Vec<String>,
}

impl PositionTracker {
    pub fn new(start: Chess) -> Self {
        Self {
            positions: vec![start],
            sans: Vec::new(),
        }
    }

    /// Replay a whole mainline, failing on the first illegal move.
    pub fn replay(game: &ParsedGame) -> Result<Self, IllegalMoveError> {
        let mut tracker = Self::new(game.start_position().clone());
        for san in game.moves() {
            tracker.push(san)?;
        }
        Ok(tracker)
    }

    /// Apply the next move and return the resulting position.
    /// The tracker is left untouched when the move is illegal.
    pub fn push(&mut self, san: &San) -> Result<&Chess, IllegalMoveError> {
        let ply = self.sans.len();
        let mut next = self.current().clone();

        let mv = san.to_move(&next).map_err(|e| IllegalMoveError {
            ply,
            san: san.to_string(),
            reason: e.to_string(),
        })?;

        // Canonical SAN, with check/mate suffix from the resulting position
        let san_plus = SanPlus::from_move_and_play_unchecked(&mut next, mv);
        self.sans.push(san_plus.to_string());
        self.positions.push(next);

        Ok(self.current())
    }

    pub fn move_count(&self) -> usize {
        self.sans.len()
    }

    /// Position after the last applied move.
    pub fn current(&self) -> &Chess {
        &self.positions[self.positions.len() - 1]
    }

    /// Canonical SAN of every applied move, in ply order.
    pub fn sans(&self) -> &[String] {
        &self.sans
    }

    /// Board after the first `ply` moves. Negative plies clamp to the start
    /// position and plies past the end clamp to the final position.
    pub fn position_at(&self, ply: i64) -> &Chess {
        let last = self.move_count() as i64;
        &self.positions[ply.clamp(0, last) as usize]
    }

    /// FEN of [`Self::position_at`], used as the diagram blob for rendering.
    pub fn fen_at(&self, ply: i64) -> String {
        to_fen(self.position_at(ply))
    }
}

pub fn to_fen(position: &Chess) -> String {
    Fen::from_position(position, EnPassantMode::Legal).to_string()
}

/// True when it is White's turn in `position`.
pub fn white_to_move(position: &Chess) -> bool {
    position.turn().is_white()
}
