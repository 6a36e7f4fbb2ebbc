//! Error types for game-record parsing and replay.

use thiserror::Error;

/// The text does not contain a usable game record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no game found in input")]
    Empty,

    #[error("malformed header: {0}")]
    MalformedHeader(String),

    #[error("invalid FEN header: {0}")]
    InvalidFen(String),

    #[error("game has no mainline moves")]
    NoMoves,

    #[error("unreadable game record: {0}")]
    Unreadable(String),
}

/// A mainline move that cannot be played in the position it appears in.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("illegal move {san} at ply {ply}: {reason}")]
pub struct IllegalMoveError {
    /// 0-based ply index of the offending move
    pub ply: usize,
    pub san: String,
    pub reason: String,
}
