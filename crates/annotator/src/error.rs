//! Annotator error types

use std::time::Duration;

use chess_core::error::{IllegalMoveError, ParseError};
use thiserror::Error;

/// Failure of an analysis run. Nothing is persisted when one of these occurs.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid game record: {0}")]
    InvalidRecord(#[from] ParseError),

    #[error("Game record diverges from legal play: {0}")]
    IllegalMove(#[from] IllegalMoveError),

    #[error("Failed to start engine: {0}")]
    EngineStart(String),

    #[error("Engine evaluation failed: {0}")]
    Evaluation(String),

    #[error("Engine gave no answer within {0:?}")]
    EngineTimeout(Duration),
}

/// Failure of the game store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Game not found: {0}")]
    NotFound(i64),
}

/// Outcome of analyze-then-store. Storage failures stay distinct from
/// analysis failures so callers can report them differently.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Analysis succeeded but the game could not be saved: {0}")]
    Storage(#[from] StoreError),
}

#[derive(Error, Debug)]
#[error("Configuration error: {0}")]
pub struct ConfigError(pub &'static str);
