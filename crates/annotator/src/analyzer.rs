//! Core game analysis: parse a record, evaluate every mainline ply with one
//! engine session, and build the annotation that gets stored.

use std::time::Duration;

use chess_core::game_data::{Annotation, MoveAnnotation};
use chess_core::pgn::{parse_pgn, ParsedGame};
use chess_core::position::PositionTracker;
use shakmaty::Chess;
use tracing::{debug, info, warn};

use crate::analysis::{display_name, Evaluation};
use crate::config::AnalysisConfig;
use crate::db::{GameStore, NewGame};
use crate::engine::{EngineLauncher, EngineSession};
use crate::error::{AnalysisError, SubmitError};

/// Per-run engine limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisSettings {
    pub depth: u32,
    pub engine_timeout: Option<Duration>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            depth: 10,
            engine_timeout: None,
        }
    }
}

impl From<&AnalysisConfig> for AnalysisSettings {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            depth: config.depth,
            engine_timeout: config.engine_timeout,
        }
    }
}

/// One evaluated ply
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedMove {
    pub ply: usize,
    pub san: String,
    /// Evaluation of the position after this move
    pub evaluation: Evaluation,
    /// `evaluation` minus the previous ply's evaluation (0.0 before the first move)
    pub evaluation_diff: f64,
}

/// Result of a complete analysis run, not yet stored
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedGame {
    pub name: String,
    pub pgn: String,
    pub moves: Vec<AnnotatedMove>,
}

impl AnnotatedGame {
    pub fn annotation(&self) -> Annotation {
        Annotation {
            moves: self
                .moves
                .iter()
                .map(|m| MoveAnnotation {
                    san: m.san.clone(),
                    evaluation_diff: m.evaluation_diff,
                })
                .collect(),
        }
    }

    pub fn to_new_game(&self) -> NewGame {
        NewGame {
            name: self.name.clone(),
            pgn: self.pgn.clone(),
            annotation: self.annotation(),
        }
    }
}

/// Runs analyses, opening a fresh engine session for each one.
pub struct Analyzer<L> {
    launcher: L,
    settings: AnalysisSettings,
}

impl<L: EngineLauncher> Analyzer<L> {
    pub fn new(launcher: L, settings: AnalysisSettings) -> Self {
        Self { launcher, settings }
    }

    /// Analyze a raw PGN. Any parse, legality or engine failure aborts the
    /// whole run; the engine session is closed on every path.
    pub async fn analyze(&self, pgn: &str) -> Result<AnnotatedGame, AnalysisError> {
        let game = parse_pgn(pgn)?;
        info!(move_count = game.len(), depth = self.settings.depth, "Starting analysis");

        let mut session = self.launcher.open().await?;
        let result = self.annotate(&mut session, &game).await;
        session.close().await;

        let moves = result.inspect_err(|e| warn!(error = %e, "Analysis aborted"))?;
        let sans: Vec<&str> = moves.iter().map(|m| m.san.as_str()).collect();
        let name = display_name(&sans);

        info!(name = %name, move_count = moves.len(), "Analysis complete");

        Ok(AnnotatedGame {
            name,
            pgn: pgn.to_string(),
            moves,
        })
    }

    /// Analyze, then persist with a single insert. Returns the new game id.
    pub async fn submit<S: GameStore>(
        &self,
        store: &S,
        pgn: &str,
    ) -> Result<(i64, AnnotatedGame), SubmitError> {
        let game = self.analyze(pgn).await?;
        let id = store.insert(&game.to_new_game()).await?;
        info!(game_id = id, name = %game.name, "Stored annotated game");
        Ok((id, game))
    }

    async fn annotate(
        &self,
        session: &mut L::Session,
        game: &ParsedGame,
    ) -> Result<Vec<AnnotatedMove>, AnalysisError> {
        let mut tracker = PositionTracker::new(game.start_position().clone());
        let mut moves = Vec::with_capacity(game.len());
        let mut previous = 0.0;

        for san in game.moves() {
            let evaluation = {
                let position = tracker.push(san)?;
                self.evaluate(session, position).await?
            };

            let ply = moves.len();
            let san = tracker.sans()[ply].clone();
            let evaluation_diff = evaluation.value() - previous;
            debug!(ply, san = %san, evaluation = evaluation.value(), evaluation_diff, "Evaluated move");

            moves.push(AnnotatedMove {
                ply,
                san,
                evaluation,
                evaluation_diff,
            });
            previous = evaluation.value();
        }

        Ok(moves)
    }

    async fn evaluate(
        &self,
        session: &mut L::Session,
        position: &Chess,
    ) -> Result<Evaluation, AnalysisError> {
        let search = session.evaluate(position, self.settings.depth);
        match self.settings.engine_timeout {
            Some(limit) => tokio::time::timeout(limit, search)
                .await
                .map_err(|_| AnalysisError::EngineTimeout(limit))?,
            None => search.await,
        }
    }
}
