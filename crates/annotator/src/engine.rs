//! Engine session contract.
//!
//! One session is opened per analysis run and closed when the run ends.
//! Methods return `impl Future + Send` so pipelines built on them can be
//! driven from spawned tasks and axum handlers.

use std::future::Future;

use shakmaty::Chess;

use crate::analysis::Evaluation;
use crate::error::AnalysisError;

/// A running evaluation engine owned by a single analysis run.
pub trait EngineSession: Send {
    /// Search `position` to `depth` plies and return the White-perspective
    /// expectation, whatever side is to move.
    fn evaluate(
        &mut self,
        position: &Chess,
        depth: u32,
    ) -> impl Future<Output = Result<Evaluation, AnalysisError>> + Send;

    /// Shut the engine down. Dropping a session without closing it must
    /// still release the underlying process.
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Starts engine sessions.
pub trait EngineLauncher: Send + Sync {
    type Session: EngineSession;

    fn open(&self) -> impl Future<Output = Result<Self::Session, AnalysisError>> + Send;
}
