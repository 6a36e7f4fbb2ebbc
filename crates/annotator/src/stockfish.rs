//! Stockfish engine wrapper using UCI protocol (async I/O)

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use shakmaty::Chess;
use tracing::{debug, warn};

use crate::analysis::{self, EngineScore, Evaluation};
use crate::engine::{EngineLauncher, EngineSession};
use crate::error::AnalysisError;
use chess_core::position::{to_fen, white_to_move};

/// How long a polite `quit` may take before the process is killed
const QUIT_GRACE: Duration = Duration::from_secs(1);

/// Spawns one Stockfish process per session
#[derive(Clone, Debug)]
pub struct StockfishLauncher {
    path: String,
    hash_mb: u32,
}

impl StockfishLauncher {
    pub fn new(path: impl Into<String>, hash_mb: u32) -> Self {
        Self {
            path: path.into(),
            hash_mb,
        }
    }
}

impl EngineLauncher for StockfishLauncher {
    type Session = StockfishEngine;

    async fn open(&self) -> Result<StockfishEngine, AnalysisError> {
        StockfishEngine::new(&self.path, self.hash_mb).await
    }
}

/// Stockfish engine instance
pub struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl StockfishEngine {
    /// Spawn a new Stockfish process and initialize UCI
    pub async fn new(path: &str, hash_mb: u32) -> Result<Self, AnalysisError> {
        let mut process = Command::new(path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(|e| AnalysisError::EngineStart(format!("Failed to spawn {path}: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| AnalysisError::EngineStart("Engine stdin unavailable".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| AnalysisError::EngineStart("Engine stdout unavailable".into()))?;

        let mut engine = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
        };

        engine.handshake(hash_mb).await.map_err(|e| match e {
            AnalysisError::Evaluation(msg) => AnalysisError::EngineStart(msg),
            other => other,
        })?;

        Ok(engine)
    }

    async fn handshake(&mut self, hash_mb: u32) -> Result<(), AnalysisError> {
        self.send("uci").await?;
        self.wait_for("uciok").await?;

        self.send("setoption name Threads value 1").await?;
        self.send(&format!("setoption name Hash value {hash_mb}")).await?;
        self.send("setoption name UCI_ShowWDL value true").await?;
        self.send("isready").await?;
        self.wait_for("readyok").await
    }

    /// Send a command to Stockfish
    async fn send(&mut self, cmd: &str) -> Result<(), AnalysisError> {
        debug!(cmd, "SF <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| AnalysisError::Evaluation(format!("Failed to write to Stockfish: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| AnalysisError::Evaluation(format!("Failed to flush stdin: {e}")))?;
        Ok(())
    }

    /// Read one trimmed line; end of stream means the engine went away
    async fn read_line(&mut self, line: &mut String) -> Result<(), AnalysisError> {
        line.clear();
        let read = self
            .stdout
            .read_line(line)
            .await
            .map_err(|e| AnalysisError::Evaluation(format!("Failed to read from Stockfish: {e}")))?;
        if read == 0 {
            return Err(AnalysisError::Evaluation("Stockfish closed its output".into()));
        }
        debug!(line = line.trim(), "SF >");
        Ok(())
    }

    /// Wait for a specific response line
    async fn wait_for(&mut self, expected: &str) -> Result<(), AnalysisError> {
        let mut line = String::new();
        loop {
            self.read_line(&mut line).await?;
            if line.trim() == expected {
                return Ok(());
            }
        }
    }

    /// Search a FEN to a fixed depth and return the last reported score
    /// (relative to the side to move).
    pub async fn search(&mut self, fen: &str, depth: u32) -> Result<EngineScore, AnalysisError> {
        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go depth {depth}")).await?;

        let mut score = EngineScore::default();
        let mut line = String::new();
        loop {
            self.read_line(&mut line).await?;
            let trimmed = line.trim();

            if trimmed.starts_with("info") && trimmed.contains(" score ") {
                if let Some(update) = parse_score(trimmed) {
                    score = update;
                }
            } else if trimmed.starts_with("bestmove") {
                break;
            }
        }

        Ok(score)
    }

    /// Send quit and wait for the process to exit. An engine stuck in a
    /// search never reads `quit`, so it is killed after `QUIT_GRACE`.
    pub async fn quit(&mut self) {
        let _ = self.send("quit").await;
        if tokio::time::timeout(QUIT_GRACE, self.process.wait()).await.is_err() {
            warn!("Stockfish ignored quit, killing it");
            let _ = self.process.start_kill();
            let _ = self.process.wait().await;
        }
    }
}

impl EngineSession for StockfishEngine {
    async fn evaluate(&mut self, position: &Chess, depth: u32) -> Result<Evaluation, AnalysisError> {
        let fen = to_fen(position);
        let score = self.search(&fen, depth).await?;
        analysis::white_evaluation(&score, white_to_move(position))
            .ok_or_else(|| AnalysisError::Evaluation(format!("No score reported for {fen}")))
    }

    async fn close(mut self) {
        self.quit().await;
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop
        let _ = self.process.start_kill();
    }
}

/// Parse the score fields of an info line. Bound-only scores are skipped.
fn parse_score(line: &str) -> Option<EngineScore> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.iter().any(|p| *p == "lowerbound" || *p == "upperbound") {
        return None;
    }

    let score = EngineScore {
        cp: parse_cp(&parts),
        mate: parse_mate(&parts),
        wdl: parse_wdl(&parts),
    };
    (!score.is_empty()).then_some(score)
}

/// Parse centipawn score from info line
fn parse_cp(parts: &[&str]) -> Option<i32> {
    value_after(parts, "cp")?.parse().ok()
}

/// Parse mate score from info line
fn parse_mate(parts: &[&str]) -> Option<i32> {
    value_after(parts, "mate")?.parse().ok()
}

/// Parse win/draw/loss triple from info line
fn parse_wdl(parts: &[&str]) -> Option<(u32, u32, u32)> {
    let i = parts.iter().position(|p| *p == "wdl")?;
    let w = parts.get(i + 1)?.parse().ok()?;
    let d = parts.get(i + 2)?.parse().ok()?;
    let l = parts.get(i + 3)?.parse().ok()?;
    Some((w, d, l))
}

fn value_after<'a>(parts: &[&'a str], key: &str) -> Option<&'a str> {
    let i = parts.iter().position(|p| *p == key)?;
    parts.get(i + 1).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cp() {
        let line = "info depth 10 seldepth 14 multipv 1 score cp 35 nodes 100000 pv e2e4";
        let score = parse_score(line).unwrap();
        assert_eq!(score.cp, Some(35));
        assert_eq!(score.mate, None);
    }

    #[test]
    fn test_parse_mate() {
        let line = "info depth 10 score mate -3 nodes 100000 pv e8f8";
        assert_eq!(parse_score(line).unwrap().mate, Some(-3));
    }

    #[test]
    fn test_parse_wdl() {
        let line = "info depth 10 score cp 35 wdl 120 830 50 nodes 100000 pv e2e4";
        let score = parse_score(line).unwrap();
        assert_eq!(score.wdl, Some((120, 830, 50)));
        assert_eq!(score.cp, Some(35));
    }

    #[test]
    fn test_parse_terminal_position() {
        // Stockfish on a mated position: no pv, mate 0
        let score = parse_score("info depth 0 score mate 0").unwrap();
        assert_eq!(score.mate, Some(0));
        assert_eq!(score.expectation(), Some(0.0));
    }

    #[test]
    fn test_bound_scores_are_skipped() {
        assert_eq!(parse_score("info depth 9 score cp 40 lowerbound nodes 10"), None);
    }

    #[test]
    fn test_lines_without_score() {
        assert_eq!(parse_score("info string NNUE evaluation using nn.nnue"), None);
        assert_eq!(parse_score("info depth 3 currmove e2e4 currmovenumber 1"), None);
    }

    #[tokio::test]
    async fn test_missing_binary_is_engine_start_error() {
        let launcher = StockfishLauncher::new("/nonexistent/stockfish-binary", 16);
        let result = launcher.open().await;
        assert!(matches!(result, Err(AnalysisError::EngineStart(_))));
    }
}
