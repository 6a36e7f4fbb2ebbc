//! Analysis configuration from environment variables

use std::env;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_STOCKFISH_PATH: &str = "/usr/local/bin/stockfish";
const DEFAULT_DEPTH: u32 = 10;
const DEFAULT_HASH_MB: u32 = 64;

#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    /// Path to the Stockfish binary
    pub stockfish_path: String,

    /// Search depth per position
    pub depth: u32,

    /// Engine hash table size in MB
    pub hash_mb: u32,

    /// Per-position timeout; `None` waits for the engine indefinitely
    pub engine_timeout: Option<Duration>,

    /// Postgres URL; analysis results are only printed when unset
    pub database_url: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            stockfish_path: DEFAULT_STOCKFISH_PATH.to_string(),
            depth: DEFAULT_DEPTH,
            hash_mb: DEFAULT_HASH_MB,
            engine_timeout: None,
            database_url: None,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let stockfish_path =
            env::var("STOCKFISH_PATH").unwrap_or_else(|_| DEFAULT_STOCKFISH_PATH.to_string());

        let depth = match env::var("ANALYSIS_DEPTH") {
            Ok(v) => v
                .parse::<u32>()
                .ok()
                .filter(|d| *d > 0)
                .ok_or(ConfigError("ANALYSIS_DEPTH must be a positive integer"))?,
            Err(_) => DEFAULT_DEPTH,
        };

        let hash_mb = env::var("ENGINE_HASH_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_HASH_MB);

        let engine_timeout = match env::var("ENGINE_TIMEOUT_SECS") {
            Ok(v) => Some(Duration::from_secs(
                v.parse()
                    .map_err(|_| ConfigError("ENGINE_TIMEOUT_SECS must be a number of seconds"))?,
            )),
            Err(_) => None,
        };

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());

        Ok(Self {
            stockfish_path,
            depth,
            hash_mb,
            engine_timeout,
            database_url,
        })
    }
}
