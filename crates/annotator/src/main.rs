//! Annotator CLI
//!
//! Analyzes a PGN file with a local Stockfish and prints the annotation.
//! When DATABASE_URL is set the annotated game is stored as well.
//!
//! Usage:
//!   annotator analyze <file.pgn> [--depth N]
//!   annotator create-database

use std::env;
use std::fs;

use annotator::analyzer::{AnalysisSettings, Analyzer};
use annotator::config::AnalysisConfig;
use annotator::db::{self, PgGameStore};
use annotator::stockfish::StockfishLauncher;
use anyhow::{bail, Context};
use tracing::info;

const USAGE: &str = "Usage:\n  annotator analyze <file.pgn> [--depth N]\n  annotator create-database";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let config = AnalysisConfig::from_env()?;

    match args.get(1).map(String::as_str) {
        Some("analyze") => {
            let Some(path) = args.get(2) else {
                bail!("{USAGE}");
            };
            let depth = parse_depth(&args[3..])?.unwrap_or(config.depth);
            analyze_file(&config, path, depth).await
        }
        Some("create-database") => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set to create the database")?;
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            info!("Games table ready");
            Ok(())
        }
        _ => bail!("{USAGE}"),
    }
}

/// Parse `--depth N` from the remaining args
fn parse_depth(args: &[String]) -> anyhow::Result<Option<u32>> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--depth" {
            let value = iter.next().context("--depth needs a value")?;
            let depth: u32 = value
                .parse()
                .with_context(|| format!("invalid depth: {value}"))?;
            if depth == 0 {
                bail!("depth must be positive");
            }
            return Ok(Some(depth));
        }
    }
    Ok(None)
}

async fn analyze_file(config: &AnalysisConfig, path: &str, depth: u32) -> anyhow::Result<()> {
    let pgn = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;

    let launcher = StockfishLauncher::new(&config.stockfish_path, config.hash_mb);
    let settings = AnalysisSettings {
        depth,
        ..AnalysisSettings::from(config)
    };
    let analyzer = Analyzer::new(launcher, settings);
    info!(stockfish_path = %config.stockfish_path, depth, "Analyzer ready");

    let game = match config.database_url.as_deref() {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            let store = PgGameStore::new(pool);
            let (id, game) = analyzer.submit(&store, &pgn).await?;
            info!(game_id = id, "Saved game");
            game
        }
        None => analyzer.analyze(&pgn).await?,
    };

    let output = serde_json::json!({
        "name": game.name,
        "metadata": game.annotation(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_depth() {
        assert_eq!(parse_depth(&args(&[])).unwrap(), None);
        assert_eq!(parse_depth(&args(&["--depth", "14"])).unwrap(), Some(14));
        assert!(parse_depth(&args(&["--depth"])).is_err());
        assert!(parse_depth(&args(&["--depth", "zero"])).is_err());
        assert!(parse_depth(&args(&["--depth", "0"])).is_err());
    }
}
