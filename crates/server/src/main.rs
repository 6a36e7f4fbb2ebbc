use std::sync::Arc;

use annotator::analyzer::{AnalysisSettings, Analyzer};
use annotator::db::{self, GameStore, MemoryGameStore, PgGameStore};
use annotator::engine::EngineLauncher;
use annotator::stockfish::StockfishLauncher;
use server::config::Config;
use server::session::SessionStore;
use server::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .init();

    let launcher = StockfishLauncher::new(&config.analysis.stockfish_path, config.analysis.hash_mb);
    let analyzer = Analyzer::new(launcher, AnalysisSettings::from(&config.analysis));
    tracing::info!(
        stockfish_path = %config.analysis.stockfish_path,
        depth = config.analysis.depth,
        "Analyzer configured"
    );

    match config.analysis.database_url.as_deref() {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(url).await?;

            tracing::info!("Running migrations...");
            db::run_migrations(&pool).await?;

            serve(&config, PgGameStore::new(pool), analyzer).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set - games are kept in memory");
            serve(&config, MemoryGameStore::new(), analyzer).await
        }
    }
}

async fn serve<S, L>(config: &Config, store: S, analyzer: Analyzer<L>) -> anyhow::Result<()>
where
    S: GameStore + 'static,
    L: EngineLauncher + 'static,
{
    let state = Arc::new(AppState::new(store, analyzer));
    let app = server::app(state, SessionStore::with_ttl(config.session_ttl));

    let addr = config.addr();
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
