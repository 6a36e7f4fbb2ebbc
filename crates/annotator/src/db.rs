//! Game store: annotated games keyed by a store-assigned id

use std::collections::BTreeMap;
use std::future::Future;

use chess_core::game_data::{Annotation, GameSummary};
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tokio::sync::RwLock;

use crate::error::StoreError;

/// A game ready to be inserted
#[derive(Debug, Clone)]
pub struct NewGame {
    pub name: String,
    pub pgn: String,
    pub annotation: Annotation,
}

/// A persisted game
#[derive(Debug, Clone, PartialEq)]
pub struct StoredGame {
    pub id: i64,
    pub name: String,
    pub pgn: String,
    pub annotation: Annotation,
    pub created_at: DateTime<Utc>,
}

/// Append-only store of annotated games.
///
/// `insert` must be atomic: a game is either readable with all of its
/// moves or not readable at all.
pub trait GameStore: Send + Sync {
    fn insert(&self, game: &NewGame) -> impl Future<Output = Result<i64, StoreError>> + Send;

    fn get_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<StoredGame>, StoreError>> + Send;

    /// All games, oldest first
    fn list_all(&self) -> impl Future<Output = Result<Vec<GameSummary>, StoreError>> + Send;

    /// Returns whether a game was removed
    fn delete(&self, id: i64) -> impl Future<Output = Result<bool, StoreError>> + Send;
}

/// Fetch a game or fail with `StoreError::NotFound`
pub async fn require_game<S: GameStore>(store: &S, id: i64) -> Result<StoredGame, StoreError> {
    store.get_by_id(id).await?.ok_or(StoreError::NotFound(id))
}

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Create the games table if it does not exist.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS games (
    id          BIGSERIAL PRIMARY KEY,
    name        TEXT NOT NULL,
    pgn         TEXT NOT NULL,
    metadata    JSONB NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#;

/// Postgres-backed store
#[derive(Clone)]
pub struct PgGameStore {
    pool: PgPool,
}

impl PgGameStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl GameStore for PgGameStore {
    async fn insert(&self, game: &NewGame) -> Result<i64, StoreError> {
        let metadata = game.annotation.to_json()?;

        // Single statement: the row and its annotation land together
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO games (name, pgn, metadata) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&game.name)
        .bind(&game.pgn)
        .bind(&metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<StoredGame>, StoreError> {
        let row: Option<(i64, String, String, JsonValue, DateTime<Utc>)> = sqlx::query_as(
            "SELECT id, name, pgn, metadata, created_at FROM games WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(id, name, pgn, metadata, created_at)| {
            Ok::<_, StoreError>(StoredGame {
                id,
                name,
                pgn,
                annotation: Annotation::from_json(metadata)?,
                created_at,
            })
        })
        .transpose()
    }

    async fn list_all(&self) -> Result<Vec<GameSummary>, StoreError> {
        let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM games ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| GameSummary { id, name })
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM games WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// In-process store with monotonic ids
#[derive(Default)]
pub struct MemoryGameStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    next_id: i64,
    games: BTreeMap<i64, StoredGame>,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryGameStore {
    async fn insert(&self, game: &NewGame) -> Result<i64, StoreError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = inner.next_id;
        inner.games.insert(
            id,
            StoredGame {
                id,
                name: game.name.clone(),
                pgn: game.pgn.clone(),
                annotation: game.annotation.clone(),
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<StoredGame>, StoreError> {
        Ok(self.inner.read().await.games.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<GameSummary>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .games
            .values()
            .map(|g| GameSummary {
                id: g.id,
                name: g.name.clone(),
            })
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.games.remove(&id).is_some())
    }
}
