use async_trait::async_trait;
use thiserror::Error;

use crate::models::{GameRecord, Price, StoredGame};

mod sqlite;
pub use sqlite::{SqliteBackend, SqliteStorage};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to open database {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("database connection lock poisoned")]
    LockPoisoned,
}

/// Optional criteria for reading persisted games. The empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameFilter {
    /// Case-insensitive substring of the title.
    pub title_contains: Option<String>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    /// Exact review label.
    pub review_label: Option<String>,
    pub limit: Option<u32>,
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Create the `games` table and its timestamp trigger if absent.
    async fn ensure_schema(&self) -> Result<(), StorageError>;
    /// Overwrite every non-key field of the row with this title; returns rows affected.
    async fn update_game(&self, game: &GameRecord) -> Result<usize, StorageError>;
    async fn insert_game(&self, game: &GameRecord) -> Result<(), StorageError>;
    async fn query_games(&self, filter: &GameFilter) -> Result<Vec<StoredGame>, StorageError>;
    async fn count_games(&self) -> Result<u64, StorageError>;
}

/// Opens one storage connection per pipeline run.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn Storage>, StorageError>;
}
