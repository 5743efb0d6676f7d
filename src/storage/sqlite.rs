use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{named_params, params_from_iter, Connection, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::models::{GameRecord, Price, StoredGame};
use crate::storage::{GameFilter, Storage, StorageBackend, StorageError};

const CREATE_GAMES_TABLE: &str = "CREATE TABLE IF NOT EXISTS games (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL UNIQUE,
    price NUMERIC(10, 2) NOT NULL DEFAULT 0,
    review_label TEXT,
    review_score INTEGER,
    review_percent INTEGER,
    review_count INTEGER,
    last_collected_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
)";

// Refresh the timestamp on every write that did not set it explicitly
const CREATE_TOUCH_TRIGGER: &str = "CREATE TRIGGER IF NOT EXISTS games_touch_last_collected
AFTER UPDATE ON games
FOR EACH ROW WHEN NEW.last_collected_at IS OLD.last_collected_at
BEGIN
    UPDATE games SET last_collected_at = CURRENT_TIMESTAMP WHERE id = NEW.id;
END";

const UPDATE_GAME: &str = "UPDATE games SET
    price = :price,
    review_label = :review_label,
    review_score = :review_score,
    review_percent = :review_percent,
    review_count = :review_count
WHERE title = :title";

const INSERT_GAME: &str = "INSERT INTO games
    (title, price, review_label, review_score, review_percent, review_count)
VALUES (:title, :price, :review_label, :review_score, :review_percent, :review_count)";

const SELECT_GAMES: &str = "SELECT id, title, price, review_label, review_score,
    review_percent, review_count, last_collected_at FROM games WHERE 1=1";

pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = db_path.as_ref();
        let conn = Connection::open(path).map_err(|source| StorageError::Open {
            path: path.display().to_string(),
            source,
        })?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::Open {
            path: ":memory:".to_string(),
            source,
        })?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

fn game_from_row(row: &Row<'_>) -> rusqlite::Result<StoredGame> {
    let price: f64 = row.get("price")?;
    let label: Option<String> = row.get("review_label")?;

    Ok(StoredGame {
        id: row.get("id")?,
        game: GameRecord {
            title: row.get("title")?,
            price: Price::from_f64(price),
            review_label: label.unwrap_or_default(),
            review_score: row.get::<_, Option<u8>>("review_score")?.unwrap_or(0),
            review_percent_positive: row.get::<_, Option<u32>>("review_percent")?.unwrap_or(0),
            review_count: row.get::<_, Option<u32>>("review_count")?.unwrap_or(0),
        },
        last_collected_at: row.get("last_collected_at")?,
    })
}

/// Escape LIKE wildcards so the user's text is matched literally.
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn build_query(filter: &GameFilter) -> (String, Vec<Value>) {
    let mut sql = SELECT_GAMES.to_string();
    let mut params = Vec::new();

    if let Some(title) = filter.title_contains.as_deref().filter(|t| !t.is_empty()) {
        sql.push_str(" AND title LIKE ? ESCAPE '\\'");
        params.push(Value::Text(like_pattern(title)));
    }
    if let Some(min) = filter.min_price {
        sql.push_str(" AND price >= ?");
        params.push(Value::Real(min.as_f64()));
    }
    if let Some(max) = filter.max_price {
        sql.push_str(" AND price <= ?");
        params.push(Value::Real(max.as_f64()));
    }
    if let Some(label) = filter.review_label.as_deref().filter(|l| !l.is_empty()) {
        sql.push_str(" AND review_label = ?");
        params.push(Value::Text(label.to_string()));
    }

    sql.push_str(" ORDER BY title");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params.push(Value::Integer(i64::from(limit)));
    }

    (sql, params)
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        let conn = self.conn()?;

        conn.execute(CREATE_GAMES_TABLE, [])?;
        conn.execute(CREATE_TOUCH_TRIGGER, [])?;

        info!("Database schema verified");
        Ok(())
    }

    async fn update_game(&self, game: &GameRecord) -> Result<usize, StorageError> {
        let conn = self.conn()?;

        let affected = conn.execute(
            UPDATE_GAME,
            named_params! {
                ":title": &game.title,
                ":price": game.price.as_f64(),
                ":review_label": &game.review_label,
                ":review_score": game.review_score,
                ":review_percent": game.review_percent_positive,
                ":review_count": game.review_count,
            },
        )?;

        Ok(affected)
    }

    async fn insert_game(&self, game: &GameRecord) -> Result<(), StorageError> {
        let conn = self.conn()?;

        conn.execute(
            INSERT_GAME,
            named_params! {
                ":title": &game.title,
                ":price": game.price.as_f64(),
                ":review_label": &game.review_label,
                ":review_score": game.review_score,
                ":review_percent": game.review_percent_positive,
                ":review_count": game.review_count,
            },
        )?;

        Ok(())
    }

    async fn query_games(&self, filter: &GameFilter) -> Result<Vec<StoredGame>, StorageError> {
        let conn = self.conn()?;
        let (sql, params) = build_query(filter);
        debug!(%sql, "Querying games");

        let mut stmt = conn.prepare(&sql)?;
        let games = stmt
            .query_map(params_from_iter(params), game_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(games)
    }

    async fn count_games(&self) -> Result<u64, StorageError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

/// Opens a fresh connection to the database file for each run.
pub struct SqliteBackend {
    path: PathBuf,
}

impl SqliteBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StorageBackend for SqliteBackend {
    async fn connect(&self) -> Result<Box<dyn Storage>, StorageError> {
        Ok(Box::new(SqliteStorage::open(&self.path)?))
    }
}
