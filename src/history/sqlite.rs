//! SQLite-backed result history
//!
//! One row per result. The full result is kept as JSON; `seq` preserves run
//! order. The connection sits behind a mutex and is only touched from the
//! blocking pool.

use async_trait::async_trait;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{HistoryError, ResultStore};
use crate::model::ValidationResult;

/// Persistent result history in `<data_dir>/results.db`
pub struct SqliteResultStore {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl SqliteResultStore {
    /// Create or open the history database
    pub fn open(data_dir: &Path) -> Result<Self, HistoryError> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join("results.db");

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS validation_results (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                dataset TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                body TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, HistoryError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, HistoryError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| HistoryError::Task("history connection poisoned".to_string()))?;
            f(&guard)
        })
        .await?
    }
}

fn decode(id: String, body: String) -> Result<ValidationResult, HistoryError> {
    serde_json::from_str(&body).map_err(|e| HistoryError::Corrupt {
        id,
        message: e.to_string(),
    })
}

#[async_trait]
impl ResultStore for SqliteResultStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn insert(&self, result: &ValidationResult) -> Result<(), HistoryError> {
        let body = serde_json::to_string(result).map_err(|e| HistoryError::Corrupt {
            id: result.id.clone(),
            message: e.to_string(),
        })?;
        let id = result.id.clone();
        let dataset = result.dataset.clone();
        let timestamp = result.timestamp.to_rfc3339();

        self.with_conn(move |conn| {
            let exists: Option<i64> = conn
                .query_row(
                    "SELECT seq FROM validation_results WHERE id = ?",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_some() {
                return Err(HistoryError::DuplicateId(id));
            }

            conn.execute(
                "INSERT INTO validation_results (id, dataset, timestamp, body)
                 VALUES (?, ?, ?, ?)",
                params![id, dataset, timestamp, body],
            )?;
            Ok(())
        })
        .await
    }

    async fn list(&self) -> Result<Vec<ValidationResult>, HistoryError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare_cached("SELECT id, body FROM validation_results ORDER BY seq")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;

            let mut results = Vec::new();
            for row in rows {
                let (id, body) = row?;
                results.push(decode(id, body)?);
            }
            Ok(results)
        })
        .await
    }

    async fn get(&self, id: &str) -> Result<Option<ValidationResult>, HistoryError> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let body: Option<String> = conn
                .query_row(
                    "SELECT body FROM validation_results WHERE id = ?",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            body.map(|body| decode(id, body)).transpose()
        })
        .await
    }

    async fn count(&self) -> Result<usize, HistoryError> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM validation_results", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }
}
