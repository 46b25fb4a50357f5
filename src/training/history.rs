//! Append-only record of trainer generations
//!
//! `MemoryHistory` keeps records for the lifetime of the process;
//! `SqliteHistory` persists them across runs (WAL, one row per generation).

use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

use super::trainer::GenerationStats;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("history record encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("history store lock poisoned")]
    Poisoned,
}

/// One generation as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Training run this generation belongs to
    pub run_id: String,
    pub recorded_at: String,
    pub stats: GenerationStats,
    /// Running estimate after the update, in the 37-element layout
    pub estimate: Vec<f64>,
}

impl GenerationRecord {
    pub fn new(run_id: &str, stats: GenerationStats, estimate: Vec<f64>) -> Self {
        Self {
            run_id: run_id.to_string(),
            recorded_at: chrono::Utc::now().to_rfc3339(),
            stats,
            estimate,
        }
    }
}

/// Append-only generation store
pub trait TrainingHistory: Send + Sync {
    fn append(&self, record: &GenerationRecord) -> Result<(), HistoryError>;

    /// Every record in append order
    fn load_all(&self) -> Result<Vec<GenerationRecord>, HistoryError>;

    fn clear(&self) -> Result<(), HistoryError>;
}

#[derive(Debug, Default)]
pub struct MemoryHistory {
    records: Mutex<Vec<GenerationRecord>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrainingHistory for MemoryHistory {
    fn append(&self, record: &GenerationRecord) -> Result<(), HistoryError> {
        let mut records = self.records.lock().map_err(|_| HistoryError::Poisoned)?;
        records.push(record.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<GenerationRecord>, HistoryError> {
        let records = self.records.lock().map_err(|_| HistoryError::Poisoned)?;
        Ok(records.clone())
    }

    fn clear(&self) -> Result<(), HistoryError> {
        self.records.lock().map_err(|_| HistoryError::Poisoned)?.clear();
        Ok(())
    }
}

pub struct SqliteHistory {
    conn: Mutex<Connection>,
}

impl SqliteHistory {
    /// Open or create a history database at the given path
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, HistoryError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, HistoryError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS generations (
                id INTEGER PRIMARY KEY,
                run_id TEXT NOT NULL,
                recorded_at TEXT NOT NULL,
                generation INTEGER NOT NULL,
                mean_fitness REAL NOT NULL,
                min_fitness REAL NOT NULL,
                estimate_fitness REAL NOT NULL,
                best_fitness REAL NOT NULL,
                elapsed_secs REAL NOT NULL,
                estimate_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_generations_run ON generations(run_id, generation);
            "#,
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

impl TrainingHistory for SqliteHistory {
    fn append(&self, record: &GenerationRecord) -> Result<(), HistoryError> {
        let estimate_json = serde_json::to_string(&record.estimate)?;
        let conn = self.conn.lock().map_err(|_| HistoryError::Poisoned)?;
        let stats = &record.stats;
        conn.execute(
            r#"INSERT INTO generations
               (run_id, recorded_at, generation, mean_fitness, min_fitness,
                estimate_fitness, best_fitness, elapsed_secs, estimate_json)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
            params![
                record.run_id,
                record.recorded_at,
                stats.generation,
                stats.mean_fitness,
                stats.min_fitness,
                stats.estimate_fitness,
                stats.best_fitness,
                stats.elapsed_secs,
                estimate_json,
            ],
        )?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<GenerationRecord>, HistoryError> {
        let conn = self.conn.lock().map_err(|_| HistoryError::Poisoned)?;
        let mut stmt = conn.prepare(
            "SELECT run_id, recorded_at, generation, mean_fitness, min_fitness,
                    estimate_fitness, best_fitness, elapsed_secs, estimate_json
             FROM generations ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                GenerationStats {
                    generation: row.get(2)?,
                    mean_fitness: row.get(3)?,
                    min_fitness: row.get(4)?,
                    estimate_fitness: row.get(5)?,
                    best_fitness: row.get(6)?,
                    elapsed_secs: row.get(7)?,
                },
                row.get::<_, String>(8)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (run_id, recorded_at, stats, estimate_json) = row?;
            records.push(GenerationRecord {
                run_id,
                recorded_at,
                stats,
                estimate: serde_json::from_str(&estimate_json)?,
            });
        }
        Ok(records)
    }

    fn clear(&self) -> Result<(), HistoryError> {
        let conn = self.conn.lock().map_err(|_| HistoryError::Poisoned)?;
        conn.execute("DELETE FROM generations", [])?;
        Ok(())
    }
}
