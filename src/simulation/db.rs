//! SQLite database for simulation results
//!
//! Provides persistent storage and querying of match batches.
//! Uses WAL mode for concurrent reads during writes.

use rusqlite::{Connection, Result, params};
use std::path::Path;

use crate::court::Side;

use super::metrics::{MatchResult, SideTallies};
use super::parallel::MatchConfig;

/// Database wrapper for simulation results
pub struct SimDatabase {
    conn: Connection,
}

impl SimDatabase {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for concurrent reads during writes
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        // Set busy timeout for parallel access
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                session_type TEXT NOT NULL,
                config_json TEXT
            );

            CREATE TABLE IF NOT EXISTS matches (
                id INTEGER PRIMARY KEY,
                session_id TEXT REFERENCES sessions(id),
                seed INTEGER NOT NULL,
                mode TEXT NOT NULL,
                near_player TEXT NOT NULL,
                far_player TEXT NOT NULL,
                first_server TEXT NOT NULL,
                score_near INTEGER NOT NULL,
                score_far INTEGER NOT NULL,
                winner TEXT NOT NULL,
                total_rallies INTEGER NOT NULL,
                total_rally_shots INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS side_tallies (
                id INTEGER PRIMARY KEY,
                match_id INTEGER REFERENCES matches(id),
                side TEXT NOT NULL,
                aces INTEGER NOT NULL,
                winners INTEGER NOT NULL,
                forced_errors INTEGER NOT NULL,
                unforced_errors INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_matches_session ON matches(session_id);
            CREATE INDEX IF NOT EXISTS idx_matches_players ON matches(near_player, far_player);
            CREATE INDEX IF NOT EXISTS idx_side_tallies_match ON side_tallies(match_id);
            "#,
        )?;
        Ok(())
    }

    /// Create a new session and return its ID
    pub fn create_session(&self, session_type: &str, config_json: Option<&str>) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO sessions (id, created_at, session_type, config_json) VALUES (?1, ?2, ?3, ?4)",
            params![id, created_at, session_type, config_json],
        )?;

        Ok(id)
    }

    /// Insert a match result and return the match ID
    pub fn insert_match(&self, session_id: &str, config: &MatchConfig, result: &MatchResult) -> Result<i64> {
        self.conn.execute(
            r#"INSERT INTO matches
               (session_id, seed, mode, near_player, far_player, first_server,
                score_near, score_far, winner, total_rallies, total_rally_shots)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"#,
            params![
                session_id,
                result.seed as i64,
                config.mode.label(),
                config.near.label(),
                config.far.label(),
                config.rules.first_server.label(),
                result.score_near,
                result.score_far,
                result.winner.label(),
                result.total_rallies,
                result.total_rally_shots,
            ],
        )?;

        let match_id = self.conn.last_insert_rowid();

        // Only the full simulator classifies points
        if let Some(detail) = &result.detail {
            self.insert_tallies(match_id, Side::Near, &detail.near)?;
            self.insert_tallies(match_id, Side::Far, &detail.far)?;
        }

        Ok(match_id)
    }

    fn insert_tallies(&self, match_id: i64, side: Side, tallies: &SideTallies) -> Result<()> {
        self.conn.execute(
            r#"INSERT INTO side_tallies
               (match_id, side, aces, winners, forced_errors, unforced_errors)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            params![
                match_id,
                side.label(),
                tallies.aces,
                tallies.winners,
                tallies.forced_errors,
                tallies.unforced_errors,
            ],
        )?;
        Ok(())
    }

    /// Aggregate record of a player label (e.g. "human 4.5") on either side
    pub fn get_player_stats(&self, player: &str) -> Result<PlayerRecord> {
        let mut stmt = self.conn.prepare(
            r#"SELECT
                COUNT(*) as matches,
                COALESCE(SUM(CASE WHEN winner = 'near' AND near_player = ?1 THEN 1
                                  WHEN winner = 'far' AND far_player = ?1 THEN 1 ELSE 0 END), 0) as wins,
                COALESCE(AVG(CASE WHEN near_player = ?1 THEN score_near ELSE score_far END), 0.0),
                COALESCE(AVG(CASE WHEN near_player = ?1 THEN score_far ELSE score_near END), 0.0)
               FROM matches
               WHERE near_player = ?1 OR far_player = ?1"#,
        )?;

        stmt.query_row(params![player], |row| {
            Ok(PlayerRecord {
                player: player.to_string(),
                matches: row.get(0)?,
                wins: row.get(1)?,
                avg_score: row.get(2)?,
                avg_opponent_score: row.get(3)?,
            })
        })
    }

    /// Summed tallies for one side of one match (None for fast-mode matches)
    pub fn get_tallies(&self, match_id: i64, side: Side) -> Result<Option<SideTallies>> {
        let mut stmt = self.conn.prepare(
            "SELECT aces, winners, forced_errors, unforced_errors
             FROM side_tallies WHERE match_id = ?1 AND side = ?2",
        )?;
        let mut rows = stmt.query_map(params![match_id, side.label()], |row| {
            Ok(SideTallies {
                aces: row.get(0)?,
                winners: row.get(1)?,
                forced_errors: row.get(2)?,
                unforced_errors: row.get(3)?,
            })
        })?;
        rows.next().transpose()
    }

    /// Get match results with optional filtering
    pub fn query_matches(&self, filter: &MatchFilter) -> Result<Vec<MatchSummary>> {
        let mut sql = String::from(
            "SELECT id, mode, near_player, far_player, score_near, score_far, winner, total_rallies
             FROM matches WHERE 1=1",
        );

        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(player) = &filter.player {
            sql.push_str(" AND (near_player = ? OR far_player = ?)");
            params.push(Box::new(player.clone()));
            params.push(Box::new(player.clone()));
        }

        if let Some(mode) = &filter.mode {
            sql.push_str(" AND mode = ?");
            params.push(Box::new(mode.clone()));
        }

        if let Some(session) = &filter.session_id {
            sql.push_str(" AND session_id = ?");
            params.push(Box::new(session.clone()));
        }

        sql.push_str(" ORDER BY id");

        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            params.push(Box::new(limit as i64));
        }

        let mut stmt = self.conn.prepare(&sql)?;

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(param_refs.as_slice(), |row| {
            Ok(MatchSummary {
                id: row.get(0)?,
                mode: row.get(1)?,
                near_player: row.get(2)?,
                far_player: row.get(3)?,
                score_near: row.get(4)?,
                score_far: row.get(5)?,
                winner: row.get(6)?,
                total_rallies: row.get(7)?,
            })
        })?;

        rows.collect()
    }

    pub fn match_count(&self) -> Result<u64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))
    }

    pub fn session_count(&self) -> Result<u64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
    }
}

/// Aggregate record for a player label
#[derive(Debug, Clone)]
pub struct PlayerRecord {
    pub player: String,
    pub matches: u32,
    pub wins: u32,
    pub avg_score: f64,
    pub avg_opponent_score: f64,
}

impl PlayerRecord {
    pub fn win_rate(&self) -> f64 {
        if self.matches == 0 {
            0.0
        } else {
            self.wins as f64 / self.matches as f64
        }
    }

    pub fn losses(&self) -> u32 {
        self.matches.saturating_sub(self.wins)
    }
}

/// Filter for querying matches
#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    pub player: Option<String>,
    pub mode: Option<String>,
    pub session_id: Option<String>,
    pub limit: Option<u32>,
}

/// Summary of a match (without tallies)
#[derive(Debug, Clone)]
pub struct MatchSummary {
    pub id: i64,
    pub mode: String,
    pub near_player: String,
    pub far_player: String,
    pub score_near: u32,
    pub score_far: u32,
    pub winner: String,
    pub total_rallies: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::PlayerSpec;
    use crate::scoring::MatchRules;
    use crate::simulation::config::SimMode;
    use crate::simulation::metrics::MatchDetail;

    fn sample_config() -> MatchConfig {
        MatchConfig {
            mode: SimMode::Full,
            near: PlayerSpec::human(4.5),
            far: PlayerSpec::computer(4.0),
            rules: MatchRules::default(),
            seed: 12345,
        }
    }

    fn sample_result() -> MatchResult {
        MatchResult {
            score_near: 11,
            score_far: 7,
            winner: Side::Near,
            total_rallies: 18,
            total_rally_shots: 81,
            seed: 12345,
            detail: Some(MatchDetail {
                avg_rally_length: 4.5,
                near: SideTallies { aces: 2, winners: 5, forced_errors: 3, unforced_errors: 4 },
                far: SideTallies { aces: 1, winners: 3, forced_errors: 4, unforced_errors: 5 },
            }),
        }
    }

    #[test]
    fn test_create_database() {
        let db = SimDatabase::open_in_memory().unwrap();
        assert_eq!(db.match_count().unwrap(), 0);
        assert_eq!(db.session_count().unwrap(), 0);
    }

    #[test]
    fn test_insert_match_with_tallies() {
        let db = SimDatabase::open_in_memory().unwrap();
        let session_id = db.create_session("test", None).unwrap();

        let match_id = db.insert_match(&session_id, &sample_config(), &sample_result()).unwrap();

        assert!(match_id > 0);
        assert_eq!(db.match_count().unwrap(), 1);
        let near = db.get_tallies(match_id, Side::Near).unwrap().unwrap();
        assert_eq!(near.winners, 5);
    }

    #[test]
    fn test_fast_match_has_no_tallies() {
        let db = SimDatabase::open_in_memory().unwrap();
        let session_id = db.create_session("test", None).unwrap();
        let mut result = sample_result();
        result.detail = None;
        let match_id = db.insert_match(&session_id, &sample_config(), &result).unwrap();
        assert_eq!(db.get_tallies(match_id, Side::Far).unwrap(), None);
    }

    #[test]
    fn test_query_matches() {
        let db = SimDatabase::open_in_memory().unwrap();
        let session_id = db.create_session("test", None).unwrap();

        db.insert_match(&session_id, &sample_config(), &sample_result()).unwrap();

        let filter = MatchFilter {
            player: Some("human 4.5".to_string()),
            ..Default::default()
        };

        let matches = db.query_matches(&filter).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].near_player, "human 4.5");
        assert_eq!(matches[0].mode, "full");

        let none = MatchFilter {
            mode: Some("fast".to_string()),
            ..Default::default()
        };
        assert!(db.query_matches(&none).unwrap().is_empty());
    }

    #[test]
    fn test_player_stats() {
        let db = SimDatabase::open_in_memory().unwrap();
        let session_id = db.create_session("test", None).unwrap();

        for i in 0..3 {
            let mut result = sample_result();
            result.seed = i;
            result.winner = if i % 2 == 0 { Side::Near } else { Side::Far };
            db.insert_match(&session_id, &sample_config(), &result).unwrap();
        }

        let stats = db.get_player_stats("human 4.5").unwrap();
        assert_eq!(stats.matches, 3);
        assert_eq!(stats.wins, 2); // near won matches 0 and 2
        assert_eq!(stats.losses(), 1);

        let unknown = db.get_player_stats("starter").unwrap();
        assert_eq!(unknown.matches, 0);
        assert_eq!(unknown.win_rate(), 0.0);
    }
}
