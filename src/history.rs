use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::stats::PlayerStats;

/// Write-once record of one finished (or aborted) derby match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub winner_name: String,
    pub total_score: u32,
    pub total_home_runs: u32,
    pub max_exit_velocity: f64,
    pub duration_mins: f64,
    pub players: Vec<PlayerStats>,
    pub stadium_id: String,
    pub stadium_name: String,
    pub finished_at: DateTime<Local>,
}

/// Destination for finished-match summaries. The screens write exactly one
/// record per match and read back a newest-first page for the history list.
pub trait HistorySink {
    fn record(&mut self, summary: &GameSummary) -> Result<()>;
    fn recent(&self, limit: usize) -> Result<Vec<GameSummary>>;
}

/// Process-lifetime history, used when no database is available and in
/// tests.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    games: Vec<GameSummary>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistorySink for MemoryHistory {
    fn record(&mut self, summary: &GameSummary) -> Result<()> {
        self.games.push(summary.clone());
        Ok(())
    }

    fn recent(&self, limit: usize) -> Result<Vec<GameSummary>> {
        Ok(self.games.iter().rev().take(limit).cloned().collect())
    }
}

/// Durable match ledger on SQLite.
#[derive(Debug)]
pub struct SqliteHistory {
    conn: Connection,
}

impl SqliteHistory {
    /// Open (or create) the ledger at the default state path.
    pub fn new() -> Result<Self> {
        let db_path =
            Self::db_path().unwrap_or_else(|| PathBuf::from("dinger_history.db"));
        Self::open_at(&db_path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS derby_games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                winner TEXT NOT NULL,
                total_score INTEGER NOT NULL,
                total_home_runs INTEGER NOT NULL,
                max_exit_velocity REAL NOT NULL,
                duration_mins REAL NOT NULL,
                stadium_id TEXT NOT NULL,
                stadium_name TEXT NOT NULL,
                players TEXT NOT NULL,
                finished_at TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_derby_games_finished_at ON derby_games(finished_at)",
            [],
        )?;

        Ok(SqliteHistory { conn })
    }

    fn db_path() -> Option<PathBuf> {
        AppDirs::history_db_path()
    }

    /// Clear the ledger (for testing or reset purposes)
    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM derby_games", [])?;
        Ok(())
    }
}

impl HistorySink for SqliteHistory {
    fn record(&mut self, summary: &GameSummary) -> Result<()> {
        let players_json = serde_json::to_string(&summary.players)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        self.conn.execute(
            r#"
            INSERT INTO derby_games
            (winner, total_score, total_home_runs, max_exit_velocity, duration_mins,
             stadium_id, stadium_name, players, finished_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                summary.winner_name,
                summary.total_score,
                summary.total_home_runs,
                summary.max_exit_velocity,
                summary.duration_mins,
                summary.stadium_id,
                summary.stadium_name,
                players_json,
                summary.finished_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn recent(&self, limit: usize) -> Result<Vec<GameSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT winner, total_score, total_home_runs, max_exit_velocity, duration_mins,
                   stadium_id, stadium_name, players, finished_at
            FROM derby_games
            ORDER BY finished_at DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            let players_json: String = row.get(7)?;
            let players: Vec<PlayerStats> = serde_json::from_str(&players_json).map_err(|_| {
                rusqlite::Error::InvalidColumnType(
                    7,
                    "players".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?;

            let finished_str: String = row.get(8)?;
            let finished_at = DateTime::parse_from_rfc3339(&finished_str)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        8,
                        "finished_at".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            Ok(GameSummary {
                winner_name: row.get(0)?,
                total_score: row.get(1)?,
                total_home_runs: row.get(2)?,
                max_exit_velocity: row.get(3)?,
                duration_mins: row.get(4)?,
                players,
                stadium_id: row.get(5)?,
                stadium_name: row.get(6)?,
                finished_at,
            })
        })?;

        let mut games = Vec::new();
        for game in rows {
            games.push(game?);
        }

        Ok(games)
    }
}

/// Dump match summaries as CSV, one row per game.
pub fn export_csv<W: std::io::Write>(games: &[GameSummary], out: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        "finished_at",
        "stadium",
        "winner",
        "players",
        "home_runs",
        "total_score",
        "max_exit_velocity_mph",
        "duration_mins",
    ])?;

    for game in games {
        let roster = game
            .players
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        writer.write_record([
            game.finished_at.to_rfc3339(),
            game.stadium_name.clone(),
            game.winner_name.clone(),
            roster,
            game.total_home_runs.to_string(),
            game.total_score.to_string(),
            format!("{:.1}", game.max_exit_velocity),
            format!("{:.1}", game.duration_mins),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
