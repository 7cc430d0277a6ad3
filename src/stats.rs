use crate::app_dirs::AppDirs;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Result};
use std::path::PathBuf;
use std::time::SystemTime;

/// One answered (or timed-out) question as stored in the progress database.
/// A timeout carries no choice id.
#[derive(Debug, Clone)]
pub struct AttemptStat {
    pub bank_id: String,
    pub question_id: String,
    pub choice_id: Option<String>,
    pub was_correct: bool,
    pub response_ms: u64,
    pub timestamp: DateTime<Local>,
}

/// Per-question aggregate across every recorded attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionSummary {
    pub question_id: String,
    pub attempts: i64,
    pub correct: i64,
    pub miss_rate: f64,
    pub avg_response_ms: f64,
    pub last_attempt: Option<String>,
}

/// Database manager for question-level progress
#[derive(Debug)]
pub struct ProgressDb {
    conn: Connection,
}

impl ProgressDb {
    /// Initialize the database connection and create tables if needed
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("qwiz_stats.db"));

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(&db_path)?;
        Self::init_schema(&conn)?;
        Ok(ProgressDb { conn })
    }

    /// In-memory database with the same schema, for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(ProgressDb { conn })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS question_stats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                bank_id TEXT NOT NULL,
                question_id TEXT NOT NULL,
                choice_id TEXT,
                was_correct BOOLEAN NOT NULL,
                response_ms INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        // Indexes for the per-bank and per-question lookups
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_question_stats_bank ON question_stats(bank_id)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_question_stats_question ON question_stats(bank_id, question_id)",
            [],
        )?;

        Ok(())
    }

    /// Record a single attempt
    pub fn record_attempt(&self, stat: &AttemptStat) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO question_stats
            (bank_id, question_id, choice_id, was_correct, response_ms, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                stat.bank_id,
                stat.question_id,
                stat.choice_id,
                stat.was_correct,
                stat.response_ms,
                stat.timestamp.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Record a whole session's attempts in one transaction
    pub fn record_attempts_batch(&mut self, stats: &[AttemptStat]) -> Result<()> {
        let tx = self.conn.transaction()?;

        for stat in stats {
            tx.execute(
                r#"
                INSERT INTO question_stats
                (bank_id, question_id, choice_id, was_correct, response_ms, timestamp)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    stat.bank_id,
                    stat.question_id,
                    stat.choice_id,
                    stat.was_correct,
                    stat.response_ms,
                    stat.timestamp.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Per-question aggregates for a bank, worst miss rate first
    pub fn question_summary(&self, bank_id: &str) -> Result<Vec<QuestionSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                question_id,
                COUNT(*) as attempts,
                SUM(CASE WHEN was_correct = 1 THEN 1 ELSE 0 END) as correct,
                (SUM(CASE WHEN was_correct = 0 THEN 1 ELSE 0 END) * 100.0 / COUNT(*)) as miss_rate,
                AVG(response_ms) as avg_response_ms,
                MAX(timestamp) as last_attempt
            FROM question_stats
            WHERE bank_id = ?1
            GROUP BY question_id
            ORDER BY miss_rate DESC, question_id
            "#,
        )?;

        let summary_iter = stmt.query_map([bank_id], |row| {
            let avg: Option<f64> = row.get(4)?;
            Ok(QuestionSummary {
                question_id: row.get(0)?,
                attempts: row.get(1)?,
                correct: row.get(2)?,
                miss_rate: row.get(3)?,
                avg_response_ms: avg.unwrap_or(0.0),
                last_attempt: row.get(5)?,
            })
        })?;

        let mut summary = Vec::new();
        for item in summary_iter {
            summary.push(item?);
        }

        Ok(summary)
    }

    /// Total attempts and correct answers recorded for a bank
    pub fn bank_totals(&self, bank_id: &str) -> Result<(i64, i64)> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                COUNT(*) as attempts,
                SUM(CASE WHEN was_correct = 1 THEN 1 ELSE 0 END) as correct
            FROM question_stats
            WHERE bank_id = ?1
            "#,
        )?;

        let (attempts, correct): (i64, Option<i64>) =
            stmt.query_row([bank_id], |row| Ok((row.get(0)?, row.get(1)?)))?;

        Ok((attempts, correct.unwrap_or(0)))
    }

    /// Miss rate for one question (percentage of attempts answered wrong)
    pub fn miss_rate(&self, bank_id: &str, question_id: &str) -> Result<f64> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                COUNT(*) as total,
                SUM(CASE WHEN was_correct = 0 THEN 1 ELSE 0 END) as incorrect
            FROM question_stats
            WHERE bank_id = ?1 AND question_id = ?2
            "#,
        )?;

        let (total, incorrect): (i64, Option<i64>) =
            stmt.query_row(params![bank_id, question_id], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;

        if total == 0 {
            Ok(0.0)
        } else {
            Ok((incorrect.unwrap_or(0) as f64 / total as f64) * 100.0)
        }
    }

    /// Clear all recorded progress (for testing or reset purposes)
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM question_stats", [])?;
        Ok(())
    }
}

/// Helper function to calculate time difference in milliseconds
pub fn time_diff_ms(start: SystemTime, end: SystemTime) -> u64 {
    end.duration_since(start).unwrap_or_default().as_millis() as u64
}
