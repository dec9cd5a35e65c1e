//! SQLite-backed history of analyzed samples, bugs and fixes.

use std::path::Path;

use chrono::Utc;
use log::debug;
use rusqlite::{params, Connection};
use thiserror::Error;

use crate::analysis::warnings::{BugKind, BugWarning, Severity};
use crate::classify::TrainingSample;

/// Errors from the history store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS code_samples (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_name TEXT NOT NULL,
    code_content TEXT NOT NULL,
    has_bugs INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS bugs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code_sample_id INTEGER NOT NULL REFERENCES code_samples(id),
    bug_type TEXT NOT NULL,
    description TEXT NOT NULL,
    line_number INTEGER NOT NULL,
    severity TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS fixes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    bug_id INTEGER NOT NULL REFERENCES bugs(id),
    fixed_code TEXT NOT NULL,
    fix_description TEXT NOT NULL
);
";

/// A stored code sample with its recorded bugs
#[derive(Debug, Clone)]
pub struct CodeSample {
    pub id: i64,
    pub file_name: String,
    pub code_content: String,
    pub has_bugs: bool,
    pub bugs: Vec<StoredBug>,
}

/// A stored bug row
#[derive(Debug, Clone)]
pub struct StoredBug {
    pub id: i64,
    pub sample_id: i64,
    pub kind: BugKind,
    pub description: String,
    pub line: usize,
    pub severity: Severity,
}

/// History store for analysis results
pub struct BugStore {
    conn: Connection,
}

impl BugStore {
    /// Open (and if needed create) a store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory store.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Record an analyzed sample; returns its row id.
    pub fn add_code_sample(
        &self,
        file_name: &str,
        code: &str,
        has_bugs: bool,
    ) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO code_samples (file_name, code_content, has_bugs, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![file_name, code, has_bugs, Utc::now().to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Record one warning against a sample; returns the bug row id.
    pub fn add_bug(&self, sample_id: i64, warning: &BugWarning) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO bugs (code_sample_id, bug_type, description, line_number, severity)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                sample_id,
                warning.kind.as_str(),
                warning.description,
                warning.line as i64,
                warning.severity.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Record a suggested fix for a stored bug.
    pub fn add_fix(
        &self,
        bug_id: i64,
        fixed_code: &str,
        fix_description: &str,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO fixes (bug_id, fixed_code, fix_description) VALUES (?1, ?2, ?3)",
            params![bug_id, fixed_code, fix_description],
        )?;
        Ok(())
    }

    /// All stored samples joined with their bugs.
    pub fn code_samples(&self) -> Result<Vec<CodeSample>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, file_name, code_content, has_bugs FROM code_samples ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, bool>(3)?,
            ))
        })?;

        let mut samples = Vec::new();
        for row in rows {
            let (id, file_name, code_content, has_bugs) = row?;
            let bugs = self.bugs_for_sample(id)?;
            samples.push(CodeSample {
                id,
                file_name,
                code_content,
                has_bugs,
                bugs,
            });
        }

        debug!("loaded {} stored samples", samples.len());
        Ok(samples)
    }

    /// All stored bugs of one kind.
    pub fn bugs_by_kind(&self, kind: &BugKind) -> Result<Vec<StoredBug>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, code_sample_id, bug_type, description, line_number, severity
             FROM bugs WHERE bug_type = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![kind.as_str()], Self::bug_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// All stored bugs, newest sample first.
    pub fn all_bugs(&self) -> Result<Vec<StoredBug>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, code_sample_id, bug_type, description, line_number, severity
             FROM bugs ORDER BY code_sample_id DESC, id",
        )?;
        let rows = stmt.query_map([], Self::bug_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Stored history as classifier training samples.
    pub fn training_samples(&self) -> Result<Vec<TrainingSample>, StoreError> {
        let samples = self.code_samples()?;
        Ok(samples
            .into_iter()
            .map(|sample| TrainingSample {
                code: sample.code_content,
                kinds: sample.bugs.into_iter().map(|bug| bug.kind).collect(),
            })
            .collect())
    }

    pub fn sample_count(&self) -> Result<usize, StoreError> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM code_samples", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn bugs_for_sample(&self, sample_id: i64) -> Result<Vec<StoredBug>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, code_sample_id, bug_type, description, line_number, severity
             FROM bugs WHERE code_sample_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![sample_id], Self::bug_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn bug_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredBug> {
        Ok(StoredBug {
            id: row.get(0)?,
            sample_id: row.get(1)?,
            kind: BugKind::from_db_str(&row.get::<_, String>(2)?),
            description: row.get(3)?,
            line: row.get::<_, i64>(4)? as usize,
            severity: Severity::from_db_str(&row.get::<_, String>(5)?),
        })
    }
}
