use std::fmt;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::config::{Config, StoreLocation};
use crate::extract::Difficulty;

pub fn connect(config: &Config) -> Result<Connection> {
    let conn = match config.location() {
        StoreLocation::Memory => {
            info!("Opening in-memory store");
            Connection::open_in_memory()?
        }
        StoreLocation::File(path) => {
            info!(path = %path.display(), "Opening store");
            Connection::open(&path)
                .with_context(|| format!("Unable to open database {}", path.display()))?
        }
    };
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> Result<()> {
    // number is indexed but not unique: duplicates are kept out by the importer
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS problem_descriptions (
            id          INTEGER PRIMARY KEY,
            number      INTEGER NOT NULL,
            difficulty  TEXT NOT NULL DEFAULT '' CHECK(difficulty IN ('','Easy','Medium','Hard')),
            company     TEXT NOT NULL DEFAULT '',
            text        TEXT NOT NULL,
            html        TEXT NOT NULL,
            date        TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
            updated_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        );
        CREATE INDEX IF NOT EXISTS idx_problems_number ON problem_descriptions(number);
        ",
    )?;
    Ok(())
}

// ── Bootstrap ──

/// Highest stored problem number. An empty store is an error.
pub fn latest_problem_number(conn: &Connection) -> Result<i64> {
    let latest: Option<i64> = conn
        .query_row(
            "SELECT number FROM problem_descriptions ORDER BY number DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .context("Unable to query latest problem number")?;
    latest.context("No problems stored yet; seed the store with `import --since <N>`")
}

// ── Writes ──

pub struct ProblemRow {
    pub number: i64,
    pub difficulty: Option<Difficulty>,
    pub company: String,
    pub text: String,
    pub html: String,
    pub date: DateTime<Utc>,
}

/// Insert one problem and return its store-assigned id.
pub fn insert_problem(conn: &Connection, row: &ProblemRow) -> Result<i64> {
    conn.execute(
        "INSERT INTO problem_descriptions (number, difficulty, company, text, html, date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            row.number,
            row.difficulty.map(Difficulty::as_str).unwrap_or(""),
            row.company,
            row.text,
            row.html,
            row.date.to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

// ── Stats ──

#[derive(Debug)]
pub struct Stats {
    pub total: usize,
    pub latest: Option<i64>,
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
    pub unrated: usize,
    pub with_company: usize,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.latest {
            Some(n) => writeln!(f, "Problems:     {}  (latest #{})", self.total, n)?,
            None => writeln!(f, "Problems:     {}", self.total)?,
        }
        writeln!(f, "Easy:         {}", self.easy)?;
        writeln!(f, "Medium:       {}", self.medium)?;
        writeln!(f, "Hard:         {}", self.hard)?;
        writeln!(f, "Unrated:      {}", self.unrated)?;
        write!(f, "With company: {}", self.with_company)
    }
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let count = |sql: &str| -> Result<usize> { Ok(conn.query_row(sql, [], |r| r.get(0))?) };
    let by_difficulty = |label: &str| -> Result<usize> {
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM problem_descriptions WHERE difficulty = ?1",
            [label],
            |r| r.get(0),
        )?)
    };

    let total = count("SELECT COUNT(*) FROM problem_descriptions")?;
    let latest: Option<i64> =
        conn.query_row("SELECT MAX(number) FROM problem_descriptions", [], |r| r.get(0))?;
    let with_company = count("SELECT COUNT(*) FROM problem_descriptions WHERE company != ''")?;

    Ok(Stats {
        total,
        latest,
        easy: by_difficulty(Difficulty::Easy.as_str())?,
        medium: by_difficulty(Difficulty::Medium.as_str())?,
        hard: by_difficulty(Difficulty::Hard.as_str())?,
        unrated: by_difficulty("")?,
        with_company,
    })
}
