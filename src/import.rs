//! Bulk import of legacy workout logs from CSV.
//!
//! A log file has one row per logged exercise:
//!
//! ```text
//! Date,Exercise,Weight,Status
//! 2024-03-04,Bench Press,60kg,Peak
//! ```
//!
//! `MuscleGroup` and `exercise_type` columns are optional in the log; missing
//! values come from the exercise catalog file (`exercise,exercise_type,MuscleGroup`),
//! matched on the bare name or on `"<name> - <type>"`. Everything is written in
//! one transaction: a bad row leaves the database untouched.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde::Deserialize;
use thiserror::Error;

use crate::db::DbPool;
use crate::models::EntryStatus;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Could not open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("No user with email {0}")]
    UnknownUser(String),

    #[error("Row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("Import task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, ImportError>;

/// One row of a workout log file.
#[derive(Debug, Clone, Deserialize)]
pub struct LogRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Exercise")]
    pub exercise: String,
    #[serde(rename = "MuscleGroup", default)]
    pub muscle_group: Option<String>,
    #[serde(default)]
    pub exercise_type: Option<String>,
    #[serde(rename = "Weight")]
    pub weight: String,
    #[serde(rename = "Status")]
    pub status: String,
}

/// One row of the exercise catalog file.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRow {
    pub exercise: String,
    #[serde(default)]
    pub exercise_type: Option<String>,
    #[serde(rename = "MuscleGroup", default)]
    pub muscle_group: Option<String>,
}

/// A log row after catalog lookup, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub date: NaiveDate,
    pub exercise: String,
    pub exercise_type: Option<String>,
    pub muscle_group: Option<String>,
    pub weight: String,
    pub status: EntryStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub sessions_created: usize,
    pub entries_created: usize,
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input)
}

pub fn read_logs<R: Read>(input: R) -> Result<Vec<LogRow>> {
    Ok(reader(input).deserialize().collect::<csv::Result<Vec<_>>>()?)
}

pub fn read_catalog<R: Read>(input: R) -> Result<Vec<CatalogRow>> {
    Ok(reader(input).deserialize().collect::<csv::Result<Vec<_>>>()?)
}

fn present(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Fill in muscle group and type from the catalog and qualify exercise names
/// with their type, e.g. "Bench Press" + "Barbell" -> "Bench Press - Barbell".
pub fn combine(logs: Vec<LogRow>, catalog: &[CatalogRow]) -> Vec<ImportRow> {
    let mut by_name: HashMap<&str, &CatalogRow> = HashMap::new();
    let mut by_full_name: HashMap<String, &CatalogRow> = HashMap::new();
    for row in catalog {
        by_name.entry(row.exercise.as_str()).or_insert(row);
        if let Some(type_name) = present(&row.exercise_type) {
            by_full_name
                .entry(format!("{} - {}", row.exercise, type_name))
                .or_insert(row);
        }
    }

    logs.into_iter()
        .map(|log| {
            let name = log.exercise.trim().to_string();
            let known: Vec<&CatalogRow> = [by_name.get(name.as_str()), by_full_name.get(&name)]
                .into_iter()
                .flatten()
                .copied()
                .collect();

            let exercise_type = present(&log.exercise_type)
                .or_else(|| known.iter().find_map(|row| present(&row.exercise_type)));
            let muscle_group = present(&log.muscle_group)
                .or_else(|| known.iter().find_map(|row| present(&row.muscle_group)));

            let exercise = match &exercise_type {
                Some(type_name) if !name.contains(type_name.as_str()) => {
                    format!("{} - {}", name, type_name)
                }
                _ => name,
            };

            ImportRow {
                date: log.date,
                exercise,
                exercise_type,
                muscle_group,
                weight: log.weight.trim().to_string(),
                status: EntryStatus::parse(log.status.trim()),
            }
        })
        .collect()
}

fn find_or_create_named(
    conn: &Connection,
    table: &str,
    column: &str,
    name: &str,
) -> rusqlite::Result<i64> {
    let existing = conn
        .query_row(
            &format!("SELECT id FROM {table} WHERE {column} = ?"),
            [name],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(&format!("INSERT INTO {table} ({column}) VALUES (?)"), [name])?;
    Ok(conn.last_insert_rowid())
}

fn find_or_create_exercise(
    conn: &Connection,
    name: &str,
    muscle_group_id: i64,
    exercise_type_id: Option<i64>,
) -> rusqlite::Result<i64> {
    let existing = conn
        .query_row(
            "SELECT id FROM exercises WHERE exercise_name = ? ORDER BY id LIMIT 1",
            [name],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(
        "INSERT INTO exercises (exercise_name, muscle_group_id, exercise_type_id) VALUES (?, ?, ?)",
        rusqlite::params![name, muscle_group_id, exercise_type_id],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Write `rows` for `user_id` inside a single transaction.
///
/// Catalog records and the per-date session are reused when they already
/// exist; new sessions are stored as completed.
pub fn import_rows(conn: &mut Connection, user_id: i64, rows: &[ImportRow]) -> Result<ImportSummary> {
    let tx = conn.transaction()?;
    let now = Utc::now();
    let mut summary = ImportSummary::default();
    let mut sessions: HashMap<NaiveDate, i64> = HashMap::new();

    for (index, row) in rows.iter().enumerate() {
        // Row numbers as seen in the file, header included
        let line = index + 2;
        let invalid = |message: String| ImportError::InvalidRow { row: line, message };

        if row.exercise.is_empty() {
            return Err(invalid("exercise name is empty".to_string()));
        }
        if row.weight.is_empty() {
            return Err(invalid(format!("no weight for {}", row.exercise)));
        }
        let group_name = row
            .muscle_group
            .as_deref()
            .ok_or_else(|| invalid(format!("no muscle group for {}", row.exercise)))?;

        let muscle_group_id =
            find_or_create_named(&tx, "muscle_groups", "muscle_group_name", group_name)?;
        let exercise_type_id = match &row.exercise_type {
            Some(type_name) => Some(find_or_create_named(
                &tx,
                "exercise_types",
                "type_name",
                type_name,
            )?),
            None => None,
        };
        let exercise_id =
            find_or_create_exercise(&tx, &row.exercise, muscle_group_id, exercise_type_id)?;

        let session_id = match sessions.get(&row.date) {
            Some(&id) => id,
            None => {
                let existing = tx
                    .query_row(
                        "SELECT id FROM workout_sessions WHERE user_id = ? AND date = ?
                         ORDER BY id LIMIT 1",
                        rusqlite::params![user_id, row.date],
                        |r| r.get(0),
                    )
                    .optional()?;
                let id = match existing {
                    Some(id) => id,
                    None => {
                        tx.execute(
                            "INSERT INTO workout_sessions (user_id, date, notes, completed, created_at)
                             VALUES (?, ?, '', 1, ?)",
                            rusqlite::params![user_id, row.date, now],
                        )?;
                        summary.sessions_created += 1;
                        tx.last_insert_rowid()
                    }
                };
                sessions.insert(row.date, id);
                id
            }
        };

        tx.execute(
            "INSERT INTO session_entries (session_id, exercise_id, weight, status, created_at)
             VALUES (?, ?, ?, ?, ?)",
            rusqlite::params![session_id, exercise_id, row.weight, row.status.as_str(), now],
        )?;
        summary.entries_created += 1;
    }

    tx.commit()?;
    Ok(summary)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| ImportError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Import a log file (plus optional catalog) into the account with `email`.
pub async fn import_file(
    pool: &DbPool,
    email: &str,
    log_path: &Path,
    catalog_path: Option<&Path>,
) -> Result<ImportSummary> {
    let pool = pool.clone();
    let email = email.trim().to_string();
    let log_path = log_path.to_path_buf();
    let catalog_path = catalog_path.map(Path::to_path_buf);

    tokio::task::spawn_blocking(move || -> Result<ImportSummary> {
        let logs = read_logs(open(&log_path)?)?;
        let catalog = match &catalog_path {
            Some(path) => read_catalog(open(path)?)?,
            None => Vec::new(),
        };
        let rows = combine(logs, &catalog);
        tracing::debug!("Parsed {} rows from {}", rows.len(), log_path.display());

        let mut conn = pool.get()?;
        let user_id: i64 = conn
            .query_row("SELECT id FROM users WHERE email = ?", [&email], |row| row.get(0))
            .optional()?
            .ok_or_else(|| ImportError::UnknownUser(email.clone()))?;

        import_rows(&mut conn, user_id, &rows)
    })
    .await
    .map_err(|e| ImportError::Task(e.to_string()))?
}
