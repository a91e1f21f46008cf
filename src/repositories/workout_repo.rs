use chrono::{NaiveDate, Utc};
use rusqlite::{types::Value, Connection, OptionalExtension};

use super::exercise_repo::{EXERCISE_COLUMNS, EXERCISE_JOINS};
use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{
    CreateSessionEntry, FromSqliteRow, Session, SessionEntry, SessionFilter, UpdateSession,
};

/// Per-user workout sessions and their entries.
#[derive(Clone)]
pub struct WorkoutRepository {
    pool: DbPool,
}

fn load_entries(conn: &Connection, session_id: i64) -> rusqlite::Result<Vec<SessionEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT se.id, se.session_id, se.weight, se.status, {EXERCISE_COLUMNS}
         FROM session_entries se
         JOIN exercises x ON x.id = se.exercise_id
         {EXERCISE_JOINS}
         WHERE se.session_id = ?
         ORDER BY se.id"
    ))?;
    let entries = stmt
        .query_map([session_id], SessionEntry::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}

fn load_session(conn: &Connection, id: i64, user_id: i64) -> rusqlite::Result<Option<Session>> {
    let session = conn
        .query_row(
            "SELECT id, date, notes, completed FROM workout_sessions WHERE id = ? AND user_id = ?",
            [id, user_id],
            Session::from_row,
        )
        .optional()?;

    match session {
        Some(mut session) => {
            session.entries = load_entries(conn, session.id)?;
            Ok(Some(session))
        }
        None => Ok(None),
    }
}

impl WorkoutRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    // Sessions
    pub async fn create_session(
        &self,
        user_id: i64,
        date: NaiveDate,
        notes: &str,
        completed: bool,
    ) -> Result<Session> {
        let pool = self.pool.clone();
        let notes = notes.to_string();
        let now = Utc::now();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO workout_sessions (user_id, date, notes, completed, created_at)
                 VALUES (?, ?, ?, ?, ?)",
                rusqlite::params![user_id, date, notes, completed, now],
            )?;

            Ok(Session {
                id: conn.last_insert_rowid(),
                date,
                notes,
                completed,
                entries: Vec::new(),
            })
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_session(&self, id: i64, user_id: i64) -> Result<Option<Session>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            Ok(load_session(&conn, id, user_id)?)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Sessions matching every set filter field, ordered by date then id, entries attached.
    pub async fn find_sessions(&self, user_id: i64, filter: &SessionFilter) -> Result<Vec<Session>> {
        let pool = self.pool.clone();
        let filter = filter.clone();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;

            let mut clauses = vec!["s.user_id = ?"];
            let mut params: Vec<Value> = vec![user_id.into()];

            if let Some(from) = filter.date_from {
                clauses.push("s.date >= ?");
                params.push(from.format("%Y-%m-%d").to_string().into());
            }
            if let Some(to) = filter.date_to {
                clauses.push("s.date <= ?");
                params.push(to.format("%Y-%m-%d").to_string().into());
            }
            if let Some(completed) = filter.completed {
                clauses.push("s.completed = ?");
                params.push(completed.into());
            }
            if let Some(exercise_id) = filter.exercise_id {
                clauses.push(
                    "EXISTS (SELECT 1 FROM session_entries se
                             WHERE se.session_id = s.id AND se.exercise_id = ?)",
                );
                params.push(exercise_id.into());
            }
            if let Some(group_id) = filter.muscle_group_id {
                clauses.push(
                    "EXISTS (SELECT 1 FROM session_entries se
                             JOIN exercises x ON x.id = se.exercise_id
                             WHERE se.session_id = s.id AND x.muscle_group_id = ?)",
                );
                params.push(group_id.into());
            }

            let query = format!(
                "SELECT s.id, s.date, s.notes, s.completed FROM workout_sessions s
                 WHERE {} ORDER BY s.date, s.id",
                clauses.join(" AND ")
            );

            let mut stmt = conn.prepare(&query)?;
            let mut sessions = stmt
                .query_map(rusqlite::params_from_iter(params), Session::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            for session in &mut sessions {
                session.entries = load_entries(&conn, session.id)?;
            }

            Ok(sessions)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Apply the set fields of `update`; `None` when the session is absent or not the user's.
    pub async fn update_session(
        &self,
        id: i64,
        user_id: i64,
        update: &UpdateSession,
    ) -> Result<Option<Session>> {
        let pool = self.pool.clone();
        let update = update.clone();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;

            let mut assignments = Vec::new();
            let mut params: Vec<Value> = Vec::new();
            if let Some(date) = update.date {
                assignments.push("date = ?");
                params.push(date.format("%Y-%m-%d").to_string().into());
            }
            if let Some(notes) = update.notes {
                assignments.push("notes = ?");
                params.push(notes.into());
            }
            if let Some(completed) = update.completed {
                assignments.push("completed = ?");
                params.push(completed.into());
            }

            if !assignments.is_empty() {
                params.push(id.into());
                params.push(user_id.into());
                conn.execute(
                    &format!(
                        "UPDATE workout_sessions SET {} WHERE id = ? AND user_id = ?",
                        assignments.join(", ")
                    ),
                    rusqlite::params_from_iter(params),
                )?;
            }

            Ok(load_session(&conn, id, user_id)?)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Delete a session and, through the foreign key cascade, its entries.
    pub async fn delete_session(&self, id: i64, user_id: i64) -> Result<bool> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "DELETE FROM workout_sessions WHERE id = ? AND user_id = ?",
                [id, user_id],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    // Session entries
    pub async fn create_entry(&self, user_id: i64, entry: &CreateSessionEntry) -> Result<SessionEntry> {
        let pool = self.pool.clone();
        let entry = entry.clone();
        let now = Utc::now();

        tokio::task::spawn_blocking(move || -> Result<SessionEntry> {
            let conn = pool.get()?;

            let owned: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM workout_sessions WHERE id = ? AND user_id = ?)",
                [entry.session, user_id],
                |row| row.get(0),
            )?;
            if !owned {
                return Err(AppError::NotFound(format!(
                    "Session {} not found",
                    entry.session
                )));
            }

            let exercise_exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM exercises WHERE id = ?)",
                [entry.exercise],
                |row| row.get(0),
            )?;
            if !exercise_exists {
                return Err(AppError::Validation(format!(
                    "Exercise {} does not exist",
                    entry.exercise
                )));
            }

            let already_logged: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM session_entries WHERE session_id = ? AND exercise_id = ?)",
                [entry.session, entry.exercise],
                |row| row.get(0),
            )?;
            if already_logged {
                return Err(AppError::Validation(
                    "This exercise is already added to the session".to_string(),
                ));
            }

            conn.execute(
                "INSERT INTO session_entries (session_id, exercise_id, weight, status, created_at)
                 VALUES (?, ?, ?, ?, ?)",
                rusqlite::params![
                    entry.session,
                    entry.exercise,
                    entry.weight.trim(),
                    entry.status.as_str(),
                    now
                ],
            )?;
            let id = conn.last_insert_rowid();

            let created = conn.query_row(
                &format!(
                    "SELECT se.id, se.session_id, se.weight, se.status, {EXERCISE_COLUMNS}
                     FROM session_entries se
                     JOIN exercises x ON x.id = se.exercise_id
                     {EXERCISE_JOINS}
                     WHERE se.id = ?"
                ),
                [id],
                SessionEntry::from_row,
            )?;
            Ok(created)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Delete an entry that belongs to one of the user's sessions.
    pub async fn delete_entry(&self, id: i64, user_id: i64) -> Result<bool> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "DELETE FROM session_entries
                 WHERE id = ?
                   AND session_id IN (SELECT id FROM workout_sessions WHERE user_id = ?)",
                [id, user_id],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}
