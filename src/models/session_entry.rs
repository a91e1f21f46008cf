use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::{Exercise, FromSqliteRow};

/// How a logged lift felt relative to previous attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntryStatus {
    #[default]
    Peak,
    Static,
    Other,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Peak => "Peak",
            EntryStatus::Static => "Static",
            EntryStatus::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Peak" => EntryStatus::Peak,
            "Static" => EntryStatus::Static,
            _ => EntryStatus::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub id: i64,
    pub session: i64,
    pub exercise: Exercise,
    /// Free-form, e.g. "20kg" or "3x10 @ 40".
    pub weight: String,
    pub status: EntryStatus,
}

impl FromSqliteRow for SessionEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let status: String = row.get("status")?;
        Ok(Self {
            id: row.get("id")?,
            session: row.get("session_id")?,
            exercise: Exercise::from_row(row)?,
            weight: row.get("weight")?,
            status: EntryStatus::parse(&status),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionEntry {
    pub session: i64,
    pub exercise: i64,
    pub weight: String,
    #[serde(default)]
    pub status: EntryStatus,
}
