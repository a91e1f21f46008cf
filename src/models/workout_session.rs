use chrono::NaiveDate;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::{FromSqliteRow, SessionEntry};

/// One calendar day's workout record for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub date: NaiveDate,
    pub notes: String,
    pub completed: bool,
    #[serde(rename = "session_entries", default)]
    pub entries: Vec<SessionEntry>,
}

/// Session columns only; entries are attached by the repository.
impl FromSqliteRow for Session {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            notes: row.get("notes")?,
            completed: row.get("completed")?,
            entries: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Query parameters accepted by `GET /sessions/`. Unset fields are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle_group_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl SessionFilter {
    pub fn on(date: NaiveDate) -> Self {
        Self::between(date, date)
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            date_from: Some(from),
            date_to: Some(to),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_deserializes_wire_shape() {
        let session: Session = serde_json::from_str(
            r#"{"id": 7, "date": "2025-06-02", "notes": "", "completed": true, "session_entries": []}"#,
        )
        .unwrap();

        assert_eq!(session.id, 7);
        assert_eq!(session.date, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
        assert!(session.completed);
        assert!(session.entries.is_empty());
    }

    #[test]
    fn test_session_filter_on_sets_both_bounds() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let filter = SessionFilter::on(date);

        assert_eq!(filter.date_from, Some(date));
        assert_eq!(filter.date_to, Some(date));
        assert_eq!(filter.completed, None);
    }

    #[test]
    fn test_session_filter_skips_unset_fields() {
        let filter = SessionFilter {
            completed: Some(false),
            ..SessionFilter::default()
        };

        let value = serde_json::to_value(&filter).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(object["completed"], false);
    }
}
