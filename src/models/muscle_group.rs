use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuscleGroup {
    pub id: i64,
    #[serde(rename = "muscle_group_name")]
    pub name: String,
}

impl FromSqliteRow for MuscleGroup {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("muscle_group_name")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMuscleGroup {
    pub muscle_group_name: String,
}

/// Equipment/category tag such as "Barbell" or "Cable".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseType {
    pub id: i64,
    #[serde(rename = "type_name")]
    pub name: String,
}

impl FromSqliteRow for ExerciseType {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("type_name")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExerciseType {
    pub type_name: String,
}
