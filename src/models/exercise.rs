use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::{ExerciseType, FromSqliteRow, MuscleGroup};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    #[serde(rename = "exercise_name")]
    pub name: String,
    pub muscle_group: MuscleGroup,
    pub exercise_type: Option<ExerciseType>,
}

/// Reads the column set produced by `exercise_repo::EXERCISE_COLUMNS`.
impl FromSqliteRow for Exercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let type_id: Option<i64> = row.get("exercise_type_id")?;
        let type_name: Option<String> = row.get("type_name")?;

        Ok(Self {
            id: row.get("exercise_id")?,
            name: row.get("exercise_name")?,
            muscle_group: MuscleGroup {
                id: row.get("muscle_group_id")?,
                name: row.get("muscle_group_name")?,
            },
            exercise_type: type_id
                .zip(type_name)
                .map(|(id, name)| ExerciseType { id, name }),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExercise {
    pub exercise_name: String,
    pub muscle_group: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_type: Option<i64>,
}

/// Query parameters accepted by `GET /exercises/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle_group_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_type_id: Option<i64>,
}
