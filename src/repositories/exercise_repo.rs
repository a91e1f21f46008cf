use rusqlite::{types::Value, OptionalExtension};

use crate::db::DbPool;
use crate::error::{unique_violation, AppError, Result};
use crate::models::{Exercise, ExerciseFilter, ExerciseType, FromSqliteRow, MuscleGroup};

/// Column list read by `Exercise::from_row`; pair with `EXERCISE_JOINS` on alias `x`.
pub(crate) const EXERCISE_COLUMNS: &str = "x.id AS exercise_id, x.exercise_name, \
     mg.id AS muscle_group_id, mg.muscle_group_name, \
     et.id AS exercise_type_id, et.type_name";

pub(crate) const EXERCISE_JOINS: &str = "JOIN muscle_groups mg ON mg.id = x.muscle_group_id \
     LEFT JOIN exercise_types et ON et.id = x.exercise_type_id";

/// Shared exercise catalog: exercises plus the muscle groups and types they reference.
#[derive(Clone)]
pub struct ExerciseRepository {
    pool: DbPool,
}

impl ExerciseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    // Muscle groups
    pub async fn find_muscle_groups(&self) -> Result<Vec<MuscleGroup>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt =
                conn.prepare("SELECT id, muscle_group_name FROM muscle_groups ORDER BY muscle_group_name")?;
            let groups = stmt
                .query_map([], MuscleGroup::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(groups)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn create_muscle_group(&self, name: &str) -> Result<MuscleGroup> {
        let pool = self.pool.clone();
        let name = name.trim().to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO muscle_groups (muscle_group_name) VALUES (?)",
                [&name],
            )
            .map_err(|e| unique_violation(e, "Muscle group with this name already exists"))?;
            Ok(MuscleGroup {
                id: conn.last_insert_rowid(),
                name,
            })
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    // Exercise types
    pub async fn find_exercise_types(&self) -> Result<Vec<ExerciseType>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT id, type_name FROM exercise_types ORDER BY type_name")?;
            let types = stmt
                .query_map([], ExerciseType::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(types)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn create_exercise_type(&self, name: &str) -> Result<ExerciseType> {
        let pool = self.pool.clone();
        let name = name.trim().to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            conn.execute("INSERT INTO exercise_types (type_name) VALUES (?)", [&name])
                .map_err(|e| unique_violation(e, "Exercise type with this name already exists"))?;
            Ok(ExerciseType {
                id: conn.last_insert_rowid(),
                name,
            })
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    // Exercises
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Exercise>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {EXERCISE_COLUMNS} FROM exercises x {EXERCISE_JOINS} WHERE x.id = ?"
            ))?;
            let result = stmt.query_row([id], Exercise::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_all(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>> {
        let pool = self.pool.clone();
        let filter = filter.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;

            let mut clauses = Vec::new();
            let mut params: Vec<Value> = Vec::new();
            if let Some(group_id) = filter.muscle_group_id {
                clauses.push("x.muscle_group_id = ?");
                params.push(group_id.into());
            }
            if let Some(type_id) = filter.exercise_type_id {
                clauses.push("x.exercise_type_id = ?");
                params.push(type_id.into());
            }

            let mut query = format!("SELECT {EXERCISE_COLUMNS} FROM exercises x {EXERCISE_JOINS}");
            if !clauses.is_empty() {
                query.push_str(" WHERE ");
                query.push_str(&clauses.join(" AND "));
            }
            query.push_str(" ORDER BY mg.muscle_group_name, x.exercise_name, x.id");

            let mut stmt = conn.prepare(&query)?;
            let exercises = stmt
                .query_map(rusqlite::params_from_iter(params), Exercise::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(exercises)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Insert an exercise. Unknown muscle group or type ids are a validation error.
    pub async fn create(
        &self,
        name: &str,
        muscle_group_id: i64,
        exercise_type_id: Option<i64>,
    ) -> Result<Exercise> {
        let pool = self.pool.clone();
        let name = name.trim().to_string();
        let id = tokio::task::spawn_blocking(move || -> Result<i64> {
            let conn = pool.get()?;

            let group_exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM muscle_groups WHERE id = ?)",
                [muscle_group_id],
                |row| row.get(0),
            )?;
            if !group_exists {
                return Err(AppError::Validation(format!(
                    "Muscle group {} does not exist",
                    muscle_group_id
                )));
            }

            if let Some(type_id) = exercise_type_id {
                let type_exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM exercise_types WHERE id = ?)",
                    [type_id],
                    |row| row.get(0),
                )?;
                if !type_exists {
                    return Err(AppError::Validation(format!(
                        "Exercise type {} does not exist",
                        type_id
                    )));
                }
            }

            conn.execute(
                "INSERT INTO exercises (exercise_name, muscle_group_id, exercise_type_id) VALUES (?, ?, ?)",
                rusqlite::params![name, muscle_group_id, exercise_type_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("exercise {} vanished after insert", id)))
    }
}
