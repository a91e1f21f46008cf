use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::error::{AppError, Result};
use crate::models::{
    CreateExercise, CreateExerciseType, CreateMuscleGroup, Exercise, ExerciseFilter, ExerciseType,
    MuscleGroup,
};
use crate::repositories::ExerciseRepository;

#[derive(Clone)]
pub struct ExercisesState {
    pub exercise_repo: ExerciseRepository,
}

fn require_name(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

pub async fn list(
    State(state): State<ExercisesState>,
    Query(filter): Query<ExerciseFilter>,
) -> Result<Json<Vec<Exercise>>> {
    Ok(Json(state.exercise_repo.find_all(&filter).await?))
}

pub async fn create(
    State(state): State<ExercisesState>,
    Json(form): Json<CreateExercise>,
) -> Result<(StatusCode, Json<Exercise>)> {
    require_name(&form.exercise_name, "exercise_name")?;

    let exercise = state
        .exercise_repo
        .create(&form.exercise_name, form.muscle_group, form.exercise_type)
        .await?;

    Ok((StatusCode::CREATED, Json(exercise)))
}

pub async fn list_muscle_groups(
    State(state): State<ExercisesState>,
) -> Result<Json<Vec<MuscleGroup>>> {
    Ok(Json(state.exercise_repo.find_muscle_groups().await?))
}

pub async fn create_muscle_group(
    State(state): State<ExercisesState>,
    Json(form): Json<CreateMuscleGroup>,
) -> Result<(StatusCode, Json<MuscleGroup>)> {
    require_name(&form.muscle_group_name, "muscle_group_name")?;

    let group = state
        .exercise_repo
        .create_muscle_group(&form.muscle_group_name)
        .await?;

    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn list_exercise_types(
    State(state): State<ExercisesState>,
) -> Result<Json<Vec<ExerciseType>>> {
    Ok(Json(state.exercise_repo.find_exercise_types().await?))
}

pub async fn create_exercise_type(
    State(state): State<ExercisesState>,
    Json(form): Json<CreateExerciseType>,
) -> Result<(StatusCode, Json<ExerciseType>)> {
    require_name(&form.type_name, "type_name")?;

    let exercise_type = state
        .exercise_repo
        .create_exercise_type(&form.type_name)
        .await?;

    Ok((StatusCode::CREATED, Json(exercise_type)))
}
