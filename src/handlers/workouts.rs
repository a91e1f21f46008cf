use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{
    CreateSession, CreateSessionEntry, Session, SessionEntry, SessionFilter, UpdateSession,
};
use crate::repositories::WorkoutRepository;

#[derive(Clone)]
pub struct WorkoutsState {
    pub workout_repo: WorkoutRepository,
}

fn session_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Session {} not found", id))
}

// Sessions
pub async fn list(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Query(filter): Query<SessionFilter>,
) -> Result<Json<Vec<Session>>> {
    let sessions = state
        .workout_repo
        .find_sessions(auth_user.id, &filter)
        .await?;
    Ok(Json(sessions))
}

pub async fn create(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Json(form): Json<CreateSession>,
) -> Result<(StatusCode, Json<Session>)> {
    let session = state
        .workout_repo
        .create_session(auth_user.id, form.date, &form.notes, form.completed)
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn show(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Session>> {
    state
        .workout_repo
        .find_session(id, auth_user.id)
        .await?
        .map(Json)
        .ok_or_else(|| session_not_found(id))
}

pub async fn update(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(form): Json<UpdateSession>,
) -> Result<Json<Session>> {
    state
        .workout_repo
        .update_session(id, auth_user.id, &form)
        .await?
        .map(Json)
        .ok_or_else(|| session_not_found(id))
}

pub async fn delete(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    if !state.workout_repo.delete_session(id, auth_user.id).await? {
        return Err(session_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// Session entries
pub async fn add_entry(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Json(form): Json<CreateSessionEntry>,
) -> Result<(StatusCode, Json<SessionEntry>)> {
    if form.weight.trim().is_empty() {
        return Err(AppError::Validation("weight is required".to_string()));
    }

    let entry = state.workout_repo.create_entry(auth_user.id, &form).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn delete_entry(
    State(state): State<WorkoutsState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    if !state.workout_repo.delete_entry(id, auth_user.id).await? {
        return Err(AppError::NotFound(format!("Session entry {} not found", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
