use axum::{
    routing::{delete, get, post},
    Extension, Router,
};

use crate::db::DbPool;
use crate::handlers::{auth, exercises, health, workouts};
use crate::repositories::TokenRepository;

pub fn create_router(
    auth_state: auth::AuthState,
    workouts_state: workouts::WorkoutsState,
    exercises_state: exercises::ExercisesState,
    token_repo: TokenRepository,
    pool: DbPool,
) -> Router {
    let api = Router::new()
        // Auth routes
        .route("/auth/register/", post(auth::register))
        .route("/auth/login/", post(auth::login))
        .route("/auth/me/", get(auth::me))
        .route("/auth/logout/", post(auth::logout))
        .route("/auth/refresh/", post(auth::refresh))
        .with_state(auth_state)
        // Session routes
        .route("/sessions/", get(workouts::list).post(workouts::create))
        .route(
            "/sessions/{id}/",
            get(workouts::show)
                .patch(workouts::update)
                .delete(workouts::delete),
        )
        .route("/session-entries/", post(workouts::add_entry))
        .route("/session-entries/{id}/", delete(workouts::delete_entry))
        .with_state(workouts_state)
        // Catalog routes
        .route("/exercises/", get(exercises::list).post(exercises::create))
        .route(
            "/muscle-groups/",
            get(exercises::list_muscle_groups).post(exercises::create_muscle_group),
        )
        .route(
            "/exercise-types/",
            get(exercises::list_exercise_types).post(exercises::create_exercise_type),
        )
        .with_state(exercises_state);

    Router::new()
        .route("/health", get(health::health_check))
        .with_state(pool)
        .nest("/api", api)
        // Token lookup for the bearer extractor
        .layer(Extension(token_repo))
}
