#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::net::TcpListener;

use fittrack::config::TokenLifetimes;
use fittrack::db::{create_memory_pool, DbPool};
use fittrack::migrations::run_migrations_for_tests;
use fittrack::models::User;
use fittrack::repositories::{
    ExerciseRepository, NewUser, TokenRepository, UserRepository, WorkoutRepository,
};

pub const PASSWORD: &str = "password123";

pub fn setup_test_db() -> DbPool {
    let pool = create_memory_pool().expect("Failed to create test database");
    run_migrations_for_tests(&pool).expect("Failed to run migrations");
    pool
}

pub fn create_test_app(pool: DbPool) -> Router {
    use fittrack::handlers::{auth, exercises, workouts};

    // Create repositories
    let user_repo = UserRepository::new(pool.clone());
    let token_repo = TokenRepository::new(pool.clone(), TokenLifetimes::default());
    let exercise_repo = ExerciseRepository::new(pool.clone());
    let workout_repo = WorkoutRepository::new(pool.clone());

    // Create handler states
    let auth_state = auth::AuthState {
        user_repo,
        token_repo: token_repo.clone(),
    };
    let workouts_state = workouts::WorkoutsState { workout_repo };
    let exercises_state = exercises::ExercisesState { exercise_repo };

    fittrack::routes::create_router(
        auth_state,
        workouts_state,
        exercises_state,
        token_repo,
        pool,
    )
}

pub async fn create_test_user(pool: &DbPool, email: &str) -> User {
    let user_repo = UserRepository::new(pool.clone());
    user_repo
        .create(NewUser {
            email,
            password: PASSWORD,
            first_name: "",
            last_name: "",
        })
        .await
        .unwrap()
}

/// Create a user and return a live access token for them.
pub async fn create_logged_in_user(pool: &DbPool, email: &str) -> (User, String) {
    let user = create_test_user(pool, email).await;
    let tokens = TokenRepository::new(pool.clone(), TokenLifetimes::default())
        .issue(user.id)
        .await
        .unwrap();
    (user, tokens.access)
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Serve the app on an ephemeral port; returns the API base URL.
pub async fn spawn_server(pool: DbPool) -> String {
    spawn_router(create_test_app(pool)).await
}

/// Serve any router on an ephemeral port; returns `http://addr/api`.
pub async fn spawn_router(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/api", addr)
}
