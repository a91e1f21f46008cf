use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::db::{self, DbPool};
use crate::version::GIT_VERSION;

#[derive(Serialize)]
pub struct HealthReport {
    status: &'static str,
    database: &'static str,
    service: &'static str,
    git_version: &'static str,
}

/// Liveness check; answers 503 when the database cannot be reached.
pub async fn health_check(State(pool): State<DbPool>) -> (StatusCode, Json<HealthReport>) {
    let database_up = db::ping(&pool).await;
    let (code, status, database) = if database_up {
        (StatusCode::OK, "ok", "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable")
    };

    (
        code,
        Json(HealthReport {
            status,
            database,
            service: env!("CARGO_PKG_NAME"),
            git_version: GIT_VERSION,
        }),
    )
}
