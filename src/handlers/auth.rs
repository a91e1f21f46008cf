use axum::{extract::State, http::StatusCode, Json};

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{
    AuthTokens, LoginCredentials, MessageResponse, RefreshRequest, RegisterRequest,
    RegisterResponse, User,
};
use crate::repositories::{NewUser, TokenRepository, UserRepository};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Clone)]
pub struct AuthState {
    pub user_repo: UserRepository,
    pub token_repo: TokenRepository,
}

pub async fn register(
    State(state): State<AuthState>,
    Json(form): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    // Validate input
    if form.email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }
    if form.password != form.password2 {
        return Err(AppError::Validation(
            "Password fields didn't match".to_string(),
        ));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let user = state
        .user_repo
        .create(NewUser {
            email: &form.email,
            password: &form.password,
            first_name: &form.first_name,
            last_name: &form.last_name,
        })
        .await?;

    tracing::info!("Registered user {} ({})", user.id, user.username);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user,
        }),
    ))
}

pub async fn login(
    State(state): State<AuthState>,
    Json(credentials): Json<LoginCredentials>,
) -> Result<Json<AuthTokens>> {
    let user = state
        .user_repo
        .verify_password(&credentials.email, &credentials.password)
        .await?
        .ok_or_else(|| {
            AppError::Unauthorized(
                "No active account found with the given credentials".to_string(),
            )
        })?;

    let tokens = state.token_repo.issue(user.id).await?;
    Ok(Json(tokens))
}

pub async fn me(State(state): State<AuthState>, auth_user: AuthUser) -> Result<Json<User>> {
    let user = state
        .user_repo
        .find_by_id(auth_user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

    Ok(Json(user))
}

pub async fn logout(
    State(state): State<AuthState>,
    auth_user: AuthUser,
) -> Result<Json<MessageResponse>> {
    state.token_repo.revoke(&auth_user.access_token).await?;

    Ok(Json(MessageResponse {
        message: "Successfully logged out".to_string(),
    }))
}

pub async fn refresh(
    State(state): State<AuthState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AuthTokens>> {
    let tokens = state
        .token_repo
        .refresh(&request.refresh)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Token is invalid or expired".to_string()))?;

    Ok(Json(tokens))
}
