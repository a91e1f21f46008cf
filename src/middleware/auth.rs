use axum::{extract::FromRequestParts, http::request::Parts, Extension};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::error::AppError;
use crate::repositories::TokenRepository;

/// The caller behind a valid `Authorization: Bearer <access>` header.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub access_token: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AppError::Unauthorized(
                        "Authentication credentials were not provided.".to_string(),
                    )
                })?;

        let Extension(token_repo) = Extension::<TokenRepository>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let access_token = bearer.token().to_string();
        let id = token_repo
            .find_user_id(&access_token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Token is invalid or expired".to_string()))?;

        Ok(Self { id, access_token })
    }
}
