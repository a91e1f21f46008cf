use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::config::TokenLifetimes;
use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::AuthTokens;

/// Opaque bearer token pairs. One row per login; refresh rotates the access half in place.
#[derive(Clone)]
pub struct TokenRepository {
    pool: DbPool,
    lifetimes: TokenLifetimes,
}

fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

impl TokenRepository {
    pub fn new(pool: DbPool, lifetimes: TokenLifetimes) -> Self {
        Self { pool, lifetimes }
    }

    /// Issue a fresh pair for a user.
    pub async fn issue(&self, user_id: i64) -> Result<AuthTokens> {
        let pool = self.pool.clone();
        let now = Utc::now();
        let access_expires_at = now + self.lifetimes.access;
        let refresh_expires_at = now + self.lifetimes.refresh;
        let tokens = AuthTokens {
            access: new_token(),
            refresh: new_token(),
        };
        let issued = tokens.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO auth_tokens
                    (access_token, refresh_token, user_id, created_at, access_expires_at, refresh_expires_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    issued.access,
                    issued.refresh,
                    user_id,
                    now,
                    access_expires_at,
                    refresh_expires_at
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        Ok(tokens)
    }

    /// Resolve an access token to its user id.
    /// A pair whose refresh half has also expired is deleted on the spot.
    pub async fn find_user_id(&self, access_token: &str) -> Result<Option<i64>> {
        let pool = self.pool.clone();
        let token = access_token.to_string();
        let now = Utc::now();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let row: Option<(i64, DateTime<Utc>, DateTime<Utc>)> = conn
                .query_row(
                    "SELECT user_id, access_expires_at, refresh_expires_at
                     FROM auth_tokens WHERE access_token = ?",
                    [&token],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()?;

            match row {
                Some((user_id, access_expires_at, _)) if access_expires_at > now => {
                    Ok(Some(user_id))
                }
                Some((_, _, refresh_expires_at)) => {
                    if refresh_expires_at <= now {
                        conn.execute("DELETE FROM auth_tokens WHERE access_token = ?", [&token])?;
                    }
                    Ok(None)
                }
                None => Ok(None),
            }
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Swap in a new access token for a live refresh token. `None` when unknown or expired.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Option<AuthTokens>> {
        let pool = self.pool.clone();
        let refresh = refresh_token.to_string();
        let now = Utc::now();
        let access_expires_at = now + self.lifetimes.access;
        let access = new_token();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "UPDATE auth_tokens SET access_token = ?, access_expires_at = ?
                 WHERE refresh_token = ? AND refresh_expires_at > ?",
                rusqlite::params![access, access_expires_at, refresh, now],
            )?;

            if rows == 0 {
                conn.execute(
                    "DELETE FROM auth_tokens WHERE refresh_token = ? AND refresh_expires_at <= ?",
                    rusqlite::params![refresh, now],
                )?;
                return Ok(None);
            }

            Ok(Some(AuthTokens { access, refresh }))
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Revoke the pair that owns this access token (logout).
    pub async fn revoke(&self, access_token: &str) -> Result<bool> {
        let pool = self.pool.clone();
        let token = access_token.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute("DELETE FROM auth_tokens WHERE access_token = ?", [&token])?;
            Ok(rows > 0)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Batch delete every pair whose refresh token has expired.
    pub async fn cleanup_expired(&self) -> Result<usize> {
        let pool = self.pool.clone();
        let now = Utc::now();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "DELETE FROM auth_tokens WHERE refresh_expires_at <= ?",
                rusqlite::params![now],
            )?;
            Ok(rows)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }
}
