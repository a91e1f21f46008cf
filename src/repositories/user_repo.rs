use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use rusqlite::OptionalExtension;

use crate::db::DbPool;
use crate::error::{unique_violation, AppError, Result};
use crate::models::user::username_base;
use crate::models::{FromSqliteRow, User};

const USER_COLUMNS: &str = "id, email, first_name, last_name, username";

/// Fields needed to create an account; the password arrives in plain text.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

#[derive(Clone)]
pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))?;
            let result = stmt.query_row([id], User::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let pool = self.pool.clone();
        let email = email.trim().to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt =
                conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))?;
            let result = stmt.query_row([&email], User::from_row).optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Insert a user, picking the first free username among `local`, `local1`, `local2`, ...
    pub async fn create(&self, new_user: NewUser<'_>) -> Result<User> {
        let password_hash = hash_password(new_user.password)?;
        let email = new_user.email.trim().to_string();
        let first_name = new_user.first_name.trim().to_string();
        let last_name = new_user.last_name.trim().to_string();
        let base = username_base(&email);
        let now = Utc::now();

        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<User> {
            let conn = pool.get()?;

            let mut username = base.clone();
            let mut suffix = 1;
            loop {
                let taken: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)",
                    [&username],
                    |row| row.get(0),
                )?;
                if !taken {
                    break;
                }
                username = format!("{}{}", base, suffix);
                suffix += 1;
            }

            conn.execute(
                "INSERT INTO users (email, username, first_name, last_name, password_hash, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                rusqlite::params![email, username, first_name, last_name, password_hash, now],
            )
            .map_err(|e| unique_violation(e, "A user with this email already exists"))?;

            Ok(User {
                id: conn.last_insert_rowid(),
                email,
                first_name,
                last_name,
                username,
            })
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// Returns the user only when the e-mail exists and the password matches its hash.
    pub async fn verify_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        let pool = self.pool.clone();
        let email = email.trim().to_string();
        let found = tokio::task::spawn_blocking(move || -> Result<Option<(User, String)>> {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?"
            ))?;
            let result = stmt
                .query_row([&email], |row| {
                    Ok((User::from_row(row)?, row.get::<_, String>("password_hash")?))
                })
                .optional()?;
            Ok(result)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        match found {
            Some((user, hash)) if verify_password(password, &hash)? => Ok(Some(user)),
            _ => Ok(None),
        }
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AppError::PasswordHash)?
        .to_string();
    Ok(password_hash)
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AppError::PasswordHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;
    use crate::migrations::run_migrations_for_tests;

    fn setup_test_db() -> DbPool {
        let pool = create_memory_pool().expect("Failed to create test database");
        run_migrations_for_tests(&pool).expect("Failed to run migrations");
        pool
    }

    fn new_user<'a>(email: &'a str, password: &'a str) -> NewUser<'a> {
        NewUser {
            email,
            password,
            first_name: "",
            last_name: "",
        }
    }

    #[tokio::test]
    async fn test_create_derives_username_from_email() {
        let repo = UserRepository::new(setup_test_db());

        let user = repo
            .create(NewUser {
                email: "jane@example.com",
                password: "password123",
                first_name: "Jane",
                last_name: "Doe",
            })
            .await
            .unwrap();

        assert_eq!(user.username, "jane");
        assert_eq!(user.first_name, "Jane");
    }

    #[tokio::test]
    async fn test_create_suffixes_taken_usernames() {
        let repo = UserRepository::new(setup_test_db());

        let first = repo.create(new_user("sam@one.com", "password123")).await.unwrap();
        let second = repo.create(new_user("sam@two.com", "password123")).await.unwrap();
        let third = repo.create(new_user("sam@three.com", "password123")).await.unwrap();

        assert_eq!(first.username, "sam");
        assert_eq!(second.username, "sam1");
        assert_eq!(third.username, "sam2");
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let repo = UserRepository::new(setup_test_db());

        repo.create(new_user("dup@example.com", "password123")).await.unwrap();
        let result = repo.create(new_user("dup@example.com", "password456")).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_verify_password() {
        let repo = UserRepository::new(setup_test_db());
        let created = repo.create(new_user("lifter@example.com", "password123")).await.unwrap();

        let ok = repo.verify_password("lifter@example.com", "password123").await.unwrap();
        let wrong = repo.verify_password("lifter@example.com", "nope").await.unwrap();
        let unknown = repo.verify_password("ghost@example.com", "password123").await.unwrap();

        assert_eq!(ok.map(|u| u.id), Some(created.id));
        assert!(wrong.is_none());
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn test_find_by_id_and_email() {
        let repo = UserRepository::new(setup_test_db());
        let created = repo.create(new_user("find@example.com", "password123")).await.unwrap();

        let by_id = repo.find_by_id(created.id).await.unwrap();
        let by_email = repo.find_by_email("find@example.com").await.unwrap();
        let missing = repo.find_by_id(9999).await.unwrap();

        assert_eq!(by_id, Some(created.clone()));
        assert_eq!(by_email, Some(created));
        assert!(missing.is_none());
    }
}
