//! Schema migrations compiled into the binary.
//!
//! Each entry is applied at most once per database; applied names are
//! remembered in the `_migrations` table.

use crate::db::DbPool;

/// Ordered list of `(name, sql)` pairs.
pub const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_create_users.sql",
        include_str!("../migrations/001_create_users.sql"),
    ),
    (
        "002_create_auth_tokens.sql",
        include_str!("../migrations/002_create_auth_tokens.sql"),
    ),
    (
        "003_create_catalog.sql",
        include_str!("../migrations/003_create_catalog.sql"),
    ),
    (
        "004_create_workout_sessions.sql",
        include_str!("../migrations/004_create_workout_sessions.sql"),
    ),
    (
        "005_create_session_entries.sql",
        include_str!("../migrations/005_create_session_entries.sql"),
    ),
];

/// Apply every migration that is not yet recorded in `_migrations`.
pub fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    tracing::info!("Running migrations...");

    let conn = pool.get()?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )?;

    let mut applied = 0usize;
    for (name, sql) in MIGRATIONS {
        let seen: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM _migrations WHERE name = ?)",
            [name],
            |row| row.get(0),
        )?;

        if seen {
            tracing::debug!("Migration {} already applied", name);
            continue;
        }

        tracing::info!("Applying migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO _migrations (name) VALUES (?)", [name])?;
        applied += 1;
    }

    tracing::info!("Migrations completed ({} applied)", applied);
    Ok(())
}

/// Apply every migration unconditionally. Meant for fresh in-memory databases.
#[allow(dead_code)] // Used by integration tests
pub fn run_migrations_for_tests(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    for (_name, sql) in MIGRATIONS {
        conn.execute_batch(sql)?;
    }

    Ok(())
}
