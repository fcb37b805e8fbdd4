//! Shared SQLite pool and the account tables every service reads.
//!
//! `profiles` and `sessions` are written by the identity platform; the
//! services only read them to authorize requests.

use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::errors::{AppError, AppResult};
use crate::models::Profile;

/// Opens the shared database.
///
/// In-memory databases live only as long as their connection, so they get a
/// single connection that is never recycled.
pub async fn connect(database_url: &str) -> AppResult<SqlitePool> {
    let options = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
    };

    options
        .connect(database_url)
        .await
        .map_err(|e| AppError::DatabaseQuery(format!("Failed to open {database_url}: {e}")))
}

/// Creates the `profiles` and `sessions` tables if they do not exist.
pub async fn ensure_account_tables(pool: &SqlitePool) -> AppResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS profiles (
            id          TEXT    PRIMARY KEY NOT NULL,
            created_at  TEXT    NOT NULL,
            email       TEXT    NOT NULL DEFAULT '',
            first_name  TEXT,
            last_name   TEXT,
            avatar_url  TEXT,
            is_admin    INTEGER NOT NULL DEFAULT 0
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| AppError::DatabaseQuery(format!("Failed to create profiles table: {e}")))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS sessions (
            token_hash  BLOB    PRIMARY KEY NOT NULL,
            user_id     TEXT    NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            created_at  INTEGER NOT NULL,
            expires_at  INTEGER NOT NULL,
            revoked_at  INTEGER
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| AppError::DatabaseQuery(format!("Failed to create sessions table: {e}")))?;

    tracing::debug!("Account tables ensured");
    Ok(())
}

/// Inserts or replaces a profile.
pub async fn upsert_profile(pool: &SqlitePool, profile: &Profile) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO profiles (id, created_at, email, first_name, last_name, avatar_url, is_admin)
         VALUES (?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
            email = excluded.email,
            first_name = excluded.first_name,
            last_name = excluded.last_name,
            avatar_url = excluded.avatar_url,
            is_admin = excluded.is_admin",
    )
    .bind(&profile.id)
    .bind(&profile.created_at)
    .bind(&profile.email)
    .bind(&profile.first_name)
    .bind(&profile.last_name)
    .bind(&profile.avatar_url)
    .bind(profile.is_admin)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn account_tables_are_idempotent() {
        let pool = connect("sqlite::memory:").await.unwrap();
        ensure_account_tables(&pool).await.unwrap();
        ensure_account_tables(&pool).await.unwrap();

        let profile = Profile {
            id: "u1".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
            email: "u1@example.com".into(),
            first_name: Some("Amal".into()),
            last_name: None,
            avatar_url: None,
            is_admin: false,
        };
        upsert_profile(&pool, &profile).await.unwrap();
        upsert_profile(&pool, &Profile { is_admin: true, ..profile }).await.unwrap();

        let (count, is_admin): (i64, bool) =
            sqlx::query_as("SELECT COUNT(*), MAX(is_admin) FROM profiles")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
        assert!(is_admin);
    }
}
