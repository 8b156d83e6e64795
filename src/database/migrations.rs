use crate::error::AppError;
use sqlx::{Pool, Row, Sqlite};
use tracing::{info, instrument, warn};

use super::schema::CURRENT_SCHEMA;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Applies the declared schema. Every statement is `CREATE TABLE IF NOT
/// EXISTS`, so this is safe to run on every startup.
#[instrument(skip_all)]
pub async fn initialize_schema(pool: &Pool<Sqlite>) -> Result<(), AppError> {
    info!("Applying database schema");
    sqlx::raw_sql(CURRENT_SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to apply schema: {}", e)))?;
    Ok(())
}

/// Brings a pre-existing `sessions` table up to the current shape by adding
/// the `session_number` and `session_date` columns when they are missing.
/// Additive only, no data is touched. Returns the number of columns added.
#[instrument(skip_all)]
pub async fn apply_migrations(pool: &Pool<Sqlite>) -> Result<u32, AppError> {
    let columns = table_columns(pool, "sessions").await?;
    let mut changes = 0;

    if !columns.iter().any(|c| c == "session_number") {
        info!("Migration: adding sessions.session_number");
        sqlx::query("ALTER TABLE sessions ADD COLUMN session_number INTEGER")
            .execute(pool)
            .await?;
        changes += 1;
    }

    if !columns.iter().any(|c| c == "session_date") {
        info!("Migration: adding sessions.session_date");
        sqlx::query("ALTER TABLE sessions ADD COLUMN session_date DATE")
            .execute(pool)
            .await?;
        changes += 1;
    }

    if changes > 0 {
        info!("Migrations applied. Schema changes made: {}", changes);
    }
    Ok(changes)
}

/// Seeds the single admin account on first run. Guarded by a row count so the
/// seed happens exactly once, whatever id the row ends up with.
#[instrument(skip_all)]
pub async fn seed_default_admin(pool: &Pool<Sqlite>) -> Result<bool, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_users")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        return Ok(false);
    }

    let password_hash = bcrypt::hash(DEFAULT_ADMIN_PASSWORD, bcrypt::DEFAULT_COST)?;

    sqlx::query("INSERT INTO admin_users (username, password_hash, full_name) VALUES (?, ?, ?)")
        .bind(DEFAULT_ADMIN_USERNAME)
        .bind(password_hash)
        .bind("Administrator")
        .execute(pool)
        .await?;

    warn!(
        username = DEFAULT_ADMIN_USERNAME,
        "Seeded default admin account with the default password; change it with set_admin_password"
    );
    Ok(true)
}

#[instrument(skip(pool))]
async fn table_columns(pool: &Pool<Sqlite>, table_name: &str) -> Result<Vec<String>, AppError> {
    let rows = sqlx::query(&format!("PRAGMA table_info({})", table_name))
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(|row| row.get::<String, _>(1)).collect())
}
