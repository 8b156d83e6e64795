//! Out-of-band maintenance path for resetting an administrator password.
//!
//! Usage: set_admin_password <username> <new-password>

use anyhow::{bail, Context};
use sqlx::SqlitePool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let mut args = std::env::args().skip(1);
    let (Some(username), Some(new_password)) = (args.next(), args.next()) else {
        bail!("Usage: set_admin_password <username> <new-password>");
    };

    if new_password.len() < 8 {
        bail!("New password must be at least 8 characters");
    }

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:vodsacademy.db".to_string());

    let pool = SqlitePool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    let password_hash = bcrypt::hash(&new_password, bcrypt::DEFAULT_COST)?;

    let result = sqlx::query("UPDATE admin_users SET password_hash = ? WHERE username = ?")
        .bind(password_hash)
        .bind(&username)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        bail!("No admin account named '{}'", username);
    }

    println!("Password updated for admin '{}'", username);
    Ok(())
}
