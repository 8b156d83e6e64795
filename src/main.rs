#[macro_use]
extern crate rocket;

mod api;
mod auth;
mod database;
mod db;
mod error;
mod helpers;
mod models;
#[cfg(test)]
mod test;

use std::str::FromStr;

use api::{
    api_create_module, api_create_program, api_create_session, api_create_sessions_bulk,
    api_delete_module, api_delete_program, api_delete_session, api_list_modules, api_list_programs,
    api_list_sessions, api_login, api_logout, api_me, api_me_unauthorized, api_move_sessions,
    api_unlock_module, api_update_module, api_update_program, api_update_session, health,
};
use auth::unauthorized_api;
use db::clean_expired_admin_sessions;
use rocket::{tokio, Build, Rocket};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[launch]
async fn rocket() -> _ {
    init_tracing();

    let _ = dotenvy::dotenv();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:vodsacademy.db".to_string());

    let options = SqliteConnectOptions::from_str(&database_url)
        .expect("Invalid DATABASE_URL")
        .create_if_missing(true);

    let pool = SqlitePool::connect_with(options)
        .await
        .expect("Failed to connect to SQLite database");

    info!("Initializing database schema");
    database::initialize_schema(&pool)
        .await
        .expect("Database schema initialization failed");

    database::apply_migrations(&pool)
        .await
        .expect("Database migration failed");

    database::seed_default_admin(&pool)
        .await
        .expect("Failed to seed admin account");

    let pool_clone = pool.clone();

    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;

        loop {
            match clean_expired_admin_sessions(&pool_clone).await {
                Ok(count) => {
                    if count > 0 {
                        info!("Cleaned up {} expired admin sessions", count);
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to clean expired admin sessions: {}", e);
                }
            }

            tokio::time::sleep(tokio::time::Duration::from_secs(3600)).await;
        }
    });

    init_rocket(pool)
}

pub fn init_rocket(pool: SqlitePool) -> Rocket<Build> {
    info!("Starting vods-academy");

    rocket::build()
        .manage(pool)
        .mount(
            "/api",
            routes![
                api_login,
                api_logout,
                api_me,
                api_me_unauthorized,
                api_list_programs,
                api_create_program,
                api_update_program,
                api_delete_program,
                api_list_modules,
                api_create_module,
                api_update_module,
                api_delete_module,
                api_unlock_module,
                api_list_sessions,
                api_create_session,
                api_update_session,
                api_delete_session,
                api_create_sessions_bulk,
                api_move_sessions,
                health,
            ],
        )
        .register("/api", catchers![unauthorized_api])
}
