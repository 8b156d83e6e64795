use chrono::{DateTime, NaiveDateTime, Utc};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::Request;
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::{get_admin, get_admin_session_by_token};

/// Name of the private cookie carrying the admin session token.
pub const ADMIN_TOKEN_COOKIE: &str = "admin_token";

#[derive(Debug, Serialize, Clone)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub active: bool,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbAdminUser {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub full_name: Option<String>,
    pub active: Option<bool>,
    pub created_at: Option<NaiveDateTime>,
}

impl From<DbAdminUser> for AdminUser {
    fn from(admin: DbAdminUser) -> Self {
        Self {
            id: admin.id.unwrap_or_default(),
            username: admin.username.unwrap_or_default(),
            full_name: admin.full_name.unwrap_or_default(),
            active: admin.active.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdminSession {
    pub id: i64,
    pub admin_id: i64,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: NaiveDateTime,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbAdminSession {
    pub id: Option<i64>,
    pub admin_id: Option<i64>,
    pub token: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub expires_at: Option<NaiveDateTime>,
}

impl From<DbAdminSession> for AdminSession {
    fn from(db: DbAdminSession) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            admin_id: db.admin_id.unwrap_or_default(),
            token: db.token.unwrap_or_default(),
            created_at: db
                .created_at
                .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
                .unwrap_or_else(Utc::now),
            expires_at: db.expires_at.unwrap_or_default(),
        }
    }
}

impl AdminSession {
    pub fn generate_token() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn is_valid(&self) -> bool {
        self.expires_at > Utc::now().naive_utc()
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = ();

    // Token failures forward rather than error, so lower-ranked routes (and,
    // failing those, the 401 catcher) get a chance to answer.
    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let token = request
            .cookies()
            .get_private(ADMIN_TOKEN_COOKIE)
            .map(|c| c.value().to_string());

        let Some(token) = token else {
            return Outcome::Forward(Status::Unauthorized);
        };

        let db = match request.rocket().state::<SqlitePool>() {
            Some(pool) => pool,
            None => {
                tracing::error!("Database pool not found in managed state");
                return Outcome::Error((Status::InternalServerError, ()));
            }
        };

        match get_admin_session_by_token(db, &token).await {
            Ok(session) => {
                if !session.is_valid() {
                    tracing::warn!("Admin session token expired");
                    return Outcome::Forward(Status::Unauthorized);
                }

                match get_admin(db, session.admin_id).await {
                    Ok(admin) if admin.active => {
                        tracing::info!(username = %admin.username, "Admin authenticated via session token");
                        Outcome::Success(admin)
                    }
                    Ok(_) => {
                        tracing::warn!(admin_id = %session.admin_id, "Admin account is deactivated");
                        Outcome::Forward(Status::Unauthorized)
                    }
                    Err(err) => {
                        tracing::error!(admin_id = %session.admin_id, error = ?err, "Failed to fetch admin for valid session");
                        Outcome::Error((Status::InternalServerError, ()))
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = ?err, "Invalid admin session token");
                Outcome::Forward(Status::Unauthorized)
            }
        }
    }
}

#[rocket::catch(401)]
pub fn unauthorized_api(_req: &Request) -> Custom<Json<Value>> {
    let error_json = json!({
        "error": "Unauthorized",
        "message": "Authentication required"
    });

    Custom(Status::Unauthorized, Json(error_json))
}
