use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

/// Description given to placeholder sessions created in bulk, before a
/// recording exists for them.
pub const BULK_PLACEHOLDER_DESCRIPTION: &str = "The recording will be uploaded soon";

#[derive(Serialize, Clone)]
pub struct Program {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbProgram {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub password_hash: Option<String>,
    pub active: Option<bool>,
    pub created_at: Option<NaiveDateTime>,
}

impl From<DbProgram> for Program {
    fn from(db: DbProgram) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            name: db.name.unwrap_or_default(),
            description: db.description.unwrap_or_default(),
            active: db.active.unwrap_or_default(),
            created_at: db
                .created_at
                .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
                .unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Serialize, Clone)]
pub struct Module {
    pub id: i64,
    pub program_id: i64,
    pub name: String,
    pub description: String,
    pub display_order: i64,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbModule {
    pub id: Option<i64>,
    pub program_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i64>,
}

impl From<DbModule> for Module {
    fn from(db: DbModule) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            program_id: db.program_id.unwrap_or_default(),
            name: db.name.unwrap_or_default(),
            description: db.description.unwrap_or_default(),
            display_order: db.display_order.unwrap_or_default(),
        }
    }
}

#[derive(Serialize, Clone)]
pub struct Session {
    pub id: i64,
    pub module_id: i64,
    pub name: String,
    pub description: String,
    /// Empty string means the recording is not available yet.
    pub video_url: String,
    pub display_order: i64,
    pub session_number: Option<i64>,
    pub session_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbSession {
    pub id: Option<i64>,
    pub module_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub display_order: Option<i64>,
    pub session_number: Option<i64>,
    pub session_date: Option<NaiveDate>,
    pub created_at: Option<NaiveDateTime>,
}

impl From<DbSession> for Session {
    fn from(db: DbSession) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            module_id: db.module_id.unwrap_or_default(),
            name: db.name.unwrap_or_default(),
            description: db.description.unwrap_or_default(),
            video_url: db.video_url.unwrap_or_default(),
            display_order: db.display_order.unwrap_or_default(),
            session_number: db.session_number,
            session_date: db.session_date,
            created_at: db
                .created_at
                .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
                .unwrap_or_else(Utc::now),
        }
    }
}

/// One entry of a bulk session creation request: the title and date for a
/// numbered placeholder. The session number itself is derived from the batch's
/// starting number.
#[derive(Clone)]
pub struct BulkSessionItem {
    pub title: String,
    pub date: Option<NaiveDate>,
}

/// Result of a bulk session creation. Validation failures abort the whole
/// batch before anything is written; insertion failures after that point are
/// collected here while the sessions that did insert stay committed.
#[derive(Serialize, Debug)]
pub struct BulkOutcome {
    pub created: u32,
    pub errors: Vec<String>,
}
