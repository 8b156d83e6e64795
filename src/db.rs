use crate::{
    auth::{AdminSession, AdminUser, DbAdminSession, DbAdminUser},
    error::AppError,
    models::{
        BulkOutcome, BulkSessionItem, DbModule, DbProgram, DbSession, Module, Program, Session,
        BULK_PLACEHOLDER_DESCRIPTION,
    },
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

/// Upper bound on sessions per bulk creation request.
pub const BULK_MAX_SESSIONS: u32 = 50;

// ---------------------------------------------------------------------------
// Admin accounts and sessions
// ---------------------------------------------------------------------------

#[instrument(skip_all, fields(username))]
pub async fn authenticate_admin(
    pool: &Pool<Sqlite>,
    username: &str,
    password: &str,
) -> Result<Option<AdminUser>, AppError> {
    info!("Authenticating admin");
    let row = sqlx::query_as::<_, DbAdminUser>(
        "SELECT id, username, password_hash, full_name, active, created_at
         FROM admin_users WHERE username = ? AND active = 1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(db_admin) => {
            let verified =
                bcrypt::verify(password, db_admin.password_hash.as_deref().unwrap_or_default())
                    .unwrap_or(false);

            if verified {
                Ok(Some(AdminUser::from(db_admin)))
            } else {
                Ok(None)
            }
        }
        None => Ok(None),
    }
}

/// Credential check without the account payload. Returns false, never an
/// authentication error, for unknown usernames and wrong passwords.
pub async fn verify_admin(
    pool: &Pool<Sqlite>,
    username: &str,
    password: &str,
) -> Result<bool, AppError> {
    Ok(authenticate_admin(pool, username, password).await?.is_some())
}

#[instrument]
pub async fn get_admin(pool: &Pool<Sqlite>, id: i64) -> Result<AdminUser, AppError> {
    let row = sqlx::query_as::<_, DbAdminUser>(
        "SELECT id, username, password_hash, full_name, active, created_at
         FROM admin_users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(admin) => Ok(AdminUser::from(admin)),
        None => Err(AppError::NotFound(format!(
            "Admin with id {} not found in database",
            id
        ))),
    }
}

#[instrument(skip_all, fields(username))]
pub async fn update_admin_password(
    pool: &Pool<Sqlite>,
    username: &str,
    new_password: &str,
) -> Result<(), AppError> {
    info!("Updating admin password");
    let password_hash = bcrypt::hash(new_password, bcrypt::DEFAULT_COST)?;

    let result = sqlx::query("UPDATE admin_users SET password_hash = ? WHERE username = ?")
        .bind(password_hash)
        .bind(username)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Admin with username {} not found in database",
            username
        )));
    }

    Ok(())
}

#[instrument(skip(pool, token))]
pub async fn create_admin_session(
    pool: &Pool<Sqlite>,
    admin_id: i64,
    token: &str,
    expires_at: NaiveDateTime,
) -> Result<i64, AppError> {
    info!("Creating admin session");

    let res = sqlx::query("INSERT INTO admin_sessions (admin_id, token, expires_at) VALUES (?, ?, ?)")
        .bind(admin_id)
        .bind(token)
        .bind(expires_at)
        .execute(pool)
        .await?;

    Ok(res.last_insert_rowid())
}

#[instrument(skip(pool, token))]
pub async fn get_admin_session_by_token(
    pool: &Pool<Sqlite>,
    token: &str,
) -> Result<AdminSession, AppError> {
    let session = sqlx::query_as::<_, DbAdminSession>(
        "SELECT id, admin_id, token, created_at, expires_at FROM admin_sessions WHERE token = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    match session {
        Some(session) => Ok(AdminSession::from(session)),
        None => Err(AppError::Authentication("Invalid session token".to_string())),
    }
}

#[instrument(skip(pool, token))]
pub async fn invalidate_admin_session(pool: &Pool<Sqlite>, token: &str) -> Result<(), AppError> {
    info!("Invalidating admin session");

    sqlx::query("DELETE FROM admin_sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}

#[instrument(skip(pool))]
pub async fn clean_expired_admin_sessions(pool: &Pool<Sqlite>) -> Result<u64, AppError> {
    let now = Utc::now().naive_utc();

    let result = sqlx::query("DELETE FROM admin_sessions WHERE expires_at < ?")
        .bind(now)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// Programs
// ---------------------------------------------------------------------------

#[instrument(skip_all, fields(program_id))]
pub async fn verify_program_password(
    pool: &Pool<Sqlite>,
    program_id: i64,
    password: &str,
) -> Result<bool, AppError> {
    info!("Verifying program password");
    let hash: Option<String> =
        sqlx::query_scalar("SELECT password_hash FROM programs WHERE id = ? AND active = 1")
            .bind(program_id)
            .fetch_optional(pool)
            .await?;

    match hash {
        Some(hash) => Ok(bcrypt::verify(password, &hash).unwrap_or(false)),
        None => Ok(false),
    }
}

/// Creates a program. The name must be unique among all programs, including
/// soft-deleted ones, so a deactivated program's name cannot be reused.
#[instrument(skip(pool, password))]
pub async fn create_program(
    pool: &Pool<Sqlite>,
    name: &str,
    description: &str,
    password: &str,
) -> Result<i64, AppError> {
    info!("Creating program");

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM programs WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    if existing.is_some() {
        return Err(AppError::DuplicateName(format!(
            "A program named '{}' already exists",
            name
        )));
    }

    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;

    let res = sqlx::query("INSERT INTO programs (name, description, password_hash) VALUES (?, ?, ?)")
        .bind(name)
        .bind(description)
        .bind(password_hash)
        .execute(pool)
        .await?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn get_program(pool: &Pool<Sqlite>, id: i64) -> Result<Program, AppError> {
    let row = sqlx::query_as::<_, DbProgram>(
        "SELECT id, name, description, password_hash, active, created_at
         FROM programs WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(program) => Ok(Program::from(program)),
        None => Err(AppError::NotFound(format!(
            "Program with id {} not found in database",
            id
        ))),
    }
}

#[instrument]
pub async fn list_programs(pool: &Pool<Sqlite>) -> Result<Vec<Program>, AppError> {
    info!("Listing active programs");
    let rows = sqlx::query_as::<_, DbProgram>(
        "SELECT id, name, description, password_hash, active, created_at
         FROM programs WHERE active = 1 ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Program::from).collect())
}

/// Updates name and description in place. The access password is only
/// replaced when a non-empty new password is supplied.
#[instrument(skip(pool, new_password))]
pub async fn update_program(
    pool: &Pool<Sqlite>,
    id: i64,
    name: &str,
    description: &str,
    new_password: Option<&str>,
) -> Result<(), AppError> {
    info!("Updating program");

    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM programs WHERE name = ? AND id != ?")
            .bind(name)
            .bind(id)
            .fetch_optional(pool)
            .await?;

    if existing.is_some() {
        return Err(AppError::DuplicateName(format!(
            "A program named '{}' already exists",
            name
        )));
    }

    match new_password.filter(|p| !p.is_empty()) {
        Some(password) => {
            let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
            sqlx::query(
                "UPDATE programs SET name = ?, description = ?, password_hash = ? WHERE id = ?",
            )
            .bind(name)
            .bind(description)
            .bind(password_hash)
            .bind(id)
            .execute(pool)
            .await?;
        }
        None => {
            sqlx::query("UPDATE programs SET name = ?, description = ? WHERE id = ?")
                .bind(name)
                .bind(description)
                .bind(id)
                .execute(pool)
                .await?;
        }
    }

    Ok(())
}

/// Soft delete. The program disappears from listings but its modules and
/// sessions stay in storage, reachable by direct id lookup.
#[instrument]
pub async fn deactivate_program(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deactivating program");
    sqlx::query("UPDATE programs SET active = 0 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

#[instrument(skip(pool))]
pub async fn create_module(
    pool: &Pool<Sqlite>,
    program_id: i64,
    name: &str,
    description: &str,
    display_order: i64,
) -> Result<i64, AppError> {
    info!("Creating module");
    let res = sqlx::query(
        "INSERT INTO modules (program_id, name, description, display_order) VALUES (?, ?, ?, ?)",
    )
    .bind(program_id)
    .bind(name)
    .bind(description)
    .bind(display_order)
    .execute(pool)
    .await?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn get_module(pool: &Pool<Sqlite>, id: i64) -> Result<Module, AppError> {
    let row = sqlx::query_as::<_, DbModule>(
        "SELECT id, program_id, name, description, display_order FROM modules WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(module) => Ok(Module::from(module)),
        None => Err(AppError::NotFound(format!(
            "Module with id {} not found in database",
            id
        ))),
    }
}

#[instrument]
pub async fn list_modules(pool: &Pool<Sqlite>, program_id: i64) -> Result<Vec<Module>, AppError> {
    info!("Listing modules");
    let rows = sqlx::query_as::<_, DbModule>(
        "SELECT id, program_id, name, description, display_order
         FROM modules WHERE program_id = ?
         ORDER BY display_order, name",
    )
    .bind(program_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Module::from).collect())
}

#[instrument(skip(pool))]
pub async fn update_module(
    pool: &Pool<Sqlite>,
    id: i64,
    name: &str,
    description: &str,
    display_order: i64,
) -> Result<(), AppError> {
    info!("Updating module");
    sqlx::query("UPDATE modules SET name = ?, description = ?, display_order = ? WHERE id = ?")
        .bind(name)
        .bind(description)
        .bind(display_order)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Hard delete. The FK cascade removes all of the module's sessions.
#[instrument]
pub async fn delete_module(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting module");
    sqlx::query("DELETE FROM modules WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Creates a session. `display_order` is derived from `session_number` (0 when
/// absent); session listings never read it, but it is kept in sync for
/// compatibility with data produced before the dated-session columns existed.
#[instrument(skip(pool, description, video_url))]
pub async fn create_session(
    pool: &Pool<Sqlite>,
    module_id: i64,
    name: &str,
    description: &str,
    video_url: &str,
    session_number: Option<i64>,
    session_date: Option<NaiveDate>,
) -> Result<i64, AppError> {
    info!("Creating session");
    let display_order = session_number.unwrap_or(0);

    let res = sqlx::query(
        "INSERT INTO sessions (module_id, name, description, video_url, session_number, session_date, display_order)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(module_id)
    .bind(name)
    .bind(description)
    .bind(video_url)
    .bind(session_number)
    .bind(session_date)
    .bind(display_order)
    .execute(pool)
    .await?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn get_session(pool: &Pool<Sqlite>, id: i64) -> Result<Session, AppError> {
    let row = sqlx::query_as::<_, DbSession>(
        "SELECT id, module_id, name, description, video_url, display_order,
                session_number, session_date, created_at
         FROM sessions WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(session) => Ok(Session::from(session)),
        None => Err(AppError::NotFound(format!(
            "Session with id {} not found in database",
            id
        ))),
    }
}

/// Most recent first: date descending, then session number descending.
#[instrument]
pub async fn list_sessions(pool: &Pool<Sqlite>, module_id: i64) -> Result<Vec<Session>, AppError> {
    info!("Listing sessions");
    let rows = sqlx::query_as::<_, DbSession>(
        "SELECT id, module_id, name, description, video_url, display_order,
                session_number, session_date, created_at
         FROM sessions WHERE module_id = ?
         ORDER BY session_date DESC, session_number DESC",
    )
    .bind(module_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Session::from).collect())
}

/// Updates a session in place, re-deriving `display_order` from the edited
/// session number.
#[instrument(skip(pool, description, video_url))]
pub async fn update_session(
    pool: &Pool<Sqlite>,
    id: i64,
    name: &str,
    description: &str,
    video_url: &str,
    session_number: Option<i64>,
    session_date: Option<NaiveDate>,
) -> Result<(), AppError> {
    info!("Updating session");
    let display_order = session_number.unwrap_or(0);

    sqlx::query(
        "UPDATE sessions
         SET name = ?, description = ?, video_url = ?, session_number = ?, session_date = ?, display_order = ?
         WHERE id = ?",
    )
    .bind(name)
    .bind(description)
    .bind(video_url)
    .bind(session_number)
    .bind(session_date)
    .bind(display_order)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

#[instrument]
pub async fn delete_session(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting session");
    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Reassigns a session to another module of the same program. Only
/// `module_id` changes; every other field is left untouched. A target module
/// under a different program is rejected.
#[instrument]
pub async fn move_session(
    pool: &Pool<Sqlite>,
    session_id: i64,
    new_module_id: i64,
) -> Result<(), AppError> {
    info!("Moving session to module");

    let current_program: Option<i64> = sqlx::query_scalar(
        "SELECT m.program_id FROM sessions s
         JOIN modules m ON m.id = s.module_id
         WHERE s.id = ?",
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?;

    let current_program = current_program.ok_or_else(|| {
        AppError::NotFound(format!(
            "Session with id {} not found in database",
            session_id
        ))
    })?;

    let target_program: Option<i64> =
        sqlx::query_scalar("SELECT program_id FROM modules WHERE id = ?")
            .bind(new_module_id)
            .fetch_optional(pool)
            .await?;

    let target_program = target_program.ok_or_else(|| {
        AppError::NotFound(format!(
            "Module with id {} not found in database",
            new_module_id
        ))
    })?;

    if current_program != target_program {
        return Err(AppError::Validation(format!(
            "Module {} belongs to a different program; sessions can only move within their own program",
            new_module_id
        )));
    }

    sqlx::query("UPDATE sessions SET module_id = ? WHERE id = ?")
        .bind(new_module_id)
        .bind(session_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Moves each session independently. There is no batch atomicity: an error on
/// one id stops the loop but the sessions already moved stay moved.
#[instrument(skip(pool, session_ids))]
pub async fn move_sessions(
    pool: &Pool<Sqlite>,
    session_ids: &[i64],
    target_module_id: i64,
) -> Result<u32, AppError> {
    info!(count = session_ids.len(), "Moving sessions to module");
    let mut moved = 0;

    for session_id in session_ids {
        move_session(pool, *session_id, target_module_id).await?;
        moved += 1;
    }

    Ok(moved)
}

// ---------------------------------------------------------------------------
// Bulk session creation
// ---------------------------------------------------------------------------

/// Creates `count` numbered placeholder sessions starting at `start_number`,
/// one per item, each with an empty video URL and a fixed placeholder
/// description.
///
/// Two-phase contract: validation is all-or-nothing (any item with a blank
/// title aborts the batch, naming the offending session numbers, before
/// anything is written), while insertion is best-effort (each item inserts
/// independently and per-item failures are reported without rolling back the
/// rows already inserted).
#[instrument(skip(pool, items))]
pub async fn create_sessions_bulk(
    pool: &Pool<Sqlite>,
    module_id: i64,
    count: u32,
    start_number: i64,
    items: &[BulkSessionItem],
) -> Result<BulkOutcome, AppError> {
    info!("Creating sessions in bulk");

    if count < 1 || count > BULK_MAX_SESSIONS {
        return Err(AppError::Validation(format!(
            "Session count must be between 1 and {}",
            BULK_MAX_SESSIONS
        )));
    }

    if start_number < 1 {
        return Err(AppError::Validation(
            "Starting session number must be at least 1".to_string(),
        ));
    }

    if items.len() != count as usize {
        return Err(AppError::Validation(format!(
            "Expected {} session entries, got {}",
            count,
            items.len()
        )));
    }

    let untitled: Vec<String> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.title.trim().is_empty())
        .map(|(i, _)| (start_number + i as i64).to_string())
        .collect();

    if !untitled.is_empty() {
        return Err(AppError::Validation(format!(
            "The following sessions have no title: {}",
            untitled.join(", ")
        )));
    }

    let mut created = 0;
    let mut errors = Vec::new();

    for (i, item) in items.iter().enumerate() {
        let session_number = start_number + i as i64;

        match create_session(
            pool,
            module_id,
            item.title.trim(),
            BULK_PLACEHOLDER_DESCRIPTION,
            "",
            Some(session_number),
            item.date,
        )
        .await
        {
            Ok(_) => created += 1,
            Err(e) => errors.push(format!("Session {}: {}", session_number, e)),
        }
    }

    Ok(BulkOutcome { created, errors })
}
