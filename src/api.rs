use chrono::{NaiveDate, Utc};
use rocket::http::{Cookie, SameSite, Status};
use rocket::serde::{json::Json, Deserialize, Serialize};
use rocket::State;
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::auth::{AdminSession, AdminUser, LearnerAccess, ADMIN_TOKEN_COOKIE};
use crate::db::{
    authenticate_admin, create_admin_session, create_module, create_program, create_session,
    create_sessions_bulk, deactivate_program, delete_module, delete_session, get_module,
    get_program, get_session, invalidate_admin_session, list_modules, list_programs, list_sessions,
    move_sessions, update_module, update_program, update_session, verify_program_password,
};
use crate::error::AppError;
use crate::helpers::{extract_video_url, format_session_date};
use crate::models::{BulkOutcome, BulkSessionItem, Module, Program, Session};

const ADMIN_SESSION_HOURS: i64 = 8;

fn validated<T: Validate>(request: &T) -> Result<(), AppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))
}

// ---------------------------------------------------------------------------
// Admin login
// ---------------------------------------------------------------------------

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub admin: Option<AdminData>,
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AdminData {
    pub id: i64,
    pub username: String,
    pub full_name: String,
}

impl From<AdminUser> for AdminData {
    fn from(admin: AdminUser) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
            full_name: admin.full_name,
        }
    }
}

#[post("/login", data = "<login>")]
pub async fn api_login(
    login: Json<LoginRequest>,
    cookies: &rocket::http::CookieJar<'_>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<LoginResponse>, AppError> {
    validated(&*login)?;

    match authenticate_admin(db, &login.username, &login.password).await? {
        Some(admin) => {
            let token = AdminSession::generate_token();
            let expires_at = Utc::now() + chrono::Duration::hours(ADMIN_SESSION_HOURS);

            create_admin_session(db, admin.id, &token, expires_at.naive_utc()).await?;

            cookies.add_private(
                Cookie::build((ADMIN_TOKEN_COOKIE, token))
                    .same_site(SameSite::Lax)
                    .http_only(true)
                    .max_age(rocket::time::Duration::hours(ADMIN_SESSION_HOURS)),
            );

            Ok(Json(LoginResponse {
                success: true,
                admin: Some(AdminData::from(admin)),
                error: None,
            }))
        }
        None => Ok(Json(LoginResponse {
            success: false,
            admin: None,
            error: Some("Invalid username or password".to_string()),
        })),
    }
}

#[post("/logout")]
pub async fn api_logout(
    cookies: &rocket::http::CookieJar<'_>,
    db: &State<Pool<Sqlite>>,
) -> Status {
    let token = cookies
        .get_private(ADMIN_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string());

    if let Some(token) = token {
        let _ = invalidate_admin_session(db, &token).await;
    }

    cookies.remove_private(Cookie::build(ADMIN_TOKEN_COOKIE));

    Status::Ok
}

#[get("/me")]
pub async fn api_me(admin: AdminUser) -> Json<AdminData> {
    Json(AdminData::from(admin))
}

#[get("/me", rank = 2)]
pub async fn api_me_unauthorized() -> Status {
    Status::Unauthorized
}

// ---------------------------------------------------------------------------
// Programs
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
pub struct ProgramData {
    pub id: i64,
    pub name: String,
    pub description: String,
}

impl From<Program> for ProgramData {
    fn from(program: Program) -> Self {
        Self {
            id: program.id,
            name: program.name,
            description: program.description,
        }
    }
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[get("/programs")]
pub async fn api_list_programs(db: &State<Pool<Sqlite>>) -> Result<Json<Vec<ProgramData>>, AppError> {
    let programs = list_programs(db).await?;
    Ok(Json(programs.into_iter().map(ProgramData::from).collect()))
}

#[derive(Deserialize, Validate)]
pub struct CreateProgramRequest {
    #[validate(length(min = 1, message = "Program name is required"))]
    name: String,
    description: Option<String>,
    #[validate(length(min = 1, message = "Access password is required"))]
    password: String,
    confirm_password: String,
}

#[post("/programs", data = "<request>")]
pub async fn api_create_program(
    request: Json<CreateProgramRequest>,
    _admin: AdminUser,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<CreatedResponse>, AppError> {
    validated(&*request)?;

    if request.password != request.confirm_password {
        return Err(AppError::Validation("Passwords do not match".to_string()));
    }

    let id = create_program(
        db,
        &request.name,
        request.description.as_deref().unwrap_or_default(),
        &request.password,
    )
    .await?;

    Ok(Json(CreatedResponse { id }))
}

#[derive(Deserialize, Validate)]
pub struct UpdateProgramRequest {
    #[validate(length(min = 1, message = "Program name is required"))]
    name: String,
    description: Option<String>,
    /// Absent or empty means "keep the existing access password".
    password: Option<String>,
}

#[put("/programs/<id>", data = "<request>")]
pub async fn api_update_program(
    id: i64,
    request: Json<UpdateProgramRequest>,
    _admin: AdminUser,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    validated(&*request)?;
    get_program(db, id).await?;

    update_program(
        db,
        id,
        &request.name,
        request.description.as_deref().unwrap_or_default(),
        request.password.as_deref(),
    )
    .await?;

    Ok(Status::Ok)
}

#[delete("/programs/<id>")]
pub async fn api_delete_program(
    id: i64,
    _admin: AdminUser,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    get_program(db, id).await?;
    deactivate_program(db, id).await?;
    Ok(Status::Ok)
}

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ModuleData {
    pub id: i64,
    pub program_id: i64,
    pub name: String,
    pub description: String,
    pub display_order: i64,
}

impl From<Module> for ModuleData {
    fn from(module: Module) -> Self {
        Self {
            id: module.id,
            program_id: module.program_id,
            name: module.name,
            description: module.description,
            display_order: module.display_order,
        }
    }
}

#[get("/programs/<id>/modules")]
pub async fn api_list_modules(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<ModuleData>>, AppError> {
    let modules = list_modules(db, id).await?;
    Ok(Json(modules.into_iter().map(ModuleData::from).collect()))
}

#[derive(Deserialize, Validate)]
pub struct ModuleRequest {
    #[validate(length(min = 1, message = "Module name is required"))]
    name: String,
    description: Option<String>,
    display_order: Option<i64>,
}

#[post("/programs/<id>/modules", data = "<request>")]
pub async fn api_create_module(
    id: i64,
    request: Json<ModuleRequest>,
    _admin: AdminUser,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<CreatedResponse>, AppError> {
    validated(&*request)?;
    get_program(db, id).await?;

    let module_id = create_module(
        db,
        id,
        &request.name,
        request.description.as_deref().unwrap_or_default(),
        request.display_order.unwrap_or_default(),
    )
    .await?;

    Ok(Json(CreatedResponse { id: module_id }))
}

#[put("/modules/<id>", data = "<request>")]
pub async fn api_update_module(
    id: i64,
    request: Json<ModuleRequest>,
    _admin: AdminUser,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    validated(&*request)?;
    get_module(db, id).await?;

    update_module(
        db,
        id,
        &request.name,
        request.description.as_deref().unwrap_or_default(),
        request.display_order.unwrap_or_default(),
    )
    .await?;

    Ok(Status::Ok)
}

#[delete("/modules/<id>")]
pub async fn api_delete_module(
    id: i64,
    _admin: AdminUser,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    get_module(db, id).await?;
    delete_module(db, id).await?;
    Ok(Status::Ok)
}

// ---------------------------------------------------------------------------
// Module unlock and session listing
// ---------------------------------------------------------------------------

#[derive(Deserialize, Validate)]
pub struct UnlockRequest {
    #[validate(length(min = 1, message = "Password is required"))]
    password: String,
}

#[derive(Serialize)]
pub struct UnlockResponse {
    pub success: bool,
    pub error: Option<String>,
}

#[post("/modules/<id>/unlock", data = "<request>")]
pub async fn api_unlock_module(
    id: i64,
    request: Json<UnlockRequest>,
    mut access: LearnerAccess,
    cookies: &rocket::http::CookieJar<'_>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<UnlockResponse>, AppError> {
    validated(&*request)?;

    // The unlock secret is the owning program's password, shared by every
    // module of that program.
    let module = get_module(db, id).await?;

    if verify_program_password(db, module.program_id, &request.password).await? {
        access.unlock(id);
        access.store(cookies);

        Ok(Json(UnlockResponse {
            success: true,
            error: None,
        }))
    } else {
        Ok(Json(UnlockResponse {
            success: false,
            error: Some("Incorrect password".to_string()),
        }))
    }
}

#[derive(Serialize)]
pub struct SessionData {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub video_url: String,
    pub session_number: Option<i64>,
    pub session_date: Option<NaiveDate>,
    pub session_date_display: String,
}

impl From<Session> for SessionData {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            name: session.name,
            description: session.description,
            video_url: session.video_url,
            session_number: session.session_number,
            session_date: session.session_date,
            session_date_display: format_session_date(session.session_date),
        }
    }
}

/// What a learner sees before unlocking a module: the schedule, nothing more.
#[derive(Serialize)]
pub struct SessionPreview {
    pub id: i64,
    pub name: String,
    pub session_number: Option<i64>,
    pub session_date_display: String,
}

impl From<Session> for SessionPreview {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            name: session.name,
            session_number: session.session_number,
            session_date_display: format_session_date(session.session_date),
        }
    }
}

#[derive(Serialize)]
pub struct SessionsResponse {
    pub unlocked: bool,
    pub sessions: Option<Vec<SessionData>>,
    pub preview: Option<Vec<SessionPreview>>,
}

#[get("/modules/<id>/sessions")]
pub async fn api_list_sessions(
    id: i64,
    admin: Option<AdminUser>,
    access: LearnerAccess,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<SessionsResponse>, AppError> {
    get_module(db, id).await?;
    let sessions = list_sessions(db, id).await?;

    if admin.is_some() || access.is_unlocked(id) {
        Ok(Json(SessionsResponse {
            unlocked: true,
            sessions: Some(sessions.into_iter().map(SessionData::from).collect()),
            preview: None,
        }))
    } else {
        Ok(Json(SessionsResponse {
            unlocked: false,
            sessions: None,
            preview: Some(sessions.into_iter().map(SessionPreview::from).collect()),
        }))
    }
}

// ---------------------------------------------------------------------------
// Sessions (admin)
// ---------------------------------------------------------------------------

#[derive(Deserialize, Validate)]
pub struct SessionRequest {
    #[validate(length(min = 1, message = "Session title is required"))]
    name: String,
    description: Option<String>,
    /// Raw pasted input: either a bare URL or full iframe embed markup.
    video_input: String,
    session_number: Option<i64>,
    session_date: Option<NaiveDate>,
}

fn normalized_video_url(input: &str) -> Result<String, AppError> {
    let url = extract_video_url(input);
    if !url.starts_with("http") {
        return Err(AppError::Validation(
            "Could not extract a valid video URL from the pasted input".to_string(),
        ));
    }
    Ok(url)
}

#[post("/modules/<id>/sessions", data = "<request>")]
pub async fn api_create_session(
    id: i64,
    request: Json<SessionRequest>,
    _admin: AdminUser,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<CreatedResponse>, AppError> {
    validated(&*request)?;
    get_module(db, id).await?;

    let video_url = normalized_video_url(&request.video_input)?;

    let session_id = create_session(
        db,
        id,
        &request.name,
        request.description.as_deref().unwrap_or_default(),
        &video_url,
        request.session_number,
        request.session_date,
    )
    .await?;

    Ok(Json(CreatedResponse { id: session_id }))
}

#[put("/sessions/<id>", data = "<request>")]
pub async fn api_update_session(
    id: i64,
    request: Json<SessionRequest>,
    _admin: AdminUser,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    validated(&*request)?;
    get_session(db, id).await?;

    let video_url = normalized_video_url(&request.video_input)?;

    update_session(
        db,
        id,
        &request.name,
        request.description.as_deref().unwrap_or_default(),
        &video_url,
        request.session_number,
        request.session_date,
    )
    .await?;

    Ok(Status::Ok)
}

#[delete("/sessions/<id>")]
pub async fn api_delete_session(
    id: i64,
    _admin: AdminUser,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, AppError> {
    get_session(db, id).await?;
    delete_session(db, id).await?;
    Ok(Status::Ok)
}

// ---------------------------------------------------------------------------
// Bulk creation and moving
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct BulkItemRequest {
    title: String,
    date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct BulkCreateRequest {
    count: u32,
    start_number: i64,
    items: Vec<BulkItemRequest>,
}

#[post("/modules/<id>/sessions/bulk", data = "<request>")]
pub async fn api_create_sessions_bulk(
    id: i64,
    request: Json<BulkCreateRequest>,
    _admin: AdminUser,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<BulkOutcome>, AppError> {
    get_module(db, id).await?;

    let items: Vec<BulkSessionItem> = request
        .items
        .iter()
        .map(|item| BulkSessionItem {
            title: item.title.clone(),
            date: item.date,
        })
        .collect();

    let outcome = create_sessions_bulk(db, id, request.count, request.start_number, &items).await?;

    Ok(Json(outcome))
}

#[derive(Deserialize)]
pub struct MoveSessionsRequest {
    session_ids: Vec<i64>,
    target_module_id: i64,
}

#[derive(Serialize)]
pub struct MoveSessionsResponse {
    pub moved: u32,
}

#[post("/sessions/move", data = "<request>")]
pub async fn api_move_sessions(
    request: Json<MoveSessionsRequest>,
    _admin: AdminUser,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<MoveSessionsResponse>, AppError> {
    let moved = move_sessions(db, &request.session_ids, request.target_module_id).await?;

    Ok(Json(MoveSessionsResponse { moved }))
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}
