use axum::{
    Json,
    extract::{Path, Query, State, rejection::{PathRejection, QueryRejection}},
    http::StatusCode,
};
use schoolhub_core::{AppError, ErrorResponse, Paginated, PaginationParams};
use schoolhub_models::ids::UserId;
use schoolhub_models::kinds::ProfileKind;
use schoolhub_models::people::Person;
use schoolhub_models::people_input::{NewPerson, PersonPatch};
use tracing::instrument;

use crate::middleware::auth::{RequireAdmin, RequireAuthenticated};
use crate::modules::people::PeopleService;
use crate::modules::teachers::model::{
    CreateTeacherDto, TeacherDirectoryEntry, TeacherSummary, UpdateTeacherDto,
};
use crate::modules::teachers::service::TeacherService;
use crate::state::AppState;
use crate::validator::{ValidatedJson, parse_path, parse_query};

#[utoipa::path(
    post,
    path = "/api/teachers",
    request_body = CreateTeacherDto,
    responses(
        (status = 201, description = "Teacher created", body = Person),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 409, description = "Email or username already taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state, dto))]
pub async fn create_teacher(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<CreateTeacherDto>,
) -> Result<(StatusCode, Json<Person>), AppError> {
    let person = NewPerson::try_from(dto)?;
    let created = PeopleService::create(&state.db, person).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/teachers",
    params(PaginationParams),
    responses(
        (status = 200, description = "Teachers, newest first", body = Paginated<TeacherSummary>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn get_teachers(
    State(state): State<AppState>,
    RequireAuthenticated(_caller): RequireAuthenticated,
    query: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<Paginated<TeacherSummary>>, AppError> {
    let params = parse_query(query)?;
    let teachers = TeacherService::list(&state.db, params).await?;
    Ok(Json(teachers))
}

#[utoipa::path(
    get,
    path = "/api/teachers/directory",
    responses(
        (status = 200, description = "All teachers with identity and profile ids", body = Vec<TeacherDirectoryEntry>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn get_teacher_directory(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<TeacherDirectoryEntry>>, AppError> {
    let entries = TeacherService::directory(&state.db).await?;
    Ok(Json(entries))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{identity_id}",
    params(("identity_id" = UserId, Path, description = "Identity ID of the teacher")),
    responses(
        (status = 200, description = "Teacher", body = Person),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn get_teacher(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<Json<Person>, AppError> {
    let identity_id = parse_path(path)?;
    let person = PeopleService::get(&state.db, identity_id, Some(ProfileKind::Teacher)).await?;
    Ok(Json(person))
}

#[utoipa::path(
    put,
    path = "/api/teachers/{identity_id}",
    params(("identity_id" = UserId, Path, description = "Identity ID of the teacher")),
    request_body = UpdateTeacherDto,
    responses(
        (status = 200, description = "Teacher updated", body = Person),
        (status = 400, description = "Empty update or invalid field", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 409, description = "Email or username already taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state, dto))]
pub async fn update_teacher(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    path: Result<Path<UserId>, PathRejection>,
    ValidatedJson(dto): ValidatedJson<UpdateTeacherDto>,
) -> Result<Json<Person>, AppError> {
    let identity_id = parse_path(path)?;
    let patch = PersonPatch::try_from(dto)?;
    let person = PeopleService::update(&state.db, identity_id, patch).await?;
    Ok(Json(person))
}
