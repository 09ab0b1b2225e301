use axum::{
    Json,
    extract::{Path, Query, State, rejection::{PathRejection, QueryRejection}},
    http::StatusCode,
};
use schoolhub_core::{AppError, ErrorResponse, Paginated};
use schoolhub_models::ids::UserId;
use schoolhub_models::kinds::ProfileKind;
use schoolhub_models::people::Person;
use schoolhub_models::people_input::{NewPerson, PersonPatch};
use tracing::instrument;

use crate::middleware::auth::{RequireAdmin, RequireStaff};
use crate::modules::people::PeopleService;
use crate::modules::students::model::{
    CreateStudentDto, StudentFilterParams, StudentSummary, UpdateStudentDto,
};
use crate::modules::students::service::StudentService;
use crate::state::AppState;
use crate::validator::{ValidatedJson, parse_path, parse_query};

#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student enrolled", body = Person),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse),
        (status = 409, description = "Email or username already taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn create_student(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<(StatusCode, Json<Person>), AppError> {
    let person = NewPerson::try_from(dto)?;
    let created = PeopleService::create(&state.db, person).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/students",
    params(StudentFilterParams),
    responses(
        (status = 200, description = "Students, newest first", body = Paginated<StudentSummary>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - staff only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_students(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    query: Result<Query<StudentFilterParams>, QueryRejection>,
) -> Result<Json<Paginated<StudentSummary>>, AppError> {
    let filters = parse_query(query)?;
    let students = StudentService::list(&state.db, filters).await?;
    Ok(Json(students))
}

#[utoipa::path(
    get,
    path = "/api/students/{identity_id}",
    params(("identity_id" = UserId, Path, description = "Identity ID of the student")),
    responses(
        (status = 200, description = "Student", body = Person),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - staff only", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<Json<Person>, AppError> {
    let identity_id = parse_path(path)?;
    let person = PeopleService::get(&state.db, identity_id, Some(ProfileKind::Student)).await?;
    Ok(Json(person))
}

#[utoipa::path(
    put,
    path = "/api/students/{identity_id}",
    params(("identity_id" = UserId, Path, description = "Identity ID of the student")),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated", body = Person),
        (status = 400, description = "Empty update or invalid field", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Student or class not found", body = ErrorResponse),
        (status = 409, description = "Email or username already taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn update_student(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    path: Result<Path<UserId>, PathRejection>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<Person>, AppError> {
    let identity_id = parse_path(path)?;
    let patch = PersonPatch::try_from(dto)?;
    let person = PeopleService::update(&state.db, identity_id, patch).await?;
    Ok(Json(person))
}
