use axum::{
    Json,
    extract::{Path, Query, State, rejection::{PathRejection, QueryRejection}},
    http::StatusCode,
};
use schoolhub_core::{AppError, ErrorResponse, Paginated, PaginationParams};
use schoolhub_models::ids::SubjectId;
use tracing::instrument;

use crate::middleware::auth::RequireAdmin;
use crate::modules::subjects::model::{
    CreateSubjectDto, NewSubject, SubjectPatch, SubjectWithTeachers, UpdateSubjectDto,
};
use crate::modules::subjects::service::SubjectService;
use crate::state::AppState;
use crate::validator::{ValidatedJson, parse_path, parse_query};

#[utoipa::path(
    post,
    path = "/api/subjects",
    request_body = CreateSubjectDto,
    responses(
        (status = 201, description = "Subject created", body = SubjectWithTeachers),
        (status = 400, description = "Missing name or teachers", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "One or more teachers not found", body = ErrorResponse),
        (status = 409, description = "Subject name already taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Subjects"
)]
#[instrument(skip(state))]
pub async fn create_subject(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<CreateSubjectDto>,
) -> Result<(StatusCode, Json<SubjectWithTeachers>), AppError> {
    let subject = NewSubject::try_from(dto)?;
    let created = SubjectService::create(&state.db, subject).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/subjects",
    params(PaginationParams),
    responses(
        (status = 200, description = "Subjects with their teachers", body = Paginated<SubjectWithTeachers>)
    ),
    tag = "Subjects"
)]
#[instrument(skip(state))]
pub async fn get_subjects(
    State(state): State<AppState>,
    query: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<Paginated<SubjectWithTeachers>>, AppError> {
    let params = parse_query(query)?;
    let subjects = SubjectService::list(&state.db, params).await?;
    Ok(Json(subjects))
}

#[utoipa::path(
    get,
    path = "/api/subjects/{id}",
    params(("id" = SubjectId, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Subject", body = SubjectWithTeachers),
        (status = 404, description = "Subject not found", body = ErrorResponse)
    ),
    tag = "Subjects"
)]
#[instrument(skip(state))]
pub async fn get_subject(
    State(state): State<AppState>,
    path: Result<Path<SubjectId>, PathRejection>,
) -> Result<Json<SubjectWithTeachers>, AppError> {
    let id = parse_path(path)?;
    let subject = SubjectService::get(&state.db, id).await?;
    Ok(Json(subject))
}

#[utoipa::path(
    put,
    path = "/api/subjects/{id}",
    params(("id" = SubjectId, Path, description = "Subject ID")),
    request_body = UpdateSubjectDto,
    responses(
        (status = 200, description = "Subject updated", body = SubjectWithTeachers),
        (status = 400, description = "Nothing to update", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Subject or teacher not found", body = ErrorResponse),
        (status = 409, description = "Subject name already taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Subjects"
)]
#[instrument(skip(state))]
pub async fn update_subject(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    path: Result<Path<SubjectId>, PathRejection>,
    ValidatedJson(dto): ValidatedJson<UpdateSubjectDto>,
) -> Result<Json<SubjectWithTeachers>, AppError> {
    let id = parse_path(path)?;
    let patch = SubjectPatch::try_from(dto)?;
    let subject = SubjectService::update(&state.db, id, patch).await?;
    Ok(Json(subject))
}

#[utoipa::path(
    delete,
    path = "/api/subjects/{id}",
    params(("id" = SubjectId, Path, description = "Subject ID")),
    responses(
        (status = 204, description = "Subject deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Subject not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Subjects"
)]
#[instrument(skip(state))]
pub async fn delete_subject(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    path: Result<Path<SubjectId>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = parse_path(path)?;
    SubjectService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
