use axum::{
    Json,
    extract::{Path, Query, State, rejection::{PathRejection, QueryRejection}},
    http::StatusCode,
};
use schoolhub_core::{AppError, ErrorResponse, Paginated};
use schoolhub_models::ids::ClassId;
use tracing::instrument;

use crate::middleware::auth::{RequireAdmin, RequireSchoolMember};
use crate::modules::classes::model::{
    ClassFilterParams, ClassPatch, ClassRecord, ClassSummary, CreateClassDto, NewClass,
    UpdateClassDto,
};
use crate::modules::classes::service::ClassService;
use crate::state::AppState;
use crate::validator::{ValidatedJson, parse_path, parse_query};

#[utoipa::path(
    post,
    path = "/api/classes",
    request_body = CreateClassDto,
    responses(
        (status = 201, description = "Class created", body = ClassRecord),
        (status = 400, description = "Missing name or teacher", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 409, description = "Class name already taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn create_class(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<CreateClassDto>,
) -> Result<(StatusCode, Json<ClassRecord>), AppError> {
    let class = NewClass::try_from(dto)?;
    let record = ClassService::create(&state.db, class).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/api/classes",
    params(ClassFilterParams),
    responses(
        (status = 200, description = "Classes with their class teacher", body = Paginated<ClassSummary>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_classes(
    State(state): State<AppState>,
    RequireSchoolMember(_member): RequireSchoolMember,
    query: Result<Query<ClassFilterParams>, QueryRejection>,
) -> Result<Json<Paginated<ClassSummary>>, AppError> {
    let filters = parse_query(query)?;
    let classes = ClassService::list(&state.db, filters).await?;
    Ok(Json(classes))
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}",
    params(("id" = ClassId, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class", body = ClassSummary),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_class(
    State(state): State<AppState>,
    RequireSchoolMember(_member): RequireSchoolMember,
    path: Result<Path<ClassId>, PathRejection>,
) -> Result<Json<ClassSummary>, AppError> {
    let id = parse_path(path)?;
    let class = ClassService::get(&state.db, id).await?;
    Ok(Json(class))
}

#[utoipa::path(
    put,
    path = "/api/classes/{id}",
    params(("id" = ClassId, Path, description = "Class ID")),
    request_body = UpdateClassDto,
    responses(
        (status = 200, description = "Class updated", body = ClassRecord),
        (status = 400, description = "Empty update or blank name", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Class or teacher not found", body = ErrorResponse),
        (status = 409, description = "Class name already taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn update_class(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    path: Result<Path<ClassId>, PathRejection>,
    ValidatedJson(dto): ValidatedJson<UpdateClassDto>,
) -> Result<Json<ClassRecord>, AppError> {
    let id = parse_path(path)?;
    let patch = ClassPatch::try_from(dto)?;
    let record = ClassService::update(&state.db, id, patch).await?;
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/api/classes/{id}",
    params(("id" = ClassId, Path, description = "Class ID")),
    responses(
        (status = 204, description = "Class deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse),
        (status = 409, description = "Students are still enrolled", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn delete_class(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    path: Result<Path<ClassId>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = parse_path(path)?;
    ClassService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
