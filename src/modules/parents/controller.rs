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

use crate::middleware::auth::{RequireAdmin, RequireStaff};
use crate::modules::parents::model::{CreateParentDto, ParentSummary, UpdateParentDto};
use crate::modules::parents::service::ParentService;
use crate::modules::people::PeopleService;
use crate::state::AppState;
use crate::validator::{ValidatedJson, parse_path, parse_query};

#[utoipa::path(
    post,
    path = "/api/parents",
    request_body = CreateParentDto,
    responses(
        (status = 201, description = "Parent created", body = Person),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 409, description = "Email or parent code already taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Parents"
)]
#[instrument(skip(state, dto))]
pub async fn create_parent(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<CreateParentDto>,
) -> Result<(StatusCode, Json<Person>), AppError> {
    let person = NewPerson::try_from(dto)?;
    let created = PeopleService::create(&state.db, person).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/parents",
    params(PaginationParams),
    responses(
        (status = 200, description = "Parents, newest first", body = Paginated<ParentSummary>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - staff only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Parents"
)]
#[instrument(skip(state))]
pub async fn get_parents(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    query: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<Paginated<ParentSummary>>, AppError> {
    let params = parse_query(query)?;
    let parents = ParentService::list(&state.db, params).await?;
    Ok(Json(parents))
}

#[utoipa::path(
    get,
    path = "/api/parents/{identity_id}",
    params(("identity_id" = UserId, Path, description = "Identity ID of the parent")),
    responses(
        (status = 200, description = "Parent", body = Person),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - staff only", body = ErrorResponse),
        (status = 404, description = "Parent not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Parents"
)]
#[instrument(skip(state))]
pub async fn get_parent(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<Json<Person>, AppError> {
    let identity_id = parse_path(path)?;
    let person = PeopleService::get(&state.db, identity_id, Some(ProfileKind::Parent)).await?;
    Ok(Json(person))
}

#[utoipa::path(
    put,
    path = "/api/parents/{identity_id}",
    params(("identity_id" = UserId, Path, description = "Identity ID of the parent")),
    request_body = UpdateParentDto,
    responses(
        (status = 200, description = "Parent updated", body = Person),
        (status = 400, description = "Empty update or invalid field", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Parent not found", body = ErrorResponse),
        (status = 409, description = "Email or parent code already taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Parents"
)]
#[instrument(skip(state, dto))]
pub async fn update_parent(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    path: Result<Path<UserId>, PathRejection>,
    ValidatedJson(dto): ValidatedJson<UpdateParentDto>,
) -> Result<Json<Person>, AppError> {
    let identity_id = parse_path(path)?;
    let patch = PersonPatch::try_from(dto)?;
    let person = PeopleService::update(&state.db, identity_id, patch).await?;
    Ok(Json(person))
}
