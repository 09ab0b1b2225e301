use axum::{
    Json,
    extract::{Path, Query, State, rejection::{PathRejection, QueryRejection}},
    http::StatusCode,
};
use schoolhub_core::{AppError, ErrorResponse, Paginated, PaginationParams};
use schoolhub_models::ids::UserId;
use schoolhub_models::people::Person;
use schoolhub_models::people_input::{NewPerson, PersonPatch};
use tracing::instrument;

use crate::modules::admins::model::{AdminSummary, CreateAdminDto, UpdateAdminDto};
use crate::modules::admins::service::AdminService;
use crate::modules::people::PeopleService;
use crate::state::AppState;
use crate::validator::{ValidatedJson, parse_path, parse_query};

#[utoipa::path(
    post,
    path = "/api/admins",
    request_body = CreateAdminDto,
    responses(
        (status = 201, description = "Admin created", body = Person),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
#[instrument(skip(state, dto))]
pub async fn create_admin(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateAdminDto>,
) -> Result<(StatusCode, Json<Person>), AppError> {
    let person = NewPerson::try_from(dto)?;
    let created = PeopleService::create(&state.db, person).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/admins",
    params(PaginationParams),
    responses(
        (status = 200, description = "Admins, newest first", body = Paginated<AdminSummary>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
#[instrument(skip(state))]
pub async fn get_admins(
    State(state): State<AppState>,
    query: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<Paginated<AdminSummary>>, AppError> {
    let params = parse_query(query)?;
    let admins = AdminService::list(&state.db, params).await?;
    Ok(Json(admins))
}

#[utoipa::path(
    put,
    path = "/api/admins/{identity_id}",
    params(("identity_id" = UserId, Path, description = "Identity ID of the admin")),
    request_body = UpdateAdminDto,
    responses(
        (status = 200, description = "Admin updated", body = Person),
        (status = 400, description = "Empty update or invalid field", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin only", body = ErrorResponse),
        (status = 404, description = "Admin not found", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
#[instrument(skip(state, dto))]
pub async fn update_admin(
    State(state): State<AppState>,
    path: Result<Path<UserId>, PathRejection>,
    ValidatedJson(dto): ValidatedJson<UpdateAdminDto>,
) -> Result<Json<Person>, AppError> {
    let identity_id = parse_path(path)?;
    let patch = PersonPatch::try_from(dto)?;
    let person = PeopleService::update(&state.db, identity_id, patch).await?;
    Ok(Json(person))
}
