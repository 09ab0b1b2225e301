use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
};
use schoolhub_core::AppError;
use schoolhub_models::ids::UserId;
use schoolhub_models::people::Person;
use tracing::instrument;

use crate::middleware::auth::RequireAdmin;
use crate::modules::people::service::PeopleService;
use crate::state::AppState;
use crate::validator::parse_path;

#[utoipa::path(
    get,
    path = "/api/people/{identity_id}",
    params(
        ("identity_id" = UserId, Path, description = "Identity ID")
    ),
    responses(
        (status = 200, description = "Identity with its profile", body = Person),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only"),
        (status = 404, description = "User not found")
    ),
    tag = "People",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_person(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<Json<Person>, AppError> {
    let identity_id = parse_path(path)?;
    let person = PeopleService::get(&state.db, identity_id, None).await?;
    Ok(Json(person))
}

#[utoipa::path(
    delete,
    path = "/api/people/{identity_id}",
    params(
        ("identity_id" = UserId, Path, description = "Identity ID")
    ),
    responses(
        (status = 204, description = "Person and profile deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only, and not for your own account"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Teacher is still the class teacher of a class")
    ),
    tag = "People",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_person(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let identity_id = parse_path(path)?;
    let requested_by = auth_user.identity_id()?;
    PeopleService::delete(&state.db, identity_id, Some(requested_by)).await?;
    Ok(StatusCode::NO_CONTENT)
}
