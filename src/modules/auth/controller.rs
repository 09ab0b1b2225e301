use axum::{Json, extract::State};
use schoolhub_core::{AppError, ErrorResponse};
use schoolhub_models::auth::{LoginRequest, LoginResponse};
use schoolhub_models::people::Person;
use tracing::instrument;

use crate::middleware::auth::RequireAuthenticated;
use crate::modules::auth::service::AuthService;
use crate::modules::people::PeopleService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Login and receive a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Bad request - validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login(&state.db, dto, &state.jwt_config).await?;
    Ok(Json(response))
}

/// The caller's own account and profile
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = Person),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    RequireAuthenticated(auth_user): RequireAuthenticated,
) -> Result<Json<Person>, AppError> {
    let person = PeopleService::get(&state.db, auth_user.identity_id()?, None).await?;
    Ok(Json(person))
}
