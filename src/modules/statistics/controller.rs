use axum::{Json, extract::State};
use schoolhub_core::AppError;
use schoolhub_models::statistics::Statistics;
use tracing::instrument;

use crate::modules::statistics::service::StatisticsService;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/statistics",
    responses(
        (status = 200, description = "School-wide counters", body = Statistics),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin only")
    ),
    tag = "Statistics",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_statistics(State(state): State<AppState>) -> Result<Json<Statistics>, AppError> {
    let stats = StatisticsService::get(&state.db).await?;
    Ok(Json(stats))
}
