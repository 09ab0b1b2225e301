use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::get_statistics;

pub fn init_statistics_router() -> Router<AppState> {
    Router::new().route("/", get(get_statistics))
}
