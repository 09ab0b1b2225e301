use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::parents::controller::{create_parent, get_parent, get_parents, update_parent};
use crate::state::AppState;

pub fn init_parents_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_parent).get(get_parents))
        .route("/{identity_id}", get(get_parent).put(update_parent))
}
