use axum::{
    Router,
    routing::{post, put},
};

use crate::modules::admins::controller::{create_admin, get_admins, update_admin};
use crate::state::AppState;

pub fn init_admins_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_admin).get(get_admins))
        .route("/{identity_id}", put(update_admin))
}
