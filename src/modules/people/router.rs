use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{delete_person, get_person};

pub fn init_people_router() -> Router<AppState> {
    Router::new().route("/{identity_id}", get(get_person).delete(delete_person))
}
