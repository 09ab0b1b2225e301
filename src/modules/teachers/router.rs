use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::teachers::controller::{
    create_teacher, get_teacher, get_teacher_directory, get_teachers, update_teacher,
};
use crate::state::AppState;

pub fn init_teachers_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_teacher).get(get_teachers))
        .route("/directory", get(get_teacher_directory))
        .route("/{identity_id}", get(get_teacher).put(update_teacher))
}
