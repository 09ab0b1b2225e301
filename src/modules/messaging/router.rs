use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::messaging::controller::{
    get_conversations, get_messages, resolve_direct_conversation, send_message,
};
use crate::state::AppState;

pub fn init_conversations_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_conversations))
        .route("/direct", post(resolve_direct_conversation))
        .route("/{id}/messages", get(get_messages).post(send_message))
}
