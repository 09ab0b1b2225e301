use axum::{
    Json,
    extract::{Path, Query, State, rejection::{PathRejection, QueryRejection}},
    http::StatusCode,
};
use schoolhub_core::{AppError, ErrorResponse, PaginationParams};
use schoolhub_models::ids::ConversationId;
use tracing::instrument;

use crate::middleware::auth::RequireAuthenticated;
use crate::modules::messaging::model::{
    Conversation, DirectConversationDto, Message, MessagePage, SendMessageDto,
};
use crate::modules::messaging::service::MessagingService;
use crate::state::AppState;
use crate::validator::{ValidatedJson, parse_path, parse_query};

#[utoipa::path(
    post,
    path = "/api/conversations/direct",
    request_body = DirectConversationDto,
    responses(
        (status = 200, description = "Existing or newly created direct conversation", body = Conversation),
        (status = 400, description = "Cannot message yourself", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Messaging"
)]
#[instrument(skip(state))]
pub async fn resolve_direct_conversation(
    State(state): State<AppState>,
    RequireAuthenticated(auth_user): RequireAuthenticated,
    ValidatedJson(dto): ValidatedJson<DirectConversationDto>,
) -> Result<Json<Conversation>, AppError> {
    let caller = auth_user.identity_id()?;
    let conversation =
        MessagingService::resolve_direct(&state.db, caller, dto.participant_id).await?;
    Ok(Json(conversation))
}

#[utoipa::path(
    get,
    path = "/api/conversations",
    responses(
        (status = 200, description = "Caller's conversations, latest activity first", body = Vec<Conversation>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Messaging"
)]
#[instrument(skip(state))]
pub async fn get_conversations(
    State(state): State<AppState>,
    RequireAuthenticated(auth_user): RequireAuthenticated,
) -> Result<Json<Vec<Conversation>>, AppError> {
    let caller = auth_user.identity_id()?;
    let conversations = MessagingService::list_conversations(&state.db, caller).await?;
    Ok(Json(conversations))
}

#[utoipa::path(
    get,
    path = "/api/conversations/{id}/messages",
    params(
        ("id" = ConversationId, Path, description = "Conversation ID"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Messages, page 1 being the most recent", body = MessagePage),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Messaging"
)]
#[instrument(skip(state))]
pub async fn get_messages(
    State(state): State<AppState>,
    RequireAuthenticated(auth_user): RequireAuthenticated,
    path: Result<Path<ConversationId>, PathRejection>,
    query: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<MessagePage>, AppError> {
    let id = parse_path(path)?;
    let params = parse_query(query)?;
    let caller = auth_user.identity_id()?;
    let page = MessagingService::list_messages(&state.db, id, caller, &params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/api/conversations/{id}/messages",
    params(("id" = ConversationId, Path, description = "Conversation ID")),
    request_body = SendMessageDto,
    responses(
        (status = 201, description = "Message sent", body = Message),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Messaging"
)]
#[instrument(skip(state, dto))]
pub async fn send_message(
    State(state): State<AppState>,
    RequireAuthenticated(auth_user): RequireAuthenticated,
    path: Result<Path<ConversationId>, PathRejection>,
    ValidatedJson(dto): ValidatedJson<SendMessageDto>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let id = parse_path(path)?;
    let caller = auth_user.identity_id()?;
    let message = MessagingService::append(&state.db, id, caller, &dto.text).await?;
    Ok((StatusCode::CREATED, Json(message)))
}
