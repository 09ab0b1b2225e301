//! Conversations and messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{ConversationId, MessageId, UserId};

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Conversation {
    pub id: ConversationId,
    pub is_group: bool,
    pub title: Option<String>,
    pub participant_ids: Vec<UserId>,
    pub last_message_text: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn has_participant(&self, user_id: UserId) -> bool {
        self.participant_ids.contains(&user_id)
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct DirectConversationDto {
    /// Identity id of the other participant.
    pub participant_id: UserId,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct SendMessageDto {
    #[validate(length(max = 5000))]
    pub text: String,
}

/// Default page size for message history.
pub const DEFAULT_MESSAGE_PAGE_SIZE: i64 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessagePageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub has_more: bool,
}

impl MessagePageMeta {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        Self {
            page,
            limit,
            total,
            has_more: page.saturating_mul(limit) < total,
        }
    }
}

/// One page of history, oldest first within the page. Page 1 holds the
/// most recent messages.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessagePage {
    pub data: Vec<Message>,
    pub pagination: MessagePageMeta,
}
