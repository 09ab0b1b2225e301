//! Direct conversations and their message history.
//!
//! Conversation and message writes are single-statement; the only
//! cross-row guarantee is that a conversation's preview is written after
//! the message it describes and never moves backwards in time.

use anyhow::anyhow;
use schoolhub_core::pagination::page_offset;
use schoolhub_core::{AppError, PaginationParams};
use schoolhub_models::ids::{ConversationId, UserId};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info, instrument};

use crate::metrics::{track_conversation_created, track_message_sent};
use crate::modules::messaging::model::{
    Conversation, DEFAULT_MESSAGE_PAGE_SIZE, Message, MessagePage, MessagePageMeta,
};
use crate::modules::people::identity;

pub struct MessagingService;

impl MessagingService {
    /// Returns the direct conversation between `caller` and `other`,
    /// creating it on first contact. Concurrent callers for the same pair
    /// all get the same conversation.
    #[instrument(skip(db))]
    pub async fn resolve_direct(
        db: &PgPool,
        caller: UserId,
        other: UserId,
    ) -> Result<Conversation, AppError> {
        if caller == other {
            return Err(AppError::invalid_field(
                "participant_id",
                "Cannot start a conversation with yourself",
            ));
        }

        let mut conn = db.acquire().await?;

        if identity::find_by_id(&mut conn, other).await?.is_none() {
            return Err(AppError::not_found(anyhow!("User not found")));
        }

        let (low, high) = if caller < other {
            (caller, other)
        } else {
            (other, caller)
        };

        let inserted = sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversations (is_group, participant_ids, participant_low, participant_high)
            VALUES (FALSE, $1, $2, $3)
            ON CONFLICT (participant_low, participant_high) WHERE NOT is_group DO NOTHING
            RETURNING *
            "#,
        )
        .bind(vec![low, high])
        .bind(low)
        .bind(high)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(conversation) = inserted {
            track_conversation_created();
            info!(conversation_id = %conversation.id, "Direct conversation created");
            return Ok(conversation);
        }

        debug!(%low, %high, "Direct conversation already exists");
        let existing = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT * FROM conversations
            WHERE NOT is_group AND participant_low = $1 AND participant_high = $2
            "#,
        )
        .bind(low)
        .bind(high)
        .fetch_one(&mut *conn)
        .await?;

        Ok(existing)
    }

    /// Conversations the caller takes part in, most recent activity first.
    #[instrument(skip(db))]
    pub async fn list_conversations(
        db: &PgPool,
        caller: UserId,
    ) -> Result<Vec<Conversation>, AppError> {
        let conversations = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT * FROM conversations
            WHERE $1 = ANY(participant_ids)
            ORDER BY COALESCE(last_message_at, created_at) DESC, id DESC
            "#,
        )
        .bind(caller)
        .fetch_all(db)
        .await?;
        Ok(conversations)
    }

    /// One page of history. Page 1 is the newest `limit` messages; each
    /// page is returned oldest first.
    #[instrument(skip(db))]
    pub async fn list_messages(
        db: &PgPool,
        conversation_id: ConversationId,
        caller: UserId,
        params: &PaginationParams,
    ) -> Result<MessagePage, AppError> {
        let mut conn = db.acquire().await?;
        load_for_participant(&mut conn, conversation_id, caller).await?;

        let page = params.page();
        let limit = params.limit_or(DEFAULT_MESSAGE_PAGE_SIZE);

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM messages WHERE conversation_id = $1",
        )
        .bind(conversation_id)
        .fetch_one(&mut *conn)
        .await?;

        let mut data = sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(conversation_id)
        .bind(limit)
        .bind(page_offset(page, limit))
        .fetch_all(&mut *conn)
        .await?;
        data.reverse();

        Ok(MessagePage {
            data,
            pagination: MessagePageMeta::new(page, limit, total),
        })
    }

    #[instrument(skip(db, text))]
    pub async fn append(
        db: &PgPool,
        conversation_id: ConversationId,
        caller: UserId,
        text: &str,
    ) -> Result<Message, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::invalid_field("text", "Message text is required"));
        }

        let mut conn = db.acquire().await?;
        load_for_participant(&mut conn, conversation_id, caller).await?;

        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (conversation_id, sender_id, text)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(conversation_id)
        .bind(caller)
        .bind(text)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            UPDATE conversations
            SET last_message_text = $2, last_message_at = $3, updated_at = NOW()
            WHERE id = $1 AND (last_message_at IS NULL OR last_message_at <= $3)
            "#,
        )
        .bind(conversation_id)
        .bind(&message.text)
        .bind(message.created_at)
        .execute(&mut *conn)
        .await?;

        track_message_sent();
        Ok(message)
    }
}

async fn load_for_participant(
    conn: &mut PgConnection,
    conversation_id: ConversationId,
    caller: UserId,
) -> Result<Conversation, AppError> {
    let conversation =
        sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = $1")
            .bind(conversation_id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Conversation not found")))?;

    if !conversation.has_participant(caller) {
        return Err(AppError::forbidden(anyhow!(
            "You are not a participant in this conversation"
        )));
    }
    Ok(conversation)
}
