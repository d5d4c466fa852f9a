//! Database operations for channel messages

use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;
use uuid::Uuid;

use crate::shared::{ChatMessage, UserProfile};

/// Message joined with its author's profile
#[derive(Debug, Clone, sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    channel_id: Uuid,
    author_id: Uuid,
    body: String,
    created_at: DateTime<Utc>,
    nickname: String,
    first_name: String,
    last_name: String,
    email: String,
}

impl From<MessageRow> for ChatMessage {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            channel_id: row.channel_id,
            author_id: row.author_id,
            body: row.body,
            created_at: row.created_at,
            author: UserProfile {
                id: row.author_id,
                nickname: row.nickname,
                first_name: row.first_name,
                last_name: row.last_name,
                email: row.email,
            },
        }
    }
}

pub async fn insert_message(
    executor: impl SqliteExecutor<'_>,
    message: &ChatMessage,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO messages (id, channel_id, author_id, body, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(message.id)
    .bind(message.channel_id)
    .bind(message.author_id)
    .bind(&message.body)
    .bind(message.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Messages of a channel, oldest first
///
/// Stored timestamps carry a variable number of fractional digits, so text
/// order is not time order. Rows come back in insertion order and are then
/// stably sorted by their parsed `created_at`.
pub async fn list_messages(
    executor: impl SqliteExecutor<'_>,
    channel_id: Uuid,
) -> Result<Vec<ChatMessage>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT m.id, m.channel_id, m.author_id, m.body, m.created_at,
               u.nickname, u.first_name, u.last_name, u.email
        FROM messages m
        JOIN users u ON u.id = m.author_id
        WHERE m.channel_id = ?
        ORDER BY m.rowid
        "#,
    )
    .bind(channel_id)
    .fetch_all(executor)
    .await?;

    let mut messages: Vec<ChatMessage> = rows.into_iter().map(ChatMessage::from).collect();
    messages.sort_by_key(|m| m.created_at);
    Ok(messages)
}
