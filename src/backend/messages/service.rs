/**
 * Channel Messages
 *
 * Posting re-checks membership on every message: a socket can outlive the
 * membership it was opened with, and a kicked user must not keep talking.
 */

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::auth::users::get_user_by_id;
use crate::backend::channels::db::{self as channel_db, Channel};
use crate::backend::error::ModerationError;
use crate::backend::messages::db;
use crate::backend::realtime::{Namespace, RealtimeHub};
use crate::shared::message::validate_body;
use crate::shared::{ChatMessage, RealtimeEvent};

#[derive(Clone)]
pub struct MessageService {
    pool: SqlitePool,
    hub: RealtimeHub,
}

impl MessageService {
    pub fn new(pool: SqlitePool, hub: RealtimeHub) -> Self {
        Self { pool, hub }
    }

    async fn member_channel(&self, caller: Uuid, channel_id: Uuid) -> Result<Channel, ModerationError> {
        let channel = channel_db::get_channel_by_id(&self.pool, channel_id)
            .await?
            .ok_or(ModerationError::ChannelNotFound)?;
        if !channel_db::is_member(&self.pool, caller, channel.id).await? {
            return Err(ModerationError::NotMember);
        }
        Ok(channel)
    }

    /// Persist a message and fan it out to the channel
    pub async fn post_message(
        &self,
        caller: Uuid,
        channel_id: Uuid,
        raw_body: &str,
    ) -> Result<ChatMessage, ModerationError> {
        let body = validate_body(raw_body)?;
        let channel = self.member_channel(caller, channel_id).await?;

        let author = get_user_by_id(&self.pool, caller)
            .await?
            .ok_or(ModerationError::UserNotFound)?;

        let message = ChatMessage {
            id: Uuid::new_v4(),
            channel_id: channel.id,
            author_id: author.id,
            body,
            created_at: Utc::now(),
            author: author.profile(),
        };

        let mut tx = channel_db::begin_write(&self.pool).await?;
        db::insert_message(&mut *tx, &message).await?;
        channel_db::touch_activity(&mut *tx, channel.id, message.created_at).await?;
        tx.commit().await?;

        tracing::debug!("[Messages] {} posted in '{}'", author.nickname, channel.name);

        self.hub.emit(
            &Namespace::Channel(channel.name.clone()),
            RealtimeEvent::message(&message),
        );

        Ok(message)
    }

    pub async fn list_messages(&self, caller: Uuid, channel_id: Uuid) -> Result<Vec<ChatMessage>, ModerationError> {
        let channel = self.member_channel(caller, channel_id).await?;
        Ok(db::list_messages(&self.pool, channel.id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::users::{create_user, NewUser, User};
    use crate::backend::channels::moderation::ChannelService;
    use crate::backend::server::config::load_database;
    use assert_matches::assert_matches;

    async fn user(pool: &SqlitePool, nickname: &str) -> User {
        create_user(
            pool,
            NewUser {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                nickname: nickname.to_string(),
                email: format!("{}@example.com", nickname),
                password_hash: "hash".to_string(),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_post_and_list_in_order() {
        let pool = load_database("sqlite::memory:").await.unwrap();
        let hub = RealtimeHub::new();
        let channels = ChannelService::new(pool.clone(), hub.clone());
        let messages = MessageService::new(pool.clone(), hub.clone());

        let alice = user(&pool, "alice").await;
        let created = channels.create_channel(alice.id, "lounge", true).await.unwrap();
        let channel_id = created.channel.id;

        let mut rx = hub.subscribe(&Namespace::Channel("lounge".to_string()));
        for body in ["one", "  two  ", "three"] {
            messages.post_message(alice.id, channel_id, body).await.unwrap();
        }

        let pushed = rx.recv().await.unwrap();
        assert_eq!(pushed.event.event_type.as_str(), "message");
        assert_eq!(pushed.event.payload["body"], "one");

        let listed = messages.list_messages(alice.id, channel_id).await.unwrap();
        let bodies: Vec<&str> = listed.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["one", "two", "three"]);
        assert_eq!(listed[0].author.nickname, "alice");

        let channel = channel_db::get_channel_by_id(&pool, channel_id).await.unwrap().unwrap();
        assert_eq!(channel.last_activity, Some(listed[2].created_at));
    }

    #[tokio::test]
    async fn test_non_member_cannot_post_or_read() {
        let pool = load_database("sqlite::memory:").await.unwrap();
        let hub = RealtimeHub::new();
        let channels = ChannelService::new(pool.clone(), hub.clone());
        let messages = MessageService::new(pool.clone(), hub);

        let alice = user(&pool, "alice").await;
        let bob = user(&pool, "bob").await;
        let created = channels.create_channel(alice.id, "lounge", true).await.unwrap();

        assert_matches!(
            messages.post_message(bob.id, created.channel.id, "hi").await,
            Err(ModerationError::NotMember)
        );
        assert_matches!(
            messages.list_messages(bob.id, created.channel.id).await,
            Err(ModerationError::NotMember)
        );
        assert_matches!(
            messages.list_messages(alice.id, Uuid::new_v4()).await,
            Err(ModerationError::ChannelNotFound)
        );
        assert_matches!(
            messages.post_message(alice.id, created.channel.id, "   ").await,
            Err(ModerationError::Invalid(_))
        );
    }
}
