/**
 * Invitations
 *
 * `InviteService` issues invites, lists them for their recipient, and
 * resolves them. At most one pending invite exists per (channel, user): a
 * new invite replaces the old one in the same transaction.
 *
 * An invite from the creator lifts a ban on its target. Anyone else's invite
 * to a banned user is refused.
 */

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::auth::users::find_user_by_nickname;
use crate::backend::channels::db as channel_db;
use crate::backend::error::ModerationError;
use crate::backend::invites::db::{self, Invite};
use crate::backend::realtime::{Namespace, RealtimeHub};
use crate::shared::{
    normalize_channel_name, normalize_nickname, ChannelSummary, InviteAction, InviteStatus,
    InviteView, RealtimeEvent,
};

#[derive(Debug, Clone)]
pub struct InviteCreated {
    pub invite_id: Uuid,
    pub target_id: Uuid,
    /// The creator's invite removed the target's kick-log rows
    pub ban_cleared: bool,
}

#[derive(Debug, Clone)]
pub struct InviteResolution {
    pub status: InviteStatus,
    /// Present when the invite was accepted
    pub channel: Option<ChannelSummary>,
}

#[derive(Clone)]
pub struct InviteService {
    pool: SqlitePool,
    hub: RealtimeHub,
}

impl InviteService {
    pub fn new(pool: SqlitePool, hub: RealtimeHub) -> Self {
        Self { pool, hub }
    }

    pub async fn create(
        &self,
        caller: Uuid,
        raw_channel: &str,
        raw_target: &str,
    ) -> Result<InviteCreated, ModerationError> {
        let name = normalize_channel_name(raw_channel)?;
        let nickname = normalize_nickname(raw_target)?;

        let channel = channel_db::get_channel_by_name(&self.pool, &name)
            .await?
            .ok_or(ModerationError::ChannelNotFound)?;

        if !channel_db::is_member(&self.pool, caller, channel.id).await? {
            return Err(ModerationError::NotMember);
        }
        if !channel.public && !channel.is_creator(caller) {
            return Err(ModerationError::Forbidden("Only the creator can invite to a private channel"));
        }

        let target = find_user_by_nickname(&self.pool, &nickname)
            .await?
            .ok_or(ModerationError::UserNotFound)?;

        if channel_db::is_member(&self.pool, target.id, channel.id).await? {
            return Err(ModerationError::AlreadyMember);
        }

        let banned = channel_db::is_banned(&self.pool, channel.id, target.id).await?;
        if banned && !channel.is_creator(caller) {
            return Err(ModerationError::TargetBanned);
        }

        let invite = Invite::new(channel.id, target.id);

        let mut tx = channel_db::begin_write(&self.pool).await?;
        if banned {
            channel_db::clear_kicks(&mut *tx, channel.id, target.id).await?;
        }
        db::delete_pending(&mut *tx, channel.id, target.id).await?;
        db::insert_invite(&mut *tx, &invite).await?;
        tx.commit().await?;

        if banned {
            tracing::info!("[Invites] Creator lifted the ban on {} in '{}'", target.nickname, channel.name);
        }
        tracing::info!("[Invites] {} invited {} to '{}'", caller, target.nickname, channel.name);

        self.hub.emit(
            &Namespace::User(target.id),
            RealtimeEvent::invite_new(invite.id, &channel.name),
        );

        Ok(InviteCreated {
            invite_id: invite.id,
            target_id: target.id,
            ban_cleared: banned,
        })
    }

    pub async fn list_pending(&self, caller: Uuid) -> Result<Vec<InviteView>, ModerationError> {
        Ok(db::pending_for_user(&self.pool, caller).await?)
    }

    pub async fn respond(
        &self,
        caller: Uuid,
        invite_id: Uuid,
        raw_action: &str,
    ) -> Result<InviteResolution, ModerationError> {
        let action: InviteAction = raw_action.parse()?;

        let invite = db::get_invite(&self.pool, invite_id)
            .await?
            .filter(|invite| invite.to_user_id == caller)
            .ok_or(ModerationError::InviteNotFound)?;

        if invite.status != InviteStatus::Pending {
            return Err(ModerationError::InviteResolved);
        }
        if invite.is_expired(Utc::now()) {
            return Err(ModerationError::InviteExpired);
        }

        let channel = channel_db::get_channel_by_id(&self.pool, invite.channel_id)
            .await?
            .ok_or(ModerationError::ChannelNotFound)?;

        match action {
            InviteAction::Decline => {
                db::set_status(&self.pool, invite.id, InviteStatus::Declined).await?;
                tracing::info!("[Invites] {} declined '{}'", caller, channel.name);
                Ok(InviteResolution {
                    status: InviteStatus::Declined,
                    channel: None,
                })
            }
            InviteAction::Accept => {
                if channel_db::is_banned(&self.pool, channel.id, caller).await? {
                    return Err(ModerationError::Banned);
                }

                let mut tx = channel_db::begin_write(&self.pool).await?;
                channel_db::add_member(&mut *tx, caller, channel.id).await?;
                db::set_status(&mut *tx, invite.id, InviteStatus::Accepted).await?;
                tx.commit().await?;

                tracing::info!("[Invites] {} accepted '{}'", caller, channel.name);
                self.hub.emit(
                    &Namespace::Channel(channel.name.clone()),
                    RealtimeEvent::members_updated(),
                );

                let members = channel_db::member_ids(&self.pool, channel.id).await?;
                Ok(InviteResolution {
                    status: InviteStatus::Accepted,
                    channel: Some(channel.summary(members)),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::users::{create_user, NewUser, User};
    use crate::backend::channels::moderation::ChannelService;
    use crate::backend::error::ModerationError;
    use crate::backend::server::config::load_database;
    use assert_matches::assert_matches;

    struct Fixture {
        pool: SqlitePool,
        hub: RealtimeHub,
        invites: InviteService,
        channels: ChannelService,
    }

    async fn fixture() -> Fixture {
        let pool = load_database("sqlite::memory:").await.unwrap();
        let hub = RealtimeHub::new();
        Fixture {
            invites: InviteService::new(pool.clone(), hub.clone()),
            channels: ChannelService::new(pool.clone(), hub.clone()),
            pool,
            hub,
        }
    }

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
    async fn test_invite_and_accept_private_channel() {
        let fx = fixture().await;
        let owner = user(&fx.pool, "owner").await;
        let guest = user(&fx.pool, "guest").await;
        fx.channels.create_channel(owner.id, "secret", false).await.unwrap();

        let mut inbox = fx.hub.subscribe(&Namespace::User(guest.id));
        let created = fx.invites.create(owner.id, "Secret", "GUEST").await.unwrap();
        assert_eq!(created.target_id, guest.id);
        assert!(!created.ban_cleared);

        let notification = inbox.recv().await.unwrap();
        assert_eq!(notification.event.event_type.as_str(), "invite:new");

        let pending = fx.invites.list_pending(guest.id).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].channel_name, "secret");

        let resolution = fx.invites.respond(guest.id, created.invite_id, "accept").await.unwrap();
        assert_eq!(resolution.status, InviteStatus::Accepted);
        let channel = resolution.channel.unwrap();
        assert!(channel.members.contains(&guest.id));

        assert!(fx.invites.list_pending(guest.id).await.unwrap().is_empty());
        assert_matches!(
            fx.invites.respond(guest.id, created.invite_id, "accept").await,
            Err(ModerationError::InviteResolved)
        );
    }

    #[tokio::test]
    async fn test_reinvite_replaces_pending() {
        let fx = fixture().await;
        let owner = user(&fx.pool, "owner").await;
        let guest = user(&fx.pool, "guest").await;
        fx.channels.create_channel(owner.id, "lounge", true).await.unwrap();

        let first = fx.invites.create(owner.id, "lounge", "guest").await.unwrap();
        let second = fx.invites.create(owner.id, "lounge", "guest").await.unwrap();
        assert_ne!(first.invite_id, second.invite_id);

        let pending = fx.invites.list_pending(guest.id).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, second.invite_id);
        assert_matches!(
            fx.invites.respond(guest.id, first.invite_id, "accept").await,
            Err(ModerationError::InviteNotFound)
        );
    }

    #[tokio::test]
    async fn test_private_channel_invites_are_creator_only() {
        let fx = fixture().await;
        let owner = user(&fx.pool, "owner").await;
        let member = user(&fx.pool, "member").await;
        let outsider = user(&fx.pool, "outsider").await;
        fx.channels.create_channel(owner.id, "vault", false).await.unwrap();

        let invite = fx.invites.create(owner.id, "vault", "member").await.unwrap();
        fx.invites.respond(member.id, invite.invite_id, "accept").await.unwrap();

        assert_matches!(
            fx.invites.create(member.id, "vault", "outsider").await,
            Err(ModerationError::Forbidden(_))
        );
        assert_matches!(
            fx.invites.create(outsider.id, "vault", "member").await,
            Err(ModerationError::NotMember)
        );
        assert_matches!(
            fx.invites.create(owner.id, "vault", "member").await,
            Err(ModerationError::AlreadyMember)
        );
        assert_matches!(
            fx.invites.create(owner.id, "vault", "nobody").await,
            Err(ModerationError::UserNotFound)
        );
    }

    #[tokio::test]
    async fn test_creator_invite_lifts_ban() {
        let fx = fixture().await;
        let owner = user(&fx.pool, "owner").await;
        let member = user(&fx.pool, "member").await;
        let target = user(&fx.pool, "target").await;
        fx.channels.create_channel(owner.id, "plaza", true).await.unwrap();
        fx.channels.join(member.id, "plaza").await.unwrap();
        fx.channels.join(target.id, "plaza").await.unwrap();

        fx.channels.kick(owner.id, "plaza", "target").await.unwrap();
        assert_matches!(fx.channels.join(target.id, "plaza").await, Err(ModerationError::Banned));

        assert_matches!(
            fx.invites.create(member.id, "plaza", "target").await,
            Err(ModerationError::TargetBanned)
        );

        let invite = fx.invites.create(owner.id, "plaza", "target").await.unwrap();
        assert!(invite.ban_cleared);
        fx.invites.respond(target.id, invite.invite_id, "accept").await.unwrap();
        let plaza = channel_db::get_channel_by_name(&fx.pool, "plaza").await.unwrap().unwrap();
        assert!(channel_db::is_member(&fx.pool, target.id, plaza.id).await.unwrap());
        assert!(!channel_db::is_banned(&fx.pool, plaza.id, target.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_decline_and_bad_action() {
        let fx = fixture().await;
        let owner = user(&fx.pool, "owner").await;
        let guest = user(&fx.pool, "guest").await;
        let stranger = user(&fx.pool, "stranger").await;
        fx.channels.create_channel(owner.id, "lounge", true).await.unwrap();
        let invite = fx.invites.create(owner.id, "lounge", "guest").await.unwrap();

        assert_matches!(
            fx.invites.respond(guest.id, invite.invite_id, "maybe").await,
            Err(ModerationError::Invalid(_))
        );
        assert_matches!(
            fx.invites.respond(stranger.id, invite.invite_id, "accept").await,
            Err(ModerationError::InviteNotFound)
        );

        let resolution = fx.invites.respond(guest.id, invite.invite_id, " Decline ").await.unwrap();
        assert_eq!(resolution.status, InviteStatus::Declined);
        assert!(resolution.channel.is_none());
    }

    #[tokio::test]
    async fn test_expired_invite_is_hidden_and_refused() {
        let fx = fixture().await;
        let owner = user(&fx.pool, "owner").await;
        let guest = user(&fx.pool, "guest").await;
        fx.channels.create_channel(owner.id, "vault", false).await.unwrap();
        let invite = fx.invites.create(owner.id, "vault", "guest").await.unwrap();

        sqlx::query("UPDATE invites SET expires_at = ? WHERE id = ?")
            .bind(Utc::now() - chrono::Duration::days(1))
            .bind(invite.invite_id)
            .execute(&fx.pool)
            .await
            .unwrap();

        assert!(fx.invites.list_pending(guest.id).await.unwrap().is_empty());
        assert_matches!(
            fx.invites.respond(guest.id, invite.invite_id, "accept").await,
            Err(ModerationError::InviteExpired)
        );
        assert_matches!(fx.channels.join(guest.id, "vault").await, Err(ModerationError::Forbidden(_)));
    }
}
