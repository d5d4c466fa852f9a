/**
 * Channel Membership & Moderation
 *
 * `ChannelService` owns the rules for creating, joining, leaving, deleting,
 * and re-configuring channels, and for removing members by kick or revoke.
 *
 * # Ordering
 *
 * Every operation writes the database first and only then broadcasts to the
 * channel namespace. Broadcasts are fire-and-forget: a crash between the two
 * leaves persisted state correct and connected clients stale until they
 * re-fetch.
 *
 * # Bans
 *
 * A kick appends rows to the kick ledger: three for the creator, one for
 * anyone else. Three or more rows against a user in a channel is a ban. The
 * count includes every voter.
 *
 * # Concurrency
 *
 * Channel creation treats the unique-name constraint as the lock: a loser of
 * the race sees a unique violation and retries once as a join. Kicks re-check
 * the voter's ledger row and the target's membership inside the transaction
 * that writes them. Write transactions take the SQLite write lock up front
 * (`db::begin_write`), so a concurrent kick waits and then loses on the rule
 * check instead of failing on the lock.
 */

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::auth::users::{find_user_by_nickname, User};
use crate::backend::channels::db::{
    self, Channel, CREATOR_KICK_WEIGHT, MEMBER_KICK_WEIGHT,
};
use crate::backend::error::ModerationError;
use crate::backend::invites::db as invite_db;
use crate::backend::realtime::{Namespace, RealtimeHub};
use crate::shared::{
    normalize_channel_name, normalize_nickname, ChannelSummary, InviteStatus, RealtimeEvent,
    UserProfile,
};

pub type ModerationResult<T> = Result<T, ModerationError>;

#[derive(Debug, Clone)]
pub struct CreateOutcome {
    pub channel: ChannelSummary,
    /// True when an existing public channel was joined instead of created
    pub was_joined: bool,
}

#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub channel: ChannelSummary,
    pub already_member: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The creator left, so the channel is gone
    Deleted,
    Left,
}

#[derive(Debug, Clone)]
pub struct PrivacyOutcome {
    pub channel: ChannelSummary,
    pub unchanged: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct KickOutcome {
    pub target_id: Uuid,
    /// Ledger rows this kick added
    pub votes_added: i64,
    /// Ledger rows against the target after this kick
    pub total_votes: i64,
}

#[derive(Clone)]
pub struct ChannelService {
    pool: SqlitePool,
    hub: RealtimeHub,
}

impl ChannelService {
    pub fn new(pool: SqlitePool, hub: RealtimeHub) -> Self {
        Self { pool, hub }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn channel_by_name(&self, raw_name: &str) -> ModerationResult<Channel> {
        let name = normalize_channel_name(raw_name)?;
        db::get_channel_by_name(&self.pool, &name)
            .await?
            .ok_or(ModerationError::ChannelNotFound)
    }

    async fn channel_by_id(&self, id: Uuid) -> ModerationResult<Channel> {
        db::get_channel_by_id(&self.pool, id)
            .await?
            .ok_or(ModerationError::ChannelNotFound)
    }

    /// Look up a user by an already-normalized nickname
    async fn user_by_nickname(&self, nickname: &str) -> ModerationResult<User> {
        find_user_by_nickname(&self.pool, nickname)
            .await?
            .ok_or(ModerationError::UserNotFound)
    }

    async fn summary(&self, channel: &Channel) -> ModerationResult<ChannelSummary> {
        let members = db::member_ids(&self.pool, channel.id).await?;
        Ok(channel.summary(members))
    }

    fn emit(&self, channel: &Channel, event: RealtimeEvent) {
        self.hub.emit(&Namespace::Channel(channel.name.clone()), event);
    }

    /// Create a channel, or join it when a public one already has the name
    pub async fn create_channel(
        &self,
        caller: Uuid,
        raw_name: &str,
        is_public: bool,
    ) -> ModerationResult<CreateOutcome> {
        let name = normalize_channel_name(raw_name)?;

        if let Some(outcome) = self.join_existing(caller, &name).await? {
            return Ok(outcome);
        }

        match self.insert_with_creator(caller, &name, is_public).await {
            Ok(channel) => {
                tracing::info!("[Channels] {} created '{}' (public: {})", caller, name, is_public);
                Ok(CreateOutcome {
                    channel: channel.summary(vec![caller]),
                    was_joined: false,
                })
            }
            Err(ModerationError::Database(e)) if db::is_unique_violation(&e) => {
                tracing::info!("[Channels] Lost creation race for '{}', joining instead", name);
                self.join_existing(caller, &name)
                    .await?
                    .ok_or(ModerationError::ChannelNotFound)
            }
            Err(e) => Err(e),
        }
    }

    /// Auto-join path of channel creation. `None` when no channel has `name`.
    async fn join_existing(&self, caller: Uuid, name: &str) -> ModerationResult<Option<CreateOutcome>> {
        let Some(channel) = db::get_channel_by_name(&self.pool, name).await? else {
            return Ok(None);
        };

        if !channel.public {
            return Err(ModerationError::ChannelExists);
        }
        if db::is_banned(&self.pool, channel.id, caller).await? {
            return Err(ModerationError::Banned);
        }

        if db::add_member(&self.pool, caller, channel.id).await? {
            tracing::info!("[Channels] {} joined existing '{}' on create", caller, channel.name);
            self.emit(&channel, RealtimeEvent::members_updated());
        }

        Ok(Some(CreateOutcome {
            channel: self.summary(&channel).await?,
            was_joined: true,
        }))
    }

    async fn insert_with_creator(
        &self,
        caller: Uuid,
        name: &str,
        is_public: bool,
    ) -> ModerationResult<Channel> {
        let channel = Channel::new(name.to_string(), caller, is_public);

        let mut tx = db::begin_write(&self.pool).await?;
        db::insert_channel(&mut *tx, &channel).await?;
        db::add_member(&mut *tx, caller, channel.id).await?;
        tx.commit().await?;

        Ok(channel)
    }

    pub async fn join(&self, caller: Uuid, raw_name: &str) -> ModerationResult<JoinOutcome> {
        let channel = self.channel_by_name(raw_name).await?;

        if db::is_banned(&self.pool, channel.id, caller).await? {
            tracing::warn!("[Channels] Banned user {} tried to join '{}'", caller, channel.name);
            return Err(ModerationError::Banned);
        }

        if db::is_member(&self.pool, caller, channel.id).await? {
            return Ok(JoinOutcome {
                channel: self.summary(&channel).await?,
                already_member: true,
            });
        }

        if channel.public {
            db::add_member(&self.pool, caller, channel.id).await?;
        } else {
            let invite = invite_db::find_pending_invite(&self.pool, channel.id, caller)
                .await?
                .ok_or(ModerationError::Forbidden("Private channel requires an invite"))?;

            let mut tx = db::begin_write(&self.pool).await?;
            invite_db::set_status(&mut *tx, invite.id, InviteStatus::Accepted).await?;
            db::add_member(&mut *tx, caller, channel.id).await?;
            tx.commit().await?;
        }

        tracing::info!("[Channels] {} joined '{}'", caller, channel.name);
        self.emit(&channel, RealtimeEvent::members_updated());

        Ok(JoinOutcome {
            channel: self.summary(&channel).await?,
            already_member: false,
        })
    }

    /// Leave a channel. The creator leaving deletes it.
    pub async fn leave(&self, caller: Uuid, raw_name: &str) -> ModerationResult<LeaveOutcome> {
        let channel = self.channel_by_name(raw_name).await?;

        if channel.is_creator(caller) {
            self.destroy(&channel).await?;
            return Ok(LeaveOutcome::Deleted);
        }

        if !db::remove_member(&self.pool, caller, channel.id).await? {
            return Err(ModerationError::NotJoined);
        }

        tracing::info!("[Channels] {} left '{}'", caller, channel.name);
        self.emit(&channel, RealtimeEvent::members_updated());
        Ok(LeaveOutcome::Left)
    }

    pub async fn delete_channel(&self, caller: Uuid, raw_name: &str) -> ModerationResult<()> {
        let channel = self.channel_by_name(raw_name).await?;
        if !channel.is_creator(caller) {
            return Err(ModerationError::Forbidden("Only the creator can delete the channel"));
        }
        self.destroy(&channel).await
    }

    /// Remove a channel and everything hanging off it, then close its namespace
    pub async fn destroy(&self, channel: &Channel) -> ModerationResult<()> {
        let mut tx = db::begin_write(&self.pool).await?;
        db::delete_kick_logs(&mut *tx, channel.id).await?;
        db::delete_channel(&mut *tx, channel.id).await?;
        tx.commit().await?;

        tracing::info!("[Channels] Deleted '{}'", channel.name);

        let namespace = Namespace::Channel(channel.name.clone());
        self.hub.emit(&namespace, RealtimeEvent::channel_deleted(&channel.name));
        self.hub.close(&namespace);
        Ok(())
    }

    pub async fn set_privacy(
        &self,
        caller: Uuid,
        raw_name: &str,
        public: bool,
    ) -> ModerationResult<PrivacyOutcome> {
        let mut channel = self.channel_by_name(raw_name).await?;
        if !channel.is_creator(caller) {
            return Err(ModerationError::Forbidden("Only the creator can change privacy"));
        }

        if channel.public == public {
            return Ok(PrivacyOutcome {
                channel: self.summary(&channel).await?,
                unchanged: true,
            });
        }

        db::set_public(&self.pool, channel.id, public).await?;
        channel.public = public;

        tracing::info!("[Channels] '{}' is now {}", channel.name, if public { "public" } else { "private" });
        self.emit(&channel, RealtimeEvent::channel_updated(public));

        Ok(PrivacyOutcome {
            channel: self.summary(&channel).await?,
            unchanged: false,
        })
    }

    /// Kick a member. Removal is immediate; the ledger rows gate re-entry.
    pub async fn kick(
        &self,
        caller: Uuid,
        raw_name: &str,
        raw_target: &str,
    ) -> ModerationResult<KickOutcome> {
        let name = normalize_channel_name(raw_name)?;
        let nickname = normalize_nickname(raw_target)?;

        let channel = db::get_channel_by_name(&self.pool, &name)
            .await?
            .ok_or(ModerationError::ChannelNotFound)?;

        let caller_is_creator = channel.is_creator(caller);
        if !channel.public && !caller_is_creator {
            return Err(ModerationError::Forbidden("Only the creator can kick in a private channel"));
        }
        if !db::is_member(&self.pool, caller, channel.id).await? {
            return Err(ModerationError::NotMember);
        }

        let target = self.user_by_nickname(&nickname).await?;

        if target.id == caller {
            return Err(ModerationError::Forbidden("You cannot kick yourself"));
        }
        if channel.is_creator(target.id) {
            return Err(ModerationError::Forbidden("Cannot kick the channel creator"));
        }
        if !db::is_member(&self.pool, target.id, channel.id).await? {
            return Err(ModerationError::TargetNotMember);
        }

        let weight = if caller_is_creator {
            CREATOR_KICK_WEIGHT
        } else {
            MEMBER_KICK_WEIGHT
        };

        let mut tx = db::begin_write(&self.pool).await?;
        if db::has_kicked(&mut *tx, channel.id, target.id, caller).await? {
            return Err(ModerationError::AlreadyKicked);
        }
        if !db::remove_member(&mut *tx, target.id, channel.id).await? {
            return Err(ModerationError::TargetNotMember);
        }
        db::insert_kick_votes(&mut tx, channel.id, target.id, caller, weight).await?;
        let total_votes = db::kick_count(&mut *tx, channel.id, target.id).await?;
        tx.commit().await?;

        tracing::info!(
            "[Channels] {} kicked {} from '{}' ({} votes, {} total)",
            caller,
            target.nickname,
            channel.name,
            weight,
            total_votes
        );

        self.emit(&channel, RealtimeEvent::members_updated());
        self.emit(&channel, RealtimeEvent::kicked(target.id));

        Ok(KickOutcome {
            target_id: target.id,
            votes_added: weight,
            total_votes,
        })
    }

    /// Creator-only removal without ledger consequences
    pub async fn revoke(&self, caller: Uuid, raw_name: &str, raw_target: &str) -> ModerationResult<Uuid> {
        let name = normalize_channel_name(raw_name)?;
        let nickname = normalize_nickname(raw_target)?;

        let channel = db::get_channel_by_name(&self.pool, &name)
            .await?
            .ok_or(ModerationError::ChannelNotFound)?;
        if !channel.is_creator(caller) {
            return Err(ModerationError::Forbidden("Only the creator can revoke members"));
        }

        let target = self.user_by_nickname(&nickname).await?;
        if target.id == caller {
            return Err(ModerationError::Forbidden("You cannot revoke yourself"));
        }

        if !db::remove_member(&self.pool, target.id, channel.id).await? {
            return Err(ModerationError::TargetNotMember);
        }

        tracing::info!("[Channels] {} revoked {} from '{}'", caller, target.nickname, channel.name);

        self.emit(&channel, RealtimeEvent::members_updated());
        self.emit(&channel, RealtimeEvent::revoked(target.id));

        Ok(target.id)
    }

    /// Channels the caller belongs to
    pub async fn list_for_user(&self, caller: Uuid) -> ModerationResult<Vec<ChannelSummary>> {
        let channels = db::channels_for_user(&self.pool, caller).await?;
        let mut summaries = Vec::with_capacity(channels.len());
        for channel in &channels {
            summaries.push(self.summary(channel).await?);
        }
        Ok(summaries)
    }

    pub async fn members(&self, caller: Uuid, channel_id: Uuid) -> ModerationResult<Vec<UserProfile>> {
        let channel = self.channel_by_id(channel_id).await?;
        if !db::is_member(&self.pool, caller, channel.id).await? {
            return Err(ModerationError::NotMember);
        }

        let members = db::members(&self.pool, channel.id).await?;
        Ok(members.iter().map(User::profile).collect())
    }
}
