//! Database operations for channels, memberships and the kick ledger
//!
//! Every function takes any SQLite executor, so the same query runs against
//! the pool or inside a transaction (`&mut *tx`).

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqliteConnection, SqliteExecutor, SqlitePool, Transaction};
use uuid::Uuid;

use crate::backend::auth::users::User;
use crate::shared::ChannelSummary;

/// Kick-log rows against a user in one channel that make a ban
pub const BAN_THRESHOLD: i64 = 3;

/// Ledger rows a single kick by the creator inserts
pub const CREATOR_KICK_WEIGHT: i64 = 3;

/// Ledger rows a single kick by any other member inserts
pub const MEMBER_KICK_WEIGHT: i64 = 1;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Channel {
    pub id: Uuid,
    /// Normalized (trimmed, lower-cased) name
    pub name: String,
    pub created_by: Uuid,
    pub public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl Channel {
    pub fn new(name: String, created_by: Uuid, public: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            created_by,
            public,
            created_at: now,
            updated_at: now,
            last_activity: Some(now),
        }
    }

    pub fn is_creator(&self, user_id: Uuid) -> bool {
        self.created_by == user_id
    }

    /// Last time anything happened in the channel
    pub fn active_at(&self) -> DateTime<Utc> {
        self.last_activity.unwrap_or(self.created_at)
    }

    pub fn summary(&self, members: Vec<Uuid>) -> ChannelSummary {
        ChannelSummary {
            id: self.id,
            name: self.name.clone(),
            public: self.public,
            creator_id: self.created_by,
            members,
        }
    }
}

const CHANNEL_COLUMNS: &str = "id, name, created_by, public, created_at, updated_at, last_activity";

pub async fn get_channel_by_name(
    executor: impl SqliteExecutor<'_>,
    name: &str,
) -> Result<Option<Channel>, sqlx::Error> {
    sqlx::query_as::<_, Channel>(&format!("SELECT {} FROM channels WHERE name = ?", CHANNEL_COLUMNS))
        .bind(name)
        .fetch_optional(executor)
        .await
}

pub async fn get_channel_by_id(
    executor: impl SqliteExecutor<'_>,
    id: Uuid,
) -> Result<Option<Channel>, sqlx::Error> {
    sqlx::query_as::<_, Channel>(&format!("SELECT {} FROM channels WHERE id = ?", CHANNEL_COLUMNS))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn list_all_channels(executor: impl SqliteExecutor<'_>) -> Result<Vec<Channel>, sqlx::Error> {
    sqlx::query_as::<_, Channel>(&format!("SELECT {} FROM channels", CHANNEL_COLUMNS))
        .fetch_all(executor)
        .await
}

/// Insert a channel row. Fails with a unique violation if the name is taken.
pub async fn insert_channel(
    executor: impl SqliteExecutor<'_>,
    channel: &Channel,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO channels (id, name, created_by, public, created_at, updated_at, last_activity)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(channel.id)
    .bind(&channel.name)
    .bind(channel.created_by)
    .bind(channel.public)
    .bind(channel.created_at)
    .bind(channel.updated_at)
    .bind(channel.last_activity)
    .execute(executor)
    .await?;
    Ok(())
}

/// Delete a channel; memberships, invites and messages cascade
pub async fn delete_channel(executor: impl SqliteExecutor<'_>, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM channels WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_public(
    executor: impl SqliteExecutor<'_>,
    id: Uuid,
    public: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE channels SET public = ?, updated_at = ? WHERE id = ?")
        .bind(public)
        .bind(Utc::now())
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn touch_activity(
    executor: impl SqliteExecutor<'_>,
    id: Uuid,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE channels SET last_activity = ? WHERE id = ?")
        .bind(at)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Attach a membership. Returns false if it already existed.
pub async fn add_member(
    executor: impl SqliteExecutor<'_>,
    user_id: Uuid,
    channel_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO memberships (user_id, channel_id, joined_at) VALUES (?, ?, ?)",
    )
    .bind(user_id)
    .bind(channel_id)
    .bind(Utc::now())
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Detach a membership. Returns false if there was none.
pub async fn remove_member(
    executor: impl SqliteExecutor<'_>,
    user_id: Uuid,
    channel_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM memberships WHERE user_id = ? AND channel_id = ?")
        .bind(user_id)
        .bind(channel_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn is_member(
    executor: impl SqliteExecutor<'_>,
    user_id: Uuid,
    channel_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM memberships WHERE user_id = ? AND channel_id = ?")
            .bind(user_id)
            .bind(channel_id)
            .fetch_optional(executor)
            .await?;
    Ok(found.is_some())
}

pub async fn member_ids(
    executor: impl SqliteExecutor<'_>,
    channel_id: Uuid,
) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar("SELECT user_id FROM memberships WHERE channel_id = ? ORDER BY joined_at")
        .bind(channel_id)
        .fetch_all(executor)
        .await
}

/// Full user rows of a channel's members, by nickname
pub async fn members(
    executor: impl SqliteExecutor<'_>,
    channel_id: Uuid,
) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.first_name, u.last_name, u.nickname, u.email, u.password_hash, u.created_at, u.updated_at
        FROM users u
        JOIN memberships m ON m.user_id = u.id
        WHERE m.channel_id = ?
        ORDER BY LOWER(u.nickname)
        "#,
    )
    .bind(channel_id)
    .fetch_all(executor)
    .await
}

pub async fn channels_for_user(
    executor: impl SqliteExecutor<'_>,
    user_id: Uuid,
) -> Result<Vec<Channel>, sqlx::Error> {
    sqlx::query_as::<_, Channel>(
        r#"
        SELECT c.id, c.name, c.created_by, c.public, c.created_at, c.updated_at, c.last_activity
        FROM channels c
        JOIN memberships m ON m.channel_id = c.id
        WHERE m.user_id = ?
        ORDER BY c.name
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

/// Ledger rows against `target` in `channel_id`, from any voter
pub async fn kick_count(
    executor: impl SqliteExecutor<'_>,
    channel_id: Uuid,
    target: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM kick_logs WHERE channel_id = ? AND target_user_id = ?")
        .bind(channel_id)
        .bind(target)
        .fetch_one(executor)
        .await
}

pub async fn is_banned(
    executor: impl SqliteExecutor<'_>,
    channel_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    Ok(kick_count(executor, channel_id, user_id).await? >= BAN_THRESHOLD)
}

pub async fn has_kicked(
    executor: impl SqliteExecutor<'_>,
    channel_id: Uuid,
    target: Uuid,
    voter: Uuid,
) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM kick_logs WHERE channel_id = ? AND target_user_id = ? AND voter_user_id = ? LIMIT 1",
    )
    .bind(channel_id)
    .bind(target)
    .bind(voter)
    .fetch_optional(executor)
    .await?;
    Ok(found.is_some())
}

/// Append `weight` ledger rows for one kick
pub async fn insert_kick_votes(
    conn: &mut SqliteConnection,
    channel_id: Uuid,
    target: Uuid,
    voter: Uuid,
    weight: i64,
) -> Result<(), sqlx::Error> {
    let now = Utc::now();
    for _ in 0..weight {
        sqlx::query(
            r#"
            INSERT INTO kick_logs (id, channel_id, target_user_id, voter_user_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(channel_id)
        .bind(target)
        .bind(voter)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Remove every ledger row against `target` in a channel (lifts a ban)
pub async fn clear_kicks(
    executor: impl SqliteExecutor<'_>,
    channel_id: Uuid,
    target: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM kick_logs WHERE channel_id = ? AND target_user_id = ?")
        .bind(channel_id)
        .bind(target)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_kick_logs(
    executor: impl SqliteExecutor<'_>,
    channel_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM kick_logs WHERE channel_id = ?")
        .bind(channel_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Begin a transaction that holds the write lock from its first statement
///
/// A deferred transaction that reads before it writes cannot wait for the
/// lock: SQLite fails it with `SQLITE_BUSY` as soon as another writer is
/// active. `BEGIN IMMEDIATE` waits out the busy timeout instead.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|e| e.is_unique_violation())
        .unwrap_or(false)
}
