//! Database operations for invites
//!
//! Expiry is compared in Rust against `chrono::Utc::now()`; SQL only
//! filters on status.

use chrono::{DateTime, Duration, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use uuid::Uuid;

use crate::shared::invite::INVITE_TTL_DAYS;
use crate::shared::{InviteStatus, InviteView};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Invite {
    pub id: Uuid,
    pub channel_id: Uuid,
    pub to_user_id: Uuid,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Invite {
    pub fn new(channel_id: Uuid, to_user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            channel_id,
            to_user_id,
            status: InviteStatus::Pending,
            created_at: now,
            updated_at: now,
            expires_at: Some(now + Duration::days(INVITE_TTL_DAYS)),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}

/// Pending invite joined with its channel, for the recipient's list
#[derive(Debug, Clone, sqlx::FromRow)]
struct InviteListingRow {
    id: Uuid,
    channel_id: Uuid,
    channel_name: String,
    channel_public: bool,
    creator_id: Uuid,
    status: InviteStatus,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl From<InviteListingRow> for InviteView {
    fn from(row: InviteListingRow) -> Self {
        Self {
            id: row.id,
            channel_id: row.channel_id,
            channel_name: row.channel_name,
            channel_public: row.channel_public,
            creator_id: row.creator_id,
            status: row.status,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

const INVITE_COLUMNS: &str = "id, channel_id, to_user_id, status, created_at, updated_at, expires_at";

pub async fn insert_invite(executor: impl SqliteExecutor<'_>, invite: &Invite) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO invites (id, channel_id, to_user_id, status, created_at, updated_at, expires_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(invite.id)
    .bind(invite.channel_id)
    .bind(invite.to_user_id)
    .bind(invite.status)
    .bind(invite.created_at)
    .bind(invite.updated_at)
    .bind(invite.expires_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get_invite(executor: impl SqliteExecutor<'_>, id: Uuid) -> Result<Option<Invite>, sqlx::Error> {
    sqlx::query_as::<_, Invite>(&format!("SELECT {} FROM invites WHERE id = ?", INVITE_COLUMNS))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// The unexpired pending invite for `(channel, user)`, if any
pub async fn find_pending_invite(
    pool: &SqlitePool,
    channel_id: Uuid,
    user_id: Uuid,
) -> Result<Option<Invite>, sqlx::Error> {
    let invites = sqlx::query_as::<_, Invite>(&format!(
        "SELECT {} FROM invites WHERE channel_id = ? AND to_user_id = ? AND status = ?",
        INVITE_COLUMNS
    ))
    .bind(channel_id)
    .bind(user_id)
    .bind(InviteStatus::Pending)
    .fetch_all(pool)
    .await?;

    let now = Utc::now();
    Ok(invites.into_iter().find(|invite| !invite.is_expired(now)))
}

/// Drop pending invites for `(channel, user)` so a new one can replace them
pub async fn delete_pending(
    executor: impl SqliteExecutor<'_>,
    channel_id: Uuid,
    user_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM invites WHERE channel_id = ? AND to_user_id = ? AND status = ?")
        .bind(channel_id)
        .bind(user_id)
        .bind(InviteStatus::Pending)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn set_status(
    executor: impl SqliteExecutor<'_>,
    id: Uuid,
    status: InviteStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE invites SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Unexpired pending invites addressed to `user_id`, newest first
pub async fn pending_for_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<InviteView>, sqlx::Error> {
    let rows = sqlx::query_as::<_, InviteListingRow>(
        r#"
        SELECT i.id, i.channel_id, c.name AS channel_name, c.public AS channel_public,
               c.created_by AS creator_id, i.status, i.created_at, i.expires_at
        FROM invites i
        JOIN channels c ON c.id = i.channel_id
        WHERE i.to_user_id = ? AND i.status = ?
        "#,
    )
    .bind(user_id)
    .bind(InviteStatus::Pending)
    .fetch_all(pool)
    .await?;

    let now = Utc::now();
    let mut views: Vec<InviteView> = rows
        .into_iter()
        .filter(|row| row.expires_at.map(|at| at > now).unwrap_or(true))
        .map(InviteView::from)
        .collect();
    views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(views)
}
