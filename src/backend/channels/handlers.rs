/**
 * Channel Handlers
 *
 * Thin HTTP wrappers over `ChannelService` and `MessageService`. Every
 * route here sits behind the auth middleware.
 *
 * # Routes
 *
 * - `GET /api/channels` - my channels
 * - `POST /api/channels` - create, or join an existing public channel
 * - `POST /api/channels/{join,leave,delete,privacy,kick,revoke}`
 * - `GET /api/channels/{channel_id}/members`
 * - `GET /api/channels/{channel_id}/messages`
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::backend::channels::db::BAN_THRESHOLD;
use crate::backend::channels::moderation::{ChannelService, LeaveOutcome};
use crate::backend::channels::types::{
    ChannelNameRequest, CreateChannelRequest, CreateChannelResponse, JoinResponse, KickResponse,
    LeaveResponse, MemberActionRequest, PrivacyRequest, PrivacyResponse, RevokeResponse,
    SuccessResponse,
};
use crate::backend::error::BackendError;
use crate::backend::messages::MessageService;
use crate::backend::middleware::AuthUser;
use crate::shared::{ChannelSummary, ChatMessage, UserProfile};

pub async fn list_channels(
    State(channels): State<ChannelService>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<ChannelSummary>>, BackendError> {
    Ok(Json(channels.list_for_user(user.user_id).await?))
}

/// Create a channel
///
/// `201 Created` for a new channel, `200 OK` when the name belonged to an
/// existing public channel and the caller joined it instead.
pub async fn create_channel(
    State(channels): State<ChannelService>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateChannelRequest>,
) -> Result<(StatusCode, Json<CreateChannelResponse>), BackendError> {
    let outcome = channels
        .create_channel(user.user_id, &request.name, request.is_public)
        .await?;

    let status = if outcome.was_joined {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((
        status,
        Json(CreateChannelResponse {
            channel: outcome.channel,
            was_joined: outcome.was_joined,
        }),
    ))
}

pub async fn join_channel(
    State(channels): State<ChannelService>,
    AuthUser(user): AuthUser,
    Json(request): Json<ChannelNameRequest>,
) -> Result<Json<JoinResponse>, BackendError> {
    let outcome = channels.join(user.user_id, &request.name).await?;
    Ok(Json(JoinResponse {
        channel: outcome.channel,
        already_member: outcome.already_member,
    }))
}

pub async fn leave_channel(
    State(channels): State<ChannelService>,
    AuthUser(user): AuthUser,
    Json(request): Json<ChannelNameRequest>,
) -> Result<Json<LeaveResponse>, BackendError> {
    let outcome = channels.leave(user.user_id, &request.name).await?;
    Ok(Json(LeaveResponse {
        success: true,
        deleted: outcome == LeaveOutcome::Deleted,
        left: outcome == LeaveOutcome::Left,
    }))
}

pub async fn delete_channel(
    State(channels): State<ChannelService>,
    AuthUser(user): AuthUser,
    Json(request): Json<ChannelNameRequest>,
) -> Result<Json<SuccessResponse>, BackendError> {
    channels.delete_channel(user.user_id, &request.name).await?;
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn set_privacy(
    State(channels): State<ChannelService>,
    AuthUser(user): AuthUser,
    Json(request): Json<PrivacyRequest>,
) -> Result<Json<PrivacyResponse>, BackendError> {
    let outcome = channels
        .set_privacy(user.user_id, &request.name, request.public)
        .await?;
    Ok(Json(PrivacyResponse {
        channel: outcome.channel,
        unchanged: outcome.unchanged,
    }))
}

pub async fn kick_member(
    State(channels): State<ChannelService>,
    AuthUser(user): AuthUser,
    Json(request): Json<MemberActionRequest>,
) -> Result<Json<KickResponse>, BackendError> {
    let outcome = channels
        .kick(user.user_id, &request.name, &request.nickname)
        .await?;
    Ok(Json(KickResponse {
        success: true,
        user_id: outcome.target_id,
        votes_added: outcome.votes_added,
        total_votes: outcome.total_votes,
        banned: outcome.total_votes >= BAN_THRESHOLD,
    }))
}

pub async fn revoke_member(
    State(channels): State<ChannelService>,
    AuthUser(user): AuthUser,
    Json(request): Json<MemberActionRequest>,
) -> Result<Json<RevokeResponse>, BackendError> {
    let target = channels
        .revoke(user.user_id, &request.name, &request.nickname)
        .await?;
    Ok(Json(RevokeResponse {
        success: true,
        user_id: target,
    }))
}

pub async fn list_members(
    State(channels): State<ChannelService>,
    AuthUser(user): AuthUser,
    Path(channel_id): Path<Uuid>,
) -> Result<Json<Vec<UserProfile>>, BackendError> {
    Ok(Json(channels.members(user.user_id, channel_id).await?))
}

pub async fn list_messages(
    State(messages): State<MessageService>,
    AuthUser(user): AuthUser,
    Path(channel_id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessage>>, BackendError> {
    Ok(Json(messages.list_messages(user.user_id, channel_id).await?))
}
