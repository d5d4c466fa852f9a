/**
 * Invite Handlers
 *
 * - `GET /api/invites` - pending invites of the caller
 * - `POST /api/invites` - invite a user to a channel
 * - `POST /api/invites/respond` - accept or decline
 */

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::invites::service::InviteService;
use crate::backend::middleware::AuthUser;
use crate::shared::{ChannelSummary, InviteStatus, InviteView};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CreateInviteRequest {
    #[serde(alias = "channelName")]
    pub channel_name: String,
    /// Nickname of the invited user
    #[serde(alias = "nickname")]
    pub target: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateInviteResponse {
    pub success: bool,
    pub id: Uuid,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RespondInviteRequest {
    #[serde(alias = "inviteId")]
    pub invite_id: Uuid,
    /// `accept` or `decline`
    pub action: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RespondInviteResponse {
    pub success: bool,
    pub status: InviteStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelSummary>,
}

pub async fn list_invites(
    State(invites): State<InviteService>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<InviteView>>, BackendError> {
    let pending = invites.list_pending(user.user_id).await?;
    Ok(Json(pending))
}

/// # Errors
///
/// * `400` - blank channel name or nickname
/// * `403` - caller not a member, private channel and caller not creator,
///   or target banned
/// * `404` - unknown channel or nickname
/// * `409` - target already a member
pub async fn create_invite(
    State(invites): State<InviteService>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateInviteRequest>,
) -> Result<(StatusCode, Json<CreateInviteResponse>), BackendError> {
    let created = invites
        .create(user.user_id, &request.channel_name, &request.target)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateInviteResponse {
            success: true,
            id: created.invite_id,
        }),
    ))
}

pub async fn respond_invite(
    State(invites): State<InviteService>,
    AuthUser(user): AuthUser,
    Json(request): Json<RespondInviteRequest>,
) -> Result<Json<RespondInviteResponse>, BackendError> {
    let resolution = invites
        .respond(user.user_id, request.invite_id, &request.action)
        .await?;

    Ok(Json(RespondInviteResponse {
        success: true,
        status: resolution.status,
        channel: resolution.channel,
    }))
}
