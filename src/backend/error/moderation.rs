//! Rule violations raised by the channel, invite and message services.
//!
//! Each variant maps to exactly one HTTP status. The messages are the ones
//! clients display, so they are kept short and stable.

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Channel not found")]
    ChannelNotFound,
    #[error("User not found")]
    UserNotFound,
    #[error("Invite not found")]
    InviteNotFound,
    #[error("You are banned from this channel")]
    Banned,
    #[error("User is banned from this channel")]
    TargetBanned,
    #[error("Not a channel member")]
    NotMember,
    #[error("User is not a member of this channel")]
    TargetNotMember,
    #[error("You are not a member of this channel")]
    NotJoined,
    #[error("User is already a member")]
    AlreadyMember,
    #[error("Channel name already taken by a private channel")]
    ChannelExists,
    #[error("You already voted to kick this user")]
    AlreadyKicked,
    #[error("Invite already resolved")]
    InviteResolved,
    #[error("Invite has expired")]
    InviteExpired,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error(transparent)]
    Invalid(#[from] SharedError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ModerationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ChannelNotFound | Self::UserNotFound | Self::InviteNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::Banned | Self::TargetBanned | Self::NotMember | Self::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            Self::TargetNotMember
            | Self::NotJoined
            | Self::AlreadyMember
            | Self::ChannelExists
            | Self::AlreadyKicked
            | Self::InviteResolved
            | Self::InviteExpired => StatusCode::CONFLICT,
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ModerationError::ChannelNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ModerationError::Banned.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ModerationError::Forbidden("Only the creator can revoke").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ModerationError::AlreadyKicked.status_code(), StatusCode::CONFLICT);
        assert_eq!(ModerationError::InviteExpired.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ModerationError::from(SharedError::validation("name", "bad")).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_forbidden_displays_reason() {
        let err = ModerationError::Forbidden("Cannot kick the channel creator");
        assert_eq!(err.to_string(), "Cannot kick the channel creator");
    }
}
