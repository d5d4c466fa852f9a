/**
 * Real-time Event System
 *
 * This module defines the frames pushed to connected sockets. Every frame
 * carries an event name (the `event` field on the wire), a JSON payload and
 * the time it was produced.
 *
 * Event names are namespaced the way clients already listen for them:
 * `channel:*` for membership and moderation, `invite:*` for per-user
 * notifications, `auth:*` for session control.
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::message::ChatMessage;

/// Type of real-time event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EventType {
    /// New chat message in a channel
    #[serde(rename = "message")]
    Message,
    /// Presence change of a member
    #[serde(rename = "status")]
    Status,
    /// Typing indicator
    #[serde(rename = "typing")]
    Typing,
    /// Membership list of a channel changed
    #[serde(rename = "channel:members_updated")]
    MembersUpdated,
    /// A member was kicked
    #[serde(rename = "channel:kicked")]
    Kicked,
    /// A member was revoked by the creator
    #[serde(rename = "channel:revoked")]
    Revoked,
    /// The channel no longer exists
    #[serde(rename = "channel:deleted")]
    ChannelDeleted,
    /// Channel visibility changed
    #[serde(rename = "channel:updated")]
    ChannelUpdated,
    /// A new invite is waiting for the user
    #[serde(rename = "invite:new")]
    InviteNew,
    /// The user signed in elsewhere
    #[serde(rename = "auth:logout")]
    ForceLogout,
    /// Reply to a client command
    #[serde(rename = "ack")]
    Ack,
    /// Failed client command
    #[serde(rename = "error")]
    Error,
}

impl EventType {
    /// Wire name of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Status => "status",
            Self::Typing => "typing",
            Self::MembersUpdated => "channel:members_updated",
            Self::Kicked => "channel:kicked",
            Self::Revoked => "channel:revoked",
            Self::ChannelDeleted => "channel:deleted",
            Self::ChannelUpdated => "channel:updated",
            Self::InviteNew => "invite:new",
            Self::ForceLogout => "auth:logout",
            Self::Ack => "ack",
            Self::Error => "error",
        }
    }
}

/// Presence states a member can announce
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Dnd,
    Offline,
}

/// Real-time event pushed to the sockets of a namespace
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RealtimeEvent {
    /// Type of event
    #[serde(rename = "event")]
    pub event_type: EventType,
    /// Event payload (JSON-serializable data)
    pub payload: serde_json::Value,
    /// Timestamp when event occurred
    pub timestamp: String,
}

impl RealtimeEvent {
    /// Create a new real-time event
    pub fn new(event_type: EventType, payload: serde_json::Value) -> Self {
        Self {
            event_type,
            payload,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create a message event
    pub fn message(message: &ChatMessage) -> Self {
        let payload = serde_json::to_value(message).unwrap_or(serde_json::Value::Null);
        Self::new(EventType::Message, payload)
    }

    /// Create a presence event
    pub fn status(user_id: Uuid, status: PresenceStatus) -> Self {
        Self::new(
            EventType::Status,
            serde_json::json!({
                "user_id": user_id,
                "status": status,
            }),
        )
    }

    /// Create a typing event
    pub fn typing(user_id: Uuid, nickname: &str, content: &str) -> Self {
        Self::new(
            EventType::Typing,
            serde_json::json!({
                "user_id": user_id,
                "nickname": nickname,
                "content": content,
            }),
        )
    }

    pub fn members_updated() -> Self {
        Self::new(EventType::MembersUpdated, serde_json::json!({}))
    }

    pub fn kicked(user_id: Uuid) -> Self {
        Self::new(EventType::Kicked, serde_json::json!({ "user_id": user_id }))
    }

    pub fn revoked(user_id: Uuid) -> Self {
        Self::new(EventType::Revoked, serde_json::json!({ "user_id": user_id }))
    }

    pub fn channel_deleted(name: &str) -> Self {
        Self::new(EventType::ChannelDeleted, serde_json::json!({ "name": name }))
    }

    pub fn channel_updated(public: bool) -> Self {
        Self::new(EventType::ChannelUpdated, serde_json::json!({ "public": public }))
    }

    pub fn invite_new(invite_id: Uuid, channel_name: &str) -> Self {
        Self::new(
            EventType::InviteNew,
            serde_json::json!({
                "invite_id": invite_id,
                "channel_name": channel_name,
            }),
        )
    }

    /// Tell every other session of a user that a newer session took over
    pub fn force_logout(session_id: Uuid) -> Self {
        Self::new(EventType::ForceLogout, serde_json::json!({ "session_id": session_id }))
    }

    /// Successful reply to a client command
    pub fn ack(request_id: Option<u64>, result: serde_json::Value) -> Self {
        Self::new(
            EventType::Ack,
            serde_json::json!({
                "id": request_id,
                "result": result,
            }),
        )
    }

    /// Failed reply to a client command
    pub fn error(request_id: Option<u64>, message: &str) -> Self {
        Self::new(
            EventType::Error,
            serde_json::json!({
                "id": request_id,
                "message": message,
            }),
        )
    }

    /// User an event is about, for events that name one
    pub fn subject_user(&self) -> Option<Uuid> {
        self.payload
            .get("user_id")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
    }

    /// Session named by a forced-logout event
    pub fn subject_session(&self) -> Option<Uuid> {
        self.payload
            .get("session_id")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_new() {
        let event = RealtimeEvent::members_updated();
        assert_eq!(event.event_type, EventType::MembersUpdated);
        assert!(!event.timestamp.is_empty());
    }

    #[test]
    fn test_wire_name_matches_as_str() {
        for event_type in [
            EventType::Message,
            EventType::Kicked,
            EventType::ChannelDeleted,
            EventType::InviteNew,
            EventType::ForceLogout,
        ] {
            let json = serde_json::to_value(event_type).unwrap();
            assert_eq!(json, serde_json::Value::String(event_type.as_str().to_string()));
        }
    }

    #[test]
    fn test_event_frame_shape() {
        let event = RealtimeEvent::channel_updated(false);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "channel:updated");
        assert_eq!(json["payload"]["public"], false);
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_kicked_subject_user() {
        let user_id = Uuid::new_v4();
        let event = RealtimeEvent::kicked(user_id);
        assert_eq!(event.subject_user(), Some(user_id));
        assert_eq!(RealtimeEvent::members_updated().subject_user(), None);
    }

    #[test]
    fn test_force_logout_subject_session() {
        let session_id = Uuid::new_v4();
        let event = RealtimeEvent::force_logout(session_id);
        assert_eq!(event.event_type.as_str(), "auth:logout");
        assert_eq!(event.subject_session(), Some(session_id));
    }

    #[test]
    fn test_presence_status_serialization() {
        let event = RealtimeEvent::status(Uuid::new_v4(), PresenceStatus::Dnd);
        assert_eq!(event.payload["status"], "dnd");
        let parsed: PresenceStatus = serde_json::from_str("\"offline\"").unwrap();
        assert_eq!(parsed, PresenceStatus::Offline);
    }

    #[test]
    fn test_ack_and_error_carry_request_id() {
        let ack = RealtimeEvent::ack(Some(7), serde_json::json!({"ok": true}));
        assert_eq!(ack.payload["id"], 7);
        let err = RealtimeEvent::error(None, "Not a channel member");
        assert!(err.payload["id"].is_null());
        assert_eq!(err.payload["message"], "Not a channel member");
    }
}
