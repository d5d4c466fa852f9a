/**
 * WebSocket Endpoints
 *
 * - `GET /ws/channels/{name}` - live traffic of one channel
 * - `GET /ws/users/{user_id}` - per-user notifications (invites, forced
 *   logout)
 *
 * Authentication and the membership check run before the upgrade, so a
 * rejected client gets a normal JSON error instead of a socket. The token
 * comes from `?token=` (browsers can't set headers on a WebSocket) or the
 * `Authorization` header.
 *
 * # Connection Loop
 *
 * Each socket runs one `tokio::select!` loop over the client stream and the
 * namespace receiver. Client commands are answered in-line with `ack` or
 * `error`. A lagging receiver skips what it missed and keeps going.
 */

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::Response,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::backend::auth::users::get_user_by_id;
use crate::backend::channels::db as channel_db;
use crate::backend::error::{BackendError, ModerationError};
use crate::backend::messages::MessageService;
use crate::backend::middleware::{authenticate_token, bearer_token, AuthenticatedUser};
use crate::backend::realtime::broadcast::Envelope;
use crate::backend::realtime::hub::{Namespace, RealtimeHub};
use crate::backend::server::state::AppState;
use crate::shared::{normalize_channel_name, EventType, PresenceStatus, RealtimeEvent};

#[derive(Debug, Default, Deserialize)]
pub struct SocketQuery {
    pub token: Option<String>,
}

/// Command frame sent by a channel socket client
#[derive(Debug, Deserialize)]
pub struct ClientFrame {
    /// Echoed back in the reply
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub command: ClientCommand,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientCommand {
    AddMessage { body: String },
    LoadMessages,
    SetStatus { status: PresenceStatus },
    Typing { content: String },
}

/// Whether a channel socket of `user_id` should hang up after `event`
pub fn should_close_channel_socket(event: &RealtimeEvent, user_id: Uuid) -> bool {
    match event.event_type {
        EventType::ChannelDeleted => true,
        EventType::Kicked | EventType::Revoked => event.subject_user() == Some(user_id),
        _ => false,
    }
}

/// Whether a user socket bound to `session_id` should hang up after `event`
pub fn should_close_user_socket(event: &RealtimeEvent, session_id: Uuid) -> bool {
    event.event_type == EventType::ForceLogout && event.subject_session() != Some(session_id)
}

async fn authenticate(
    state: &AppState,
    query: &SocketQuery,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, BackendError> {
    let token = query
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .or_else(|| bearer_token(headers))
        .ok_or_else(|| {
            tracing::warn!("[Realtime] Socket request without a token");
            BackendError::unauthorized("Missing bearer token")
        })?;

    authenticate_token(&state.db_pool, &state.config.jwt_secret, token).await
}

type SocketSink = SplitSink<WebSocket, Message>;

async fn send_event(sink: &mut SocketSink, event: &RealtimeEvent) -> Result<(), BackendError> {
    let text = serde_json::to_string(event)?;
    sink.send(Message::Text(text.into()))
        .await
        .map_err(|e| BackendError::protocol(e.to_string()))
}

/// Upgrade to a channel socket
///
/// # Errors
///
/// * `401` - missing or invalid token
/// * `404` - no such channel
/// * `403` - caller is not a member
pub async fn channel_socket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(raw_name): Path<String>,
    Query(query): Query<SocketQuery>,
    headers: HeaderMap,
) -> Result<Response, BackendError> {
    let user = authenticate(&state, &query, &headers).await?;
    let name = normalize_channel_name(&raw_name)?;

    let channel = channel_db::get_channel_by_name(&state.db_pool, &name)
        .await?
        .ok_or(ModerationError::ChannelNotFound)?;
    if !channel_db::is_member(&state.db_pool, user.user_id, channel.id).await? {
        tracing::warn!("[Realtime] {} is not a member of '{}'", user.user_id, channel.name);
        return Err(ModerationError::NotMember.into());
    }

    let nickname = get_user_by_id(&state.db_pool, user.user_id)
        .await?
        .map(|u| u.nickname)
        .ok_or(ModerationError::UserNotFound)?;

    let namespace = Namespace::Channel(channel.name.clone());
    // Subscribe before the upgrade so nothing sent in between is lost.
    let receiver = state.hub.subscribe(&namespace);

    let connection = ChannelConnection {
        connection_id: Uuid::new_v4(),
        user,
        nickname,
        channel_id: channel.id,
        namespace,
        hub: state.hub.clone(),
        messages: MessageService::new(state.db_pool.clone(), state.hub.clone()),
    };

    Ok(ws.on_upgrade(move |socket| connection.run(socket, receiver)))
}

struct ChannelConnection {
    connection_id: Uuid,
    user: AuthenticatedUser,
    nickname: String,
    channel_id: Uuid,
    namespace: Namespace,
    hub: RealtimeHub,
    messages: MessageService,
}

impl ChannelConnection {
    async fn run(self, socket: WebSocket, mut receiver: broadcast::Receiver<Envelope>) {
        let (mut sink, mut stream) = socket.split();
        tracing::info!(
            "[Realtime] {} connected to {} ({})",
            self.nickname,
            self.namespace,
            self.connection_id
        );

        loop {
            tokio::select! {
                incoming = stream.next() => {
                    match incoming {
                        Some(Ok(Message::Text(text))) => {
                            let reply = self.handle_frame(text.as_str()).await;
                            if send_event(&mut sink, &reply).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!("[Realtime] Read error on {}: {}", self.namespace, e);
                            break;
                        }
                    }
                }

                received = receiver.recv() => {
                    match received {
                        Ok(envelope) => {
                            if !envelope.is_for(self.connection_id) {
                                continue;
                            }
                            let hang_up = should_close_channel_socket(&envelope.event, self.user.user_id);
                            if send_event(&mut sink, &envelope.event).await.is_err() {
                                break;
                            }
                            if hang_up {
                                tracing::info!(
                                    "[Realtime] Closing {} for {} after '{}'",
                                    self.namespace,
                                    self.nickname,
                                    envelope.event.event_type.as_str()
                                );
                                break;
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!("[Realtime] {} lagged on {}, skipped {} events", self.nickname, self.namespace, skipped);
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }
        }

        let _ = sink.close().await;
        tracing::info!("[Realtime] {} left {}", self.nickname, self.namespace);
    }

    async fn handle_frame(&self, text: &str) -> RealtimeEvent {
        let frame: ClientFrame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!("[Realtime] Malformed frame from {}: {}", self.nickname, e);
                return RealtimeEvent::error(None, "Malformed frame");
            }
        };

        match self.dispatch(frame.command).await {
            Ok(result) => RealtimeEvent::ack(frame.id, result),
            Err(e) => RealtimeEvent::error(frame.id, &e.message()),
        }
    }

    async fn dispatch(&self, command: ClientCommand) -> Result<serde_json::Value, BackendError> {
        match command {
            ClientCommand::AddMessage { body } => {
                let message = self
                    .messages
                    .post_message(self.user.user_id, self.channel_id, &body)
                    .await?;
                Ok(serde_json::to_value(&message)?)
            }
            ClientCommand::LoadMessages => {
                let messages = self
                    .messages
                    .list_messages(self.user.user_id, self.channel_id)
                    .await?;
                Ok(serde_json::to_value(&messages)?)
            }
            ClientCommand::SetStatus { status } => {
                self.hub.emit_except(
                    &self.namespace,
                    RealtimeEvent::status(self.user.user_id, status),
                    self.connection_id,
                );
                Ok(serde_json::json!({ "status": status }))
            }
            ClientCommand::Typing { content } => {
                self.hub.emit_except(
                    &self.namespace,
                    RealtimeEvent::typing(self.user.user_id, &self.nickname, &content),
                    self.connection_id,
                );
                Ok(serde_json::json!({}))
            }
        }
    }
}

/// Upgrade to the caller's own user socket
///
/// # Errors
///
/// * `401` - missing or invalid token
/// * `403` - `{user_id}` is someone else
pub async fn user_socket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<SocketQuery>,
    headers: HeaderMap,
) -> Result<Response, BackendError> {
    let user = authenticate(&state, &query, &headers).await?;
    if user.user_id != user_id {
        tracing::warn!("[Realtime] {} tried to subscribe to {}", user.user_id, user_id);
        return Err(BackendError::handler(
            StatusCode::FORBIDDEN,
            "Cannot subscribe to another user",
        ));
    }

    let namespace = Namespace::User(user_id);
    let receiver = state.hub.subscribe(&namespace);

    Ok(ws.on_upgrade(move |socket| run_user_socket(socket, receiver, namespace, user)))
}

async fn run_user_socket(
    socket: WebSocket,
    mut receiver: broadcast::Receiver<Envelope>,
    namespace: Namespace,
    user: AuthenticatedUser,
) {
    let (mut sink, mut stream) = socket.split();
    tracing::info!("[Realtime] Session {} connected to {}", user.session_id, namespace);

    loop {
        tokio::select! {
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(_)) => {}
                }
            }

            received = receiver.recv() => {
                match received {
                    Ok(envelope) => {
                        let hang_up = should_close_user_socket(&envelope.event, user.session_id);
                        if send_event(&mut sink, &envelope.event).await.is_err() {
                            break;
                        }
                        if hang_up {
                            tracing::info!("[Realtime] Session {} replaced, closing {}", user.session_id, namespace);
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("[Realtime] {} lagged, skipped {} events", namespace, skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    let _ = sink.close().await;
}
