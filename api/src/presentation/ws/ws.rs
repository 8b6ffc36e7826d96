use axum::extract::ws::{Message as AxumMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::application::access::AuthUser;
use crate::bootstrap::app_context::AppContext;
use crate::domain::realtime::change::{OutboundMessage, Room};
use crate::presentation::http::auth;

#[derive(Debug, Deserialize, Clone)]
pub struct AuthQuery {
    pub token: Option<String>,
    pub access_token: Option<String>,
}

/// Frames a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinNamespace { room: String },
    JoinClass { class: String },
    LeaveRoom { room: String },
    Ping,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerFrame {
    pub event: String,
    pub data: Value,
}

impl ServerFrame {
    fn new(event: &str, data: Value) -> Self {
        Self {
            event: event.to_string(),
            data,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self::new("error", json!({ "message": message.into() }))
    }
}

/// Rooms one socket has joined, and who is behind it.
#[derive(Debug)]
pub struct SocketSession {
    caller: Option<AuthUser>,
    rooms: Vec<Room>,
}

impl SocketSession {
    pub fn new(caller: Option<AuthUser>) -> Self {
        Self {
            caller,
            rooms: vec![Room::Global],
        }
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn connected(&self) -> ServerFrame {
        let rooms: Vec<String> = self.rooms.iter().map(ToString::to_string).collect();
        ServerFrame::new("connected", json!({ "rooms": rooms }))
    }

    fn join(&mut self, room: Room) -> ServerFrame {
        let name = room.to_string();
        if !self.rooms.contains(&room) {
            self.rooms.push(room);
        }
        ServerFrame::new("joined", json!({ "room": name }))
    }

    /// Applies a client frame and returns the reply.
    pub fn handle(&mut self, message: ClientMessage) -> ServerFrame {
        match message {
            ClientMessage::Ping => ServerFrame::new("pong", json!({})),
            ClientMessage::JoinClass { class } => {
                let class = class.trim();
                if class.is_empty() {
                    return ServerFrame::error("Class is required");
                }
                self.join(Room::class(class))
            }
            ClientMessage::JoinNamespace { room } => {
                let Ok(parsed) = room.parse::<Room>() else {
                    return ServerFrame::error(format!("Unknown room: {room}"));
                };
                let owned = match (&parsed, &self.caller) {
                    (Room::Namespace { role, user_id }, Some(caller)) => {
                        *role == caller.role && *user_id == caller.id
                    }
                    _ => false,
                };
                if !owned {
                    return ServerFrame::error("Not allowed to join this namespace");
                }
                self.join(parsed)
            }
            ClientMessage::LeaveRoom { room } => match room.parse::<Room>() {
                Ok(parsed) => {
                    self.rooms.retain(|r| *r != parsed);
                    ServerFrame::new("left", json!({ "room": parsed.to_string() }))
                }
                Err(_) => ServerFrame::error(format!("Unknown room: {room}")),
            },
        }
    }

    pub fn wants(&self, message: &OutboundMessage) -> bool {
        message.addressed_to(&self.rooms)
    }
}

#[utoipa::path(
    get,
    path = "/api/realtime/ws",
    params(
        ("token" = Option<String>, Query, description = "JWT, needed to join a dashboard namespace"),
        ("Authorization" = Option<String>, Header, description = "Bearer token")
    ),
    responses(
        (status = 101, description = "Switching Protocols (WebSocket upgrade)")
    ),
    security(()),
    tag = "Realtime"
)]
pub async fn axum_ws_entry(
    ws: WebSocketUpgrade,
    Query(query): Query<AuthQuery>,
    headers: HeaderMap,
    State(ctx): State<AppContext>,
) -> impl IntoResponse {
    let token = query
        .token
        .or(query.access_token)
        .or_else(|| auth::token_from_headers(&headers));
    // Anonymous sockets still get the global and class rooms.
    let caller = token
        .as_deref()
        .and_then(|t| auth::validate_token(&ctx.cfg, t));
    ws.on_upgrade(move |socket| peer_axum(socket, ctx, caller))
}

/// What to do with one item pulled off the room broadcast.
#[derive(Debug)]
enum Delivery {
    Forward(OutboundMessage),
    Skip,
    Close,
}

fn delivery(
    session: &SocketSession,
    received: Result<OutboundMessage, RecvError>,
    user_id: Option<Uuid>,
) -> Delivery {
    match received {
        Ok(message) if session.wants(&message) => Delivery::Forward(message),
        Ok(_) => Delivery::Skip,
        // A slow socket drops what it missed and resumes from the newest message.
        Err(RecvError::Lagged(skipped)) => {
            tracing::warn!(?user_id, skipped, "ws_peer_lagged");
            Delivery::Skip
        }
        Err(RecvError::Closed) => Delivery::Close,
    }
}

fn encode<T: Serialize>(frame: &T) -> Option<AxumMessage> {
    match serde_json::to_string(frame) {
        Ok(text) => Some(AxumMessage::Text(text)),
        Err(e) => {
            tracing::warn!(error = ?e, "ws_frame_encode_failed");
            None
        }
    }
}

async fn peer_axum(socket: WebSocket, ctx: AppContext, caller: Option<AuthUser>) {
    let user_id = caller.as_ref().map(|c| c.id);
    tracing::debug!(?user_id, "ws_peer_connected");
    let mut inbox = ctx.rooms().subscribe();
    let (mut sink, mut stream) = socket.split();
    let mut session = SocketSession::new(caller);

    if let Some(frame) = encode(&session.connected()) {
        if sink.send(frame).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            incoming = stream.next() => {
                let reply = match incoming {
                    Some(Ok(AxumMessage::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(message) => session.handle(message),
                            Err(_) => ServerFrame::error("Unrecognised message"),
                        }
                    }
                    Some(Ok(AxumMessage::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "ws_peer_read_failed");
                        break;
                    }
                };
                if let Some(frame) = encode(&reply) {
                    if sink.send(frame).await.is_err() {
                        break;
                    }
                }
            }
            outgoing = inbox.recv() => {
                match delivery(&session, outgoing, user_id) {
                    Delivery::Forward(message) => {
                        if let Some(frame) = encode(&message) {
                            if sink.send(frame).await.is_err() {
                                break;
                            }
                        }
                    }
                    Delivery::Skip => {}
                    Delivery::Close => break,
                }
            }
        }
    }
    tracing::debug!(?user_id, "ws_peer_disconnected");
}
