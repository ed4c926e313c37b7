//! services/api/src/web/chat_ws.rs
//!
//! The chat WebSocket. One connection owns one conversation; frames are
//! handled one at a time, so replies come back in submission order. The
//! connection follows the user's language changes and closes when the user
//! signs out or the server shuts down.

use crate::web::{
    protocol::{suggestion_chips, ChatMessage, ClientMessage, ServerMessage},
    state::AppState,
};
use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    Extension,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use mindful_core::i18n::translate;
use mindful_core::{AuthEvent, AuthUser, ChatError, ChatSession, Locale};
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn chat_ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state, user))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>, user: AuthUser) {
    info!("New chat connection for user: {}", user.id);
    let (sender, receiver) = socket.split();
    run_chat(app_state, user, sender, receiver).await;
    info!("Chat connection closed.");
}

async fn send<S>(sink: &mut S, message: &ServerMessage) -> Result<(), S::Error>
where
    S: Sink<WsMessage> + Unpin,
{
    match serde_json::to_string(message) {
        Ok(json) => sink.send(WsMessage::Text(json.into())).await,
        Err(e) => {
            error!("Failed to serialize chat frame: {:?}", e);
            Ok(())
        }
    }
}

fn error_frame(code: &'static str, locale: Locale) -> ServerMessage {
    ServerMessage::Error {
        code: code.to_string(),
        message: translate(locale, code).to_string(),
    }
}

/// Drives one conversation until the client leaves, the user signs out or the
/// server shuts down.
pub(crate) async fn run_chat<S, R, E>(
    state: Arc<AppState>,
    user: AuthUser,
    mut sink: S,
    mut stream: R,
) where
    S: Sink<WsMessage> + Unpin,
    S::Error: Display,
    R: Stream<Item = Result<WsMessage, E>> + Unpin,
    E: Display,
{
    // Subscribe before the first frame so no change slips through.
    let mut auth_events = state.sessions.subscribe();
    let mut locale_events = state.locales.subscribe();

    let mut locale = state.locales.current(user.id).await;
    let mut chat = ChatSession::new(locale);
    let history = ServerMessage::History {
        messages: chat.messages().iter().map(ChatMessage::from).collect(),
        locale,
        suggestions: suggestion_chips(locale),
    };
    if let Err(e) = send(&mut sink, &history).await {
        error!("Failed to send chat history: {}", e);
        return;
    }

    loop {
        tokio::select! {
            _ = state.shutdown.cancelled() => {
                debug!("Server shutting down; closing chat.");
                let _ = sink.send(WsMessage::Close(None)).await;
                break;
            }
            event = auth_events.recv() => match event {
                Ok(AuthEvent::SignedOut { user_id }) if user_id == user.id => {
                    info!("User {} signed out; closing chat.", user.id);
                    let _ = sink.send(WsMessage::Close(None)).await;
                    break;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!("Chat missed {} auth events", skipped),
                Err(RecvError::Closed) => break,
            },
            change = locale_events.recv() => match change {
                Ok(change) if change.user_id == user.id && change.locale != locale => {
                    locale = change.locale;
                    let changed = ServerMessage::LocaleChanged {
                        locale,
                        suggestions: suggestion_chips(locale),
                    };
                    if send(&mut sink, &changed).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Chat missed {} locale events", skipped);
                    locale = state.locales.current(user.id).await;
                }
                Err(RecvError::Closed) => break,
            },
            frame = stream.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    let handled = handle_text_message(
                        text.as_str(),
                        &state,
                        &user,
                        &mut chat,
                        &mut locale,
                        &mut sink,
                    )
                    .await;
                    if let Err(e) = handled {
                        warn!("Chat client went away mid-reply: {}", e);
                        break;
                    }
                }
                Some(Ok(WsMessage::Close(_))) | None => {
                    info!("Client disconnected.");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("Chat socket error: {}", e);
                    break;
                }
            },
        }
    }
}

/// Helper function to handle the logic for different `ClientMessage` variants.
async fn handle_text_message<S>(
    text: &str,
    state: &AppState,
    user: &AuthUser,
    chat: &mut ChatSession,
    locale: &mut Locale,
    sink: &mut S,
) -> Result<(), S::Error>
where
    S: Sink<WsMessage> + Unpin,
{
    let client_msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            return send(sink, &error_frame("data.error.invalid_input", *locale)).await;
        }
    };

    match client_msg {
        ClientMessage::Send { text } => {
            let sent = match chat.submit(&text) {
                Ok(message) => message,
                Err(ChatError::Busy) => return send(sink, &error_frame("chat.busy", *locale)).await,
                Err(e) => {
                    debug!("Rejected chat message: {}", e);
                    return send(sink, &error_frame("data.error.invalid_input", *locale)).await;
                }
            };
            send(sink, &ServerMessage::Message { message: ChatMessage::from(&sent) }).await?;
            send(sink, &ServerMessage::TypingStarted).await?;

            tokio::time::sleep(state.config.chat_reply_delay).await;

            // A switch made elsewhere during the pause applies to this reply.
            let current = state.locales.current(user.id).await;
            if current != *locale {
                *locale = current;
                let changed = ServerMessage::LocaleChanged {
                    locale: current,
                    suggestions: suggestion_chips(current),
                };
                send(sink, &changed).await?;
            }
            match chat.complete(*locale) {
                Ok(reply) => {
                    let message = ChatMessage::from(&reply);
                    send(sink, &ServerMessage::Message { message }).await?;
                }
                Err(e) => error!("Chat reply could not be produced: {}", e),
            }
            send(sink, &ServerMessage::TypingEnded).await
        }
        ClientMessage::SetLocale { locale: selected } => {
            state.locales.select(user.id, selected).await;
            let stored = state
                .data
                .for_user(Some(user))
                .set_preferred_language(selected)
                .await;
            if let Some(e) = stored.error {
                warn!(user_id = %user.id, "Failed to store language preference: {}", e);
            }
            Ok(())
        }
    }
}
