//! Per-connection WebSocket handling.
//!
//! One task per connection reads inbound frames and dispatches them as
//! broker calls; a second task forwards the broker's outbound messages onto
//! the socket. The dispatch itself is synchronous, so each inbound event is
//! a single run-to-completion step against the shared registries.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use sessionhub_broker::message::types::{InboundMessage, OutboundMessage};
use sessionhub_broker::session::session::SessionSettings;
use sessionhub_broker::SessionBroker;
use sessionhub_core::config::gateway::GatewayConfig;
use sessionhub_core::types::ClientId;

/// Serve one established WebSocket connection until it closes.
///
/// Generic over the stream type so the plaintext and TLS listeners share
/// the same code path.
pub async fn serve<S>(
    ws: WebSocketStream<S>,
    peer: SocketAddr,
    broker: Arc<SessionBroker>,
    config: GatewayConfig,
) where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let conn_id = Uuid::new_v4();
    let (mut ws_tx, mut ws_rx) = ws.split();
    let (tx, mut rx) = mpsc::channel::<OutboundMessage>(config.send_buffer_size);

    let connected = match broker.connect(conn_id, tx.clone()) {
        Ok(connected) => connected,
        Err(e) => {
            warn!(conn_id = %conn_id, peer = %peer, reason = %e.message, "connection rejected");
            let rejection = OutboundMessage::ConnectionRejected { reason: e.message };
            if let Ok(text) = serde_json::to_string(&rejection) {
                let _ = ws_tx.send(Message::text(text)).await;
            }
            let _ = ws_tx.close().await;
            return;
        }
    };
    let client_id = connected.id;
    info!(conn_id = %conn_id, client_id = %client_id, peer = %peer, "WebSocket connection established");

    // Let the client know its assigned identity.
    let _ = tx.try_send(OutboundMessage::Connected {
        id: connected.id,
        name: connected.name,
    });

    // Outbound message forwarder.
    let forward_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if ws_tx.send(Message::text(text)).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to serialize outbound message");
                }
            }
        }
    });

    // Process inbound frames.
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => {
                dispatch(&broker, client_id, &tx, text.as_str());
            }
            Ok(Message::Close(_)) => {
                break;
            }
            Ok(_) => {
                // Binary frames and transport-level ping/pong are ignored.
            }
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Cleanup: the disconnect cascade runs the ordinary leave path.
    forward_task.abort();
    broker.disconnect(client_id);
    info!(conn_id = %conn_id, client_id = %client_id, "WebSocket connection closed");
}

/// Map one inbound wire event to a broker call and the result back to the
/// requester's outbound event(s).
///
/// A frame that fails to deserialize is logged and ignored; malformed input
/// is never an error to the peer and never fatal.
fn dispatch(
    broker: &Arc<SessionBroker>,
    client_id: ClientId,
    tx: &mpsc::Sender<OutboundMessage>,
    raw: &str,
) {
    let msg: InboundMessage = match serde_json::from_str(raw) {
        Ok(msg) => msg,
        Err(e) => {
            debug!(client_id = %client_id, error = %e, "ignoring malformed frame");
            return;
        }
    };

    match msg {
        InboundMessage::SetSessionState { session_state } => {
            broker.set_session_state(client_id, session_state);
        }
        InboundMessage::CreateSession {
            program_name,
            session_name,
            max_number_of_clients,
            session_open,
            session_needs_host_to_live,
            session_needs_clients_to_live,
            session_timeout_minutes,
            key,
            is_hidden_session,
        } => {
            let settings = SessionSettings {
                program_name,
                session_name,
                capacity: max_number_of_clients,
                open: session_open,
                needs_host: session_needs_host_to_live,
                needs_members: session_needs_clients_to_live,
                grace_minutes: session_timeout_minutes,
                secret: key,
                hidden: is_hidden_session,
            };
            match broker.create_session(client_id, settings) {
                Ok(session_id) => reply(tx, OutboundMessage::SessionCreated { session_id }),
                Err(e) => reply(
                    tx,
                    OutboundMessage::CreateSessionRejected { reason: e.message },
                ),
            }
        }
        InboundMessage::LeaveSession => {
            broker.leave_session(client_id);
        }
        InboundMessage::JoinSession { session_id, key } => {
            match broker.join_session(client_id, session_id, &key) {
                Ok(joined) => reply(
                    tx,
                    OutboundMessage::JoinSessionSuccess {
                        session_id: joined.session_id,
                        clients: joined.clients,
                        host_client_id: joined.host_client_id,
                        host_client_name: joined.host_client_name,
                    },
                ),
                Err(e) => reply(
                    tx,
                    OutboundMessage::JoinSessionRejected {
                        session_id,
                        reason: e.message,
                    },
                ),
            }
        }
        InboundMessage::SessionList {
            program_name,
            list_all_sessions,
        } => {
            let sessions = broker.list_sessions(&program_name, list_all_sessions);
            reply(tx, OutboundMessage::SessionList { sessions });
        }
        InboundMessage::MessageToClient {
            destination_id,
            payload,
        } => {
            broker.send_to_client(client_id, destination_id, payload);
        }
        InboundMessage::MessageToAllClients {
            send_to_self,
            payload,
        } => {
            broker.broadcast(client_id, payload, send_to_self);
        }
        InboundMessage::Name { name } => {
            broker.rename_client(client_id, name);
        }
        InboundMessage::GetCache => {
            if let Some((session_id, cache)) = broker.cache_snapshot(client_id) {
                reply(tx, OutboundMessage::Cache { session_id, cache });
            }
        }
        InboundMessage::GetCacheLength => {
            if let Some((session_id, cache_length)) = broker.cache_length(client_id) {
                reply(
                    tx,
                    OutboundMessage::CacheLength {
                        session_id,
                        cache_length,
                    },
                );
            }
        }
        InboundMessage::ClearCache => {
            broker.clear_cache(client_id);
        }
        InboundMessage::GetMappedObject { index } => {
            if let Some((index, object)) = broker.mapped_object(client_id, index) {
                reply(tx, OutboundMessage::MappedObject { index, object });
            }
        }
        InboundMessage::SetMappedObject { index, object } => {
            broker.set_mapped_object(client_id, index, object);
        }
    }
}

/// Queue a reply to the requester, fire-and-forget like every other send.
fn reply(tx: &mpsc::Sender<OutboundMessage>, msg: OutboundMessage) {
    if tx.try_send(msg).is_err() {
        debug!("reply dropped, send buffer full or connection gone");
    }
}
