//! A single connected client.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use sessionhub_core::types::{ClientId, SessionId};

use crate::message::types::{ClientInfo, OutboundMessage};

/// A connected client.
///
/// Holds the sender half of the connection's outbound channel; the gateway
/// owns the receiver and forwards messages onto the socket. The broker only
/// ever pushes into the channel, it never reads from the connection.
#[derive(Debug)]
pub struct Client {
    /// Broker-issued client id.
    pub id: ClientId,
    /// Display name, default `"Client<id>"`; uniqueness is not enforced.
    pub name: String,
    /// Program name, copied from the session the client belongs to.
    pub program_name: String,
    /// Current session membership.
    pub session: Option<SessionId>,
    /// Gateway connection identity, for log correlation.
    pub conn_id: Uuid,
    /// When the connection was accepted.
    pub connected_at: DateTime<Utc>,
    /// Sender for outbound messages.
    sender: mpsc::Sender<OutboundMessage>,
}

impl Client {
    pub(crate) fn new(id: ClientId, conn_id: Uuid, sender: mpsc::Sender<OutboundMessage>) -> Self {
        Self {
            id,
            name: format!("Client{}", id.value()),
            program_name: String::new(),
            session: None,
            conn_id,
            connected_at: Utc::now(),
            sender,
        }
    }

    /// Send an outbound message to this client, fire-and-forget.
    ///
    /// A full or closed buffer drops the message; it never fails the
    /// operation that produced it.
    pub fn send(&self, msg: OutboundMessage) -> bool {
        match self.sender.try_send(msg) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(client_id = %self.id, "send buffer full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Roster entry for this client.
    pub fn info(&self) -> ClientInfo {
        ClientInfo {
            id: self.id,
            name: self.name.clone(),
        }
    }
}
