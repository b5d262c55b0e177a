//! Inbound and outbound WebSocket message type definitions.
//!
//! One JSON object per text frame, tagged by `type`. Application payload
//! fields on the relay events are carried through untouched via flattened
//! maps; the broker annotates them with `sourceId` before delivery.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sessionhub_core::types::{ClientId, SessionId};

/// Messages sent by the client to the server.
///
/// Optional fields default exactly as the protocol specifies; a frame
/// missing a *required* field fails to deserialize and is ignored by the
/// gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InboundMessage {
    /// Host-only update of the session's open-for-joining state.
    SetSessionState {
        /// Whether new joins are accepted.
        session_state: bool,
    },
    /// Create a new session with the sender as host and sole member.
    CreateSession {
        /// Application/program the session belongs to.
        program_name: String,
        /// Human-readable session name.
        session_name: String,
        /// Member capacity (0 = unlimited).
        #[serde(default = "default_max_number_of_clients")]
        max_number_of_clients: u32,
        /// Whether new joins are accepted.
        #[serde(default = "default_true")]
        session_open: bool,
        /// Whether the session closes when the host departs.
        #[serde(default = "default_true")]
        session_needs_host_to_live: bool,
        /// Whether the session closes as soon as it becomes empty or loses
        /// its host; `false` keeps it alive for the grace period instead.
        #[serde(default = "default_true")]
        session_needs_clients_to_live: bool,
        /// Grace period in minutes before a closable session terminates.
        #[serde(default = "default_session_timeout_minutes")]
        session_timeout_minutes: f64,
        /// Join secret (empty = none required).
        #[serde(default)]
        key: String,
        /// Whether the session is excluded from discovery listings.
        #[serde(default)]
        is_hidden_session: bool,
    },
    /// Leave the current session.
    LeaveSession,
    /// Join an existing session by id.
    JoinSession {
        /// Target session.
        session_id: SessionId,
        /// Supplied join secret.
        #[serde(default)]
        key: String,
    },
    /// List discoverable sessions for a program.
    SessionList {
        /// Program to list sessions for.
        program_name: String,
        /// Include closed and full sessions.
        #[serde(default)]
        list_all_sessions: bool,
    },
    /// Relay a payload to one member of the sender's session.
    MessageToClient {
        /// Destination client.
        destination_id: ClientId,
        /// Application payload, relayed untouched.
        #[serde(flatten)]
        payload: serde_json::Map<String, Value>,
    },
    /// Relay a payload to every member of the sender's session.
    MessageToAllClients {
        /// Deliver to the sender as well.
        #[serde(default)]
        send_to_self: bool,
        /// Application payload, relayed untouched.
        #[serde(flatten)]
        payload: serde_json::Map<String, Value>,
    },
    /// Set the sender's display name.
    Name {
        /// New free-text name; uniqueness is not enforced.
        name: String,
    },
    /// Read the session's full message cache.
    GetCache,
    /// Read the session's message cache length.
    GetCacheLength,
    /// Clear the session's message cache.
    ClearCache,
    /// Read a value from the session's shared object map.
    GetMappedObject {
        /// Numeric map key.
        index: i64,
    },
    /// Store a value in the session's shared object map.
    SetMappedObject {
        /// Numeric map key.
        index: i64,
        /// Arbitrary value.
        object: Value,
    },
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OutboundMessage {
    /// Connection accepted; carries the assigned identity.
    Connected {
        /// Assigned client id.
        id: ClientId,
        /// Default display name.
        name: String,
    },
    /// Connection refused (global client ceiling reached).
    ConnectionRejected {
        /// Human-readable reason.
        reason: String,
    },
    /// Session creation refused.
    CreateSessionRejected {
        /// Human-readable reason.
        reason: String,
    },
    /// Session created; the sender is host and sole member.
    SessionCreated {
        /// New session id.
        session_id: SessionId,
    },
    /// Join refused.
    JoinSessionRejected {
        /// Target session.
        session_id: SessionId,
        /// Human-readable reason.
        reason: String,
    },
    /// Join succeeded; carries the full roster.
    JoinSessionSuccess {
        /// Joined session.
        session_id: SessionId,
        /// All current members, join order, including the joiner.
        clients: Vec<ClientInfo>,
        /// Session host.
        host_client_id: ClientId,
        /// Host display name; empty when the host is gone.
        host_client_name: String,
    },
    /// Another client joined the session.
    ClientJoinedSession {
        /// Joiner id.
        id: ClientId,
        /// Joiner display name.
        name: String,
    },
    /// Another client left the session.
    ClientLeft {
        /// Leaver id.
        id: ClientId,
        /// Leaver display name.
        name: String,
    },
    /// The session was terminated.
    SessionClosed {
        /// Closed session.
        session_id: SessionId,
    },
    /// Discovery listing.
    SessionList {
        /// Matching sessions.
        sessions: Vec<SessionSummary>,
    },
    /// Relayed direct message.
    MessageToClient {
        /// Application payload.
        #[serde(flatten)]
        payload: serde_json::Map<String, Value>,
        /// Sending client.
        source_id: ClientId,
    },
    /// Relayed broadcast message.
    MessageToAllClients {
        /// Application payload.
        #[serde(flatten)]
        payload: serde_json::Map<String, Value>,
        /// Sending client.
        source_id: ClientId,
    },
    /// Another client changed its display name.
    ClientChangedName {
        /// Client id.
        id: ClientId,
        /// New display name.
        name: String,
    },
    /// Full message cache snapshot.
    Cache {
        /// Owning session.
        session_id: SessionId,
        /// Cached payloads, oldest first.
        cache: Vec<Value>,
    },
    /// Message cache length.
    CacheLength {
        /// Owning session.
        session_id: SessionId,
        /// Number of cached payloads.
        cache_length: usize,
    },
    /// Shared object map read result. The `object` key is omitted when the
    /// index is unmapped.
    MappedObject {
        /// Numeric map key.
        index: i64,
        /// Stored value, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        object: Option<Value>,
    },
}

/// A session member as exposed in rosters and join notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client id.
    pub id: ClientId,
    /// Display name.
    pub name: String,
}

/// A session as exposed in discovery listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Session id.
    pub session_id: SessionId,
    /// Session name.
    pub session_name: String,
    /// Host client id.
    pub host_client_id: ClientId,
    /// Host display name; empty when the host lookup fails.
    pub host_client_name: String,
}

fn default_true() -> bool {
    true
}

fn default_max_number_of_clients() -> u32 {
    2
}

fn default_session_timeout_minutes() -> f64 {
    240.0
}
