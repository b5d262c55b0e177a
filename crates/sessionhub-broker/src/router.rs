//! Message routing between session members.
//!
//! Direct and broadcast relay, renames, discovery, and the per-session
//! cache and shared object map. All operations are scoped to the caller's
//! current session and are silent no-ops when the caller has none; a
//! missing destination never produces an error event.

use serde_json::{Map, Value};

use sessionhub_core::types::{ClientId, Limit, SessionId};

use crate::broker::SessionBroker;
use crate::message::types::{OutboundMessage, SessionSummary};

impl SessionBroker {
    /// Relay a payload to one member of the sender's session.
    ///
    /// The payload is annotated with the sender's id. Sessions that survive
    /// emptiness also record the annotated payload in their cache, but only
    /// when the destination was actually found.
    pub fn send_to_client(
        &self,
        sender_id: ClientId,
        destination_id: ClientId,
        payload: Map<String, Value>,
    ) {
        let state = &mut *self.state.lock();
        let Some(sender) = state.clients.get(sender_id) else {
            return;
        };
        let Some(session_id) = sender.session else {
            return;
        };
        let Some(session) = state.sessions.get_mut(session_id) else {
            return;
        };
        if !session.is_member(destination_id) {
            return;
        }

        // The server owns the sourceId annotation; a client-supplied value
        // is discarded. The typed field re-adds it on serialization.
        let mut payload = payload;
        payload.remove("sourceId");
        let mut annotated = payload.clone();
        annotated.insert("sourceId".to_string(), Value::from(sender_id.value()));

        if let Some(destination) = state.clients.get(destination_id) {
            destination.send(OutboundMessage::MessageToClient {
                payload,
                source_id: sender_id,
            });
        }
        if !session.needs_members {
            session.cache.push(Value::Object(annotated));
        }
    }

    /// Relay a payload to every member of the sender's session, optionally
    /// including the sender itself.
    pub fn broadcast(
        &self,
        sender_id: ClientId,
        payload: Map<String, Value>,
        send_to_self: bool,
    ) {
        let state = &mut *self.state.lock();
        let Some(sender) = state.clients.get(sender_id) else {
            return;
        };
        let Some(session_id) = sender.session else {
            return;
        };
        let Some(session) = state.sessions.get_mut(session_id) else {
            return;
        };

        let mut payload = payload;
        payload.remove("sourceId");
        let mut annotated = payload.clone();
        annotated.insert("sourceId".to_string(), Value::from(sender_id.value()));

        for &member in &session.members {
            if member == sender_id && !send_to_self {
                continue;
            }
            if let Some(peer) = state.clients.get(member) {
                peer.send(OutboundMessage::MessageToAllClients {
                    payload: payload.clone(),
                    source_id: sender_id,
                });
            }
        }
        if !session.needs_members {
            session.cache.push(Value::Object(annotated));
        }
    }

    /// Set a client's display name and notify the other members of its
    /// current session, if any. Uniqueness is not enforced.
    pub fn rename_client(&self, client_id: ClientId, new_name: String) {
        let state = &mut *self.state.lock();
        let Some(client) = state.clients.get_mut(client_id) else {
            return;
        };
        client.name = new_name.clone();
        let Some(session_id) = client.session else {
            return;
        };
        let Some(session) = state.sessions.get(session_id) else {
            return;
        };
        for &member in &session.members {
            if member == client_id {
                continue;
            }
            if let Some(peer) = state.clients.get(member) {
                peer.send(OutboundMessage::ClientChangedName {
                    id: client_id,
                    name: new_name.clone(),
                });
            }
        }
    }

    /// Discovery listing for a program.
    ///
    /// Hidden sessions are never listed. Closed and full sessions are
    /// listed only when `list_all` is set.
    pub fn list_sessions(&self, program_name: &str, list_all: bool) -> Vec<SessionSummary> {
        let state = self.state.lock();
        state
            .sessions
            .iter()
            .filter(|session| session.program_name == program_name && !session.hidden)
            .filter(|session| session.open || list_all)
            .filter(|session| match session.capacity {
                Limit::Unlimited => true,
                Limit::Fixed(max) => (session.member_count() as u32) < max || list_all,
            })
            .map(|session| SessionSummary {
                session_id: session.id,
                session_name: session.session_name.clone(),
                host_client_id: session.host,
                host_client_name: state.clients.name_of(session.host).unwrap_or_default(),
            })
            .collect()
    }

    /// Snapshot of the caller's session cache. `None` when the caller has
    /// no session.
    pub fn cache_snapshot(&self, client_id: ClientId) -> Option<(SessionId, Vec<Value>)> {
        let state = self.state.lock();
        let session_id = state.clients.get(client_id)?.session?;
        let session = state.sessions.get(session_id)?;
        Some((session_id, session.cache.snapshot()))
    }

    /// Length of the caller's session cache. `None` when the caller has no
    /// session.
    pub fn cache_length(&self, client_id: ClientId) -> Option<(SessionId, usize)> {
        let state = self.state.lock();
        let session_id = state.clients.get(client_id)?.session?;
        let session = state.sessions.get(session_id)?;
        Some((session_id, session.cache.len()))
    }

    /// Clear the caller's session cache. No-op when the caller has no
    /// session.
    pub fn clear_cache(&self, client_id: ClientId) {
        let state = &mut *self.state.lock();
        let Some(session_id) = state.clients.get(client_id).and_then(|c| c.session) else {
            return;
        };
        if let Some(session) = state.sessions.get_mut(session_id) {
            session.cache.clear();
        }
    }

    /// Read a value from the caller's session shared map. Outer `None` when
    /// the caller has no session (no reply is sent); the inner option is
    /// the stored value.
    pub fn mapped_object(&self, client_id: ClientId, index: i64) -> Option<(i64, Option<Value>)> {
        let state = self.state.lock();
        let session_id = state.clients.get(client_id)?.session?;
        let session = state.sessions.get(session_id)?;
        Some((index, session.shared.get(&index).cloned()))
    }

    /// Store a value in the caller's session shared map. No-op when the
    /// caller has no session.
    pub fn set_mapped_object(&self, client_id: ClientId, index: i64, object: Value) {
        let state = &mut *self.state.lock();
        let Some(session_id) = state.clients.get(client_id).and_then(|c| c.session) else {
            return;
        };
        if let Some(session) = state.sessions.get_mut(session_id) {
            session.shared.insert(index, object);
        }
    }
}
