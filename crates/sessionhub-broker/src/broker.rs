//! The session broker: lifecycle state machine over the shared registries.
//!
//! Both gateway listeners funnel every inbound event into one of the methods
//! here. All registry state lives behind a single mutex and every method is
//! one run-to-completion critical section: no await point exists while the
//! lock is held. Outbound notification is fire-and-forget `try_send` on each
//! member's channel handle, so a slow or dead peer never blocks or rolls
//! back a mutation.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

use sessionhub_core::config::broker::BrokerConfig;
use sessionhub_core::error::AppError;
use sessionhub_core::result::AppResult;
use sessionhub_core::types::{ClientId, Limit, SessionId};

use crate::client::client::Client;
use crate::client::registry::ClientRegistry;
use crate::message::types::{ClientInfo, OutboundMessage};
use crate::session::registry::SessionRegistry;
use crate::session::session::SessionSettings;

/// Result payload of a successful connect.
#[derive(Debug, Clone)]
pub struct Connected {
    /// Assigned client id.
    pub id: ClientId,
    /// Default display name.
    pub name: String,
}

/// Result payload of a successful join.
#[derive(Debug, Clone)]
pub struct JoinedSession {
    /// Joined session.
    pub session_id: SessionId,
    /// All current members in join order, including the joiner.
    pub clients: Vec<ClientInfo>,
    /// Session host.
    pub host_client_id: ClientId,
    /// Host display name; empty when the host is gone.
    pub host_client_name: String,
}

/// Registry aggregate guarded by the broker's mutex.
pub(crate) struct BrokerState {
    pub(crate) clients: ClientRegistry,
    pub(crate) sessions: SessionRegistry,
}

/// The session broker.
///
/// Owns the client and session registries (and through them both id
/// allocators) and implements the session lifecycle: creation, joining,
/// leaving, host/member-loss policy, and deferred closing. Message routing
/// lives in [`crate::router`] as a second impl block over the same state.
pub struct SessionBroker {
    pub(crate) state: Mutex<BrokerState>,
    pub(crate) config: BrokerConfig,
}

impl SessionBroker {
    /// Create a broker with the given ceilings and tuning.
    pub fn new(config: BrokerConfig) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(BrokerState {
                clients: ClientRegistry::new(
                    Limit::from(config.max_clients),
                    config.id_recycle_threshold,
                ),
                sessions: SessionRegistry::new(
                    Limit::from(config.max_sessions),
                    config.id_recycle_threshold,
                ),
            }),
            config,
        })
    }

    /// Register a newly accepted connection.
    ///
    /// Rejects with `CapacityExceeded` when the global client ceiling is
    /// reached; the gateway turns that into a `connectionRejected` event and
    /// closes the socket.
    pub fn connect(
        &self,
        conn_id: Uuid,
        sender: mpsc::Sender<OutboundMessage>,
    ) -> AppResult<Connected> {
        let state = &mut *self.state.lock();
        let id = state.clients.add(conn_id, sender)?;
        let name = state.clients.name_of(id).unwrap_or_default();
        tracing::info!(
            client_id = %id,
            conn_id = %conn_id,
            connected_clients = state.clients.len(),
            active_sessions = state.sessions.len(),
            "client connected"
        );
        Ok(Connected { id, name })
    }

    /// Handle a disconnect: run the session-detach cascade, then deregister
    /// the client and release its id.
    pub fn disconnect(self: &Arc<Self>, client_id: ClientId) {
        let state = &mut *self.state.lock();
        self.detach(state, client_id);
        if state.clients.remove(client_id).is_some() {
            tracing::info!(
                client_id = %client_id,
                connected_clients = state.clients.len(),
                recycled_ids = state.clients.recycled_ids_pending(),
                "client disconnected"
            );
        }
    }

    /// Create a new session with `client_id` as host and sole member.
    ///
    /// Checks run before the requester is detached from any current session,
    /// so a rejected create leaves its membership untouched.
    pub fn create_session(
        self: &Arc<Self>,
        client_id: ClientId,
        settings: SessionSettings,
    ) -> AppResult<SessionId> {
        let state = &mut *self.state.lock();
        if state.sessions.at_capacity() {
            return Err(AppError::capacity_exceeded("Max number of sessions reached"));
        }
        if let Limit::Fixed(max) = Limit::from(self.config.max_clients_per_session) {
            if settings.capacity > max {
                return Err(AppError::capacity_exceeded("maxNumberOfClients is too large"));
            }
        }
        if state.clients.get(client_id).is_none() {
            return Err(AppError::not_found("Unknown client"));
        }
        if settings.program_name.is_empty() || settings.session_name.is_empty() {
            return Err(AppError::validation(
                "programName and sessionName must not be empty",
            ));
        }

        // A client belongs to at most one session; creating implies leaving.
        self.detach(state, client_id);

        let program_name = settings.program_name.clone();
        let session_id = state
            .sessions
            .add(client_id, settings, self.config.cache_max_entries)?;
        if let Some(client) = state.clients.get_mut(client_id) {
            client.session = Some(session_id);
            client.program_name = program_name;
        }

        tracing::info!(
            session_id = %session_id,
            host = %client_id,
            active_sessions = state.sessions.len(),
            "session created"
        );
        Ok(session_id)
    }

    /// Join an existing session.
    ///
    /// A client already in a session (including the target) leaves it first.
    /// Rejection order: unknown session, not open, full, key mismatch.
    pub fn join_session(
        self: &Arc<Self>,
        client_id: ClientId,
        session_id: SessionId,
        supplied_key: &str,
    ) -> AppResult<JoinedSession> {
        let state = &mut *self.state.lock();
        let Some(client) = state.clients.get(client_id) else {
            return Err(AppError::not_found("Unknown client"));
        };
        if client.session.is_some() {
            self.detach(state, client_id);
        }

        {
            let Some(session) = state.sessions.get(session_id) else {
                return Err(AppError::not_found("No such session"));
            };
            if !session.open {
                return Err(AppError::permission_denied("Session not open for joining"));
            }
            if session.is_full() {
                return Err(AppError::capacity_exceeded("Session full"));
            }
            if !session.secret.is_empty() && supplied_key != session.secret {
                return Err(AppError::auth("Session requires another key"));
            }
        }

        let joiner_name = state
            .clients
            .get(client_id)
            .map(|c| c.name.clone())
            .unwrap_or_default();

        let (host_client_id, program_name, had_timer, member_count) = {
            let Some(session) = state.sessions.get_mut(session_id) else {
                return Err(AppError::internal("session vanished during join"));
            };
            session.add_member(client_id);
            let had_timer = session.cancel_close_timer();
            (
                session.host,
                session.program_name.clone(),
                had_timer,
                session.member_count(),
            )
        };
        if had_timer {
            tracing::info!(session_id = %session_id, "pending close cancelled by join");
        }

        if let Some(client) = state.clients.get_mut(client_id) {
            client.session = Some(session_id);
            client.program_name = program_name;
        }

        let host_client_name = state.clients.name_of(host_client_id).unwrap_or_default();

        let Some(session) = state.sessions.get(session_id) else {
            return Err(AppError::internal("session vanished during join"));
        };
        let clients: Vec<ClientInfo> = session
            .members
            .iter()
            .filter_map(|&m| state.clients.get(m).map(Client::info))
            .collect();
        for &member in &session.members {
            if member == client_id {
                continue;
            }
            if let Some(peer) = state.clients.get(member) {
                peer.send(OutboundMessage::ClientJoinedSession {
                    id: client_id,
                    name: joiner_name.clone(),
                });
            }
        }

        tracing::info!(
            session_id = %session_id,
            client_id = %client_id,
            members = member_count,
            "client joined session"
        );
        Ok(JoinedSession {
            session_id,
            clients,
            host_client_id,
            host_client_name,
        })
    }

    /// Leave the current session, if any.
    pub fn leave_session(self: &Arc<Self>, client_id: ClientId) {
        let state = &mut *self.state.lock();
        self.detach(state, client_id);
    }

    /// Host-only update of the session's open-for-joining state. Silent
    /// no-op for non-hosts and clients without a session.
    pub fn set_session_state(&self, client_id: ClientId, open: bool) {
        let state = &mut *self.state.lock();
        let Some(client) = state.clients.get(client_id) else {
            return;
        };
        let Some(session_id) = client.session else {
            return;
        };
        let Some(session) = state.sessions.get_mut(session_id) else {
            return;
        };
        if session.host != client_id {
            return;
        }
        session.open = open;
        tracing::debug!(session_id = %session_id, open, "session state updated by host");
    }

    /// Number of connected clients.
    pub fn client_count(&self) -> usize {
        self.state.lock().clients.len()
    }

    /// Number of active sessions.
    pub fn session_count(&self) -> usize {
        self.state.lock().sessions.len()
    }

    /// Current session membership of a client.
    pub fn membership_of(&self, client_id: ClientId) -> Option<SessionId> {
        self.state.lock().clients.get(client_id).and_then(|c| c.session)
    }

    /// Detach a client from its current session and evaluate closure.
    ///
    /// Shared by leave, disconnect, and the implicit leave on create/join.
    fn detach(self: &Arc<Self>, state: &mut BrokerState, client_id: ClientId) {
        let (session_id, client_name) = match state.clients.get(client_id) {
            Some(client) => match client.session {
                Some(session_id) => (session_id, client.name.clone()),
                None => return,
            },
            None => return,
        };

        // Both sides of the membership pairing mutate in this one step.
        if let Some(client) = state.clients.get_mut(client_id) {
            client.session = None;
        }

        let close_now;
        let needs_members;
        {
            let Some(session) = state.sessions.get_mut(session_id) else {
                return;
            };
            session.remove_member(client_id);
            for &member in &session.members {
                if let Some(peer) = state.clients.get(member) {
                    peer.send(OutboundMessage::ClientLeft {
                        id: client_id,
                        name: client_name.clone(),
                    });
                }
            }
            close_now = session.members.is_empty()
                || (session.needs_host && session.host == client_id);
            needs_members = session.needs_members;
            tracing::info!(
                session_id = %session_id,
                client_id = %client_id,
                members = session.member_count(),
                "client left session"
            );
        }

        if !close_now {
            return;
        }
        if needs_members {
            self.close_session(state, session_id);
        } else {
            // The session survives without members for the grace period.
            self.arm_close_timer(state, session_id);
        }
    }

    /// Terminate a session: notify members, reset their membership, remove
    /// the session from the registry, and release its id.
    pub(crate) fn close_session(&self, state: &mut BrokerState, session_id: SessionId) {
        let Some(mut session) = state.sessions.remove(session_id) else {
            return;
        };
        session.cancel_close_timer();
        for &member in &session.members {
            if let Some(client) = state.clients.get_mut(member) {
                client.session = None;
                client.send(OutboundMessage::SessionClosed { session_id });
            }
        }
        tracing::info!(
            session_id = %session_id,
            active_sessions = state.sessions.len(),
            "session closed"
        );
    }

    /// (Re)arm the one-shot deferred-close timer for a session.
    ///
    /// Arming always cancels a prior live timer first; timers never stack.
    fn arm_close_timer(self: &Arc<Self>, state: &mut BrokerState, session_id: SessionId) {
        let Some(session) = state.sessions.get_mut(session_id) else {
            return;
        };
        let generation = session.next_timer_generation();
        let grace = session.grace_period();
        let broker = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            broker.close_after_grace(session_id, generation);
        });
        session.set_close_timer(generation, handle);
        tracing::info!(
            session_id = %session_id,
            minutes = session.grace_minutes,
            "session is closable but keeps no-members policy, deferred close armed"
        );
    }

    /// Timer-expiry path: terminate unless the timer was cancelled or
    /// superseded while this expiry was in flight.
    fn close_after_grace(&self, session_id: SessionId, generation: u64) {
        let state = &mut *self.state.lock();
        let Some(session) = state.sessions.get(session_id) else {
            return;
        };
        if session.close_timer_generation() != Some(generation) {
            return;
        }
        tracing::info!(session_id = %session_id, "grace period expired, closing session");
        self.close_session(state, session_id);
    }

    /// Verify the bidirectional membership invariant, for tests.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let state = self.state.lock();
        for session in state.sessions.iter() {
            for &member in &session.members {
                let client = state.clients.get(member).expect("member is registered");
                assert_eq!(
                    client.session,
                    Some(session.id),
                    "member list entry without matching membership"
                );
                assert_eq!(
                    session.members.iter().filter(|&&m| m == member).count(),
                    1,
                    "member appears more than once"
                );
            }
        }
    }
}
