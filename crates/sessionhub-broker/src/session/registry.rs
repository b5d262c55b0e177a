//! Session registry.

use std::collections::HashMap;

use sessionhub_core::error::AppError;
use sessionhub_core::result::AppResult;
use sessionhub_core::types::{ClientId, Limit, SessionId};

use crate::allocator::IdAllocator;

use super::session::{Session, SessionSettings};

/// Registry of all active sessions, keyed by session id.
///
/// Owns the session id allocator, mirroring the client registry.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
    allocator: IdAllocator,
    limit: Limit,
}

impl SessionRegistry {
    /// Create an empty registry with the given global session ceiling.
    pub fn new(limit: Limit, recycle_threshold: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            allocator: IdAllocator::new(recycle_threshold),
            limit,
        }
    }

    /// Whether the global session ceiling leaves no room for one more.
    pub fn at_capacity(&self) -> bool {
        self.limit.is_exceeded_by(self.sessions.len() as u32)
    }

    /// Create and register a session with `host` as sole member.
    ///
    /// Rejects with `CapacityExceeded` when the global ceiling is reached.
    pub fn add(
        &mut self,
        host: ClientId,
        settings: SessionSettings,
        cache_max: usize,
    ) -> AppResult<SessionId> {
        if self.limit.is_exceeded_by(self.sessions.len() as u32) {
            return Err(AppError::capacity_exceeded("Max number of sessions reached"));
        }
        let id = SessionId::new(self.allocator.allocate());
        self.sessions
            .insert(id, Session::new(id, host, settings, cache_max));
        Ok(id)
    }

    /// Deregister a session and release its id for reuse.
    pub fn remove(&mut self, id: SessionId) -> Option<Session> {
        let session = self.sessions.remove(&id)?;
        self.allocator.release(id.value());
        Some(session)
    }

    /// Look up a session by id.
    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// Look up a session mutably by id.
    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    /// Iterate over all active sessions; no ordering guarantees.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    /// Number of active sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is active.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
