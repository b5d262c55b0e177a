//! Client registry.

use std::collections::HashMap;

use tokio::sync::mpsc;
use uuid::Uuid;

use sessionhub_core::error::AppError;
use sessionhub_core::result::AppResult;
use sessionhub_core::types::{ClientId, Limit};

use crate::allocator::IdAllocator;
use crate::message::types::OutboundMessage;

use super::client::Client;

/// Registry of all connected clients, keyed by client id.
///
/// Owns the client id allocator; adding a client allocates, removing one
/// releases. The session-detach cascade is the lifecycle layer's job and
/// runs before removal.
#[derive(Debug)]
pub struct ClientRegistry {
    clients: HashMap<ClientId, Client>,
    allocator: IdAllocator,
    limit: Limit,
}

impl ClientRegistry {
    /// Create an empty registry with the given global client ceiling.
    pub fn new(limit: Limit, recycle_threshold: usize) -> Self {
        Self {
            clients: HashMap::new(),
            allocator: IdAllocator::new(recycle_threshold),
            limit,
        }
    }

    /// Register a new client and return its id.
    ///
    /// Rejects with `CapacityExceeded` when the global ceiling is reached.
    pub fn add(
        &mut self,
        conn_id: Uuid,
        sender: mpsc::Sender<OutboundMessage>,
    ) -> AppResult<ClientId> {
        if self.limit.is_exceeded_by(self.clients.len() as u32) {
            return Err(AppError::capacity_exceeded("Max number of clients reached"));
        }
        let id = ClientId::new(self.allocator.allocate());
        self.clients.insert(id, Client::new(id, conn_id, sender));
        Ok(id)
    }

    /// Deregister a client and release its id for reuse.
    pub fn remove(&mut self, id: ClientId) -> Option<Client> {
        let client = self.clients.remove(&id)?;
        self.allocator.release(id.value());
        Some(client)
    }

    /// Look up a client by id.
    pub fn get(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(&id)
    }

    /// Look up a client mutably by id.
    pub fn get_mut(&mut self, id: ClientId) -> Option<&mut Client> {
        self.clients.get_mut(&id)
    }

    /// Look up a client's display name by id.
    pub fn name_of(&self, id: ClientId) -> Option<String> {
        self.clients.get(&id).map(|c| c.name.clone())
    }

    /// Number of connected clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether no client is connected.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Pending recycled client ids, for logs.
    pub fn recycled_ids_pending(&self) -> usize {
        self.allocator.pending()
    }
}
