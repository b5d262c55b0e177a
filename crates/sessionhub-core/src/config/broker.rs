//! Session broker configuration.

use serde::{Deserialize, Serialize};

/// Session broker ceilings and tuning.
///
/// The three ceilings use `0` to mean unlimited, matching the wire-level
/// convention for a session's `maxNumberOfClients`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Maximum concurrently connected clients (0 = unlimited).
    #[serde(default = "default_max_clients")]
    pub max_clients: u32,
    /// Maximum concurrently active sessions (0 = unlimited).
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u32,
    /// Maximum members a session may be created to hold (0 = unlimited).
    #[serde(default = "default_max_clients_per_session")]
    pub max_clients_per_session: u32,
    /// Number of released ids that must queue up before recycling starts.
    #[serde(default = "default_id_recycle_threshold")]
    pub id_recycle_threshold: usize,
    /// Maximum entries in a session's message cache; the oldest entry is
    /// dropped on overflow.
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            max_clients: default_max_clients(),
            max_sessions: default_max_sessions(),
            max_clients_per_session: default_max_clients_per_session(),
            id_recycle_threshold: default_id_recycle_threshold(),
            cache_max_entries: default_cache_max_entries(),
        }
    }
}

fn default_max_clients() -> u32 {
    1000
}

fn default_max_sessions() -> u32 {
    1000
}

fn default_max_clients_per_session() -> u32 {
    1000
}

fn default_id_recycle_threshold() -> usize {
    100
}

fn default_cache_max_entries() -> usize {
    1024
}
