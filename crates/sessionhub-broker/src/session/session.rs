//! A single active session.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;

use sessionhub_core::types::{ClientId, Limit, SessionId};

use super::cache::MessageCache;

/// Creation parameters for a session, as supplied by the host.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Application/program the session belongs to.
    pub program_name: String,
    /// Human-readable session name.
    pub session_name: String,
    /// Member capacity (0 = unlimited).
    pub capacity: u32,
    /// Whether new joins are accepted.
    pub open: bool,
    /// Whether the session closes when the host departs.
    pub needs_host: bool,
    /// Whether the session closes as soon as a closure condition is met;
    /// `false` defers termination by the grace period instead.
    pub needs_members: bool,
    /// Grace period in minutes; fractions are allowed.
    pub grace_minutes: f64,
    /// Join secret (empty = none required).
    pub secret: String,
    /// Whether the session is excluded from discovery listings.
    pub hidden: bool,
}

/// The pending deferred-close timer of a session.
///
/// At most one is live at a time; arming a new one aborts the old one. The
/// generation guards against an expiry that was already in flight when the
/// timer was cancelled.
#[derive(Debug)]
struct CloseTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

/// An active session.
#[derive(Debug)]
pub struct Session {
    /// Broker-issued session id.
    pub id: SessionId,
    /// The client that created the session.
    pub host: ClientId,
    /// Application/program the session belongs to.
    pub program_name: String,
    /// Human-readable session name.
    pub session_name: String,
    /// Current members in join order. The host is a member like any other
    /// once joined; the order is not maintained host-first.
    pub members: Vec<ClientId>,
    /// Member capacity.
    pub capacity: Limit,
    /// Whether new joins are accepted.
    pub open: bool,
    /// Whether the session closes when the host departs.
    pub needs_host: bool,
    /// Whether the session closes immediately on a closure condition.
    pub needs_members: bool,
    /// Grace period in minutes.
    pub grace_minutes: f64,
    /// Join secret (empty = none required).
    pub secret: String,
    /// Whether the session is excluded from discovery listings.
    pub hidden: bool,
    /// Relayed payloads, populated only when `needs_members` is false.
    pub cache: MessageCache,
    /// Shared session state, keyed by numeric index.
    pub shared: HashMap<i64, Value>,
    close_timer: Option<CloseTimer>,
    timer_generation: u64,
}

impl Session {
    /// Create a session with `host` as its sole member.
    pub fn new(id: SessionId, host: ClientId, settings: SessionSettings, cache_max: usize) -> Self {
        Self {
            id,
            host,
            program_name: settings.program_name,
            session_name: settings.session_name,
            members: vec![host],
            capacity: Limit::from(settings.capacity),
            open: settings.open,
            needs_host: settings.needs_host,
            needs_members: settings.needs_members,
            grace_minutes: settings.grace_minutes,
            secret: settings.secret,
            hidden: settings.hidden,
            cache: MessageCache::new(cache_max),
            shared: HashMap::new(),
            close_timer: None,
            timer_generation: 0,
        }
    }

    /// Number of current members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Whether `id` is currently a member.
    pub fn is_member(&self, id: ClientId) -> bool {
        self.members.contains(&id)
    }

    /// Whether the capacity leaves no room for one more member.
    pub fn is_full(&self) -> bool {
        self.capacity.is_exceeded_by(self.members.len() as u32)
    }

    /// Append a member; join order is preserved.
    pub fn add_member(&mut self, id: ClientId) {
        self.members.push(id);
    }

    /// Remove a member. Returns whether it was present.
    pub fn remove_member(&mut self, id: ClientId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| *m != id);
        self.members.len() < before
    }

    /// The grace period as a duration.
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis((self.grace_minutes * 60_000.0) as u64)
    }

    /// Reserve the next timer generation for a timer about to be armed.
    pub fn next_timer_generation(&mut self) -> u64 {
        self.timer_generation += 1;
        self.timer_generation
    }

    /// Install a newly armed close timer, aborting any previous one.
    pub fn set_close_timer(&mut self, generation: u64, handle: JoinHandle<()>) {
        if let Some(old) = self.close_timer.take() {
            old.handle.abort();
        }
        self.close_timer = Some(CloseTimer { generation, handle });
    }

    /// Cancel the pending close timer, if any. Returns whether one was live.
    pub fn cancel_close_timer(&mut self) -> bool {
        match self.close_timer.take() {
            Some(timer) => {
                timer.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Generation of the pending close timer, if one is live.
    pub fn close_timer_generation(&self) -> Option<u64> {
        self.close_timer.as_ref().map(|t| t.generation)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel_close_timer();
    }
}
