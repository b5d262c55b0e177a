//! # sessionhub-broker
//!
//! The session broker core for SessionHub. Provides:
//!
//! - Id allocation with FIFO recycling and threshold hysteresis
//! - Client and session registries behind one serialized mutation path
//! - The session lifecycle state machine (create, join, leave, deferred close)
//! - Message routing (direct, broadcast), discovery, per-session cache and
//!   shared object map
//! - The wire message types spoken by the gateway
//!
//! Everything a connection gateway needs is exposed through
//! [`SessionBroker`]; the gateway maps inbound wire events to broker calls
//! and maps each result back to the corresponding outbound event.

pub mod allocator;
pub mod broker;
pub mod client;
pub mod message;
pub mod router;
pub mod session;

pub use broker::{Connected, JoinedSession, SessionBroker};
pub use client::registry::ClientRegistry;
pub use session::registry::SessionRegistry;
pub use session::session::SessionSettings;
