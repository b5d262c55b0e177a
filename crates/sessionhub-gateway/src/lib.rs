//! # sessionhub-gateway
//!
//! Connection gateway for SessionHub. Terminates WebSocket connections on
//! two listeners (plaintext and TLS) that speak the identical protocol
//! against the one shared broker, maps each inbound wire event to a broker
//! call, and maps the result back to the corresponding outbound event.

pub mod connection;
pub mod server;
pub mod tls;

pub use server::Gateway;
