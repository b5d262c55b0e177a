//! Wire message type definitions.

pub mod types;

pub use types::{ClientInfo, InboundMessage, OutboundMessage, SessionSummary};
