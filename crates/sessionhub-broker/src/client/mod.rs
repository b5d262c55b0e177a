//! Connected clients and their registry.

pub mod client;
pub mod registry;

pub use client::Client;
pub use registry::ClientRegistry;
