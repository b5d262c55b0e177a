//! Connection gateway configuration.

use serde::{Deserialize, Serialize};

/// WebSocket listener configuration.
///
/// The gateway always runs a plaintext listener; the TLS listener is
/// enabled separately and speaks the identical protocol against the same
/// shared broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Plaintext listener port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-client outbound send buffer size (messages).
    #[serde(default = "default_send_buffer")]
    pub send_buffer_size: usize,
    /// TLS listener configuration.
    #[serde(default)]
    pub tls: TlsConfig,
}

/// TLS listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Whether the TLS listener is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// TLS listener port.
    #[serde(default = "default_tls_port")]
    pub port: u16,
    /// Path to the PEM certificate file.
    #[serde(default)]
    pub cert_path: String,
    /// Path to the PEM private key file.
    #[serde(default)]
    pub key_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            send_buffer_size: default_send_buffer(),
            tls: TlsConfig::default(),
        }
    }
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_tls_port(),
            cert_path: String::new(),
            key_path: String::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8004
}

fn default_tls_port() -> u16 {
    8005
}

fn default_send_buffer() -> usize {
    256
}
