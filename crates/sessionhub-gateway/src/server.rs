//! The two WebSocket listeners.
//!
//! Both listeners hand every accepted connection to the same per-connection
//! code path against the one shared broker; serialization of registry
//! mutations is the broker's job, not the listeners'.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, info, warn};

use sessionhub_broker::SessionBroker;
use sessionhub_core::config::gateway::GatewayConfig;
use sessionhub_core::error::AppError;
use sessionhub_core::result::AppResult;

use crate::connection;
use crate::tls;

/// The connection gateway: a plaintext listener and an optional TLS
/// listener speaking the identical protocol.
pub struct Gateway {
    broker: Arc<SessionBroker>,
    config: GatewayConfig,
    plain_listener: TcpListener,
    tls_listener: Option<(TcpListener, TlsAcceptor)>,
}

impl Gateway {
    /// Bind the configured listeners.
    ///
    /// Binding is separate from serving so callers can learn the actual
    /// local addresses (port 0 binds an ephemeral port).
    pub async fn bind(broker: Arc<SessionBroker>, config: GatewayConfig) -> AppResult<Self> {
        let plain_addr = format!("{}:{}", config.host, config.port);
        let plain_listener = TcpListener::bind(&plain_addr)
            .await
            .map_err(|e| AppError::transport(format!("failed to bind {plain_addr}: {e}")))?;
        info!(addr = %plain_listener.local_addr()?, "listening (plaintext)");

        let tls_listener = if config.tls.enabled {
            let acceptor = tls::build_acceptor(&config.tls)?;
            let tls_addr = format!("{}:{}", config.host, config.tls.port);
            let listener = TcpListener::bind(&tls_addr)
                .await
                .map_err(|e| AppError::transport(format!("failed to bind {tls_addr}: {e}")))?;
            info!(addr = %listener.local_addr()?, "listening (TLS)");
            Some((listener, acceptor))
        } else {
            None
        };

        Ok(Self {
            broker,
            config,
            plain_listener,
            tls_listener,
        })
    }

    /// Local address of the plaintext listener.
    pub fn local_addr(&self) -> AppResult<SocketAddr> {
        Ok(self.plain_listener.local_addr()?)
    }

    /// Local address of the TLS listener, if enabled.
    pub fn tls_local_addr(&self) -> Option<SocketAddr> {
        self.tls_listener
            .as_ref()
            .and_then(|(listener, _)| listener.local_addr().ok())
    }

    /// Accept connections until the process shuts down.
    pub async fn serve(self) -> AppResult<()> {
        let Self {
            broker,
            config,
            plain_listener,
            tls_listener,
        } = self;

        match tls_listener {
            Some((listener, acceptor)) => {
                tokio::select! {
                    res = accept_plain(plain_listener, broker.clone(), config.clone()) => res,
                    res = accept_tls(listener, acceptor, broker, config) => res,
                }
            }
            None => accept_plain(plain_listener, broker, config).await,
        }
    }
}

/// Accept loop for the plaintext listener.
async fn accept_plain(
    listener: TcpListener,
    broker: Arc<SessionBroker>,
    config: GatewayConfig,
) -> AppResult<()> {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "accept failed");
                continue;
            }
        };
        let broker = broker.clone();
        let config = config.clone();
        tokio::spawn(async move {
            match tokio_tungstenite::accept_async(stream).await {
                Ok(ws) => connection::serve(ws, peer, broker, config).await,
                Err(e) => debug!(peer = %peer, error = %e, "WebSocket handshake failed"),
            }
        });
    }
}

/// Accept loop for the TLS listener.
async fn accept_tls(
    listener: TcpListener,
    acceptor: TlsAcceptor,
    broker: Arc<SessionBroker>,
    config: GatewayConfig,
) -> AppResult<()> {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "accept failed");
                continue;
            }
        };
        let acceptor = acceptor.clone();
        let broker = broker.clone();
        let config = config.clone();
        tokio::spawn(async move {
            let tls_stream = match acceptor.accept(stream).await {
                Ok(tls_stream) => tls_stream,
                Err(e) => {
                    debug!(peer = %peer, error = %e, "TLS handshake failed");
                    return;
                }
            };
            match tokio_tungstenite::accept_async(tls_stream).await {
                Ok(ws) => connection::serve(ws, peer, broker, config).await,
                Err(e) => debug!(peer = %peer, error = %e, "WebSocket handshake failed"),
            }
        });
    }
}
