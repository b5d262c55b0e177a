//! TLS acceptor construction from PEM certificate and key files.

use std::fs;
use std::sync::Arc;

use tokio_rustls::TlsAcceptor;

use sessionhub_core::config::gateway::TlsConfig;
use sessionhub_core::error::AppError;
use sessionhub_core::result::AppResult;

/// Load the configured certificate chain and private key and build a TLS
/// acceptor for the encrypted listener.
///
/// Missing or unparseable material is a configuration error at startup,
/// never a silent fallback to plaintext.
pub fn build_acceptor(config: &TlsConfig) -> AppResult<TlsAcceptor> {
    let cert_pem = fs::read(&config.cert_path).map_err(|e| {
        AppError::configuration(format!("read cert '{}': {e}", config.cert_path))
    })?;
    let key_pem = fs::read(&config.key_path)
        .map_err(|e| AppError::configuration(format!("read key '{}': {e}", config.key_path)))?;

    let certs = rustls_pemfile::certs(&mut &cert_pem[..])
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::configuration(format!("parse certs: {e}")))?;
    if certs.is_empty() {
        return Err(AppError::configuration("certificate chain empty"));
    }

    let key = rustls_pemfile::private_key(&mut &key_pem[..])
        .map_err(|e| AppError::configuration(format!("parse key: {e}")))?
        .ok_or_else(|| {
            AppError::configuration(format!("no private key found in '{}'", config.key_path))
        })?;

    let server_config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| AppError::configuration(format!("build server config: {e}")))?;

    Ok(TlsAcceptor::from(Arc::new(server_config)))
}
