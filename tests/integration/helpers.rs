//! Shared test helpers for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use sessionhub_broker::SessionBroker;
use sessionhub_core::config::broker::BrokerConfig;
use sessionhub_core::config::gateway::GatewayConfig;
use sessionhub_gateway::Gateway;

/// Test application context: a broker plus a plaintext listener bound to an
/// ephemeral port.
pub struct TestApp {
    /// Address of the plaintext listener.
    pub addr: SocketAddr,
}

impl TestApp {
    /// Start a test application with default ceilings.
    pub async fn new() -> Self {
        Self::with_broker_config(BrokerConfig::default()).await
    }

    /// Start a test application with custom broker ceilings.
    pub async fn with_broker_config(broker_config: BrokerConfig) -> Self {
        let gateway_config = GatewayConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..GatewayConfig::default()
        };
        let broker = SessionBroker::new(broker_config);
        let gateway = Gateway::bind(broker, gateway_config)
            .await
            .expect("bind gateway");
        let addr = gateway.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = gateway.serve().await;
        });
        Self { addr }
    }

    /// Connect a WebSocket client and consume the `connected` greeting.
    pub async fn client(&self) -> TestClient {
        let mut client = self.raw_client().await;
        let greeting = client.expect_event("connected").await;
        client.id = greeting["id"].as_u64().expect("client id");
        client.name = greeting["name"].as_str().expect("client name").to_string();
        client
    }

    /// Connect without consuming the first event.
    pub async fn raw_client(&self) -> TestClient {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{}", self.addr))
            .await
            .expect("connect");
        TestClient {
            ws,
            id: 0,
            name: String::new(),
        }
    }
}

/// One connected WebSocket test client.
pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    /// Assigned client id.
    pub id: u64,
    /// Assigned display name.
    pub name: String,
}

impl TestClient {
    /// Send one JSON event.
    pub async fn send(&mut self, event: Value) {
        self.ws
            .send(Message::text(event.to_string()))
            .await
            .expect("send");
    }

    /// Receive the next JSON event, skipping transport-level frames.
    pub async fn recv(&mut self) -> Value {
        loop {
            let frame = tokio::time::timeout(Duration::from_secs(5), self.ws.next())
                .await
                .expect("timed out waiting for event")
                .expect("connection closed")
                .expect("websocket error");
            if let Message::Text(text) = frame {
                return serde_json::from_str(text.as_str()).expect("valid JSON event");
            }
        }
    }

    /// Receive the next event and assert its type.
    pub async fn expect_event(&mut self, event_type: &str) -> Value {
        let event = self.recv().await;
        assert_eq!(event["type"], event_type, "unexpected event: {event}");
        event
    }

    /// Assert that no event arrives within the given window.
    pub async fn expect_silence(&mut self, window: Duration) {
        if let Ok(frame) = tokio::time::timeout(window, self.ws.next()).await {
            panic!("expected silence, got {frame:?}");
        }
    }

    /// Close the connection.
    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}

/// Create a session for `programName: "chess"` with the given field
/// overrides and return the new session id.
pub async fn create_session(client: &mut TestClient, overrides: Value) -> u64 {
    let mut event = serde_json::json!({
        "type": "createSession",
        "programName": "chess",
        "sessionName": "integration"
    });
    if let (Value::Object(base), Value::Object(extra)) = (&mut event, overrides) {
        for (key, value) in extra {
            base.insert(key, value);
        }
    }
    client.send(event).await;
    let created = client.expect_event("sessionCreated").await;
    created["sessionId"].as_u64().expect("session id")
}
