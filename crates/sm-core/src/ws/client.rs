//! Single WebSocket connection with auto-reconnect and ping keep-alive.
//!
//! Each `WsConnection` runs as a tokio task that:
//! 1. Connects to the push endpoint.
//! 2. Sends the subscribe request.
//! 3. Forwards every text frame to a callback.
//! 4. Sends periodic pings, if configured.
//! 5. Reconnects with exponential backoff and resubscribes after a drop.
//!
//! Decoding and reconciliation happen in the callback; the connection only
//! moves frames.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::error::MirrorError;

/// Callback invoked for each received text frame.
pub type OnTextFrame = Arc<dyn Fn(&str) + Send + Sync>;

const INITIAL_BACKOFF: Duration = Duration::from_millis(100);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Ping payload format.
#[derive(Debug, Clone)]
pub enum PingPayload {
    /// Send a text frame (e.g. `"ping"`).
    Text(String),
    /// Send a JSON object as text (e.g. `{"op":"ping"}`).
    Json(serde_json::Value),
    /// Use the standard WebSocket ping frame.
    WebSocketPing,
}

/// Configuration for a single WebSocket connection.
#[derive(Debug, Clone)]
pub struct WsConnConfig {
    /// Full WebSocket URL.
    pub url: String,
    /// Message sent after every (re)connect.
    pub subscribe_msg: Option<String>,
    /// Extra HTTP headers for the handshake.
    pub extra_headers: HashMap<String, String>,
    pub ping_interval: Option<Duration>,
    pub ping_payload: Option<PingPayload>,
    /// Log label (e.g. `"subaccount_orders"`).
    pub label: String,
}

/// A single WebSocket connection managed by a background tokio task.
pub struct WsConnection {
    pub config: WsConnConfig,
    shutdown_tx: Option<watch::Sender<bool>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl WsConnection {
    /// Create a new (not yet started) connection.
    pub fn new(config: WsConnConfig) -> Self {
        Self {
            config,
            shutdown_tx: None,
            task: None,
        }
    }

    /// Spawn the connection task. Must be called within a tokio runtime.
    pub fn start(&mut self, on_text: OnTextFrame) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let config = self.config.clone();

        let task = tokio::spawn(async move {
            connection_loop(config, on_text, shutdown_rx).await;
        });

        self.shutdown_tx = Some(shutdown_tx);
        self.task = Some(task);
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Signal shutdown and abort the task without waiting. Idempotent.
    ///
    /// A frame already being handled when this is called may still reach
    /// the callback.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Stop the connection and wait for the task to finish.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for WsConnection {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Main connection loop: connect, subscribe, read, ping, reconnect.
async fn connection_loop(config: WsConnConfig, on_text: OnTextFrame, mut shutdown_rx: watch::Receiver<bool>) {
    let mut backoff = INITIAL_BACKOFF;
    let label = config.label.as_str();

    loop {
        if *shutdown_rx.borrow() {
            info!("[ws-{label}] shutdown requested");
            return;
        }

        info!("[ws-{label}] connecting to {}", config.url);

        let ws_stream = match connect_ws(&config).await {
            Ok(s) => {
                backoff = INITIAL_BACKOFF;
                info!("[ws-{label}] connected");
                s
            }
            Err(e) => {
                error!("[ws-{label}] connection failed: {e}, retrying in {backoff:?}");
                tokio::select! {
                    _ = tokio::time::sleep(backoff) => {},
                    _ = shutdown_rx.changed() => return,
                }
                backoff = (backoff * 2).min(MAX_BACKOFF);
                continue;
            }
        };

        let (mut ws_write, mut ws_read) = ws_stream.split();

        if let Some(ref sub_msg) = config.subscribe_msg {
            debug!("[ws-{label}] subscribing: {sub_msg}");
            if let Err(e) = ws_write.send(Message::Text(sub_msg.clone().into())).await {
                error!("[ws-{label}] subscribe send failed: {e}");
                continue;
            }
        }

        let ping_interval = config.ping_interval.map(tokio::time::interval);

        tokio::pin! {
            let ping_tick = async {
                if let Some(mut interval) = ping_interval {
                    // The first tick completes immediately.
                    interval.tick().await;
                    loop {
                        interval.tick().await;
                    }
                } else {
                    std::future::pending::<()>().await
                }
            };
        }

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("[ws-{label}] shutdown signal received");
                    let _ = ws_write.close().await;
                    return;
                }

                msg = ws_read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => on_text(&text),
                        Some(Ok(Message::Ping(data))) => {
                            let _ = ws_write.send(Message::Pong(data)).await;
                        }
                        Some(Ok(Message::Close(_))) => {
                            warn!("[ws-{label}] received close frame");
                            break;
                        }
                        Some(Err(e)) => {
                            error!("[ws-{label}] read error: {e}");
                            break;
                        }
                        None => {
                            warn!("[ws-{label}] stream ended");
                            break;
                        }
                        _ => {} // Binary, Pong, Frame
                    }
                }

                _ = &mut ping_tick => {
                    let ping_msg = match &config.ping_payload {
                        Some(PingPayload::Text(t)) => Message::Text(t.clone().into()),
                        Some(PingPayload::Json(j)) => Message::Text(j.to_string().into()),
                        Some(PingPayload::WebSocketPing) | None => Message::Ping(Vec::new().into()),
                    };
                    if let Err(e) = ws_write.send(ping_msg).await {
                        error!("[ws-{label}] ping send error: {e}");
                        break;
                    }
                }
            }
        }

        warn!("[ws-{label}] disconnected, reconnecting in {backoff:?}");
        tokio::select! {
            _ = tokio::time::sleep(backoff) => {},
            _ = shutdown_rx.changed() => return,
        }
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

/// Establish a WebSocket connection (TLS for `wss://`).
async fn connect_ws(
    config: &WsConnConfig,
) -> Result<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
    MirrorError,
> {
    use tokio_tungstenite::tungstenite::client::IntoClientRequest;
    use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};

    let mut request = config
        .url
        .as_str()
        .into_client_request()
        .map_err(|e| MirrorError::WebSocket(format!("bad request for {}: {e}", config.url)))?;

    for (key, value) in &config.extra_headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| MirrorError::WebSocket(format!("bad header name {key}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| MirrorError::WebSocket(format!("bad header value for {key}: {e}")))?;
        request.headers_mut().insert(name, value);
    }

    let (stream, _response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| MirrorError::WebSocket(e.to_string()))?;
    Ok(stream)
}

/// Extract the host from a URL string, for log labels.
pub fn extract_host(url: &str) -> String {
    url::Url::parse(url)
        .map(|u| u.host_str().unwrap_or("").to_string())
        .unwrap_or_default()
}
