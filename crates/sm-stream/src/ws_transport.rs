//! [`Transport`] over the indexer's WebSocket push endpoint.
//!
//! Each `open` starts one auto-reconnecting [`WsConnection`] that sends the
//! stream's subscribe request after every (re)connect and decodes each text
//! frame into the stream's [`FeedEvent`] type before invoking the callback.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sm_core::error::MirrorError;
use sm_core::ws::{OnTextFrame, PingPayload, WsConnConfig, WsConnection};
use tokio::runtime::Handle;
use tracing::{info, trace};

use crate::codec;
use crate::transport::{OnFeedEvent, StreamDescriptor, StreamHandle, Transport};

/// Keep-alive settings of every connection this transport opens.
#[derive(Debug, Clone)]
pub struct PingConfig {
    pub interval: Duration,
    pub payload: PingPayload,
}

/// Opens one WebSocket connection per stream.
#[derive(Debug, Clone)]
pub struct WsTransport {
    endpoint: String,
    ping: Option<PingConfig>,
    extra_headers: HashMap<String, String>,
    runtime: Handle,
}

impl WsTransport {
    /// Transport for `endpoint` whose connections run on `runtime`.
    pub fn new(endpoint: impl Into<String>, runtime: Handle) -> Self {
        Self {
            endpoint: endpoint.into(),
            ping: None,
            extra_headers: HashMap::new(),
            runtime,
        }
    }

    pub fn with_ping(mut self, ping: Option<PingConfig>) -> Self {
        self.ping = ping;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for WsTransport {
    fn open(&self, descriptor: StreamDescriptor, on_event: OnFeedEvent) -> Result<Box<dyn StreamHandle>, MirrorError> {
        let key = descriptor.key;
        url::Url::parse(&self.endpoint)
            .map_err(|e| MirrorError::Config(format!("invalid endpoint {}: {e}", self.endpoint)))?;

        let config = WsConnConfig {
            url: self.endpoint.clone(),
            subscribe_msg: Some(codec::build_subscribe(&descriptor)),
            extra_headers: self.extra_headers.clone(),
            ping_interval: self.ping.as_ref().map(|p| p.interval),
            ping_payload: self.ping.as_ref().map(|p| p.payload.clone()),
            label: key.as_str().to_string(),
        };

        let on_text: OnTextFrame = Arc::new(move |text| match codec::decode_frame(key, text) {
            Ok(event) => on_event(event),
            Err(e) => trace!("[{key}] undecodable frame skipped: {e}"),
        });

        let mut conn = WsConnection::new(config);
        {
            let _guard = self.runtime.enter();
            conn.start(on_text);
        }
        info!("[{key}] stream opened on {}", sm_core::ws::client::extract_host(&self.endpoint));

        Ok(Box::new(WsStreamHandle { conn }))
    }
}

/// Handle of one WebSocket-backed stream.
pub struct WsStreamHandle {
    conn: WsConnection,
}

impl StreamHandle for WsStreamHandle {
    fn cancel(&mut self) {
        self.conn.cancel();
    }
}

#[cfg(test)]
mod tests {
    use sm_core::types::{FeedEvent, StreamKey};

    use super::*;
    use crate::transport::StreamRequest;

    #[tokio::test]
    async fn rejects_invalid_endpoint() {
        let transport = WsTransport::new("not a url", Handle::current());
        let descriptor = StreamDescriptor::new(StreamKey::TradesForMarket, StreamRequest::new());
        let err = transport.open(descriptor, Arc::new(|_: FeedEvent| {})).err();
        assert!(matches!(err, Some(MirrorError::Config(_))));
    }

    #[tokio::test]
    async fn open_then_cancel_twice() {
        let transport = WsTransport::new("ws://127.0.0.1:9", Handle::current()).with_ping(Some(PingConfig {
            interval: Duration::from_secs(30),
            payload: PingPayload::WebSocketPing,
        }));
        let descriptor = StreamDescriptor::new(StreamKey::SubaccountOrders, StreamRequest::new());
        let mut handle = transport.open(descriptor, Arc::new(|_: FeedEvent| {})).unwrap();
        handle.cancel();
        handle.cancel();
    }
}
