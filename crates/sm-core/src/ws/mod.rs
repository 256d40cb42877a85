//! WebSocket client with auto-reconnect and keep-alive.

pub mod client;

pub use client::{OnTextFrame, PingPayload, WsConnConfig, WsConnection};
