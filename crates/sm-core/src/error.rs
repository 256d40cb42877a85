//! Typed error definitions for the spot market mirror.
//!
//! [`MirrorError`] covers the edges of the system: configuration, the
//! WebSocket transport and frame decoding. The reconciliation core never
//! produces one; malformed or out-of-scope events are dropped silently.

use thiserror::Error;

/// Domain-specific errors for the spot market mirror.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Configuration parsing or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// WebSocket connection, handshake, or communication error.
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// Feed frame decoding error.
    #[error("parse error: {0}")]
    Parse(String),

    /// Transport-level failure while opening or tearing down a stream.
    #[error("transport error: {0}")]
    Transport(String),
}
