//! # sm-core
//!
//! Core crate for the spot market mirror, providing:
//!
//! - **Types** (`types`): ids, enums, orderbook/trade/order/balance entities, feed event payloads
//! - **Bounded collection** (`collection`): capacity-bounded, newest-first sequence of keyed entities
//! - **Market scope** (`scope`): account-wide vs. single-market event filtering
//! - **Configuration** (`config`): JSON config deserialization
//! - **Error types** (`error`): domain-specific `MirrorError` via thiserror
//! - **Numeric parsing** (`numeric`): string-or-number decoding for wire payloads
//! - **WebSocket** (`ws`): WS client with auto-reconnect and keep-alive
//! - **Logging** (`logging`): tracing-based structured logging

pub mod collection;
pub mod config;
pub mod error;
pub mod logging;
pub mod numeric;
pub mod scope;
pub mod types;
pub mod ws;

// Re-export types at crate root for convenience.
pub use collection::{BoundedOrderedCollection, DEFAULT_CAPACITY, Keyed};
pub use scope::{ActiveMarketSet, MarketScope};
pub use types::*;
