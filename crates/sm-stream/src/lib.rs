//! # sm-stream
//!
//! Real-time reconciliation of spot market feeds into bounded, newest-first
//! projections.
//!
//! ## Architecture
//!
//! ```text
//! SpotStreams.stream_*() ──► SubscriptionRegistry ──► Transport.open(descriptor, handler)
//!                                                          │
//!             FeedEvent ◄──────────────────────────────────┘
//!                 │
//!                 ▼
//! StreamDispatcher ──► payload check ──► MarketScope ──► Reconciler ──► SpotStore projection
//! ```
//!
//! ## Modules
//!
//! - [`transport`]: the transport port (`Transport`, `StreamHandle`, request types)
//! - [`reconcile`]: per-entity merge policies
//! - [`store`]: read-side projections and change notifications
//! - [`registry`]: one live subscription per stream key
//! - [`dispatcher`]: event routing from callbacks into the store
//! - [`context`]: `SpotStreams`, the per-session wiring
//! - [`codec`]: JSON frame decoding and subscribe requests
//! - [`ws_transport`] / [`memory`]: WebSocket and in-process transports

pub mod codec;
pub mod context;
pub mod dispatcher;
pub mod memory;
pub mod reconcile;
pub mod registry;
pub mod store;
pub mod transport;
pub mod ws_transport;

pub use context::SpotStreams;
pub use dispatcher::StreamDispatcher;
pub use memory::{InMemoryTransport, TransportCall};
pub use registry::SubscriptionRegistry;
pub use store::{ProjectionSummary, SpotStore};
pub use transport::{OnFeedEvent, StreamDescriptor, StreamHandle, StreamRequest, Transport};
pub use ws_transport::{PingConfig, WsTransport};
