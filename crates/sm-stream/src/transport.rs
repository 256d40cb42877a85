//! The transport port: how the mirror asks for a push stream.
//!
//! A [`Transport`] opens one push subscription per [`StreamDescriptor`] and
//! invokes the callback once per arriving event until the returned
//! [`StreamHandle`] is cancelled. Connection management, retries and frame
//! decoding are the transport's business; the mirror only sees typed
//! [`FeedEvent`]s.

use std::sync::Arc;

use sm_core::error::MirrorError;
use sm_core::types::{FeedEvent, MarketId, StreamKey, SubaccountId, TradeExecutionSide};

/// Callback invoked once per pushed event.
pub type OnFeedEvent = Arc<dyn Fn(FeedEvent) + Send + Sync>;

/// Optional filters of a subscription request.
///
/// Every field defaults to absent. An absent `market_id` means account-wide
/// (unfiltered by market); an absent `subaccount_id` means the public feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamRequest {
    pub market_id: Option<MarketId>,
    pub subaccount_id: Option<SubaccountId>,
    pub execution_side: Option<TradeExecutionSide>,
}

impl StreamRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_market(mut self, market_id: Option<MarketId>) -> Self {
        self.market_id = market_id;
        self
    }

    pub fn with_subaccount(mut self, subaccount_id: SubaccountId) -> Self {
        self.subaccount_id = Some(subaccount_id);
        self
    }

    pub fn with_execution_side(mut self, side: TradeExecutionSide) -> Self {
        self.execution_side = Some(side);
        self
    }
}

/// Feed kind plus request filters: everything a transport needs to open a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub key: StreamKey,
    pub request: StreamRequest,
}

impl StreamDescriptor {
    pub fn new(key: StreamKey, request: StreamRequest) -> Self {
        Self { key, request }
    }
}

/// Cancellation capability for one open stream.
pub trait StreamHandle: Send {
    /// Terminate delivery. Idempotent.
    ///
    /// An event the transport dispatched before observing the cancel may
    /// still arrive afterwards.
    fn cancel(&mut self);
}

/// Opens push subscriptions.
pub trait Transport: Send + Sync {
    /// Establish a push subscription that calls `on_event` for every event.
    fn open(&self, descriptor: StreamDescriptor, on_event: OnFeedEvent) -> Result<Box<dyn StreamHandle>, MirrorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_are_unfiltered() {
        let req = StreamRequest::new();
        assert!(req.market_id.is_none());
        assert!(req.subaccount_id.is_none());
        assert!(req.execution_side.is_none());

        let req = StreamRequest::new()
            .with_market(Some("0xm1".into()))
            .with_subaccount("0xs1".into())
            .with_execution_side(TradeExecutionSide::Taker);
        assert_eq!(req.market_id.as_deref(), Some("0xm1"));
        assert_eq!(req.subaccount_id.as_deref(), Some("0xs1"));
        assert_eq!(req.execution_side, Some(TradeExecutionSide::Taker));
    }
}
