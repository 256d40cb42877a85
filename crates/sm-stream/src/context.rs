//! [`SpotStreams`]: the wiring of transport, registry, dispatcher and store.
//!
//! One instance per mirrored session. The transport and the store are
//! injected; nothing here is global. Each `stream_*` entry point checks its
//! precondition, builds the request, and hands an opener to the registry so
//! that the previous stream of the same key is cancelled before the new one
//! is opened.

use std::sync::Arc;

use parking_lot::RwLock;
use sm_core::scope::MarketScope;
use sm_core::types::{MarketId, StreamKey, SubaccountId, TradeExecutionSide};
use tracing::{debug, info};

use crate::dispatcher::StreamDispatcher;
use crate::registry::SubscriptionRegistry;
use crate::store::SpotStore;
use crate::transport::{StreamDescriptor, StreamRequest, Transport};

const SUBACCOUNT_STREAMS: [StreamKey; 4] = [
    StreamKey::SubaccountOrders,
    StreamKey::SubaccountOrderHistory,
    StreamKey::SubaccountTrades,
    StreamKey::SubaccountBalances,
];

/// Subscriptions and projections of one spot-market session.
pub struct SpotStreams {
    transport: Arc<dyn Transport>,
    registry: SubscriptionRegistry,
    store: Arc<SpotStore>,
    dispatcher: StreamDispatcher,
    subaccount: RwLock<Option<SubaccountId>>,
}

impl SpotStreams {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<SpotStore>) -> Self {
        Self {
            transport,
            registry: SubscriptionRegistry::new(),
            dispatcher: StreamDispatcher::new(Arc::clone(&store)),
            store,
            subaccount: RwLock::new(None),
        }
    }

    pub fn store(&self) -> &Arc<SpotStore> {
        &self.store
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    // --- session ----------------------------------------------------------

    /// Bind the subaccount that account-scoped streams are opened for.
    ///
    /// Streams already open keep their old subaccount until resubscribed.
    pub fn set_subaccount(&self, subaccount_id: impl Into<SubaccountId>) {
        let subaccount_id = subaccount_id.into();
        info!("subaccount bound: {subaccount_id}");
        *self.subaccount.write() = Some(subaccount_id);
    }

    pub fn clear_subaccount(&self) {
        if self.subaccount.write().take().is_some() {
            info!("subaccount unbound");
        }
    }

    pub fn subaccount(&self) -> Option<SubaccountId> {
        self.subaccount.read().clone()
    }

    // --- subscribe --------------------------------------------------------

    /// Open (or reopen) the stream for `key`, optionally restricted to
    /// `market_id`.
    ///
    /// Returns `false` without touching the registry when a precondition is
    /// missing: no market for the orderbook feed, or no bound subaccount for
    /// an account-scoped feed. Also returns `false` when the transport
    /// refuses to open.
    pub fn subscribe(&self, key: StreamKey, market_id: Option<MarketId>) -> bool {
        let Some(request) = self.request_for(key, market_id) else {
            return false;
        };

        let scope = MarketScope::from_market(request.market_id.clone());
        let on_event = self.dispatcher.handler(key, scope);
        let descriptor = StreamDescriptor::new(key, request);
        let transport = Arc::clone(&self.transport);

        self.registry.subscribe(key, move || transport.open(descriptor, on_event))
    }

    pub fn stream_orderbook(&self, market_id: impl Into<MarketId>) -> bool {
        self.subscribe(StreamKey::OrderbookForMarket, Some(market_id.into()))
    }

    /// Public trades of `market_id`, or of every active market when `None`.
    pub fn stream_trades(&self, market_id: Option<MarketId>) -> bool {
        self.subscribe(StreamKey::TradesForMarket, market_id)
    }

    pub fn stream_subaccount_orders(&self, market_id: Option<MarketId>) -> bool {
        self.subscribe(StreamKey::SubaccountOrders, market_id)
    }

    pub fn stream_subaccount_order_history(&self, market_id: Option<MarketId>) -> bool {
        self.subscribe(StreamKey::SubaccountOrderHistory, market_id)
    }

    pub fn stream_subaccount_trades(&self, market_id: Option<MarketId>) -> bool {
        self.subscribe(StreamKey::SubaccountTrades, market_id)
    }

    pub fn stream_subaccount_balances(&self) -> bool {
        self.subscribe(StreamKey::SubaccountBalances, None)
    }

    fn request_for(&self, key: StreamKey, market_id: Option<MarketId>) -> Option<StreamRequest> {
        match key {
            StreamKey::OrderbookForMarket => {
                if market_id.is_none() {
                    debug!("[{key}] no market given, subscribe skipped");
                    return None;
                }
                Some(StreamRequest::new().with_market(market_id))
            }
            StreamKey::TradesForMarket => Some(
                StreamRequest::new()
                    .with_market(market_id)
                    .with_execution_side(TradeExecutionSide::Taker),
            ),
            StreamKey::SubaccountBalances => {
                let subaccount_id = self.bound_subaccount(key)?;
                Some(StreamRequest::new().with_subaccount(subaccount_id))
            }
            StreamKey::SubaccountOrders | StreamKey::SubaccountOrderHistory | StreamKey::SubaccountTrades => {
                let subaccount_id = self.bound_subaccount(key)?;
                Some(StreamRequest::new().with_market(market_id).with_subaccount(subaccount_id))
            }
        }
    }

    fn bound_subaccount(&self, key: StreamKey) -> Option<SubaccountId> {
        let subaccount = self.subaccount();
        if subaccount.is_none() {
            debug!("[{key}] no subaccount bound, subscribe skipped");
        }
        subaccount
    }

    // --- cancel -----------------------------------------------------------

    /// Cancel the stream for `key`. A no-op when none is open.
    pub fn cancel(&self, key: StreamKey) -> bool {
        self.registry.cancel(key)
    }

    /// Cancel every account-scoped stream, leaving public feeds open.
    pub fn cancel_subaccount_streams(&self) -> usize {
        self.registry.cancel_many(&SUBACCOUNT_STREAMS)
    }

    pub fn cancel_all(&self) -> usize {
        self.registry.cancel_all()
    }

    /// Full session teardown: cancel every stream, empty every projection
    /// and unbind the subaccount.
    ///
    /// An event already in flight when its stream is cancelled may still
    /// land after the projections were emptied.
    pub fn reset(&self) {
        let cancelled = self.registry.cancel_all();
        self.store.clear();
        self.clear_subaccount();
        info!("session reset, {cancelled} stream(s) cancelled");
    }
}

impl std::fmt::Debug for SpotStreams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotStreams")
            .field("registry", &self.registry)
            .field("subaccount", &self.subaccount())
            .field("summary", &self.store.summary())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subaccount_streams_are_exactly_the_account_scoped_keys() {
        let expected: Vec<_> = StreamKey::ALL.into_iter().filter(|k| k.is_account_scoped()).collect();
        assert_eq!(SUBACCOUNT_STREAMS.to_vec(), expected);
    }
}
