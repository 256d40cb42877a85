//! Stream dispatcher: routes a pushed event to the reconciler of its feed.
//!
//! ```text
//! Transport ──FeedEvent──► handler(key, scope) ──► payload check ──► scope check ──► SpotStore.apply_*
//! ```
//!
//! Events with a missing required payload field (heartbeats, partial frames)
//! are ignored. Account-scoped events for a market outside the active set are
//! dropped when the subscription is account-wide.

use std::sync::Arc;

use sm_core::scope::MarketScope;
use sm_core::types::*;
use tracing::{debug, trace};

use crate::store::SpotStore;
use crate::transport::OnFeedEvent;

/// Builds subscription callbacks bound to one store.
#[derive(Debug, Clone)]
pub struct StreamDispatcher {
    store: Arc<SpotStore>,
}

impl StreamDispatcher {
    pub fn new(store: Arc<SpotStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<SpotStore> {
        &self.store
    }

    /// Callback for a subscription of `key` opened under `scope`.
    pub fn handler(&self, key: StreamKey, scope: MarketScope) -> OnFeedEvent {
        let store = Arc::clone(&self.store);
        Arc::new(move |event| {
            dispatch(&store, key, &scope, event);
        })
    }
}

/// Apply one event of feed `key` to `store`. Returns whether a projection
/// changed.
pub fn dispatch(store: &SpotStore, key: StreamKey, scope: &MarketScope, event: FeedEvent) -> bool {
    match (key, event) {
        (StreamKey::OrderbookForMarket, FeedEvent::Orderbook(ev)) => {
            let Some(orderbook) = ev.orderbook else {
                trace!("[{key}] event without orderbook ignored");
                return false;
            };
            let market_id = if ev.market_id.is_empty() {
                scope.market_id().unwrap_or_default().to_string()
            } else {
                ev.market_id
            };
            store.apply_orderbook(OrderbookSnapshot { market_id, orderbook })
        }

        (StreamKey::TradesForMarket, FeedEvent::Trade(ev)) => {
            let (Some(trade), Some(operation)) = (ev.trade, ev.operation) else {
                trace!("[{key}] event without trade or operation ignored");
                return false;
            };
            if !accept(store, key, scope, &trade.market_id) {
                return false;
            }
            store.apply_trade(operation, trade)
        }

        (StreamKey::SubaccountTrades, FeedEvent::Trade(ev)) => {
            let (Some(trade), Some(operation)) = (ev.trade, ev.operation) else {
                trace!("[{key}] event without trade or operation ignored");
                return false;
            };
            if !accept(store, key, scope, &trade.market_id) {
                return false;
            }
            store.apply_subaccount_trade(operation, trade)
        }

        (StreamKey::SubaccountOrders, FeedEvent::Order(ev)) => {
            let Some(order) = ev.order else {
                trace!("[{key}] event without order ignored");
                return false;
            };
            if !accept(store, key, scope, &order.market_id) {
                return false;
            }
            store.apply_subaccount_order(order)
        }

        (StreamKey::SubaccountOrderHistory, FeedEvent::Order(ev)) => {
            let Some(order) = ev.order else {
                trace!("[{key}] event without order ignored");
                return false;
            };
            if !accept(store, key, scope, &order.market_id) {
                return false;
            }
            store.apply_order_history(order)
        }

        (StreamKey::SubaccountBalances, FeedEvent::Balance(ev)) => {
            let Some(balance) = ev.balance else {
                trace!("[{key}] event without balance ignored");
                return false;
            };
            store.apply_balance(balance)
        }

        (key, event) => {
            debug!("[{key}] unexpected event kind ignored: {event:?}");
            false
        }
    }
}

#[inline]
fn accept(store: &SpotStore, key: StreamKey, scope: &MarketScope, market_id: &str) -> bool {
    let accepted = store.in_scope(scope, market_id);
    if !accepted {
        trace!("[{key}] event for inactive market {market_id} dropped");
    }
    accepted
}
