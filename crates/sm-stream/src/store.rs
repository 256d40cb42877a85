//! Read-side state: the projections every feed folds into.
//!
//! [`SpotStore`] owns one [`Projection`] per feed plus the consumer's
//! [`ActiveMarketSet`]. Readers get copies (newest first) and counts; only
//! reconciliation calls made by the dispatcher mutate. Each projection has
//! its own lock, so independent feeds never contend and a reader may see one
//! feed's update before another's.
//!
//! When built with [`SpotStore::with_notifier`], every projection that
//! actually changed publishes its [`StreamKey`] on a bounded channel.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use parking_lot::RwLock;
use sm_core::collection::BoundedOrderedCollection;
use sm_core::scope::{ActiveMarketSet, MarketScope};
use sm_core::types::*;
use tracing::warn;

use crate::reconcile::{
    BalanceReconciler, OrderHistoryReconciler, OrderbookReconciler, Reconciler, SubaccountOrderReconciler,
    SubaccountTradeReconciler, TradeReconciler,
};

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// One lock-guarded projection.
#[derive(Debug, Default)]
pub struct Projection<S> {
    state: RwLock<S>,
}

impl<S: Default> Projection<S> {
    pub fn new(initial: S) -> Self {
        Self {
            state: RwLock::new(initial),
        }
    }

    /// Run one reconciliation step under the write lock. Returns whether the
    /// projection changed.
    pub fn apply<R>(&self, reconciler: &R, event: R::Event) -> bool
    where
        R: Reconciler<State = S>,
    {
        let mut guard = self.state.write();
        // The placeholder left behind must not allocate: `S::default()` runs per event.
        let current = std::mem::take(&mut *guard);
        let next = reconciler.reconcile(current, event);
        let changed = next.is_changed();
        *guard = next.into_inner();
        changed
    }

    pub fn read<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        f(&*self.state.read())
    }

    pub fn replace(&self, state: S) {
        *self.state.write() = state;
    }
}

// ---------------------------------------------------------------------------
// SpotStore
// ---------------------------------------------------------------------------

/// Projection lengths at one instant, for logging and health output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionSummary {
    pub has_orderbook: bool,
    pub trades: usize,
    pub subaccount_orders: usize,
    pub subaccount_order_history: usize,
    pub subaccount_trades: usize,
    pub subaccount_balances: usize,
    pub active_markets: usize,
}

impl std::fmt::Display for ProjectionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "orderbook={} trades={} orders={} history={} subaccount_trades={} balances={} active_markets={}",
            self.has_orderbook,
            self.trades,
            self.subaccount_orders,
            self.subaccount_order_history,
            self.subaccount_trades,
            self.subaccount_balances,
            self.active_markets,
        )
    }
}

/// All spot projections of one mirror instance.
#[derive(Debug)]
pub struct SpotStore {
    capacity: usize,
    orderbook: Projection<Option<OrderbookSnapshot>>,
    trades: Projection<BoundedOrderedCollection<SpotTrade>>,
    subaccount_orders: Projection<BoundedOrderedCollection<SubaccountOrder>>,
    subaccount_order_history: Projection<BoundedOrderedCollection<SubaccountOrder>>,
    subaccount_trades: Projection<BoundedOrderedCollection<SpotTrade>>,
    subaccount_balances: Projection<Vec<SubaccountBalance>>,
    active_markets: RwLock<ActiveMarketSet>,
    notifier: Option<Sender<StreamKey>>,
}

impl SpotStore {
    /// Empty store whose collections hold at most `capacity` entries each.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            orderbook: Projection::new(None),
            trades: Projection::new(BoundedOrderedCollection::new(capacity)),
            subaccount_orders: Projection::new(BoundedOrderedCollection::new(capacity)),
            subaccount_order_history: Projection::new(BoundedOrderedCollection::new(capacity)),
            subaccount_trades: Projection::new(BoundedOrderedCollection::new(capacity)),
            subaccount_balances: Projection::new(Vec::new()),
            active_markets: RwLock::new(ActiveMarketSet::new()),
            notifier: None,
        }
    }

    /// Like [`new`](Self::new), also returning the receiver of change
    /// notifications. At most `notify_capacity` notifications are buffered;
    /// further ones are dropped until the consumer catches up.
    pub fn with_notifier(capacity: usize, notify_capacity: usize) -> (Self, Receiver<StreamKey>) {
        let (tx, rx) = crossbeam_channel::bounded(notify_capacity);
        let mut store = Self::new(capacity);
        store.notifier = Some(tx);
        (store, rx)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // --- read accessors ---------------------------------------------------

    pub fn orderbook(&self) -> Option<OrderbookSnapshot> {
        self.orderbook.read(Clone::clone)
    }

    pub fn trades(&self) -> Vec<SpotTrade> {
        self.trades.read(BoundedOrderedCollection::to_vec)
    }

    pub fn trades_count(&self) -> usize {
        self.trades.read(BoundedOrderedCollection::len)
    }

    pub fn subaccount_orders(&self) -> Vec<SubaccountOrder> {
        self.subaccount_orders.read(BoundedOrderedCollection::to_vec)
    }

    pub fn subaccount_orders_count(&self) -> usize {
        self.subaccount_orders.read(BoundedOrderedCollection::len)
    }

    pub fn subaccount_order_history(&self) -> Vec<SubaccountOrder> {
        self.subaccount_order_history.read(BoundedOrderedCollection::to_vec)
    }

    pub fn subaccount_order_history_count(&self) -> usize {
        self.subaccount_order_history.read(BoundedOrderedCollection::len)
    }

    pub fn subaccount_trades(&self) -> Vec<SpotTrade> {
        self.subaccount_trades.read(BoundedOrderedCollection::to_vec)
    }

    pub fn subaccount_trades_count(&self) -> usize {
        self.subaccount_trades.read(BoundedOrderedCollection::len)
    }

    pub fn subaccount_balances(&self) -> Vec<SubaccountBalance> {
        self.subaccount_balances.read(Clone::clone)
    }

    pub fn subaccount_balance(&self, denom: &str) -> Option<SubaccountBalance> {
        self.subaccount_balances
            .read(|balances| balances.iter().find(|b| b.denom == denom).cloned())
    }

    pub fn summary(&self) -> ProjectionSummary {
        ProjectionSummary {
            has_orderbook: self.orderbook.read(Option::is_some),
            trades: self.trades_count(),
            subaccount_orders: self.subaccount_orders_count(),
            subaccount_order_history: self.subaccount_order_history_count(),
            subaccount_trades: self.subaccount_trades_count(),
            subaccount_balances: self.subaccount_balances.read(Vec::len),
            active_markets: self.active_markets.read().len(),
        }
    }

    // --- active markets ---------------------------------------------------

    pub fn set_active_markets<I, S>(&self, markets: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<MarketId>,
    {
        self.active_markets.write().replace(markets);
    }

    pub fn add_active_market(&self, market_id: impl Into<MarketId>) -> bool {
        self.active_markets.write().insert(market_id)
    }

    pub fn remove_active_market(&self, market_id: &str) -> bool {
        self.active_markets.write().remove(market_id)
    }

    pub fn active_markets(&self) -> ActiveMarketSet {
        self.active_markets.read().clone()
    }

    /// Apply `scope` to an event for `market_id` against the current active set.
    pub fn in_scope(&self, scope: &MarketScope, market_id: &str) -> bool {
        scope.accepts(market_id, &self.active_markets.read())
    }

    // --- reconciliation (dispatcher only) ---------------------------------

    pub(crate) fn apply_orderbook(&self, snapshot: OrderbookSnapshot) -> bool {
        let changed = self.orderbook.apply(&OrderbookReconciler, snapshot);
        self.publish(StreamKey::OrderbookForMarket, changed)
    }

    pub(crate) fn apply_trade(&self, operation: StreamOperation, trade: SpotTrade) -> bool {
        let changed = self.trades.apply(&TradeReconciler, (operation, trade));
        self.publish(StreamKey::TradesForMarket, changed)
    }

    pub(crate) fn apply_subaccount_order(&self, order: SubaccountOrder) -> bool {
        let changed = self.subaccount_orders.apply(&SubaccountOrderReconciler, order);
        self.publish(StreamKey::SubaccountOrders, changed)
    }

    pub(crate) fn apply_order_history(&self, order: SubaccountOrder) -> bool {
        let changed = self.subaccount_order_history.apply(&OrderHistoryReconciler, order);
        self.publish(StreamKey::SubaccountOrderHistory, changed)
    }

    pub(crate) fn apply_subaccount_trade(&self, operation: StreamOperation, trade: SpotTrade) -> bool {
        let changed = self.subaccount_trades.apply(&SubaccountTradeReconciler, (operation, trade));
        self.publish(StreamKey::SubaccountTrades, changed)
    }

    pub(crate) fn apply_balance(&self, update: BalanceUpdate) -> bool {
        let changed = self.subaccount_balances.apply(&BalanceReconciler, update);
        self.publish(StreamKey::SubaccountBalances, changed)
    }

    // --- teardown ---------------------------------------------------------

    /// Empty the account-scoped projections (orders, history, trades, balances).
    pub fn clear_account(&self) {
        self.subaccount_orders.replace(BoundedOrderedCollection::new(self.capacity));
        self.subaccount_order_history.replace(BoundedOrderedCollection::new(self.capacity));
        self.subaccount_trades.replace(BoundedOrderedCollection::new(self.capacity));
        self.subaccount_balances.replace(Vec::new());
    }

    /// Empty every projection. The active market set is kept: it is the
    /// consumer's navigation state, not feed data.
    pub fn clear(&self) {
        self.orderbook.replace(None);
        self.trades.replace(BoundedOrderedCollection::new(self.capacity));
        self.clear_account();
    }

    fn publish(&self, key: StreamKey, changed: bool) -> bool {
        if changed {
            if let Some(tx) = &self.notifier {
                match tx.try_send(key) {
                    Ok(()) | Err(TrySendError::Disconnected(_)) => {}
                    Err(TrySendError::Full(_)) => warn!("[{key}] update notification channel full"),
                }
            }
        }
        changed
    }
}
