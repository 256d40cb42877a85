use sm_core::types::OrderbookSnapshot;

use super::{Reconciled, Reconciler};

/// Single-slot, last-write-wins orderbook.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderbookReconciler;

impl Reconciler for OrderbookReconciler {
    type State = Option<OrderbookSnapshot>;
    type Event = OrderbookSnapshot;

    fn reconcile(&self, state: Self::State, event: Self::Event) -> Reconciled<Self::State> {
        let changed = state.as_ref() != Some(&event);
        Reconciled::changed_if(changed, Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sm_core::types::{Orderbook, PriceLevel};

    fn snapshot(market: &str, best_buy: f64) -> OrderbookSnapshot {
        OrderbookSnapshot {
            market_id: market.into(),
            orderbook: Orderbook {
                buys: vec![PriceLevel { price: best_buy, quantity: 1.0, timestamp: 0 }],
                sells: vec![],
                sequence: 1,
            },
        }
    }

    #[test]
    fn last_message_wins() {
        let r = OrderbookReconciler;
        let state = r.reconcile(None, snapshot("0xm1", 10.0));
        assert!(state.is_changed());
        let state = r.reconcile(state.into_inner(), snapshot("0xm1", 11.0)).into_inner();
        assert_eq!(state.and_then(|s| s.orderbook.best_buy().map(|l| l.price)), Some(11.0));
    }

    #[test]
    fn identical_snapshot_is_unchanged() {
        let r = OrderbookReconciler;
        let state = r.reconcile(None, snapshot("0xm1", 10.0)).into_inner();
        assert!(!r.reconcile(state, snapshot("0xm1", 10.0)).is_changed());
    }
}
