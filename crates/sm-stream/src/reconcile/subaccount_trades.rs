use sm_core::collection::BoundedOrderedCollection;
use sm_core::types::{SpotTrade, StreamOperation};

use super::{Reconciled, Reconciler};

/// Subaccount trades: mirrors an insert/update/delete log into a flat,
/// recency-ordered view keyed by order hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubaccountTradeReconciler;

impl Reconciler for SubaccountTradeReconciler {
    type State = BoundedOrderedCollection<SpotTrade>;
    type Event = (StreamOperation, SpotTrade);

    fn reconcile(&self, mut state: Self::State, (operation, trade): Self::Event) -> Reconciled<Self::State> {
        let changed = match operation {
            StreamOperation::Insert => {
                state.replace_front(trade);
                true
            }
            StreamOperation::Update => state.upsert_by_key(trade),
            StreamOperation::Delete => state.remove_by_key(&trade.order_hash),
            StreamOperation::Unknown => false,
        };
        Reconciled::changed_if(changed, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::test_support::trade;

    #[test]
    fn insert_update_delete() {
        let r = SubaccountTradeReconciler;
        let mut state = BoundedOrderedCollection::new(10);
        state = r.reconcile(state, (StreamOperation::Insert, trade("T1", "0xm1", 1.0))).into_inner();
        state = r.reconcile(state, (StreamOperation::Update, trade("T1", "0xm1", 5.0))).into_inner();

        assert_eq!(state.len(), 1);
        assert_eq!(state.get("T1").map(|t| t.quantity), Some(5.0));

        state = r.reconcile(state, (StreamOperation::Delete, trade("T1", "0xm1", 5.0))).into_inner();
        assert!(!state.contains_key("T1"));
    }

    #[test]
    fn update_of_absent_trade_does_not_create() {
        let r = SubaccountTradeReconciler;
        let out = r.reconcile(
            BoundedOrderedCollection::new(10),
            (StreamOperation::Update, trade("T1", "0xm1", 5.0)),
        );
        assert!(!out.is_changed());
        assert!(out.into_inner().is_empty());
    }

    #[test]
    fn update_keeps_position() {
        let r = SubaccountTradeReconciler;
        let mut state = BoundedOrderedCollection::new(10);
        for hash in ["T1", "T2", "T3"] {
            state = r.reconcile(state, (StreamOperation::Insert, trade(hash, "0xm1", 1.0))).into_inner();
        }
        state = r.reconcile(state, (StreamOperation::Update, trade("T2", "0xm1", 2.0))).into_inner();
        let hashes: Vec<_> = state.iter().map(|t| t.order_hash.as_str()).collect();
        assert_eq!(hashes, ["T3", "T2", "T1"]);
    }
}
