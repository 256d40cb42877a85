use sm_core::collection::BoundedOrderedCollection;
use sm_core::types::{SpotTrade, StreamOperation};

use super::{Reconciled, Reconciler};

/// Public trade feed: prints are only ever inserted.
///
/// A print re-emitted under an order hash already shown replaces the older
/// one, so order hashes stay unique within the projection.
#[derive(Debug, Clone, Copy, Default)]
pub struct TradeReconciler;

impl Reconciler for TradeReconciler {
    type State = BoundedOrderedCollection<SpotTrade>;
    type Event = (StreamOperation, SpotTrade);

    fn reconcile(&self, mut state: Self::State, (operation, trade): Self::Event) -> Reconciled<Self::State> {
        match operation {
            StreamOperation::Insert => {
                state.replace_front(trade);
                Reconciled::Changed(state)
            }
            StreamOperation::Update | StreamOperation::Delete | StreamOperation::Unknown => {
                Reconciled::Unchanged(state)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::test_support::trade;

    #[test]
    fn inserts_prepend() {
        let r = TradeReconciler;
        let mut state = BoundedOrderedCollection::new(2);
        for hash in ["t1", "t2", "t3"] {
            state = r.reconcile(state, (StreamOperation::Insert, trade(hash, "0xm1", 1.0))).into_inner();
        }
        let hashes: Vec<_> = state.iter().map(|t| t.order_hash.as_str()).collect();
        assert_eq!(hashes, ["t3", "t2"]);
    }

    #[test]
    fn reinsert_same_hash_keeps_one() {
        let r = TradeReconciler;
        let mut state = BoundedOrderedCollection::new(5);
        state = r.reconcile(state, (StreamOperation::Insert, trade("t1", "0xm1", 1.0))).into_inner();
        state = r.reconcile(state, (StreamOperation::Insert, trade("t2", "0xm1", 1.0))).into_inner();
        state = r.reconcile(state, (StreamOperation::Insert, trade("t1", "0xm1", 2.0))).into_inner();
        let hashes: Vec<_> = state.iter().map(|t| t.order_hash.as_str()).collect();
        assert_eq!(hashes, ["t1", "t2"]);
        assert_eq!(state.get("t1").map(|t| t.quantity), Some(2.0));
    }

    #[test]
    fn other_operations_ignored() {
        let r = TradeReconciler;
        let state = BoundedOrderedCollection::new(5);
        let state = r.reconcile(state, (StreamOperation::Insert, trade("t1", "0xm1", 1.0))).into_inner();
        for op in [StreamOperation::Update, StreamOperation::Delete, StreamOperation::Unknown] {
            let out = r.reconcile(state.clone(), (op, trade("t1", "0xm1", 9.0)));
            assert!(!out.is_changed());
            assert_eq!(out.into_inner(), state);
        }
    }
}
