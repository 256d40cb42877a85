use sm_core::collection::BoundedOrderedCollection;
use sm_core::types::{OrderState, SubaccountOrder};

use super::{Reconciled, Reconciler};

/// Order history view: entries are never removed; a cancel is recorded in
/// place on an order already present.
///
/// A cancel for an order the history has never seen is dropped. This loses
/// the record when the order was created before the stream (re)connected;
/// periodic REST hydration is expected to repair it.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderHistoryReconciler;

impl Reconciler for OrderHistoryReconciler {
    type State = BoundedOrderedCollection<SubaccountOrder>;
    type Event = SubaccountOrder;

    fn reconcile(&self, mut state: Self::State, order: Self::Event) -> Reconciled<Self::State> {
        match order.state {
            OrderState::Booked | OrderState::Unfilled | OrderState::PartialFilled | OrderState::Filled => {
                state.replace_front(order);
                Reconciled::Changed(state)
            }
            OrderState::Canceled => {
                if order.order_hash.is_empty() {
                    return Reconciled::Unchanged(state);
                }
                let replaced = state.upsert_by_key(order);
                Reconciled::changed_if(replaced, state)
            }
            OrderState::Unknown => Reconciled::Unchanged(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::test_support::order;

    #[test]
    fn filled_is_retained_at_front() {
        let r = OrderHistoryReconciler;
        let mut state = BoundedOrderedCollection::new(10);
        state = r.reconcile(state, order("h1", OrderState::Booked)).into_inner();
        state = r.reconcile(state, order("h2", OrderState::Booked)).into_inner();
        state = r.reconcile(state, order("h1", OrderState::Filled)).into_inner();

        let hashes: Vec<_> = state.iter().map(|o| o.order_hash.as_str()).collect();
        assert_eq!(hashes, ["h1", "h2"]);
        assert_eq!(state.get("h1").map(|o| o.state), Some(OrderState::Filled));
    }

    #[test]
    fn cancel_replaces_in_place() {
        let r = OrderHistoryReconciler;
        let mut state = BoundedOrderedCollection::new(10);
        state = r.reconcile(state, order("h1", OrderState::Booked)).into_inner();
        state = r.reconcile(state, order("h2", OrderState::Booked)).into_inner();
        let out = r.reconcile(state, order("h1", OrderState::Canceled));
        assert!(out.is_changed());
        let state = out.into_inner();

        let hashes: Vec<_> = state.iter().map(|o| o.order_hash.as_str()).collect();
        assert_eq!(hashes, ["h2", "h1"]);
        assert_eq!(state.get("h1").map(|o| o.state), Some(OrderState::Canceled));
    }

    #[test]
    fn cancel_for_unseen_order_is_dropped() {
        let r = OrderHistoryReconciler;
        let mut state = BoundedOrderedCollection::new(10);
        state = r.reconcile(state, order("h1", OrderState::Booked)).into_inner();
        let out = r.reconcile(state, order("h9", OrderState::Canceled));
        assert!(!out.is_changed());
        let state = out.into_inner();
        assert_eq!(state.len(), 1);
        assert!(!state.contains_key("h9"));
    }

    #[test]
    fn cancel_without_hash_is_dropped() {
        let r = OrderHistoryReconciler;
        let state = r
            .reconcile(BoundedOrderedCollection::new(10), order("", OrderState::Booked))
            .into_inner();
        assert!(!r.reconcile(state, order("", OrderState::Canceled)).is_changed());
    }
}
