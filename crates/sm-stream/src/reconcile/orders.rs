use sm_core::collection::BoundedOrderedCollection;
use sm_core::types::{OrderState, SubaccountOrder};

use super::{Reconciled, Reconciler};

/// Live orders view: an order disappears once it is filled or canceled.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubaccountOrderReconciler;

impl Reconciler for SubaccountOrderReconciler {
    type State = BoundedOrderedCollection<SubaccountOrder>;
    type Event = SubaccountOrder;

    fn reconcile(&self, mut state: Self::State, order: Self::Event) -> Reconciled<Self::State> {
        match order.state {
            OrderState::Booked | OrderState::Unfilled | OrderState::PartialFilled => {
                state.replace_front(order);
                Reconciled::Changed(state)
            }
            OrderState::Canceled | OrderState::Filled => {
                let removed = state.remove_by_key(&order.order_hash);
                Reconciled::changed_if(removed, state)
            }
            OrderState::Unknown => Reconciled::Unchanged(state),
        }
    }
}
