//! Entity reconcilers: one merge policy per entity kind.
//!
//! A reconciler takes the current projection by value plus one validated
//! event and returns the next projection, tagged with whether anything
//! changed. Reconcilers hold no state and perform no I/O; the store owns the
//! projections and decides when to publish a change.
//!
//! | Kind | Policy |
//! |------|--------|
//! | [`OrderbookReconciler`] | last write wins |
//! | [`TradeReconciler`] | `Insert` prepends, anything else ignored |
//! | [`SubaccountOrderReconciler`] | open states move to front, terminal states remove |
//! | [`OrderHistoryReconciler`] | every state but `Canceled` moves to front, `Canceled` replaces in place |
//! | [`SubaccountTradeReconciler`] | `Insert` prepends, `Update` replaces in place, `Delete` removes |
//! | [`BalanceReconciler`] | upsert by denom, keeping amounts the update omits |

mod balances;
mod order_history;
mod orderbook;
mod orders;
mod subaccount_trades;
mod trades;

#[cfg(test)]
pub(crate) mod test_support;

pub use balances::BalanceReconciler;
pub use order_history::OrderHistoryReconciler;
pub use orderbook::OrderbookReconciler;
pub use orders::SubaccountOrderReconciler;
pub use subaccount_trades::SubaccountTradeReconciler;
pub use trades::TradeReconciler;

/// Result of one reconciliation step.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled<S> {
    Changed(S),
    Unchanged(S),
}

impl<S> Reconciled<S> {
    pub fn changed_if(changed: bool, state: S) -> Self {
        if changed { Self::Changed(state) } else { Self::Unchanged(state) }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }

    pub fn into_inner(self) -> S {
        match self {
            Self::Changed(s) | Self::Unchanged(s) => s,
        }
    }
}

/// Merge policy of one entity kind.
pub trait Reconciler {
    /// Projection the policy maintains.
    type State;
    /// A validated event: required payload fields already present.
    type Event;

    fn reconcile(&self, state: Self::State, event: Self::Event) -> Reconciled<Self::State>;
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use sm_core::collection::{BoundedOrderedCollection, Keyed};
    use sm_core::types::{OrderState, StreamOperation};

    use super::test_support::{order, trade};
    use super::*;

    const HASHES: [&str; 6] = ["h0", "h1", "h2", "h3", "h4", "h5"];

    fn any_hash() -> impl Strategy<Value = &'static str> {
        prop::sample::select(HASHES.to_vec())
    }

    fn any_state() -> impl Strategy<Value = OrderState> {
        prop_oneof![
            Just(OrderState::Booked),
            Just(OrderState::Unfilled),
            Just(OrderState::PartialFilled),
            Just(OrderState::Filled),
            Just(OrderState::Canceled),
            Just(OrderState::Unknown),
        ]
    }

    fn any_operation() -> impl Strategy<Value = StreamOperation> {
        prop_oneof![
            Just(StreamOperation::Insert),
            Just(StreamOperation::Update),
            Just(StreamOperation::Delete),
            Just(StreamOperation::Unknown),
        ]
    }

    fn check_bounded_unique<T: Keyed>(state: &BoundedOrderedCollection<T>) -> Result<(), TestCaseError> {
        prop_assert!(state.len() <= state.capacity());
        let mut keys: Vec<&str> = state.iter().map(Keyed::key).collect();
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        prop_assert_eq!(keys.len(), total);
        Ok(())
    }

    proptest! {
        #[test]
        fn live_orders_unique_and_free_of_terminal(
            cap in 1usize..6,
            events in prop::collection::vec((any_hash(), any_state()), 0..200),
        ) {
            let r = SubaccountOrderReconciler;
            let mut state = BoundedOrderedCollection::new(cap);
            for (hash, order_state) in events {
                let before = state.clone();
                let out = r.reconcile(state, order(hash, order_state));
                let changed = out.is_changed();
                state = out.into_inner();

                check_bounded_unique(&state)?;
                if order_state.is_terminal() {
                    prop_assert!(!state.contains_key(hash));
                }
                if order_state.is_open() {
                    prop_assert_eq!(state.iter().next().map(|o| o.order_hash.as_str()), Some(hash));
                }
                if !changed {
                    prop_assert_eq!(&state, &before);
                }
            }
        }

        #[test]
        fn history_unique_and_cancel_never_inserts(
            cap in 1usize..6,
            events in prop::collection::vec((any_hash(), any_state()), 0..200),
        ) {
            let r = OrderHistoryReconciler;
            let mut state = BoundedOrderedCollection::new(cap);
            for (hash, order_state) in events {
                let known = state.contains_key(hash);
                let len_before = state.len();
                state = r.reconcile(state, order(hash, order_state)).into_inner();

                check_bounded_unique(&state)?;
                match order_state {
                    OrderState::Canceled => {
                        prop_assert_eq!(state.contains_key(hash), known);
                        prop_assert_eq!(state.len(), len_before);
                    }
                    OrderState::Unknown => {
                        prop_assert_eq!(state.len(), len_before);
                    }
                    _ => {
                        prop_assert_eq!(state.iter().next().map(|o| o.state), Some(order_state));
                    }
                }
            }
        }

        #[test]
        fn subaccount_trades_unique_across_operations(
            cap in 1usize..6,
            events in prop::collection::vec((any_hash(), any_operation()), 0..200),
        ) {
            let r = SubaccountTradeReconciler;
            let mut state = BoundedOrderedCollection::new(cap);
            for (step, (hash, operation)) in events.into_iter().enumerate() {
                let known = state.contains_key(hash);
                state = r.reconcile(state, (operation, trade(hash, "0xm1", step as f64))).into_inner();

                check_bounded_unique(&state)?;
                match operation {
                    StreamOperation::Insert => {
                        prop_assert_eq!(state.iter().next().map(|t| t.order_hash.as_str()), Some(hash));
                    }
                    StreamOperation::Update => {
                        prop_assert_eq!(state.contains_key(hash), known);
                        if known {
                            prop_assert_eq!(state.get(hash).map(|t| t.quantity), Some(step as f64));
                        }
                    }
                    StreamOperation::Delete => {
                        prop_assert!(!state.contains_key(hash));
                    }
                    StreamOperation::Unknown => {
                        prop_assert_eq!(state.contains_key(hash), known);
                    }
                }
            }
        }
    }
}
