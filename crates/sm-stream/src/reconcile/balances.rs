use sm_core::types::{BalanceUpdate, SubaccountBalance};

use super::{Reconciled, Reconciler};

/// Balances by denom. Not capacity-bounded: the set of denoms a subaccount
/// holds is small and dropping one would misreport funds.
///
/// An updated denom moves to the back, so the list is ordered by last
/// update, oldest first.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceReconciler;

impl Reconciler for BalanceReconciler {
    type State = Vec<SubaccountBalance>;
    type Event = BalanceUpdate;

    fn reconcile(&self, mut state: Self::State, update: Self::Event) -> Reconciled<Self::State> {
        match state.iter().position(|b| b.denom == update.denom) {
            Some(idx) => {
                let current = state.remove(idx);
                let resolved = SubaccountBalance::resolve(update, Some(&current));
                let changed = current != resolved || idx != state.len();
                state.push(resolved);
                Reconciled::changed_if(changed, state)
            }
            None => {
                state.push(SubaccountBalance::resolve(update, None));
                Reconciled::Changed(state)
            }
        }
    }
}
