//! Account-scoped entities: subaccount orders and bank balances.

use serde::{Deserialize, Serialize};

use super::enums::{Direction, OrderState};
use super::ids::{Denom, MarketId, OrderHash, SubaccountId};
use crate::collection::Keyed;
use crate::numeric::{de_f64, de_opt_amount, de_u64};

// ---------------------------------------------------------------------------
// Subaccount order
// ---------------------------------------------------------------------------

/// A spot order of the bound subaccount, as pushed by the orders and order
/// history feeds. Identified by `order_hash`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubaccountOrder {
    pub order_hash: OrderHash,
    #[serde(default)]
    pub market_id: MarketId,
    #[serde(default)]
    pub subaccount_id: SubaccountId,
    #[serde(default)]
    pub order_side: Direction,
    pub state: OrderState,
    #[serde(default, deserialize_with = "de_f64")]
    pub price: f64,
    #[serde(default, deserialize_with = "de_f64")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "de_f64")]
    pub unfilled_quantity: f64,
    #[serde(default, deserialize_with = "de_f64")]
    pub trigger_price: f64,
    #[serde(default, deserialize_with = "de_u64")]
    pub created_at: u64,
    #[serde(default, deserialize_with = "de_u64")]
    pub updated_at: u64,
}

impl SubaccountOrder {
    /// Quantity filled so far.
    pub fn filled_quantity(&self) -> f64 {
        (self.quantity - self.unfilled_quantity).max(0.0)
    }
}

impl Keyed for SubaccountOrder {
    fn key(&self) -> &str {
        &self.order_hash
    }
}

// ---------------------------------------------------------------------------
// Balances
// ---------------------------------------------------------------------------

/// A balance change as pushed by the balances feed. Either amount may be
/// absent when only the other one changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceUpdate {
    #[serde(default)]
    pub subaccount_id: SubaccountId,
    pub denom: Denom,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub total_balance: Option<String>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub available_balance: Option<String>,
}

/// Resolved balance of one denom. Amounts are integer strings in base units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubaccountBalance {
    pub subaccount_id: SubaccountId,
    pub denom: Denom,
    pub total_balance: String,
    pub available_balance: String,
}

/// Amount used when neither the update nor the current state has a value.
pub const ZERO_AMOUNT: &str = "0";

impl SubaccountBalance {
    /// Resolve an update against the currently known balance of the same
    /// denom, keeping the previous amount for any field the update omits.
    pub fn resolve(update: BalanceUpdate, current: Option<&SubaccountBalance>) -> Self {
        let fallback = |pick: fn(&SubaccountBalance) -> &String| {
            current.map_or_else(|| ZERO_AMOUNT.to_string(), |c| pick(c).clone())
        };
        Self {
            total_balance: update.total_balance.unwrap_or_else(|| fallback(|c| &c.total_balance)),
            available_balance: update
                .available_balance
                .unwrap_or_else(|| fallback(|c| &c.available_balance)),
            subaccount_id: update.subaccount_id,
            denom: update.denom,
        }
    }
}

impl Keyed for SubaccountBalance {
    fn key(&self) -> &str {
        &self.denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_from_indexer_json() {
        let o: SubaccountOrder = serde_json::from_str(
            r#"{
                "orderHash": "0xh1",
                "marketId": "0xm1",
                "subaccountId": "0xs1",
                "orderSide": "sell",
                "state": "partial_filled",
                "price": "1.5",
                "quantity": "10",
                "unfilledQuantity": "4",
                "triggerPrice": "0",
                "createdAt": 1,
                "updatedAt": "2"
            }"#,
        )
        .unwrap();
        assert_eq!(o.key(), "0xh1");
        assert_eq!(o.state, OrderState::PartialFilled);
        assert_eq!(o.order_side, Direction::Sell);
        assert_eq!(o.filled_quantity(), 6.0);
        assert_eq!(o.updated_at, 2);
    }

    #[test]
    fn balance_resolve_keeps_missing_fields() {
        let current = SubaccountBalance {
            subaccount_id: "0xs1".into(),
            denom: "inj".into(),
            total_balance: "100".into(),
            available_balance: "80".into(),
        };
        let update = BalanceUpdate {
            subaccount_id: "0xs1".into(),
            denom: "inj".into(),
            total_balance: None,
            available_balance: Some("50".into()),
        };
        let resolved = SubaccountBalance::resolve(update, Some(&current));
        assert_eq!(resolved.total_balance, "100");
        assert_eq!(resolved.available_balance, "50");
    }

    #[test]
    fn balance_resolve_defaults_to_zero() {
        let update: BalanceUpdate =
            serde_json::from_str(r#"{"denom":"usdt","totalBalance":"7"}"#).unwrap();
        let resolved = SubaccountBalance::resolve(update, None);
        assert_eq!(resolved.total_balance, "7");
        assert_eq!(resolved.available_balance, ZERO_AMOUNT);
        assert_eq!(resolved.key(), "usdt");
    }
}
