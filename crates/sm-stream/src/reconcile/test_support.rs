//! Entity builders shared by the reconciler tests.

use sm_core::types::{Direction, OrderState, SpotTrade, SubaccountOrder};

pub fn trade(hash: &str, market: &str, quantity: f64) -> SpotTrade {
    SpotTrade {
        order_hash: hash.into(),
        market_id: market.into(),
        subaccount_id: "0xs1".into(),
        trade_id: format!("{hash}-trade"),
        trade_direction: Direction::Buy,
        execution_side: None,
        price: 1.0,
        quantity,
        fee: 0.0,
        executed_at: 0,
    }
}

pub fn order(hash: &str, state: OrderState) -> SubaccountOrder {
    order_in(hash, "0xm1", state)
}

pub fn order_in(hash: &str, market: &str, state: OrderState) -> SubaccountOrder {
    SubaccountOrder {
        order_hash: hash.into(),
        market_id: market.into(),
        subaccount_id: "0xs1".into(),
        order_side: Direction::Buy,
        state,
        price: 1.0,
        quantity: 10.0,
        unfilled_quantity: 10.0,
        trigger_price: 0.0,
        created_at: 0,
        updated_at: 0,
    }
}
