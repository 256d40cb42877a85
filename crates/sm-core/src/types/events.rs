//! Feed event payloads, one per feed family.
//!
//! Every payload is optional: the transport also delivers heartbeats and
//! partial frames, which decode with the payload set to `None` and are then
//! ignored by the dispatcher.

use serde::{Deserialize, Serialize};

use super::enums::StreamOperation;
use super::ids::MarketId;
use super::market_data::{Orderbook, SpotTrade};
use super::trading::{BalanceUpdate, SubaccountOrder};
use crate::numeric::de_u64;

/// Orderbook feed event: `{ marketId, orderbook? }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderbookEvent {
    #[serde(default)]
    pub market_id: MarketId,
    #[serde(default, alias = "snapshot")]
    pub orderbook: Option<Orderbook>,
    #[serde(default, deserialize_with = "de_u64")]
    pub timestamp: u64,
}

/// Trade feed event, public or subaccount: `{ trade?, operation? }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeEvent {
    #[serde(default)]
    pub trade: Option<SpotTrade>,
    #[serde(default)]
    pub operation: Option<StreamOperation>,
    #[serde(default, deserialize_with = "de_u64")]
    pub timestamp: u64,
}

/// Order feed event (orders and order history): `{ order?, operation? }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEvent {
    #[serde(default)]
    pub order: Option<SubaccountOrder>,
    #[serde(default)]
    pub operation: Option<StreamOperation>,
    #[serde(default, deserialize_with = "de_u64")]
    pub timestamp: u64,
}

/// Balance feed event: `{ balance? }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceEvent {
    #[serde(default)]
    pub balance: Option<BalanceUpdate>,
    #[serde(default, deserialize_with = "de_u64")]
    pub timestamp: u64,
}

/// A tagged union of all feed events, as handed to subscription callbacks.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Orderbook(OrderbookEvent),
    Trade(TradeEvent),
    Order(OrderEvent),
    Balance(BalanceEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heartbeat_frames_decode_without_payload() {
        let e: OrderbookEvent = serde_json::from_str(r#"{"marketId":"0xm1"}"#).unwrap();
        assert!(e.orderbook.is_none());
        let e: TradeEvent = serde_json::from_str("{}").unwrap();
        assert!(e.trade.is_none() && e.operation.is_none());
        let e: OrderEvent = serde_json::from_str(r#"{"timestamp":5}"#).unwrap();
        assert!(e.order.is_none());
        let e: BalanceEvent = serde_json::from_str(r#"{"balance":null}"#).unwrap();
        assert!(e.balance.is_none());
    }

    #[test]
    fn snapshot_alias_is_accepted() {
        let e: OrderbookEvent =
            serde_json::from_str(r#"{"marketId":"0xm1","snapshot":{"buys":[],"sells":[]}}"#).unwrap();
        assert!(e.orderbook.is_some());
    }
}
