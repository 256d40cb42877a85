//! Enumerations used throughout the spot market mirror.
//!
//! Wire enums carry a `#[serde(other)]` fallback so that a value the indexer
//! adds later decodes as `Unknown` instead of failing the whole frame.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Stream keys
// ---------------------------------------------------------------------------

/// Identity of a logical feed. At most one live subscription exists per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StreamKey {
    /// Orderbook snapshots for one market.
    #[serde(rename = "orderbook")]
    OrderbookForMarket,
    /// Public trade prints for one market.
    #[serde(rename = "trades")]
    TradesForMarket,
    /// Live (non-terminal) orders of the bound subaccount.
    #[serde(rename = "subaccount_orders")]
    SubaccountOrders,
    /// Order history of the bound subaccount.
    #[serde(rename = "subaccount_order_history")]
    SubaccountOrderHistory,
    /// Trades of the bound subaccount.
    #[serde(rename = "subaccount_trades")]
    SubaccountTrades,
    /// Bank balances of the bound subaccount.
    #[serde(rename = "subaccount_balances")]
    SubaccountBalances,
}

impl StreamKey {
    /// Every stream key, public feeds first.
    pub const ALL: [StreamKey; 6] = [
        StreamKey::OrderbookForMarket,
        StreamKey::TradesForMarket,
        StreamKey::SubaccountOrders,
        StreamKey::SubaccountOrderHistory,
        StreamKey::SubaccountTrades,
        StreamKey::SubaccountBalances,
    ];

    /// Whether opening this feed requires a bound subaccount.
    pub fn is_account_scoped(self) -> bool {
        !matches!(self, Self::OrderbookForMarket | Self::TradesForMarket)
    }

    /// Stable snake_case name, also used as the wire channel name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OrderbookForMarket => "orderbook",
            Self::TradesForMarket => "trades",
            Self::SubaccountOrders => "subaccount_orders",
            Self::SubaccountOrderHistory => "subaccount_order_history",
            Self::SubaccountTrades => "subaccount_trades",
            Self::SubaccountBalances => "subaccount_balances",
        }
    }
}

impl std::fmt::Display for StreamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Order lifecycle
// ---------------------------------------------------------------------------

/// Spot order state as reported by the indexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Booked,
    Unfilled,
    PartialFilled,
    Filled,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl OrderState {
    /// `Booked`, `Unfilled` or `PartialFilled`: the order still rests on the book.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Booked | Self::Unfilled | Self::PartialFilled)
    }

    /// `Filled` or `Canceled`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Filled | Self::Canceled)
    }
}

/// Operation tag attached to trade (and order) stream events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamOperation {
    Insert,
    Update,
    Delete,
    #[serde(other)]
    Unknown,
}

// ---------------------------------------------------------------------------
// Trade metadata
// ---------------------------------------------------------------------------

/// Whether the trade side provided or took liquidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeExecutionSide {
    Maker,
    Taker,
}

impl TradeExecutionSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Maker => "maker",
            Self::Taker => "taker",
        }
    }
}

/// Buy or sell direction of an order or trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Buy,
    Sell,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_state_wire_names() {
        let s: OrderState = serde_json::from_str("\"partial_filled\"").unwrap();
        assert_eq!(s, OrderState::PartialFilled);
        let s: OrderState = serde_json::from_str("\"booked\"").unwrap();
        assert!(s.is_open());
        let s: OrderState = serde_json::from_str("\"canceled\"").unwrap();
        assert!(s.is_terminal());
    }

    #[test]
    fn unknown_values_do_not_fail() {
        let s: OrderState = serde_json::from_str("\"triggered\"").unwrap();
        assert_eq!(s, OrderState::Unknown);
        assert!(!s.is_open() && !s.is_terminal());

        let op: StreamOperation = serde_json::from_str("\"replace\"").unwrap();
        assert_eq!(op, StreamOperation::Unknown);
    }

    #[test]
    fn stream_key_names_match_serde() {
        for key in StreamKey::ALL {
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key.as_str()));
        }
        assert!(!StreamKey::OrderbookForMarket.is_account_scoped());
        assert!(!StreamKey::TradesForMarket.is_account_scoped());
        assert!(StreamKey::SubaccountBalances.is_account_scoped());
    }
}
