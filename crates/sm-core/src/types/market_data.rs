//! Market data structures: orderbook state and trade prints.
//!
//! # Timestamp convention
//!
//! All timestamps are **milliseconds since Unix epoch**, as sent by the
//! indexer. A missing timestamp decodes as `0`.

use serde::{Deserialize, Serialize};

use super::enums::{Direction, TradeExecutionSide};
use super::ids::{MarketId, OrderHash, SubaccountId};
use crate::collection::Keyed;
use crate::numeric::{de_f64, de_u64};

// ---------------------------------------------------------------------------
// Orderbook
// ---------------------------------------------------------------------------

/// One aggregated price level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLevel {
    #[serde(deserialize_with = "de_f64")]
    pub price: f64,
    #[serde(deserialize_with = "de_f64")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "de_u64")]
    pub timestamp: u64,
}

/// Book state as pushed by the orderbook feed.
///
/// `buys` are ordered best (highest) first and `sells` best (lowest) first;
/// the feed sends them that way and the mirror does not re-sort.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Orderbook {
    #[serde(default)]
    pub buys: Vec<PriceLevel>,
    #[serde(default)]
    pub sells: Vec<PriceLevel>,
    #[serde(default, deserialize_with = "de_u64")]
    pub sequence: u64,
}

impl Orderbook {
    /// Best bid level, if any.
    pub fn best_buy(&self) -> Option<&PriceLevel> {
        self.buys.first()
    }

    /// Best ask level, if any.
    pub fn best_sell(&self) -> Option<&PriceLevel> {
        self.sells.first()
    }

    /// Best ask minus best bid, when both sides are present.
    pub fn spread(&self) -> Option<f64> {
        Some(self.best_sell()?.price - self.best_buy()?.price)
    }

    /// Returns `true` if the book has no levels on either side.
    pub fn is_empty(&self) -> bool {
        self.buys.is_empty() && self.sells.is_empty()
    }
}

/// The single-slot orderbook projection: a market plus its latest book.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderbookSnapshot {
    pub market_id: MarketId,
    pub orderbook: Orderbook,
}

// ---------------------------------------------------------------------------
// Trade
// ---------------------------------------------------------------------------

/// A spot trade print, public or belonging to the bound subaccount.
///
/// Identified by `order_hash` within a projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotTrade {
    pub order_hash: OrderHash,
    #[serde(default)]
    pub market_id: MarketId,
    #[serde(default)]
    pub subaccount_id: SubaccountId,
    #[serde(default)]
    pub trade_id: String,
    #[serde(default)]
    pub trade_direction: Direction,
    #[serde(default)]
    pub execution_side: Option<TradeExecutionSide>,
    #[serde(deserialize_with = "de_f64")]
    pub price: f64,
    #[serde(deserialize_with = "de_f64")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "de_f64")]
    pub fee: f64,
    #[serde(default, deserialize_with = "de_u64")]
    pub executed_at: u64,
}

impl Keyed for SpotTrade {
    fn key(&self) -> &str {
        &self.order_hash
    }
}
