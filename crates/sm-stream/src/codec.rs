//! JSON frame codec for the push endpoint.
//!
//! Inbound frames are either a bare event object or an envelope
//! `{"result": { ... }}`; both decode to the [`FeedEvent`] variant of the
//! stream they arrived on. Outbound, [`build_subscribe`] renders a
//! [`StreamDescriptor`] as the subscribe request, omitting absent filters.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use sm_core::error::MirrorError;
use sm_core::types::*;

use crate::transport::StreamDescriptor;

/// Decode one text frame received on the stream of `key`.
pub fn decode_frame(key: StreamKey, text: &str) -> Result<FeedEvent, MirrorError> {
    let mut v: Value = serde_json::from_str(text).map_err(|e| MirrorError::Parse(format!("[{key}] {e}")))?;

    if let Some(inner) = v.get_mut("result").filter(|r| r.is_object()) {
        v = inner.take();
    }

    let event = match key {
        StreamKey::OrderbookForMarket => FeedEvent::Orderbook(decode(key, v)?),
        StreamKey::TradesForMarket | StreamKey::SubaccountTrades => FeedEvent::Trade(decode(key, v)?),
        StreamKey::SubaccountOrders | StreamKey::SubaccountOrderHistory => FeedEvent::Order(decode(key, v)?),
        StreamKey::SubaccountBalances => FeedEvent::Balance(decode(key, v)?),
    };
    Ok(event)
}

fn decode<T: DeserializeOwned>(key: StreamKey, v: Value) -> Result<T, MirrorError> {
    serde_json::from_value(v).map_err(|e| MirrorError::Parse(format!("[{key}] {e}")))
}

/// Build the subscribe request for `descriptor`.
///
/// ```text
/// {"op":"subscribe","channel":"subaccount_orders","marketId":"0x..","subaccountId":"0x.."}
/// ```
pub fn build_subscribe(descriptor: &StreamDescriptor) -> String {
    let request = &descriptor.request;
    let mut msg = Map::new();
    msg.insert("op".into(), Value::from("subscribe"));
    msg.insert("channel".into(), Value::from(descriptor.key.as_str()));
    if let Some(market_id) = &request.market_id {
        msg.insert("marketId".into(), Value::from(market_id.as_str()));
    }
    if let Some(subaccount_id) = &request.subaccount_id {
        msg.insert("subaccountId".into(), Value::from(subaccount_id.as_str()));
    }
    if let Some(side) = request.execution_side {
        msg.insert("executionSide".into(), Value::from(side.as_str()));
    }
    Value::Object(msg).to_string()
}
