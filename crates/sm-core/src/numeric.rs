//! Numeric decoding helpers for indexer payloads.
//!
//! The indexer encodes prices and quantities as decimal strings
//! (`"0.000000000001234"`) but occasionally as plain JSON numbers, and
//! timestamps as either. These helpers accept both forms and are wired into
//! the entity structs through `#[serde(deserialize_with = ...)]`.

use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::Value;

/// Parse a JSON value (string or number) as `f64`.
///
/// `null` and the empty string decode as `0.0`, matching how the indexer
/// reports an unset quantity.
#[inline]
pub fn parse_str_f64(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Null => Some(0.0),
        Value::String(s) if s.is_empty() => Some(0.0),
        Value::String(s) => fast_float2::parse(s).ok(),
        other => other.as_f64(),
    }
}

/// Parse a JSON value (string or number) as `u64`.
#[inline]
pub fn parse_str_u64(v: Option<&Value>) -> Option<u64> {
    match v? {
        Value::Null => Some(0),
        Value::String(s) if s.is_empty() => Some(0),
        Value::String(s) => s.parse().ok(),
        other => other.as_u64(),
    }
}

/// Serde adapter: decimal string or number into `f64`.
pub fn de_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    parse_str_f64(Some(&v)).ok_or_else(|| D::Error::custom(format!("expected decimal, got {v}")))
}

/// Serde adapter: integer string or number into `u64`.
pub fn de_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    parse_str_u64(Some(&v)).ok_or_else(|| D::Error::custom(format!("expected integer, got {v}")))
}

/// Serde adapter: optional amount kept verbatim as a string.
///
/// Chain amounts exceed `f64` precision, so balances are carried as
/// strings. Numbers are stringified; `null`/missing stays `None`.
pub fn de_opt_amount<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected amount, got {other}"))),
    }
}
