//! Identifier aliases shared across the mirror.
//!
//! The indexer sends all identifiers as hex strings; they are compared by
//! value only, never parsed.

/// Market identifier (e.g. `0x0611780b...`).
pub type MarketId = String;

/// Subaccount identifier (an address-derived hex string).
pub type SubaccountId = String;

/// Order hash, the identity key used to deduplicate orders and trades.
pub type OrderHash = String;

/// Bank denomination (e.g. `"inj"`, `"peggy0xdAC17F958D2ee523a2206206994597C13D831ec7"`).
pub type Denom = String;
