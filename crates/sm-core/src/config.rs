//! Configuration parsing for the spot market mirror.
//!
//! The runner reads its settings from a single JSON file: logging metadata,
//! the push endpoint, projection capacity, the session (subaccount and
//! active markets) and which feeds to open.
//!
//! # Example config
//!
//! ```json
//! {
//!   "mirror": { "module_name": "spot_mirror", "log_path": "/tmp/log" },
//!   "endpoint": "wss://indexer.example/stream",
//!   "capacity": 100,
//!   "subaccount_id": "0xabc...000",
//!   "market_id": "0xmarket",
//!   "active_markets": ["0xmarket", "0xother"],
//!   "feeds": ["orderbook", "trades", "subaccount_orders"],
//!   "account_wide": true
//! }
//! ```

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::collection::DEFAULT_CAPACITY;
use crate::error::MirrorError;
use crate::types::{MarketId, StreamKey, SubaccountId};

/// Top-level application config, deserialized from a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Module metadata (name, log path).
    pub mirror: Option<ModuleMeta>,

    /// Push endpoint (e.g. `wss://indexer.example/stream`).
    pub endpoint: String,

    /// Per-projection capacity (default: 100).
    pub capacity: Option<usize>,

    /// Subaccount bound at startup. Account-scoped feeds are skipped without it.
    pub subaccount_id: Option<SubaccountId>,

    /// Market for the orderbook and public trades feeds.
    pub market_id: Option<MarketId>,

    /// Markets accepted by account-wide subscriptions.
    #[serde(default)]
    pub active_markets: Vec<MarketId>,

    /// Feeds to open (default: all).
    pub feeds: Option<Vec<StreamKey>>,

    /// Open account-scoped feeds account-wide instead of for `market_id`.
    #[serde(default)]
    pub account_wide: bool,

    /// Keep-alive ping interval in seconds (none by default).
    pub ping_interval_sec: Option<u64>,

    /// Interval between projection summaries in seconds (default: 10).
    pub summary_interval_sec: Option<u64>,

    /// Bound of the update-notification channel (default: 1024).
    pub notify_capacity: Option<usize>,
}

/// Module metadata block.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleMeta {
    pub module_name: Option<String>,
    pub log_path: Option<String>,
}

impl AppConfig {
    /// Returns the projection capacity, defaulting to [`DEFAULT_CAPACITY`].
    pub fn effective_capacity(&self) -> usize {
        self.capacity.unwrap_or(DEFAULT_CAPACITY)
    }

    /// Returns the configured feeds, or every feed when unset.
    pub fn effective_feeds(&self) -> Vec<StreamKey> {
        self.feeds.clone().unwrap_or_else(|| StreamKey::ALL.to_vec())
    }

    /// Market used to scope account feeds: `None` when `account_wide` is set.
    pub fn account_market(&self) -> Option<MarketId> {
        if self.account_wide { None } else { self.market_id.clone() }
    }

    pub fn module_name(&self) -> String {
        self.mirror
            .as_ref()
            .and_then(|m| m.module_name.clone())
            .unwrap_or_else(|| "spot_mirror".to_string())
    }

    pub fn log_path(&self) -> Option<String> {
        self.mirror.as_ref().and_then(|m| m.log_path.clone())
    }

    pub fn ping_interval(&self) -> Option<Duration> {
        self.ping_interval_sec.filter(|s| *s > 0).map(Duration::from_secs)
    }

    pub fn summary_interval(&self) -> Duration {
        Duration::from_secs(self.summary_interval_sec.unwrap_or(10).max(1))
    }

    pub fn notify_capacity(&self) -> usize {
        self.notify_capacity.unwrap_or(1024)
    }

    /// Check settings that would make the mirror useless.
    ///
    /// A missing subaccount is only warned about: account-scoped subscribes
    /// become no-ops, which is valid for a public-data-only session.
    pub fn validate(&self) -> Result<(), MirrorError> {
        if self.endpoint.trim().is_empty() {
            return Err(MirrorError::Config("endpoint must not be empty".into()));
        }
        if self.effective_capacity() == 0 {
            return Err(MirrorError::Config("capacity must be greater than 0".into()));
        }
        let feeds = self.effective_feeds();
        if feeds.contains(&StreamKey::OrderbookForMarket) && self.market_id.is_none() {
            return Err(MirrorError::Config("orderbook feed requires market_id".into()));
        }
        if self.subaccount_id.is_none() && feeds.iter().any(|k| k.is_account_scoped()) {
            warn!("no subaccount_id configured, account-scoped feeds will not be opened");
        }
        if self.account_wide && self.active_markets.is_empty() {
            warn!("account_wide is set but active_markets is empty, account events will be dropped");
        }
        Ok(())
    }
}

/// Load and parse a JSON config file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
