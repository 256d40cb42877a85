//! Market scope filtering for account-scoped feeds.
//!
//! An account-wide subscription receives events for every market the
//! subaccount ever touched. The consumer only cares about the markets in its
//! [`ActiveMarketSet`]; events for any other market are dropped before they
//! reach a projection. A subscription opened for one market is already
//! filtered server-side, so its scope passes everything through.

use ahash::AHashSet;

use crate::types::MarketId;

/// The declared scope of one subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarketScope {
    /// Restricted to one market; the server filters, the mirror does not.
    Market(MarketId),
    /// Every market of the account, gated by the active market set.
    AccountWide,
}

impl MarketScope {
    /// `Some(market)` scopes to that market, `None` is account-wide.
    pub fn from_market(market_id: Option<MarketId>) -> Self {
        match market_id {
            Some(id) => Self::Market(id),
            None => Self::AccountWide,
        }
    }

    pub fn market_id(&self) -> Option<&str> {
        match self {
            Self::Market(id) => Some(id),
            Self::AccountWide => None,
        }
    }

    /// Whether an event for `market_id` should be applied.
    #[inline]
    pub fn accepts(&self, market_id: &str, active: &ActiveMarketSet) -> bool {
        match self {
            Self::Market(_) => true,
            Self::AccountWide => active.contains(market_id),
        }
    }
}

/// The markets the consumer currently displays or trades.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveMarketSet {
    markets: AHashSet<MarketId>,
}

impl ActiveMarketSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, market_id: &str) -> bool {
        self.markets.contains(market_id)
    }

    /// Returns `true` if the market was not present yet.
    pub fn insert(&mut self, market_id: impl Into<MarketId>) -> bool {
        self.markets.insert(market_id.into())
    }

    pub fn remove(&mut self, market_id: &str) -> bool {
        self.markets.remove(market_id)
    }

    /// Replace the whole set.
    pub fn replace<I, S>(&mut self, markets: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<MarketId>,
    {
        self.markets = markets.into_iter().map(Into::into).collect();
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    pub fn clear(&mut self) {
        self.markets.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.markets.iter().map(String::as_str)
    }
}

impl<S: Into<MarketId>> FromIterator<S> for ActiveMarketSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            markets: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_scope_passes_everything() {
        let active = ActiveMarketSet::new();
        let scope = MarketScope::from_market(Some("0xm1".into()));
        assert_eq!(scope.market_id(), Some("0xm1"));
        assert!(scope.accepts("0xm1", &active));
        assert!(scope.accepts("0xother", &active));
    }

    #[test]
    fn account_wide_scope_checks_active_set() {
        let active: ActiveMarketSet = ["0xm1"].into_iter().collect();
        let scope = MarketScope::from_market(None);
        assert_eq!(scope, MarketScope::AccountWide);
        assert!(scope.accepts("0xm1", &active));
        assert!(!scope.accepts("0xm2", &active));
        assert!(!scope.accepts("", &active));
    }

    #[test]
    fn active_set_mutation() {
        let mut active = ActiveMarketSet::new();
        assert!(active.insert("a"));
        assert!(!active.insert("a"));
        active.replace(["b", "c"]);
        assert!(!active.contains("a"));
        assert_eq!(active.len(), 2);
        assert!(active.remove("b"));
        active.clear();
        assert!(active.is_empty());
    }
}
