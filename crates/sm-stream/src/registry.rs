//! Subscription registry: at most one live stream per [`StreamKey`].
//!
//! Subscribing under a key that already has a live handle cancels that
//! handle first and only then opens the new stream. The map lock is held
//! across cancel-then-open, so two concurrent subscribes on one key
//! serialize and never leave two handles delivering at once.

use ahash::AHashMap;
use parking_lot::Mutex;
use sm_core::error::MirrorError;
use sm_core::types::StreamKey;
use tracing::{debug, error, info};

use crate::transport::StreamHandle;

/// Registry of live subscriptions, one slot per stream key.
#[derive(Default)]
pub struct SubscriptionRegistry {
    handles: Mutex<AHashMap<StreamKey, Box<dyn StreamHandle>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any live handle for `key`, then call `open` and store the
    /// handle it returns.
    ///
    /// If `open` fails the key is left without a subscription and `false`
    /// is returned; the error is logged, not propagated.
    pub fn subscribe<F>(&self, key: StreamKey, open: F) -> bool
    where
        F: FnOnce() -> Result<Box<dyn StreamHandle>, MirrorError>,
    {
        let mut handles = self.handles.lock();

        if let Some(mut previous) = handles.remove(&key) {
            previous.cancel();
            debug!("[{key}] cancelled previous subscription");
        }

        match open() {
            Ok(handle) => {
                handles.insert(key, handle);
                info!("[{key}] subscribed");
                true
            }
            Err(e) => {
                error!("[{key}] failed to open stream: {e}");
                false
            }
        }
    }

    /// Cancel and forget the handle for `key`. Cancelling an absent key is a
    /// no-op returning `false`.
    pub fn cancel(&self, key: StreamKey) -> bool {
        let removed = self.handles.lock().remove(&key);
        match removed {
            Some(mut handle) => {
                handle.cancel();
                info!("[{key}] cancelled");
                true
            }
            None => false,
        }
    }

    /// Cancel every key in `keys`. Returns how many were live.
    pub fn cancel_many(&self, keys: &[StreamKey]) -> usize {
        keys.iter().filter(|key| self.cancel(**key)).count()
    }

    /// Cancel every live subscription. Returns how many there were.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<_> = self.handles.lock().drain().collect();
        let count = drained.len();
        for (key, mut handle) in drained {
            handle.cancel();
            debug!("[{key}] cancelled");
        }
        if count > 0 {
            info!("cancelled {count} subscription(s)");
        }
        count
    }

    pub fn is_active(&self, key: StreamKey) -> bool {
        self.handles.lock().contains_key(&key)
    }

    /// Live keys, sorted.
    pub fn active_keys(&self) -> Vec<StreamKey> {
        let mut keys: Vec<_> = self.handles.lock().keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }
}

impl Drop for SubscriptionRegistry {
    fn drop(&mut self) {
        for (_, mut handle) in self.handles.get_mut().drain() {
            handle.cancel();
        }
    }
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("active", &self.active_keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    /// Handle that records its lifecycle into a shared log.
    struct LoggedHandle {
        id: u32,
        log: Arc<Mutex<Vec<String>>>,
        cancelled: bool,
    }

    impl StreamHandle for LoggedHandle {
        fn cancel(&mut self) {
            if !self.cancelled {
                self.cancelled = true;
                self.log.lock().push(format!("cancel {}", self.id));
            }
        }
    }

    fn opener(
        id: u32,
        log: &Arc<Mutex<Vec<String>>>,
    ) -> impl FnOnce() -> Result<Box<dyn StreamHandle>, MirrorError> + use<> {
        let log = Arc::clone(log);
        move || {
            log.lock().push(format!("open {id}"));
            Ok(Box::new(LoggedHandle { id, log, cancelled: false }) as Box<dyn StreamHandle>)
        }
    }

    #[test]
    fn resubscribe_cancels_before_open() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = SubscriptionRegistry::new();

        assert!(registry.subscribe(StreamKey::SubaccountOrders, opener(1, &log)));
        assert!(registry.subscribe(StreamKey::SubaccountOrders, opener(2, &log)));

        assert_eq!(*log.lock(), ["open 1", "cancel 1", "open 2"]);
        assert_eq!(registry.len(), 1);
        assert!(registry.is_active(StreamKey::SubaccountOrders));
    }

    #[test]
    fn keys_are_independent() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = SubscriptionRegistry::new();
        registry.subscribe(StreamKey::TradesForMarket, opener(1, &log));
        registry.subscribe(StreamKey::OrderbookForMarket, opener(2, &log));

        assert_eq!(registry.active_keys(), [StreamKey::OrderbookForMarket, StreamKey::TradesForMarket]);
        assert_eq!(*log.lock(), ["open 1", "open 2"]);
    }

    #[test]
    fn cancel_absent_key_is_noop() {
        let registry = SubscriptionRegistry::new();
        assert!(!registry.cancel(StreamKey::SubaccountTrades));
        assert!(registry.is_empty());
    }

    #[test]
    fn cancel_and_cancel_all() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = SubscriptionRegistry::new();
        registry.subscribe(StreamKey::TradesForMarket, opener(1, &log));
        registry.subscribe(StreamKey::SubaccountOrders, opener(2, &log));
        registry.subscribe(StreamKey::SubaccountTrades, opener(3, &log));

        assert!(registry.cancel(StreamKey::TradesForMarket));
        assert!(!registry.cancel(StreamKey::TradesForMarket));
        assert_eq!(registry.cancel_all(), 2);
        assert!(registry.is_empty());
        assert_eq!(log.lock().iter().filter(|l| l.starts_with("cancel")).count(), 3);
    }

    #[test]
    fn failed_open_leaves_key_empty() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = SubscriptionRegistry::new();
        registry.subscribe(StreamKey::SubaccountBalances, opener(1, &log));

        let ok = registry.subscribe(StreamKey::SubaccountBalances, || {
            Err(MirrorError::Transport("refused".into()))
        });
        assert!(!ok);
        assert!(!registry.is_active(StreamKey::SubaccountBalances));
        assert_eq!(*log.lock(), ["open 1", "cancel 1"]);
    }

    #[test]
    fn drop_cancels_live_handles() {
        let log = Arc::new(Mutex::new(Vec::new()));
        {
            let registry = SubscriptionRegistry::new();
            registry.subscribe(StreamKey::SubaccountOrders, opener(7, &log));
        }
        assert_eq!(*log.lock(), ["open 7", "cancel 7"]);
    }
}
