//! In-process [`Transport`]: events are pushed by the caller instead of a
//! server.
//!
//! Every `open` registers the callback as the live subscriber of its key and
//! returns a handle whose `cancel` detaches it. [`InMemoryTransport::push`]
//! delivers an event to the live subscriber, if any. Every open and cancel
//! is recorded in order, so callers can assert on subscription lifecycles.

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;
use sm_core::error::MirrorError;
use sm_core::types::{FeedEvent, StreamKey};
use tracing::{debug, trace};

use crate::codec;
use crate::transport::{OnFeedEvent, StreamDescriptor, StreamHandle, Transport};

/// One recorded transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCall {
    Open { key: StreamKey, id: u64 },
    Cancel { key: StreamKey, id: u64 },
}

struct Subscriber {
    id: u64,
    descriptor: StreamDescriptor,
    on_event: OnFeedEvent,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    live: AHashMap<StreamKey, Subscriber>,
    calls: Vec<TransportCall>,
    refuse: Vec<StreamKey>,
}

/// Transport whose streams are fed by [`push`](Self::push).
#[derive(Clone, Default)]
pub struct InMemoryTransport {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to the live subscriber of `key`. Returns `false` when
    /// nothing is subscribed.
    pub fn push(&self, key: StreamKey, event: FeedEvent) -> bool {
        // Clone the callback out so it runs without the lock held.
        let on_event = self.inner.lock().live.get(&key).map(|s| Arc::clone(&s.on_event));
        match on_event {
            Some(on_event) => {
                on_event(event);
                true
            }
            None => {
                trace!("[{key}] no live subscriber, event discarded");
                false
            }
        }
    }

    /// Decode a raw JSON frame as the stream of `key` would, then push it.
    pub fn push_frame(&self, key: StreamKey, text: &str) -> Result<bool, MirrorError> {
        let event = codec::decode_frame(key, text)?;
        Ok(self.push(key, event))
    }

    /// Make every subsequent `open` for `key` fail.
    pub fn refuse(&self, key: StreamKey) {
        self.inner.lock().refuse.push(key);
    }

    /// Every open and cancel so far, oldest first.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.inner.lock().calls.clone()
    }

    pub fn is_live(&self, key: StreamKey) -> bool {
        self.inner.lock().live.contains_key(&key)
    }

    /// Descriptor the live stream of `key` was opened with.
    pub fn descriptor(&self, key: StreamKey) -> Option<StreamDescriptor> {
        self.inner.lock().live.get(&key).map(|s| s.descriptor.clone())
    }

    pub fn live_count(&self) -> usize {
        self.inner.lock().live.len()
    }
}

impl Transport for InMemoryTransport {
    fn open(&self, descriptor: StreamDescriptor, on_event: OnFeedEvent) -> Result<Box<dyn StreamHandle>, MirrorError> {
        let key = descriptor.key;
        let mut inner = self.inner.lock();
        if inner.refuse.contains(&key) {
            return Err(MirrorError::Transport(format!("[{key}] open refused")));
        }

        inner.next_id += 1;
        let id = inner.next_id;
        if let Some(stale) = inner.live.insert(key, Subscriber { id, descriptor, on_event }) {
            debug!("[{key}] replaced live subscriber {}", stale.id);
        }
        inner.calls.push(TransportCall::Open { key, id });

        Ok(Box::new(MemoryHandle {
            key,
            id,
            inner: Arc::clone(&self.inner),
            cancelled: false,
        }))
    }
}

impl std::fmt::Debug for InMemoryTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("InMemoryTransport")
            .field("live", &inner.live.len())
            .field("calls", &inner.calls.len())
            .finish()
    }
}

struct MemoryHandle {
    key: StreamKey,
    id: u64,
    inner: Arc<Mutex<Inner>>,
    cancelled: bool,
}

impl StreamHandle for MemoryHandle {
    fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;

        let mut inner = self.inner.lock();
        if inner.live.get(&self.key).is_some_and(|s| s.id == self.id) {
            inner.live.remove(&self.key);
        }
        inner.calls.push(TransportCall::Cancel {
            key: self.key,
            id: self.id,
        });
    }
}
