//! Capacity-bounded, newest-first collection of keyed entities.
//!
//! Live feeds are unbounded; the projections built from them are not. A
//! [`BoundedOrderedCollection`] keeps at most `capacity` elements ordered
//! newest first and evicts from the back when full. Every operation is a
//! linear scan, which is fine for the tens-to-hundreds of entries a
//! projection holds.

use std::collections::VecDeque;

/// Capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 100;

/// An entity with a string identity key (`orderHash`, denom, ...).
pub trait Keyed {
    fn key(&self) -> &str;
}

/// Fixed-capacity sequence ordered newest first.
///
/// The collection itself does not enforce key uniqueness on
/// [`insert_front`](Self::insert_front); reconcilers that need it call
/// [`replace_front`](Self::replace_front) instead.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedOrderedCollection<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T: Keyed> BoundedOrderedCollection<T> {
    /// Empty collection bounded to `capacity`. Storage grows on demand;
    /// nothing is allocated up front.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::new(),
            capacity,
        }
    }

    /// Prepend `item`, then truncate to capacity.
    ///
    /// Returns the number of elements evicted from the back.
    pub fn insert_front(&mut self, item: T) -> usize {
        self.items.push_front(item);
        let evicted = self.items.len().saturating_sub(self.capacity);
        self.items.truncate(self.capacity);
        evicted
    }

    /// Remove any element with the same key as `item`, then prepend it.
    ///
    /// Re-emission of a known entity moves it to the front with its new
    /// fields.
    pub fn replace_front(&mut self, item: T) -> usize {
        self.remove_by_key(item.key());
        self.insert_front(item)
    }

    /// Drop every element whose key equals `key`. Returns `true` if any was
    /// removed.
    pub fn remove_by_key(&mut self, key: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|it| it.key() != key);
        self.items.len() != before
    }

    /// Replace the element with the same key as `item` in place.
    ///
    /// No-op returning `false` when no such element exists.
    pub fn upsert_by_key(&mut self, item: T) -> bool {
        match self.items.iter_mut().find(|it| it.key() == item.key()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.items.iter().find(|it| it.key() == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Newest-first iterator.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Keyed + Clone> BoundedOrderedCollection<T> {
    /// Newest-first copy of the contents.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<T: Keyed> Default for BoundedOrderedCollection<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
