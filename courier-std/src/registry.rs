//! Thread-safe listener registry.
//!
//! One [`Registry`] holds the active registrations of one category. It is
//! written to from the engine thread (single-use listeners retiring
//! themselves) and from application threads (explicit add/remove, including
//! from inside a handler), so every method takes `&self`.
//!
//! The lock is never held while caller code runs: [`Registry::for_each`]
//! copies the membership out first and visits the copy.

use courier_core::ListenerId;
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

/// An entry that can live in a [`Registry`].
pub trait Registrant: Send + Sync {
    /// The identity the registry keys on.
    fn listener_id(&self) -> ListenerId;
}

struct Slot<T: ?Sized> {
    seq: u64,
    entry: Arc<T>,
}

struct Slots<T: ?Sized> {
    entries: HashMap<ListenerId, Slot<T>>,
    next_seq: u64,
}

/// A set of registrations keyed by [`ListenerId`].
///
/// - Adding an entry that is already present is a no-op.
/// - Removing an entry that is absent is a no-op.
/// - Enumeration follows insertion order.
pub struct Registry<T: ?Sized> {
    slots: Mutex<Slots<T>>,
}

impl<T: Registrant + ?Sized> Registry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Slots {
                entries: HashMap::new(),
                next_seq: 0,
            }),
        }
    }

    /// Add an entry. Returns `true` if it was not already registered.
    pub fn register(&self, entry: Arc<T>) -> bool {
        let id = entry.listener_id();
        let mut slots = self.slots.lock();
        if slots.entries.contains_key(&id) {
            return false;
        }
        let seq = slots.next_seq;
        slots.next_seq += 1;
        slots.entries.insert(id, Slot { seq, entry });
        true
    }

    /// Remove an entry. Returns `true` if it was registered.
    pub fn unregister(&self, id: ListenerId) -> bool {
        // The removed entry is dropped after the lock is released; its
        // destructor may re-enter the registry.
        let removed = self.slots.lock().entries.remove(&id);
        removed.is_some()
    }

    /// Remove every entry matching `predicate`. Returns how many were removed.
    pub fn unregister_where<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let removed: Vec<Slot<T>> = {
            let mut slots = self.slots.lock();
            let ids: Vec<ListenerId> = slots
                .entries
                .iter()
                .filter(|(_, slot)| predicate(slot.entry.as_ref()))
                .map(|(id, _)| *id)
                .collect();
            ids.iter()
                .filter_map(|id| slots.entries.remove(id))
                .collect()
        };
        removed.len()
    }

    /// Whether `id` is currently registered.
    pub fn contains(&self, id: ListenerId) -> bool {
        self.slots.lock().entries.contains_key(&id)
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.slots.lock().entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.lock().entries.is_empty()
    }

    /// Remove every entry. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let drained: Vec<Slot<T>> = self.slots.lock().entries.drain().map(|(_, s)| s).collect();
        drained.len()
    }

    /// A point-in-time copy of the membership, in insertion order.
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        let mut slots: Vec<(u64, Arc<T>)> = {
            let guard = self.slots.lock();
            guard
                .entries
                .values()
                .map(|slot| (slot.seq, Arc::clone(&slot.entry)))
                .collect()
        };
        slots.sort_unstable_by_key(|(seq, _)| *seq);
        slots.into_iter().map(|(_, entry)| entry).collect()
    }

    /// Visit a point-in-time copy of the membership.
    ///
    /// Entries added or removed by the visitor do not change the current
    /// round: every entry present when the call started is visited exactly
    /// once.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&Arc<T>),
    {
        for entry in self.snapshot() {
            visitor(&entry);
        }
    }
}

impl<T: Registrant + ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> std::fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("len", &self.slots.lock().entries.len())
            .finish()
    }
}
