//! Testing utilities for courier.
//!
//! Engine payloads are only valid for the duration of one callback. These
//! doubles let a test play the engine's part: hand a payload to a callback,
//! then mutate or destroy it right after, and check that whatever reached the
//! handler is unaffected.
//!
//! # Features
//!
//! - [`EnginePayload`]: an engine-owned object that can be changed, destroyed
//!   or made to fail its copy.
//! - [`EngineList`]: an engine-owned list of [`EnginePayload`]s.

use courier_core::{Capture, Message, PayloadList};
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Engine Payload
// ============================================================================

enum SlotState<S> {
    Live(S),
    /// The engine refuses to produce a copy.
    Broken,
    /// The engine freed the object.
    Destroyed,
}

/// An engine-owned payload double.
///
/// Clones share the same underlying object, the way the engine and a callback
/// argument refer to the same memory.
///
/// # Example
///
/// ```rust,ignore
/// let transfer = EnginePayload::new(TransferSnapshot { tag: 7, ..Default::default() });
/// delegate.on_transfer_start(&transfer);
/// transfer.destroy(); // the handler must still see tag 7
/// ```
pub struct EnginePayload<S> {
    slot: Arc<Mutex<SlotState<S>>>,
    captures: Arc<AtomicUsize>,
}

impl<S: Clone> EnginePayload<S> {
    /// A live payload holding `value`.
    pub fn new(value: S) -> Self {
        Self {
            slot: Arc::new(Mutex::new(SlotState::Live(value))),
            captures: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A payload whose copy always fails.
    pub fn broken() -> Self {
        Self {
            slot: Arc::new(Mutex::new(SlotState::Broken)),
            captures: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Overwrite the engine-side value.
    pub fn set(&self, value: S) {
        *self.slot.lock() = SlotState::Live(value);
    }

    /// Mutate the engine-side value in place. No-op once destroyed.
    pub fn update<F: FnOnce(&mut S)>(&self, f: F) {
        if let SlotState::Live(value) = &mut *self.slot.lock() {
            f(value);
        }
    }

    /// Free the engine-side object.
    pub fn destroy(&self) {
        *self.slot.lock() = SlotState::Destroyed;
    }

    /// Whether [`EnginePayload::destroy`] has been called.
    pub fn is_destroyed(&self) -> bool {
        matches!(*self.slot.lock(), SlotState::Destroyed)
    }

    /// How many times a copy was requested.
    pub fn capture_count(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }
}

impl<S> Clone for EnginePayload<S> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
            captures: self.captures.clone(),
        }
    }
}

impl<S: Message + Clone> Capture for EnginePayload<S> {
    type Snapshot = S;

    fn capture(&self) -> Option<S> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        match &*self.slot.lock() {
            SlotState::Live(value) => Some(value.clone()),
            SlotState::Broken => None,
            SlotState::Destroyed => {
                panic!("engine payload read after it was destroyed")
            }
        }
    }
}

// ============================================================================
// Engine List
// ============================================================================

/// An engine-owned list double.
pub struct EngineList<S> {
    items: Vec<EnginePayload<S>>,
}

impl<S: Clone> EngineList<S> {
    /// A list of live payloads.
    pub fn new(values: impl IntoIterator<Item = S>) -> Self {
        Self {
            items: values.into_iter().map(EnginePayload::new).collect(),
        }
    }

    /// A list built from existing payload doubles (some may be broken).
    pub fn from_payloads(items: Vec<EnginePayload<S>>) -> Self {
        Self { items }
    }

    /// The element payloads, for mutating or destroying them.
    pub fn items(&self) -> &[EnginePayload<S>] {
        &self.items
    }

    /// Free every element.
    pub fn destroy(&self) {
        self.items.iter().for_each(EnginePayload::destroy);
    }
}

impl<S: Message + Clone> PayloadList<S> for EngineList<S> {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn capture_at(&self, index: usize) -> Option<S> {
        self.items.get(index).and_then(Capture::capture)
    }
}
