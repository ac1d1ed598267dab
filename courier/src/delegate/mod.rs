//! # Delegates
//!
//! A delegate is the engine-facing side of one registration. It implements
//! the engine callback contracts from `courier_core`, and for every callback:
//!
//! 1. drops it if the registration has retired,
//! 2. captures each borrowed payload into an owned snapshot,
//! 3. wraps the snapshots into a [`Delivery`] and submits it to the
//!    courier's dispatcher.
//!
//! Single-use request and transfer delegates retire on their finish event:
//! the state flips before the snapshot is taken, so a duplicated finish is
//! ignored, and the delegate leaves its registry right after the finish
//! delivery is submitted (not after it runs).

mod combined;
mod global;
mod logger;
mod request;
mod transfer;
mod tree;

pub use combined::CombinedDelegate;
pub use global::GlobalDelegate;
pub use logger::LoggerDelegate;
pub use request::RequestDelegate;
pub use transfer::TransferDelegate;
pub use tree::TreeDelegate;

pub(crate) use global::GlobalPart;
pub(crate) use request::RequestPart;
pub(crate) use transfer::TransferPart;

use crate::{
    Courier,
    courier::Shared,
    delivery::{Delivery, Route},
    handle::{Lifecycle, Scope},
};
use courier_core::{Category, ListenerId};
use std::sync::{
    Arc, Weak,
    atomic::{AtomicU8, Ordering},
};

const ACTIVE: u8 = 0;
const RETIRED: u8 = 1;

/// State shared by every delegate kind.
pub(crate) struct DelegateCore {
    id: ListenerId,
    category: Category,
    scope: Scope,
    state: AtomicU8,
    courier: Weak<Shared>,
}

impl DelegateCore {
    pub(crate) fn new(category: Category, scope: Scope, courier: Weak<Shared>) -> Self {
        Self {
            id: ListenerId::next(),
            category,
            scope,
            state: AtomicU8::new(ACTIVE),
            courier,
        }
    }

    pub(crate) fn id(&self) -> ListenerId {
        self.id
    }

    pub(crate) fn scope(&self) -> Scope {
        self.scope
    }

    pub(crate) fn lifecycle(&self) -> Lifecycle {
        match self.state.load(Ordering::Acquire) {
            ACTIVE => Lifecycle::Active,
            _ => Lifecycle::Retired,
        }
    }

    pub(crate) fn belongs_to(&self, shared: &Arc<Shared>) -> bool {
        std::ptr::eq(self.courier.as_ptr(), Arc::as_ptr(shared))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.lifecycle() == Lifecycle::Active
    }

    /// Gate for a terminal event. Returns `false` if the event must be
    /// dropped.
    pub(crate) fn begin_terminal(&self) -> bool {
        match self.scope {
            Scope::Durable => self.is_active(),
            Scope::SingleUse => self
                .state
                .compare_exchange(ACTIVE, RETIRED, Ordering::AcqRel, Ordering::Acquire)
                .is_ok(),
        }
    }

    /// Leave the registry after the terminal delivery was submitted.
    pub(crate) fn end_terminal(&self) {
        if self.scope != Scope::SingleUse {
            return;
        }
        if let Some(shared) = self.courier.upgrade() {
            shared.registries.unregister(self.category, self.id);
        }
        tracing::debug!(
            listener = %self.id,
            category = %self.category,
            "single-use listener retired"
        );
    }

    /// A courier for synchronous callbacks, if it is still alive.
    pub(crate) fn courier(&self) -> Option<Courier> {
        self.courier.upgrade().map(Courier::from_shared)
    }

    /// Wrap a captured callback and hand it to the dispatcher.
    pub(crate) fn submit(&self, route: Route) {
        let Some(shared) = self.courier.upgrade() else {
            tracing::trace!(listener = %self.id, "courier dropped, ignoring callback");
            return;
        };
        let delivery = Delivery::new(self.id, self.category, Weak::clone(&self.courier), route);
        let event = delivery.name();
        tracing::trace!(listener = %self.id, event, "submitting delivery");
        if let Err(error) = shared.dispatcher.submit(delivery) {
            tracing::warn!(listener = %self.id, event, %error, "delivery dropped");
        }
    }
}
