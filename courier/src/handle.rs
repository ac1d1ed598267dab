//! Registration handles.

use crate::delegate::{
    CombinedDelegate, DelegateCore, GlobalDelegate, LoggerDelegate, RequestDelegate,
    TransferDelegate, TreeDelegate,
};
use courier_core::{Category, ListenerId};
use std::{fmt, sync::Arc};

/// How long a registration lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Until explicitly removed.
    Durable,
    /// Until the terminal event of the one operation it was created for.
    SingleUse,
}

/// Where a registration is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Accepting engine callbacks.
    Active,
    /// Saw its terminal event; further callbacks are dropped.
    Retired,
}

/// One registration, of any category.
///
/// Cloning a handle clones the reference, not the registration.
#[derive(Clone)]
pub enum ListenerHandle {
    /// A request delegate.
    Request(Arc<RequestDelegate>),
    /// A transfer delegate.
    Transfer(Arc<TransferDelegate>),
    /// A global delegate.
    Global(Arc<GlobalDelegate>),
    /// A combined delegate.
    Combined(Arc<CombinedDelegate>),
    /// A logger delegate.
    Logger(Arc<LoggerDelegate>),
    /// A tree processor delegate.
    Tree(Arc<TreeDelegate>),
}

impl ListenerHandle {
    pub(crate) fn core(&self) -> &DelegateCore {
        match self {
            ListenerHandle::Request(d) => d.core(),
            ListenerHandle::Transfer(d) => d.core(),
            ListenerHandle::Global(d) => d.core(),
            ListenerHandle::Combined(d) => d.core(),
            ListenerHandle::Logger(d) => d.core(),
            ListenerHandle::Tree(d) => d.core(),
        }
    }

    /// Identity of the registration.
    pub fn id(&self) -> ListenerId {
        self.core().id()
    }

    /// The category this handle registers under.
    pub fn category(&self) -> Category {
        match self {
            ListenerHandle::Request(_) => Category::Request,
            ListenerHandle::Transfer(_) => Category::Transfer,
            ListenerHandle::Global(_) => Category::Global,
            ListenerHandle::Combined(_) => Category::Combined,
            ListenerHandle::Logger(_) => Category::Logger,
            ListenerHandle::Tree(_) => Category::TreeProcessor,
        }
    }

    /// Durable or single-use.
    pub fn scope(&self) -> Scope {
        self.core().scope()
    }

    /// Active or retired.
    pub fn lifecycle(&self) -> Lifecycle {
        self.core().lifecycle()
    }
}

impl PartialEq for ListenerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for ListenerHandle {}

impl fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("id", &self.id())
            .field("category", &self.category())
            .field("scope", &self.scope())
            .field("lifecycle", &self.lifecycle())
            .finish()
    }
}

impl From<Arc<RequestDelegate>> for ListenerHandle {
    fn from(delegate: Arc<RequestDelegate>) -> Self {
        ListenerHandle::Request(delegate)
    }
}

impl From<Arc<TransferDelegate>> for ListenerHandle {
    fn from(delegate: Arc<TransferDelegate>) -> Self {
        ListenerHandle::Transfer(delegate)
    }
}

impl From<Arc<GlobalDelegate>> for ListenerHandle {
    fn from(delegate: Arc<GlobalDelegate>) -> Self {
        ListenerHandle::Global(delegate)
    }
}

impl From<Arc<CombinedDelegate>> for ListenerHandle {
    fn from(delegate: Arc<CombinedDelegate>) -> Self {
        ListenerHandle::Combined(delegate)
    }
}

impl From<Arc<LoggerDelegate>> for ListenerHandle {
    fn from(delegate: Arc<LoggerDelegate>) -> Self {
        ListenerHandle::Logger(delegate)
    }
}

impl From<Arc<TreeDelegate>> for ListenerHandle {
    fn from(delegate: Arc<TreeDelegate>) -> Self {
        ListenerHandle::Tree(delegate)
    }
}
