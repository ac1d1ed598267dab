//! # Deliveries
//!
//! A [`Delivery`] is one captured engine callback on its way to a handler:
//! which registration it belongs to, which event it is, the owned snapshots,
//! and the handler that will receive them. It is a plain value, so any
//! [`Dispatcher`](courier_std::Dispatcher) can queue it, move it across
//! threads and run it later.

use crate::{
    Courier,
    courier::Shared,
    handler::{GlobalHandler, LogHandler, RequestHandler, TransferHandler},
};
use courier_core::{
    Category, ContactRequestSnapshot, EngineEventSnapshot, ErrorSnapshot, FolderProgress,
    ListenerId, LogRecord, NodeSnapshot, RequestSnapshot, SetElementSnapshot, SetSnapshot,
    TransferSnapshot, UserAlertSnapshot, UserSnapshot,
};
use courier_std::Deliver;
use std::{
    fmt,
    sync::{Arc, Weak},
};

// ============================================================================
// Events
// ============================================================================

/// A captured request callback.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestEvent {
    /// `on_request_start`
    Start(Option<RequestSnapshot>),
    /// `on_request_update`
    Update(Option<RequestSnapshot>),
    /// `on_request_finish`
    Finish(Option<RequestSnapshot>, Option<ErrorSnapshot>),
    /// `on_request_temporary_error`
    TemporaryError(Option<RequestSnapshot>, Option<ErrorSnapshot>),
}

impl RequestEvent {
    fn name(&self) -> &'static str {
        match self {
            RequestEvent::Start(_) => "request_start",
            RequestEvent::Update(_) => "request_update",
            RequestEvent::Finish(..) => "request_finish",
            RequestEvent::TemporaryError(..) => "request_temporary_error",
        }
    }

    fn apply(self, handler: &dyn RequestHandler, api: &Courier) {
        match self {
            RequestEvent::Start(request) => handler.on_request_start(api, request.as_ref()),
            RequestEvent::Update(request) => handler.on_request_update(api, request.as_ref()),
            RequestEvent::Finish(request, error) => {
                handler.on_request_finish(api, request.as_ref(), error.as_ref())
            }
            RequestEvent::TemporaryError(request, error) => {
                handler.on_request_temporary_error(api, request.as_ref(), error.as_ref())
            }
        }
    }
}

/// A captured transfer callback.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferEvent {
    /// `on_transfer_start`
    Start(Option<TransferSnapshot>),
    /// `on_transfer_update`
    Update(Option<TransferSnapshot>),
    /// `on_transfer_finish`
    Finish(Option<TransferSnapshot>, Option<ErrorSnapshot>),
    /// `on_transfer_temporary_error`
    TemporaryError(Option<TransferSnapshot>, Option<ErrorSnapshot>),
    /// `on_folder_transfer_update`
    FolderUpdate(Option<TransferSnapshot>, FolderProgress),
}

impl TransferEvent {
    fn name(&self) -> &'static str {
        match self {
            TransferEvent::Start(_) => "transfer_start",
            TransferEvent::Update(_) => "transfer_update",
            TransferEvent::Finish(..) => "transfer_finish",
            TransferEvent::TemporaryError(..) => "transfer_temporary_error",
            TransferEvent::FolderUpdate(..) => "folder_transfer_update",
        }
    }

    fn apply(self, handler: &dyn TransferHandler, api: &Courier) {
        match self {
            TransferEvent::Start(transfer) => handler.on_transfer_start(api, transfer.as_ref()),
            TransferEvent::Update(transfer) => handler.on_transfer_update(api, transfer.as_ref()),
            TransferEvent::Finish(transfer, error) => {
                handler.on_transfer_finish(api, transfer.as_ref(), error.as_ref())
            }
            TransferEvent::TemporaryError(transfer, error) => {
                handler.on_transfer_temporary_error(api, transfer.as_ref(), error.as_ref())
            }
            TransferEvent::FolderUpdate(transfer, progress) => {
                handler.on_folder_transfer_update(api, transfer.as_ref(), &progress)
            }
        }
    }
}

/// A captured global callback.
#[derive(Debug, Clone, PartialEq)]
pub enum GlobalEvent {
    /// `on_users_update`
    UsersUpdate(Option<Vec<UserSnapshot>>),
    /// `on_user_alerts_update`
    UserAlertsUpdate(Option<Vec<UserAlertSnapshot>>),
    /// `on_nodes_update`
    NodesUpdate(Option<Vec<NodeSnapshot>>),
    /// `on_account_update`
    AccountUpdate,
    /// `on_contact_requests_update`
    ContactRequestsUpdate(Option<Vec<ContactRequestSnapshot>>),
    /// `on_reload_needed`
    ReloadNeeded,
    /// `on_event`
    Event(Option<EngineEventSnapshot>),
    /// `on_sets_update`
    SetsUpdate(Option<Vec<SetSnapshot>>),
    /// `on_set_elements_update`
    SetElementsUpdate(Option<Vec<SetElementSnapshot>>),
    /// `on_global_sync_state_changed`
    GlobalSyncStateChanged,
}

impl GlobalEvent {
    fn name(&self) -> &'static str {
        match self {
            GlobalEvent::UsersUpdate(_) => "users_update",
            GlobalEvent::UserAlertsUpdate(_) => "user_alerts_update",
            GlobalEvent::NodesUpdate(_) => "nodes_update",
            GlobalEvent::AccountUpdate => "account_update",
            GlobalEvent::ContactRequestsUpdate(_) => "contact_requests_update",
            GlobalEvent::ReloadNeeded => "reload_needed",
            GlobalEvent::Event(_) => "event",
            GlobalEvent::SetsUpdate(_) => "sets_update",
            GlobalEvent::SetElementsUpdate(_) => "set_elements_update",
            GlobalEvent::GlobalSyncStateChanged => "global_sync_state_changed",
        }
    }

    fn apply(self, handler: &dyn GlobalHandler, api: &Courier) {
        match self {
            GlobalEvent::UsersUpdate(users) => handler.on_users_update(api, users.as_deref()),
            GlobalEvent::UserAlertsUpdate(alerts) => {
                handler.on_user_alerts_update(api, alerts.as_deref())
            }
            GlobalEvent::NodesUpdate(nodes) => handler.on_nodes_update(api, nodes.as_deref()),
            GlobalEvent::AccountUpdate => handler.on_account_update(api),
            GlobalEvent::ContactRequestsUpdate(requests) => {
                handler.on_contact_requests_update(api, requests.as_deref())
            }
            GlobalEvent::ReloadNeeded => handler.on_reload_needed(api),
            GlobalEvent::Event(event) => handler.on_event(api, event.as_ref()),
            GlobalEvent::SetsUpdate(sets) => handler.on_sets_update(api, sets.as_deref()),
            GlobalEvent::SetElementsUpdate(elements) => {
                handler.on_set_elements_update(api, elements.as_deref())
            }
            GlobalEvent::GlobalSyncStateChanged => handler.on_global_sync_state_changed(api),
        }
    }
}

// ============================================================================
// Delivery
// ============================================================================

pub(crate) enum Route {
    Request {
        handler: Arc<dyn RequestHandler>,
        event: RequestEvent,
    },
    Transfer {
        handler: Arc<dyn TransferHandler>,
        event: TransferEvent,
    },
    Global {
        handler: Arc<dyn GlobalHandler>,
        event: GlobalEvent,
    },
    Log {
        handler: Arc<dyn LogHandler>,
        record: LogRecord,
    },
}

impl Route {
    fn name(&self) -> &'static str {
        match self {
            Route::Request { event, .. } => event.name(),
            Route::Transfer { event, .. } => event.name(),
            Route::Global { event, .. } => event.name(),
            Route::Log { .. } => "log",
        }
    }
}

/// One captured callback bound for one handler.
///
/// Owns everything it needs: running it never touches engine memory.
pub struct Delivery {
    listener: ListenerId,
    category: Category,
    courier: Weak<Shared>,
    route: Route,
}

impl Delivery {
    pub(crate) fn new(
        listener: ListenerId,
        category: Category,
        courier: Weak<Shared>,
        route: Route,
    ) -> Self {
        Self {
            listener,
            category,
            courier,
            route,
        }
    }

    /// The registration this delivery belongs to.
    pub fn listener(&self) -> ListenerId {
        self.listener
    }

    /// Category of the registration.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Name of the callback, e.g. `"transfer_update"`.
    pub fn name(&self) -> &'static str {
        self.route.name()
    }

    /// Whether this is a finish event.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.route,
            Route::Request {
                event: RequestEvent::Finish(..),
                ..
            } | Route::Transfer {
                event: TransferEvent::Finish(..),
                ..
            }
        )
    }

    /// The captured request event, if this is one.
    pub fn request_event(&self) -> Option<&RequestEvent> {
        match &self.route {
            Route::Request { event, .. } => Some(event),
            _ => None,
        }
    }

    /// The captured transfer event, if this is one.
    pub fn transfer_event(&self) -> Option<&TransferEvent> {
        match &self.route {
            Route::Transfer { event, .. } => Some(event),
            _ => None,
        }
    }

    /// The captured global event, if this is one.
    pub fn global_event(&self) -> Option<&GlobalEvent> {
        match &self.route {
            Route::Global { event, .. } => Some(event),
            _ => None,
        }
    }

    /// The captured log line, if this is one.
    pub fn log_record(&self) -> Option<&LogRecord> {
        match &self.route {
            Route::Log { record, .. } => Some(record),
            _ => None,
        }
    }
}

impl Deliver for Delivery {
    fn deliver(self) {
        let Some(shared) = self.courier.upgrade() else {
            tracing::trace!(
                listener = %self.listener,
                event = self.route.name(),
                "courier dropped, discarding delivery"
            );
            return;
        };
        let api = Courier::from_shared(shared);
        match self.route {
            Route::Request { handler, event } => event.apply(handler.as_ref(), &api),
            Route::Transfer { handler, event } => event.apply(handler.as_ref(), &api),
            Route::Global { handler, event } => event.apply(handler.as_ref(), &api),
            Route::Log { handler, record } => handler.log(&record),
        }
    }
}

impl fmt::Debug for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delivery")
            .field("listener", &self.listener)
            .field("category", &self.category)
            .field("event", &self.name())
            .finish()
    }
}
