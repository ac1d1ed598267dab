//! # Engine-facing callback contracts
//!
//! These are the interfaces the engine calls from its own worker threads.
//! Payload arguments are borrowed for the duration of one call; anything that
//! must outlive the call is captured into an owned snapshot first.
//!
//! Fire-and-forget callbacks return `()`. Two callbacks need an answer from
//! the application and return `bool`: [`TransferCallbacks::on_transfer_data`]
//! (continue streaming?) and [`TreeCallbacks::process_node`] (continue the
//! traversal?).

use crate::{
    payload::{
        ContactRequestSnapshot, EngineEventSnapshot, ErrorSnapshot, FolderProgress, LogLevel,
        NodeSnapshot, RequestSnapshot, SetElementSnapshot, SetSnapshot, TransferSnapshot,
        UserAlertSnapshot, UserSnapshot,
    },
    snapshot::{Capture, PayloadList},
};

/// A borrowed engine request.
pub type DynRequest = dyn Capture<Snapshot = RequestSnapshot>;
/// A borrowed engine transfer.
pub type DynTransfer = dyn Capture<Snapshot = TransferSnapshot>;
/// A borrowed engine error.
pub type DynError = dyn Capture<Snapshot = ErrorSnapshot>;
/// A borrowed engine node.
pub type DynNode = dyn Capture<Snapshot = NodeSnapshot>;
/// A borrowed generic engine event.
pub type DynEvent = dyn Capture<Snapshot = EngineEventSnapshot>;

/// A borrowed engine list of users.
pub type DynUserList = dyn PayloadList<UserSnapshot>;
/// A borrowed engine list of user alerts.
pub type DynUserAlertList = dyn PayloadList<UserAlertSnapshot>;
/// A borrowed engine list of nodes.
pub type DynNodeList = dyn PayloadList<NodeSnapshot>;
/// A borrowed engine list of contact requests.
pub type DynContactRequestList = dyn PayloadList<ContactRequestSnapshot>;
/// A borrowed engine list of sets.
pub type DynSetList = dyn PayloadList<SetSnapshot>;
/// A borrowed engine list of set elements.
pub type DynSetElementList = dyn PayloadList<SetElementSnapshot>;

/// Progress and completion of one asynchronous request.
pub trait RequestCallbacks: Send + Sync {
    /// The request is about to start.
    fn on_request_start(&self, request: &DynRequest);

    /// Intermediate progress of a long-running request.
    fn on_request_update(&self, request: &DynRequest);

    /// The request finished. No further callbacks follow for this request.
    fn on_request_finish(&self, request: &DynRequest, error: &DynError);

    /// A transient failure; the engine retries and more callbacks follow.
    fn on_request_temporary_error(&self, request: &DynRequest, error: &DynError);
}

/// Progress, completion and streaming data of one transfer.
pub trait TransferCallbacks: Send + Sync {
    /// The transfer is about to start.
    fn on_transfer_start(&self, transfer: &DynTransfer);

    /// Progress update.
    fn on_transfer_update(&self, transfer: &DynTransfer);

    /// The transfer finished. No further callbacks follow for this transfer.
    fn on_transfer_finish(&self, transfer: &DynTransfer, error: &DynError);

    /// A transient failure; the engine retries and more callbacks follow.
    fn on_transfer_temporary_error(&self, transfer: &DynTransfer, error: &DynError);

    /// Scanning/creation progress of a folder transfer.
    fn on_folder_transfer_update(&self, transfer: &DynTransfer, progress: &FolderProgress);

    /// The latest chunk of a streaming download.
    ///
    /// Returns whether the engine should keep streaming.
    fn on_transfer_data(&self, transfer: &DynTransfer, buffer: &[u8]) -> bool;
}

/// Account-wide notifications.
pub trait GlobalCallbacks: Send + Sync {
    /// Users changed. `None` means "reload everything".
    fn on_users_update(&self, users: Option<&DynUserList>);

    /// User alerts changed.
    fn on_user_alerts_update(&self, alerts: Option<&DynUserAlertList>);

    /// Nodes changed. `None` means "reload everything".
    fn on_nodes_update(&self, nodes: Option<&DynNodeList>);

    /// Account details changed.
    fn on_account_update(&self);

    /// Incoming or outgoing contact requests changed.
    fn on_contact_requests_update(&self, requests: Option<&DynContactRequestList>);

    /// The local cache is stale and must be reloaded.
    fn on_reload_needed(&self);

    /// A generic engine event.
    fn on_event(&self, event: &DynEvent);

    /// Sets changed.
    fn on_sets_update(&self, sets: Option<&DynSetList>);

    /// Set elements changed.
    fn on_set_elements_update(&self, elements: Option<&DynSetElementList>);

    /// The aggregate sync state changed.
    fn on_global_sync_state_changed(&self);
}

/// Everything a request, transfer and global listener receives.
pub trait CombinedCallbacks: RequestCallbacks + TransferCallbacks + GlobalCallbacks {}

impl<T> CombinedCallbacks for T where T: RequestCallbacks + TransferCallbacks + GlobalCallbacks {}

/// Engine log output.
pub trait LoggerCallbacks: Send + Sync {
    /// One log line. All strings are borrowed from the engine.
    fn log(&self, time: &str, level: LogLevel, source: &str, message: &str);
}

/// Node tree traversal.
pub trait TreeCallbacks: Send + Sync {
    /// Visit one node. Returns whether the traversal should continue.
    fn process_node(&self, node: &DynNode) -> bool;
}
