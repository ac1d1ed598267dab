//! # Application handler contracts
//!
//! What application code implements. Every method has a no-op default, so a
//! handler only overrides the events it cares about.
//!
//! Handlers never see engine memory. Each argument is an owned snapshot
//! captured before the call was queued; `None` means the engine provided no
//! object (or its copy failed) and the value is unknown.
//!
//! All methods except [`LogHandler::log`] receive the [`Courier`] that
//! delivered the event, so a handler can register or remove listeners while
//! it runs.

use crate::Courier;
use courier_core::{
    ContactRequestSnapshot, EngineEventSnapshot, ErrorSnapshot, FolderProgress, LogRecord,
    NodeSnapshot, RequestSnapshot, SetElementSnapshot, SetSnapshot, TransferSnapshot,
    UserAlertSnapshot, UserSnapshot,
};
use std::sync::Arc;

// ============================================================================
// Request
// ============================================================================

/// Receives progress and completion of asynchronous requests.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a request handler",
    label = "missing `RequestHandler` implementation",
    note = "Implement `RequestHandler` and override the events you need."
)]
pub trait RequestHandler: Send + Sync + 'static {
    /// The request is about to start.
    fn on_request_start(&self, _api: &Courier, _request: Option<&RequestSnapshot>) {}

    /// Intermediate progress.
    fn on_request_update(&self, _api: &Courier, _request: Option<&RequestSnapshot>) {}

    /// The request finished. Nothing follows for this request.
    fn on_request_finish(
        &self,
        _api: &Courier,
        _request: Option<&RequestSnapshot>,
        _error: Option<&ErrorSnapshot>,
    ) {
    }

    /// A transient failure the engine is retrying.
    fn on_request_temporary_error(
        &self,
        _api: &Courier,
        _request: Option<&RequestSnapshot>,
        _error: Option<&ErrorSnapshot>,
    ) {
    }
}

// ============================================================================
// Transfer
// ============================================================================

/// Receives progress, completion and streamed data of transfers.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a transfer handler",
    label = "missing `TransferHandler` implementation",
    note = "Implement `TransferHandler` and override the events you need."
)]
pub trait TransferHandler: Send + Sync + 'static {
    /// The transfer is about to start.
    fn on_transfer_start(&self, _api: &Courier, _transfer: Option<&TransferSnapshot>) {}

    /// Progress update.
    fn on_transfer_update(&self, _api: &Courier, _transfer: Option<&TransferSnapshot>) {}

    /// The transfer finished. Nothing follows for this transfer.
    fn on_transfer_finish(
        &self,
        _api: &Courier,
        _transfer: Option<&TransferSnapshot>,
        _error: Option<&ErrorSnapshot>,
    ) {
    }

    /// A transient failure the engine is retrying.
    fn on_transfer_temporary_error(
        &self,
        _api: &Courier,
        _transfer: Option<&TransferSnapshot>,
        _error: Option<&ErrorSnapshot>,
    ) {
    }

    /// Scan and creation progress of a folder transfer.
    fn on_folder_transfer_update(
        &self,
        _api: &Courier,
        _transfer: Option<&TransferSnapshot>,
        _progress: &FolderProgress,
    ) {
    }

    /// A chunk of a streaming download. Return `true` to keep streaming.
    ///
    /// Unlike every other method this runs synchronously on the engine
    /// thread, whatever the dispatch target, because the engine waits for the
    /// answer. Keep it short.
    fn on_transfer_data(
        &self,
        _api: &Courier,
        _transfer: Option<&TransferSnapshot>,
        _buffer: &[u8],
    ) -> bool {
        false
    }
}

// ============================================================================
// Global
// ============================================================================

/// Receives account-wide notifications.
///
/// For list events `None` means the engine asks for a full reload of that
/// collection.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a global handler",
    label = "missing `GlobalHandler` implementation",
    note = "Implement `GlobalHandler` and override the events you need."
)]
pub trait GlobalHandler: Send + Sync + 'static {
    /// Users changed.
    fn on_users_update(&self, _api: &Courier, _users: Option<&[UserSnapshot]>) {}

    /// User alerts changed.
    fn on_user_alerts_update(&self, _api: &Courier, _alerts: Option<&[UserAlertSnapshot]>) {}

    /// Nodes changed.
    fn on_nodes_update(&self, _api: &Courier, _nodes: Option<&[NodeSnapshot]>) {}

    /// Account details changed.
    fn on_account_update(&self, _api: &Courier) {}

    /// Contact requests changed.
    fn on_contact_requests_update(
        &self,
        _api: &Courier,
        _requests: Option<&[ContactRequestSnapshot]>,
    ) {
    }

    /// The local cache must be reloaded.
    fn on_reload_needed(&self, _api: &Courier) {}

    /// A generic engine event.
    fn on_event(&self, _api: &Courier, _event: Option<&EngineEventSnapshot>) {}

    /// Sets changed.
    fn on_sets_update(&self, _api: &Courier, _sets: Option<&[SetSnapshot]>) {}

    /// Set elements changed.
    fn on_set_elements_update(&self, _api: &Courier, _elements: Option<&[SetElementSnapshot]>) {}

    /// The aggregate sync state changed.
    fn on_global_sync_state_changed(&self, _api: &Courier) {}
}

// ============================================================================
// Combined
// ============================================================================

/// A handler for requests, transfers and global events at once.
///
/// Implemented automatically for every type that implements the three
/// category traits.
pub trait CombinedHandler: RequestHandler + TransferHandler + GlobalHandler {
    /// View as a request handler.
    fn into_request(self: Arc<Self>) -> Arc<dyn RequestHandler>;
    /// View as a transfer handler.
    fn into_transfer(self: Arc<Self>) -> Arc<dyn TransferHandler>;
    /// View as a global handler.
    fn into_global(self: Arc<Self>) -> Arc<dyn GlobalHandler>;
}

impl<T> CombinedHandler for T
where
    T: RequestHandler + TransferHandler + GlobalHandler,
{
    fn into_request(self: Arc<Self>) -> Arc<dyn RequestHandler> {
        self
    }

    fn into_transfer(self: Arc<Self>) -> Arc<dyn TransferHandler> {
        self
    }

    fn into_global(self: Arc<Self>) -> Arc<dyn GlobalHandler> {
        self
    }
}

// ============================================================================
// Logger / Tree
// ============================================================================

/// Receives engine log lines.
pub trait LogHandler: Send + Sync + 'static {
    /// One log line.
    fn log(&self, record: &LogRecord);
}

impl<F> LogHandler for F
where
    F: Fn(&LogRecord) + Send + Sync + 'static,
{
    fn log(&self, record: &LogRecord) {
        self(record)
    }
}

/// Visits nodes during a tree traversal.
///
/// Runs synchronously on the engine thread. Return `false` to stop.
pub trait TreeProcessor: Send + Sync + 'static {
    /// Visit one node.
    fn process_node(&self, api: &Courier, node: Option<&NodeSnapshot>) -> bool;
}

impl<F> TreeProcessor for F
where
    F: Fn(&Courier, Option<&NodeSnapshot>) -> bool + Send + Sync + 'static,
{
    fn process_node(&self, api: &Courier, node: Option<&NodeSnapshot>) -> bool {
        self(api, node)
    }
}
