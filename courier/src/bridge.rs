//! # Engine bridge
//!
//! The single object an engine registers for durable listeners. On every
//! callback it takes a point-in-time snapshot of the matching registries and
//! forwards the borrowed payload to each durable delegate in registration
//! order, then to every combined delegate.
//!
//! Single-use delegates are skipped: the engine calls those directly for the
//! one operation they were created for.
//!
//! No registry lock is held while a delegate runs, so handlers may register
//! and unregister freely. Changes take effect from the next callback.

use crate::{courier::Shared, handle::Scope};
use courier_core::{
    DynContactRequestList, DynError, DynEvent, DynNodeList, DynRequest, DynSetElementList,
    DynSetList, DynTransfer, DynUserAlertList, DynUserList, FolderProgress, GlobalCallbacks,
    LogLevel, LoggerCallbacks, RequestCallbacks, TransferCallbacks,
};
use std::sync::Weak;

/// Fans engine callbacks out to a courier's durable delegates.
///
/// Created by [`Courier::engine_bridge`](crate::Courier::engine_bridge). It
/// holds the courier weakly: once the courier is dropped every callback is a
/// no-op.
pub struct EngineBridge {
    shared: Weak<Shared>,
}

impl EngineBridge {
    pub(crate) fn new(shared: Weak<Shared>) -> Self {
        Self { shared }
    }

    fn requests<F>(&self, mut visit: F)
    where
        F: FnMut(&dyn RequestCallbacks),
    {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        shared.registries.request.for_each(|delegate| {
            if delegate.scope() == Scope::Durable {
                visit(&**delegate);
            }
        });
        shared
            .registries
            .combined
            .for_each(|delegate| visit(&**delegate));
    }

    fn transfers<F>(&self, mut visit: F)
    where
        F: FnMut(&dyn TransferCallbacks),
    {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        shared.registries.transfer.for_each(|delegate| {
            if delegate.scope() == Scope::Durable {
                visit(&**delegate);
            }
        });
        shared
            .registries
            .combined
            .for_each(|delegate| visit(&**delegate));
    }

    fn globals<F>(&self, mut visit: F)
    where
        F: FnMut(&dyn GlobalCallbacks),
    {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        shared
            .registries
            .global
            .for_each(|delegate| visit(&**delegate));
        shared
            .registries
            .combined
            .for_each(|delegate| visit(&**delegate));
    }
}

impl RequestCallbacks for EngineBridge {
    fn on_request_start(&self, request: &DynRequest) {
        self.requests(|target| target.on_request_start(request));
    }

    fn on_request_update(&self, request: &DynRequest) {
        self.requests(|target| target.on_request_update(request));
    }

    fn on_request_finish(&self, request: &DynRequest, error: &DynError) {
        self.requests(|target| target.on_request_finish(request, error));
    }

    fn on_request_temporary_error(&self, request: &DynRequest, error: &DynError) {
        self.requests(|target| target.on_request_temporary_error(request, error));
    }
}

impl TransferCallbacks for EngineBridge {
    fn on_transfer_start(&self, transfer: &DynTransfer) {
        self.transfers(|target| target.on_transfer_start(transfer));
    }

    fn on_transfer_update(&self, transfer: &DynTransfer) {
        self.transfers(|target| target.on_transfer_update(transfer));
    }

    fn on_transfer_finish(&self, transfer: &DynTransfer, error: &DynError) {
        self.transfers(|target| target.on_transfer_finish(transfer, error));
    }

    fn on_transfer_temporary_error(&self, transfer: &DynTransfer, error: &DynError) {
        self.transfers(|target| target.on_transfer_temporary_error(transfer, error));
    }

    fn on_folder_transfer_update(&self, transfer: &DynTransfer, progress: &FolderProgress) {
        self.transfers(|target| target.on_folder_transfer_update(transfer, progress));
    }

    /// Every durable handler sees the chunk. Streaming continues if any of
    /// them asks for it.
    fn on_transfer_data(&self, transfer: &DynTransfer, buffer: &[u8]) -> bool {
        let mut keep_streaming = false;
        self.transfers(|target| {
            keep_streaming |= target.on_transfer_data(transfer, buffer);
        });
        keep_streaming
    }
}

impl GlobalCallbacks for EngineBridge {
    fn on_users_update(&self, users: Option<&DynUserList>) {
        self.globals(|target| target.on_users_update(users));
    }

    fn on_user_alerts_update(&self, alerts: Option<&DynUserAlertList>) {
        self.globals(|target| target.on_user_alerts_update(alerts));
    }

    fn on_nodes_update(&self, nodes: Option<&DynNodeList>) {
        self.globals(|target| target.on_nodes_update(nodes));
    }

    fn on_account_update(&self) {
        self.globals(|target| target.on_account_update());
    }

    fn on_contact_requests_update(&self, requests: Option<&DynContactRequestList>) {
        self.globals(|target| target.on_contact_requests_update(requests));
    }

    fn on_reload_needed(&self) {
        self.globals(|target| target.on_reload_needed());
    }

    fn on_event(&self, event: &DynEvent) {
        self.globals(|target| target.on_event(event));
    }

    fn on_sets_update(&self, sets: Option<&DynSetList>) {
        self.globals(|target| target.on_sets_update(sets));
    }

    fn on_set_elements_update(&self, elements: Option<&DynSetElementList>) {
        self.globals(|target| target.on_set_elements_update(elements));
    }

    fn on_global_sync_state_changed(&self) {
        self.globals(|target| target.on_global_sync_state_changed());
    }
}

impl LoggerCallbacks for EngineBridge {
    fn log(&self, time: &str, level: LogLevel, source: &str, message: &str) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        shared
            .registries
            .logger
            .for_each(|delegate| delegate.log(time, level, source, message));
    }
}
