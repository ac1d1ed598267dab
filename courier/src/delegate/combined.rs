//! Combined delegate: the request, transfer and global parts composed over
//! one handler.

use super::{DelegateCore, GlobalPart, RequestPart, TransferPart};
use crate::{delivery::GlobalEvent, handler::CombinedHandler};
use courier_core::{
    DynContactRequestList, DynError, DynEvent, DynNodeList, DynRequest, DynSetElementList,
    DynSetList, DynTransfer, DynUserAlertList, DynUserList, FolderProgress, GlobalCallbacks,
    ListenerId, RequestCallbacks, TransferCallbacks,
};
use courier_std::Registrant;
use std::{fmt, sync::Arc};

/// Engine-facing wrapper around one [`CombinedHandler`].
///
/// Always durable: finish events of individual requests and transfers never
/// retire it.
pub struct CombinedDelegate {
    core: DelegateCore,
    handler: Arc<dyn CombinedHandler>,
    request: RequestPart,
    transfer: TransferPart,
    global: GlobalPart,
}

impl CombinedDelegate {
    pub(crate) fn new(core: DelegateCore, handler: Arc<dyn CombinedHandler>) -> Self {
        Self {
            core,
            request: RequestPart::new(Some(Arc::clone(&handler).into_request())),
            transfer: TransferPart::new(Some(Arc::clone(&handler).into_transfer())),
            global: GlobalPart::new(Arc::clone(&handler).into_global()),
            handler,
        }
    }

    /// Identity of the registration.
    pub fn id(&self) -> ListenerId {
        self.core.id()
    }

    pub(crate) fn core(&self) -> &DelegateCore {
        &self.core
    }

    pub(crate) fn wraps(&self, target: *const ()) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.handler), target)
    }
}

impl RequestCallbacks for CombinedDelegate {
    fn on_request_start(&self, request: &DynRequest) {
        self.request.start(&self.core, request);
    }

    fn on_request_update(&self, request: &DynRequest) {
        self.request.update(&self.core, request);
    }

    fn on_request_finish(&self, request: &DynRequest, error: &DynError) {
        self.request.finish(&self.core, request, error);
    }

    fn on_request_temporary_error(&self, request: &DynRequest, error: &DynError) {
        self.request.temporary_error(&self.core, request, error);
    }
}

impl TransferCallbacks for CombinedDelegate {
    fn on_transfer_start(&self, transfer: &DynTransfer) {
        self.transfer.start(&self.core, transfer);
    }

    fn on_transfer_update(&self, transfer: &DynTransfer) {
        self.transfer.update(&self.core, transfer);
    }

    fn on_transfer_finish(&self, transfer: &DynTransfer, error: &DynError) {
        self.transfer.finish(&self.core, transfer, error);
    }

    fn on_transfer_temporary_error(&self, transfer: &DynTransfer, error: &DynError) {
        self.transfer.temporary_error(&self.core, transfer, error);
    }

    fn on_folder_transfer_update(&self, transfer: &DynTransfer, progress: &FolderProgress) {
        self.transfer.folder_update(&self.core, transfer, progress);
    }

    fn on_transfer_data(&self, transfer: &DynTransfer, buffer: &[u8]) -> bool {
        self.transfer.data(&self.core, transfer, buffer)
    }
}

impl GlobalCallbacks for CombinedDelegate {
    fn on_users_update(&self, users: Option<&DynUserList>) {
        self.global.users_update(&self.core, users);
    }

    fn on_user_alerts_update(&self, alerts: Option<&DynUserAlertList>) {
        self.global.user_alerts_update(&self.core, alerts);
    }

    fn on_nodes_update(&self, nodes: Option<&DynNodeList>) {
        self.global.nodes_update(&self.core, nodes);
    }

    fn on_account_update(&self) {
        self.global.forward(&self.core, GlobalEvent::AccountUpdate);
    }

    fn on_contact_requests_update(&self, requests: Option<&DynContactRequestList>) {
        self.global.contact_requests_update(&self.core, requests);
    }

    fn on_reload_needed(&self) {
        self.global.forward(&self.core, GlobalEvent::ReloadNeeded);
    }

    fn on_event(&self, event: &DynEvent) {
        self.global.event(&self.core, event);
    }

    fn on_sets_update(&self, sets: Option<&DynSetList>) {
        self.global.sets_update(&self.core, sets);
    }

    fn on_set_elements_update(&self, elements: Option<&DynSetElementList>) {
        self.global.set_elements_update(&self.core, elements);
    }

    fn on_global_sync_state_changed(&self) {
        self.global
            .forward(&self.core, GlobalEvent::GlobalSyncStateChanged);
    }
}

impl Registrant for CombinedDelegate {
    fn listener_id(&self) -> ListenerId {
        self.core.id()
    }
}

impl fmt::Debug for CombinedDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombinedDelegate")
            .field("id", &self.id())
            .finish()
    }
}
