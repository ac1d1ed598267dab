//! Global delegate.

use super::DelegateCore;
use crate::{
    delivery::{GlobalEvent, Route},
    handler::GlobalHandler,
};
use courier_core::{
    DynContactRequestList, DynEvent, DynNodeList, DynSetElementList, DynSetList,
    DynUserAlertList, DynUserList, GlobalCallbacks, ListenerId, capture, capture_list,
};
use courier_std::Registrant;
use std::{fmt, sync::Arc};

/// Global forwarding shared by global and combined delegates.
pub(crate) struct GlobalPart {
    handler: Arc<dyn GlobalHandler>,
}

impl GlobalPart {
    pub(crate) fn new(handler: Arc<dyn GlobalHandler>) -> Self {
        Self { handler }
    }

    pub(crate) fn handler(&self) -> &Arc<dyn GlobalHandler> {
        &self.handler
    }

    pub(crate) fn forward(&self, core: &DelegateCore, event: GlobalEvent) {
        core.submit(Route::Global {
            handler: Arc::clone(&self.handler),
            event,
        });
    }

    pub(crate) fn users_update(&self, core: &DelegateCore, users: Option<&DynUserList>) {
        self.forward(core, GlobalEvent::UsersUpdate(capture_list(users)));
    }

    pub(crate) fn user_alerts_update(
        &self,
        core: &DelegateCore,
        alerts: Option<&DynUserAlertList>,
    ) {
        self.forward(core, GlobalEvent::UserAlertsUpdate(capture_list(alerts)));
    }

    pub(crate) fn nodes_update(&self, core: &DelegateCore, nodes: Option<&DynNodeList>) {
        self.forward(core, GlobalEvent::NodesUpdate(capture_list(nodes)));
    }

    pub(crate) fn contact_requests_update(
        &self,
        core: &DelegateCore,
        requests: Option<&DynContactRequestList>,
    ) {
        self.forward(core, GlobalEvent::ContactRequestsUpdate(capture_list(requests)));
    }

    pub(crate) fn event(&self, core: &DelegateCore, event: &DynEvent) {
        self.forward(core, GlobalEvent::Event(capture(Some(event))));
    }

    pub(crate) fn sets_update(&self, core: &DelegateCore, sets: Option<&DynSetList>) {
        self.forward(core, GlobalEvent::SetsUpdate(capture_list(sets)));
    }

    pub(crate) fn set_elements_update(
        &self,
        core: &DelegateCore,
        elements: Option<&DynSetElementList>,
    ) {
        self.forward(core, GlobalEvent::SetElementsUpdate(capture_list(elements)));
    }
}

/// Engine-facing wrapper around one [`GlobalHandler`]. Always durable.
pub struct GlobalDelegate {
    core: DelegateCore,
    part: GlobalPart,
}

impl GlobalDelegate {
    pub(crate) fn new(core: DelegateCore, handler: Arc<dyn GlobalHandler>) -> Self {
        Self {
            core,
            part: GlobalPart::new(handler),
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
        std::ptr::addr_eq(Arc::as_ptr(self.part.handler()), target)
    }
}

impl GlobalCallbacks for GlobalDelegate {
    fn on_users_update(&self, users: Option<&DynUserList>) {
        self.part.users_update(&self.core, users);
    }

    fn on_user_alerts_update(&self, alerts: Option<&DynUserAlertList>) {
        self.part.user_alerts_update(&self.core, alerts);
    }

    fn on_nodes_update(&self, nodes: Option<&DynNodeList>) {
        self.part.nodes_update(&self.core, nodes);
    }

    fn on_account_update(&self) {
        self.part.forward(&self.core, GlobalEvent::AccountUpdate);
    }

    fn on_contact_requests_update(&self, requests: Option<&DynContactRequestList>) {
        self.part.contact_requests_update(&self.core, requests);
    }

    fn on_reload_needed(&self) {
        self.part.forward(&self.core, GlobalEvent::ReloadNeeded);
    }

    fn on_event(&self, event: &DynEvent) {
        self.part.event(&self.core, event);
    }

    fn on_sets_update(&self, sets: Option<&DynSetList>) {
        self.part.sets_update(&self.core, sets);
    }

    fn on_set_elements_update(&self, elements: Option<&DynSetElementList>) {
        self.part.set_elements_update(&self.core, elements);
    }

    fn on_global_sync_state_changed(&self) {
        self.part
            .forward(&self.core, GlobalEvent::GlobalSyncStateChanged);
    }
}

impl Registrant for GlobalDelegate {
    fn listener_id(&self) -> ListenerId {
        self.core.id()
    }
}

impl fmt::Debug for GlobalDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalDelegate")
            .field("id", &self.id())
            .finish()
    }
}
