//! Tree processor delegate.

use super::DelegateCore;
use crate::handler::TreeProcessor;
use courier_core::{DynNode, ListenerId, TreeCallbacks, capture};
use courier_std::{Registrant, guard};
use std::{fmt, sync::Arc};

/// Engine-facing wrapper around one [`TreeProcessor`].
///
/// The handler runs inline on the engine thread because the traversal waits
/// for its answer. Without a handler every node answers `false`.
pub struct TreeDelegate {
    core: DelegateCore,
    handler: Option<Arc<dyn TreeProcessor>>,
}

impl TreeDelegate {
    pub(crate) fn new(core: DelegateCore, handler: Option<Arc<dyn TreeProcessor>>) -> Self {
        Self { core, handler }
    }

    /// Identity of the registration.
    pub fn id(&self) -> ListenerId {
        self.core.id()
    }

    pub(crate) fn core(&self) -> &DelegateCore {
        &self.core
    }
}

impl TreeCallbacks for TreeDelegate {
    fn process_node(&self, node: &DynNode) -> bool {
        let Some(handler) = &self.handler else {
            return false;
        };
        let Some(api) = self.core.courier() else {
            return false;
        };
        let node = capture(Some(node));
        guard(|| handler.process_node(&api, node.as_ref())).unwrap_or(false)
    }
}

impl Registrant for TreeDelegate {
    fn listener_id(&self) -> ListenerId {
        self.core.id()
    }
}

impl fmt::Debug for TreeDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeDelegate")
            .field("id", &self.id())
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}
