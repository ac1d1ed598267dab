//! Request delegate.

use super::DelegateCore;
use crate::{
    delivery::{RequestEvent, Route},
    handle::{Lifecycle, Scope},
    handler::RequestHandler,
};
use courier_core::{DynError, DynRequest, ListenerId, RequestCallbacks, capture};
use courier_std::Registrant;
use std::{fmt, sync::Arc};

/// Request forwarding shared by request and combined delegates.
pub(crate) struct RequestPart {
    handler: Option<Arc<dyn RequestHandler>>,
}

impl RequestPart {
    pub(crate) fn new(handler: Option<Arc<dyn RequestHandler>>) -> Self {
        Self { handler }
    }

    pub(crate) fn handler(&self) -> Option<&Arc<dyn RequestHandler>> {
        self.handler.as_ref()
    }

    fn forward<F>(&self, core: &DelegateCore, event: F)
    where
        F: FnOnce() -> RequestEvent,
    {
        if let Some(handler) = &self.handler {
            core.submit(Route::Request {
                handler: Arc::clone(handler),
                event: event(),
            });
        }
    }

    pub(crate) fn start(&self, core: &DelegateCore, request: &DynRequest) {
        self.forward(core, || RequestEvent::Start(capture(Some(request))));
    }

    pub(crate) fn update(&self, core: &DelegateCore, request: &DynRequest) {
        self.forward(core, || RequestEvent::Update(capture(Some(request))));
    }

    pub(crate) fn finish(&self, core: &DelegateCore, request: &DynRequest, error: &DynError) {
        self.forward(core, || {
            RequestEvent::Finish(capture(Some(request)), capture(Some(error)))
        });
    }

    pub(crate) fn temporary_error(
        &self,
        core: &DelegateCore,
        request: &DynRequest,
        error: &DynError,
    ) {
        self.forward(core, || {
            RequestEvent::TemporaryError(capture(Some(request)), capture(Some(error)))
        });
    }
}

/// Engine-facing wrapper around one [`RequestHandler`].
///
/// Durable delegates are created by
/// [`Courier::add_request_listener`](crate::Courier::add_request_listener);
/// single-use ones by [`Courier::request_listener`](crate::Courier::request_listener)
/// and passed to exactly one engine call.
pub struct RequestDelegate {
    core: DelegateCore,
    part: RequestPart,
}

impl RequestDelegate {
    pub(crate) fn new(core: DelegateCore, handler: Option<Arc<dyn RequestHandler>>) -> Self {
        Self {
            core,
            part: RequestPart::new(handler),
        }
    }

    /// Identity of the registration.
    pub fn id(&self) -> ListenerId {
        self.core.id()
    }

    pub(crate) fn core(&self) -> &DelegateCore {
        &self.core
    }

    /// Durable or single-use.
    pub fn scope(&self) -> Scope {
        self.core.scope()
    }

    /// Active or retired.
    pub fn lifecycle(&self) -> Lifecycle {
        self.core.lifecycle()
    }

    pub(crate) fn wraps(&self, target: *const ()) -> bool {
        self.part
            .handler()
            .is_some_and(|handler| std::ptr::addr_eq(Arc::as_ptr(handler), target))
    }
}

impl RequestCallbacks for RequestDelegate {
    fn on_request_start(&self, request: &DynRequest) {
        if self.core.is_active() {
            self.part.start(&self.core, request);
        }
    }

    fn on_request_update(&self, request: &DynRequest) {
        if self.core.is_active() {
            self.part.update(&self.core, request);
        }
    }

    fn on_request_finish(&self, request: &DynRequest, error: &DynError) {
        if !self.core.begin_terminal() {
            return;
        }
        self.part.finish(&self.core, request, error);
        self.core.end_terminal();
    }

    fn on_request_temporary_error(&self, request: &DynRequest, error: &DynError) {
        if self.core.is_active() {
            self.part.temporary_error(&self.core, request, error);
        }
    }
}

impl Registrant for RequestDelegate {
    fn listener_id(&self) -> ListenerId {
        self.core.id()
    }
}

impl fmt::Debug for RequestDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDelegate")
            .field("id", &self.id())
            .field("scope", &self.scope())
            .field("lifecycle", &self.lifecycle())
            .field("has_handler", &self.part.handler().is_some())
            .finish()
    }
}
