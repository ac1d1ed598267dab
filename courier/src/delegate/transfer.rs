//! Transfer delegate, including the output-sink variant used for unbuffered
//! streaming downloads.

use super::DelegateCore;
use crate::{
    delivery::{Route, TransferEvent},
    handle::{Lifecycle, Scope},
    handler::TransferHandler,
};
use courier_core::{
    DynError, DynTransfer, FolderProgress, ListenerId, TransferCallbacks, capture,
};
use courier_std::{Registrant, guard};
use parking_lot::Mutex;
use std::{fmt, io::Write, sync::Arc};

/// Transfer forwarding shared by transfer and combined delegates.
pub(crate) struct TransferPart {
    handler: Option<Arc<dyn TransferHandler>>,
}

impl TransferPart {
    pub(crate) fn new(handler: Option<Arc<dyn TransferHandler>>) -> Self {
        Self { handler }
    }

    pub(crate) fn handler(&self) -> Option<&Arc<dyn TransferHandler>> {
        self.handler.as_ref()
    }

    fn forward<F>(&self, core: &DelegateCore, event: F)
    where
        F: FnOnce() -> TransferEvent,
    {
        if let Some(handler) = &self.handler {
            core.submit(Route::Transfer {
                handler: Arc::clone(handler),
                event: event(),
            });
        }
    }

    pub(crate) fn start(&self, core: &DelegateCore, transfer: &DynTransfer) {
        self.forward(core, || TransferEvent::Start(capture(Some(transfer))));
    }

    pub(crate) fn update(&self, core: &DelegateCore, transfer: &DynTransfer) {
        self.forward(core, || TransferEvent::Update(capture(Some(transfer))));
    }

    pub(crate) fn finish(&self, core: &DelegateCore, transfer: &DynTransfer, error: &DynError) {
        self.forward(core, || {
            TransferEvent::Finish(capture(Some(transfer)), capture(Some(error)))
        });
    }

    pub(crate) fn temporary_error(
        &self,
        core: &DelegateCore,
        transfer: &DynTransfer,
        error: &DynError,
    ) {
        self.forward(core, || {
            TransferEvent::TemporaryError(capture(Some(transfer)), capture(Some(error)))
        });
    }

    pub(crate) fn folder_update(
        &self,
        core: &DelegateCore,
        transfer: &DynTransfer,
        progress: &FolderProgress,
    ) {
        self.forward(core, || {
            TransferEvent::FolderUpdate(capture(Some(transfer)), progress.clone())
        });
    }

    /// Ask the handler, inline, whether streaming should continue.
    pub(crate) fn data(&self, core: &DelegateCore, transfer: &DynTransfer, buffer: &[u8]) -> bool {
        let Some(handler) = &self.handler else {
            return false;
        };
        let Some(api) = core.courier() else {
            return false;
        };
        let snapshot = capture(Some(transfer));
        guard(|| handler.on_transfer_data(&api, snapshot.as_ref(), buffer)).unwrap_or(false)
    }
}

/// Where streamed bytes go when a transfer is bound to an output sink.
pub(crate) type Sink = Mutex<Box<dyn Write + Send>>;

/// Engine-facing wrapper around one [`TransferHandler`].
///
/// When created by
/// [`Courier::output_transfer_listener`](crate::Courier::output_transfer_listener)
/// the delegate owns an output sink: every data chunk is written to it and
/// the handler is not consulted for data.
pub struct TransferDelegate {
    core: DelegateCore,
    part: TransferPart,
    sink: Option<Sink>,
}

impl TransferDelegate {
    pub(crate) fn new(core: DelegateCore, handler: Option<Arc<dyn TransferHandler>>) -> Self {
        Self {
            core,
            part: TransferPart::new(handler),
            sink: None,
        }
    }

    pub(crate) fn with_sink(
        core: DelegateCore,
        sink: Box<dyn Write + Send>,
        handler: Option<Arc<dyn TransferHandler>>,
    ) -> Self {
        Self {
            core,
            part: TransferPart::new(handler),
            sink: Some(Mutex::new(sink)),
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

    /// Whether data chunks go to an output sink.
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    pub(crate) fn wraps(&self, target: *const ()) -> bool {
        self.part
            .handler()
            .is_some_and(|handler| std::ptr::addr_eq(Arc::as_ptr(handler), target))
    }

    fn write_chunk(&self, sink: &Sink, buffer: &[u8]) -> bool {
        match guard(|| sink.lock().write_all(buffer)) {
            Ok(Ok(())) => true,
            Ok(Err(error)) => {
                tracing::warn!(
                    listener = %self.core.id(),
                    len = buffer.len(),
                    %error,
                    "output sink write failed, stopping stream"
                );
                false
            }
            // The guard already logged the panic.
            Err(_) => false,
        }
    }
}

impl TransferCallbacks for TransferDelegate {
    fn on_transfer_start(&self, transfer: &DynTransfer) {
        if self.core.is_active() {
            self.part.start(&self.core, transfer);
        }
    }

    fn on_transfer_update(&self, transfer: &DynTransfer) {
        if self.core.is_active() {
            self.part.update(&self.core, transfer);
        }
    }

    fn on_transfer_finish(&self, transfer: &DynTransfer, error: &DynError) {
        if !self.core.begin_terminal() {
            return;
        }
        self.part.finish(&self.core, transfer, error);
        // Unregisters however the flush ends.
        if let Some(sink) = &self.sink {
            if let Ok(Err(error)) = guard(|| sink.lock().flush()) {
                tracing::warn!(listener = %self.core.id(), %error, "output sink flush failed");
            }
        }
        self.core.end_terminal();
    }

    fn on_transfer_temporary_error(&self, transfer: &DynTransfer, error: &DynError) {
        if self.core.is_active() {
            self.part.temporary_error(&self.core, transfer, error);
        }
    }

    fn on_folder_transfer_update(&self, transfer: &DynTransfer, progress: &FolderProgress) {
        if self.core.is_active() {
            self.part.folder_update(&self.core, transfer, progress);
        }
    }

    fn on_transfer_data(&self, transfer: &DynTransfer, buffer: &[u8]) -> bool {
        if !self.core.is_active() {
            return false;
        }
        match &self.sink {
            Some(sink) => self.write_chunk(sink, buffer),
            None => self.part.data(&self.core, transfer, buffer),
        }
    }
}

impl Registrant for TransferDelegate {
    fn listener_id(&self) -> ListenerId {
        self.core.id()
    }
}

impl fmt::Debug for TransferDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferDelegate")
            .field("id", &self.id())
            .field("scope", &self.scope())
            .field("lifecycle", &self.lifecycle())
            .field("has_handler", &self.part.handler().is_some())
            .field("has_sink", &self.has_sink())
            .finish()
    }
}
