//! # The courier facade
//!
//! [`Courier`] owns one registry per listener category and the dispatcher
//! every delegate submits to. It is cheap to clone; clones share state.
//!
//! Two couriers in one process share nothing.

use crate::{
    bridge::EngineBridge,
    delegate::{
        CombinedDelegate, DelegateCore, GlobalDelegate, LoggerDelegate, RequestDelegate,
        TransferDelegate, TreeDelegate,
    },
    delivery::Delivery,
    handle::{Lifecycle, ListenerHandle, Scope},
    handler::{
        CombinedHandler, GlobalHandler, LogHandler, RequestHandler, TransferHandler,
        TreeProcessor,
    },
};
use courier_core::{Categories, Category, ListenerId};
use courier_std::{
    AsyncLoop, AsyncPump, Direct, DispatchTarget, Dispatcher, MainLoop, MainLoopPump, Registrant,
    Registry,
};
use std::{fmt, io::Write, sync::Arc};

// ============================================================================
// Shared state
// ============================================================================

/// Per-category registries.
pub(crate) struct Registries {
    pub(crate) request: Registry<RequestDelegate>,
    pub(crate) transfer: Registry<TransferDelegate>,
    pub(crate) global: Registry<GlobalDelegate>,
    pub(crate) combined: Registry<CombinedDelegate>,
    pub(crate) logger: Registry<LoggerDelegate>,
    pub(crate) tree: Registry<TreeDelegate>,
}

impl Registries {
    fn new() -> Self {
        Self {
            request: Registry::new(),
            transfer: Registry::new(),
            global: Registry::new(),
            combined: Registry::new(),
            logger: Registry::new(),
            tree: Registry::new(),
        }
    }

    pub(crate) fn unregister(&self, category: Category, id: ListenerId) -> bool {
        match category {
            Category::Request => self.request.unregister(id),
            Category::Transfer => self.transfer.unregister(id),
            Category::Global => self.global.unregister(id),
            Category::Combined => self.combined.unregister(id),
            Category::Logger => self.logger.unregister(id),
            Category::TreeProcessor => self.tree.unregister(id),
        }
    }

    fn contains(&self, category: Category, id: ListenerId) -> bool {
        match category {
            Category::Request => self.request.contains(id),
            Category::Transfer => self.transfer.contains(id),
            Category::Global => self.global.contains(id),
            Category::Combined => self.combined.contains(id),
            Category::Logger => self.logger.contains(id),
            Category::TreeProcessor => self.tree.contains(id),
        }
    }

    fn len(&self, category: Category) -> usize {
        match category {
            Category::Request => self.request.len(),
            Category::Transfer => self.transfer.len(),
            Category::Global => self.global.len(),
            Category::Combined => self.combined.len(),
            Category::Logger => self.logger.len(),
            Category::TreeProcessor => self.tree.len(),
        }
    }

    fn clear(&self, category: Category) -> usize {
        match category {
            Category::Request => self.request.clear(),
            Category::Transfer => self.transfer.clear(),
            Category::Global => self.global.clear(),
            Category::Combined => self.combined.clear(),
            Category::Logger => self.logger.clear(),
            Category::TreeProcessor => self.tree.clear(),
        }
    }

    fn handles(&self, category: Category) -> Vec<ListenerHandle> {
        match category {
            Category::Request => collect(&self.request, ListenerHandle::Request),
            Category::Transfer => collect(&self.transfer, ListenerHandle::Transfer),
            Category::Global => collect(&self.global, ListenerHandle::Global),
            Category::Combined => collect(&self.combined, ListenerHandle::Combined),
            Category::Logger => collect(&self.logger, ListenerHandle::Logger),
            Category::TreeProcessor => collect(&self.tree, ListenerHandle::Tree),
        }
    }
}

fn collect<T, F>(registry: &Registry<T>, wrap: F) -> Vec<ListenerHandle>
where
    T: Registrant,
    F: Fn(Arc<T>) -> ListenerHandle,
{
    registry.snapshot().into_iter().map(wrap).collect()
}

pub(crate) struct Shared {
    pub(crate) registries: Registries,
    pub(crate) dispatcher: Box<dyn Dispatcher<Delivery>>,
}

// ============================================================================
// Courier
// ============================================================================

/// The dispatch layer's facade.
///
/// # Example
///
/// ```rust,ignore
/// let (courier, pump) = Courier::with_main_loop();
/// courier.add_transfer_listener(Arc::new(ProgressBar::default()));
/// engine.set_transfer_listener(courier.engine_bridge());
///
/// // on the UI thread
/// pump.run_pending();
/// ```
///
/// Handlers that keep a clone of the courier they are registered with form a
/// reference cycle; hold a clone only for as long as needed, or remove the
/// handler before dropping the last outside clone.
#[derive(Clone)]
pub struct Courier {
    shared: Arc<Shared>,
}

impl Courier {
    /// A courier that runs handlers inline on the engine thread.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring a courier.
    pub fn builder() -> CourierBuilder {
        CourierBuilder::new()
    }

    /// A courier whose handlers run on whichever thread drives the returned
    /// pump.
    pub fn with_main_loop() -> (Self, MainLoopPump<Delivery>) {
        Self::builder().main_loop()
    }

    /// A courier whose handlers run on the task awaiting the returned pump.
    pub fn with_async_loop() -> (Self, AsyncPump<Delivery>) {
        Self::builder().async_loop()
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    fn core(&self, category: Category, scope: Scope) -> DelegateCore {
        DelegateCore::new(category, scope, Arc::downgrade(&self.shared))
    }

    /// Whether two values refer to the same courier.
    pub fn ptr_eq(&self, other: &Courier) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Where handlers run.
    pub fn dispatch_target(&self) -> DispatchTarget {
        self.shared.dispatcher.target()
    }

    /// The object the engine registers as its listener for durable
    /// registrations. Every engine callback is fanned out to the durable
    /// delegates registered at that moment.
    pub fn engine_bridge(&self) -> Arc<EngineBridge> {
        Arc::new(EngineBridge::new(Arc::downgrade(&self.shared)))
    }

    // ------------------------------------------------------------------------
    // Durable registration
    // ------------------------------------------------------------------------

    /// Register a durable request handler.
    pub fn add_request_listener(&self, handler: Arc<dyn RequestHandler>) -> ListenerHandle {
        let delegate = Arc::new(RequestDelegate::new(
            self.core(Category::Request, Scope::Durable),
            Some(handler),
        ));
        self.register_new(ListenerHandle::Request(delegate))
    }

    /// Register a durable transfer handler.
    pub fn add_transfer_listener(&self, handler: Arc<dyn TransferHandler>) -> ListenerHandle {
        let delegate = Arc::new(TransferDelegate::new(
            self.core(Category::Transfer, Scope::Durable),
            Some(handler),
        ));
        self.register_new(ListenerHandle::Transfer(delegate))
    }

    /// Register a global handler.
    pub fn add_global_listener(&self, handler: Arc<dyn GlobalHandler>) -> ListenerHandle {
        let delegate = Arc::new(GlobalDelegate::new(
            self.core(Category::Global, Scope::Durable),
            handler,
        ));
        self.register_new(ListenerHandle::Global(delegate))
    }

    /// Register a handler for requests, transfers and global events.
    pub fn add_listener(&self, handler: Arc<dyn CombinedHandler>) -> ListenerHandle {
        let delegate = Arc::new(CombinedDelegate::new(
            self.core(Category::Combined, Scope::Durable),
            handler,
        ));
        self.register_new(ListenerHandle::Combined(delegate))
    }

    /// Register an engine log handler.
    pub fn add_logger(&self, handler: Arc<dyn LogHandler>) -> ListenerHandle {
        let delegate = Arc::new(LoggerDelegate::new(
            self.core(Category::Logger, Scope::Durable),
            handler,
        ));
        self.register_new(ListenerHandle::Logger(delegate))
    }

    fn register_new(&self, handle: ListenerHandle) -> ListenerHandle {
        self.register(&handle);
        handle
    }

    // ------------------------------------------------------------------------
    // Single-use
    // ------------------------------------------------------------------------

    /// A delegate for exactly one engine request.
    ///
    /// It stays registered until the request finishes, then retires. A
    /// missing handler still retires on finish.
    pub fn request_listener(
        &self,
        handler: Option<Arc<dyn RequestHandler>>,
    ) -> Arc<RequestDelegate> {
        let delegate = Arc::new(RequestDelegate::new(
            self.core(Category::Request, Scope::SingleUse),
            handler,
        ));
        self.register(&ListenerHandle::Request(Arc::clone(&delegate)));
        delegate
    }

    /// A delegate for exactly one engine transfer.
    pub fn transfer_listener(
        &self,
        handler: Option<Arc<dyn TransferHandler>>,
    ) -> Arc<TransferDelegate> {
        let delegate = Arc::new(TransferDelegate::new(
            self.core(Category::Transfer, Scope::SingleUse),
            handler,
        ));
        self.register(&ListenerHandle::Transfer(Arc::clone(&delegate)));
        delegate
    }

    /// A delegate for one unbuffered streaming download: data chunks are
    /// written to `sink`, other events go to `handler`.
    ///
    /// A failed write answers `false` to the engine, which stops the stream.
    pub fn output_transfer_listener<W>(
        &self,
        sink: W,
        handler: Option<Arc<dyn TransferHandler>>,
    ) -> Arc<TransferDelegate>
    where
        W: Write + Send + 'static,
    {
        let delegate = Arc::new(TransferDelegate::with_sink(
            self.core(Category::Transfer, Scope::SingleUse),
            Box::new(sink),
            handler,
        ));
        self.register(&ListenerHandle::Transfer(Arc::clone(&delegate)));
        delegate
    }

    // ------------------------------------------------------------------------
    // Tree processing
    // ------------------------------------------------------------------------

    /// A registered tree processor delegate. Stays registered until removed.
    pub fn tree_processor(&self, handler: Option<Arc<dyn TreeProcessor>>) -> Arc<TreeDelegate> {
        let delegate = Arc::new(TreeDelegate::new(
            self.core(Category::TreeProcessor, Scope::Durable),
            handler,
        ));
        self.register(&ListenerHandle::Tree(Arc::clone(&delegate)));
        delegate
    }

    /// Run one traversal with `handler` registered, and unregister it
    /// afterwards (even if `traverse` panics).
    pub fn process_tree<R, F>(&self, handler: Arc<dyn TreeProcessor>, traverse: F) -> R
    where
        F: FnOnce(&TreeDelegate) -> R,
    {
        let delegate = self.tree_processor(Some(handler));
        let _registered = Unregister {
            registries: &self.shared.registries,
            id: delegate.id(),
        };
        traverse(&delegate)
    }

    // ------------------------------------------------------------------------
    // Handle management
    // ------------------------------------------------------------------------

    /// Add a handle to its registry. Returns `false` if it was already
    /// registered, has retired, or belongs to another courier.
    pub fn register(&self, handle: &ListenerHandle) -> bool {
        if !handle.core().belongs_to(&self.shared) || handle.lifecycle() == Lifecycle::Retired {
            return false;
        }
        let registries = &self.shared.registries;
        let added = match handle {
            ListenerHandle::Request(d) => registries.request.register(Arc::clone(d)),
            ListenerHandle::Transfer(d) => registries.transfer.register(Arc::clone(d)),
            ListenerHandle::Global(d) => registries.global.register(Arc::clone(d)),
            ListenerHandle::Combined(d) => registries.combined.register(Arc::clone(d)),
            ListenerHandle::Logger(d) => registries.logger.register(Arc::clone(d)),
            ListenerHandle::Tree(d) => registries.tree.register(Arc::clone(d)),
        };
        if added {
            tracing::debug!(
                listener = %handle.id(),
                category = %handle.category(),
                scope = ?handle.scope(),
                "listener registered"
            );
        }
        added
    }

    /// Remove a handle from its registry. Returns `false` if it was not
    /// registered. Deliveries already submitted still run.
    pub fn unregister(&self, handle: &ListenerHandle) -> bool {
        let removed = self
            .shared
            .registries
            .unregister(handle.category(), handle.id());
        if removed {
            tracing::debug!(
                listener = %handle.id(),
                category = %handle.category(),
                "listener unregistered"
            );
        }
        removed
    }

    /// Whether `handle` is currently registered here.
    pub fn is_registered(&self, handle: &ListenerHandle) -> bool {
        handle.core().belongs_to(&self.shared)
            && self
                .shared
                .registries
                .contains(handle.category(), handle.id())
    }

    /// Remove every request delegate wrapping `handler`, durable or
    /// single-use. Returns how many were removed.
    pub fn remove_request_listener<H: ?Sized>(&self, handler: &Arc<H>) -> usize {
        let target = Arc::as_ptr(handler) as *const ();
        self.removed(
            Category::Request,
            self.shared
                .registries
                .request
                .unregister_where(|d| d.wraps(target)),
        )
    }

    /// Remove every transfer delegate wrapping `handler`.
    pub fn remove_transfer_listener<H: ?Sized>(&self, handler: &Arc<H>) -> usize {
        let target = Arc::as_ptr(handler) as *const ();
        self.removed(
            Category::Transfer,
            self.shared
                .registries
                .transfer
                .unregister_where(|d| d.wraps(target)),
        )
    }

    /// Remove every global delegate wrapping `handler`.
    pub fn remove_global_listener<H: ?Sized>(&self, handler: &Arc<H>) -> usize {
        let target = Arc::as_ptr(handler) as *const ();
        self.removed(
            Category::Global,
            self.shared
                .registries
                .global
                .unregister_where(|d| d.wraps(target)),
        )
    }

    /// Remove every combined delegate wrapping `handler`.
    pub fn remove_listener<H: ?Sized>(&self, handler: &Arc<H>) -> usize {
        let target = Arc::as_ptr(handler) as *const ();
        self.removed(
            Category::Combined,
            self.shared
                .registries
                .combined
                .unregister_where(|d| d.wraps(target)),
        )
    }

    /// Remove every logger delegate wrapping `handler`.
    pub fn remove_logger<H: ?Sized>(&self, handler: &Arc<H>) -> usize {
        let target = Arc::as_ptr(handler) as *const ();
        self.removed(
            Category::Logger,
            self.shared
                .registries
                .logger
                .unregister_where(|d| d.wraps(target)),
        )
    }

    fn removed(&self, category: Category, count: usize) -> usize {
        if count > 0 {
            tracing::debug!(%category, count, "listeners removed by handler identity");
        }
        count
    }

    // ------------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------------

    /// Number of registrations across `categories`.
    pub fn listener_count(&self, categories: Categories) -> usize {
        categories
            .categories()
            .map(|category| self.shared.registries.len(category))
            .sum()
    }

    /// Registrations of one category, in registration order.
    pub fn handles(&self, category: Category) -> Vec<ListenerHandle> {
        self.shared.registries.handles(category)
    }

    /// Remove every registration across `categories`. Returns how many were
    /// removed.
    pub fn remove_all(&self, categories: Categories) -> usize {
        let count: usize = categories
            .categories()
            .map(|category| self.shared.registries.clear(category))
            .sum();
        tracing::debug!(?categories, count, "listeners cleared");
        count
    }
}

impl Default for Courier {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Courier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Courier")
            .field("dispatch_target", &self.dispatch_target())
            .field("listeners", &self.listener_count(Categories::all()))
            .finish()
    }
}

struct Unregister<'a> {
    registries: &'a Registries,
    id: ListenerId,
}

impl Drop for Unregister<'_> {
    fn drop(&mut self) {
        self.registries.unregister(Category::TreeProcessor, self.id);
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Configures a [`Courier`].
///
/// The dispatch target is chosen here and fixed for the courier's lifetime.
/// The default is [`Direct`].
pub struct CourierBuilder {
    dispatcher: Option<Box<dyn Dispatcher<Delivery>>>,
}

impl CourierBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self { dispatcher: None }
    }

    /// Run handlers inline on the engine thread.
    pub fn direct(self) -> Self {
        self.dispatcher(Direct)
    }

    /// Use a custom dispatch strategy.
    pub fn dispatcher<D>(mut self, dispatcher: D) -> Self
    where
        D: Dispatcher<Delivery>,
    {
        self.dispatcher = Some(Box::new(dispatcher));
        self
    }

    /// Build with a [`MainLoop`] dispatcher and return its pump.
    pub fn main_loop(self) -> (Courier, MainLoopPump<Delivery>) {
        let (main_loop, pump) = MainLoop::channel();
        (self.dispatcher(main_loop).build(), pump)
    }

    /// Build with an [`AsyncLoop`] dispatcher and return its pump.
    pub fn async_loop(self) -> (Courier, AsyncPump<Delivery>) {
        let (async_loop, pump) = AsyncLoop::channel();
        (self.dispatcher(async_loop).build(), pump)
    }

    /// Build the courier.
    pub fn build(self) -> Courier {
        let dispatcher: Box<dyn Dispatcher<Delivery>> = match self.dispatcher {
            Some(dispatcher) => dispatcher,
            None => Box::new(Direct),
        };
        tracing::debug!(dispatch = %dispatcher.target(), "courier created");
        Courier {
            shared: Arc::new(Shared {
                registries: Registries::new(),
                dispatcher,
            }),
        }
    }
}

impl Default for CourierBuilder {
    fn default() -> Self {
        Self::new()
    }
}
