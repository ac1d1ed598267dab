//! # courier - Event delegation and thread-affine dispatch
//!
//! `courier` sits between an internally threaded engine and application
//! handlers. The engine calls delegates from its own worker threads with
//! payloads it owns; `courier` captures each payload into an owned snapshot,
//! queues the event as a [`Delivery`] and runs the handler on the thread the
//! application chose.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! struct Progress;
//!
//! impl TransferHandler for Progress {
//!     fn on_transfer_update(&self, _api: &Courier, transfer: Option<&TransferSnapshot>) {
//!         if let Some(transfer) = transfer {
//!             println!("{:.0}%", transfer.progress() * 100.0);
//!         }
//!     }
//! }
//!
//! let (courier, pump) = Courier::with_main_loop();
//! let listener = courier.transfer_listener(Some(Arc::new(Progress)));
//! engine.start_download(node, path, listener);
//!
//! // On the UI thread:
//! pump.run_pending();
//! ```
//!
//! ## Pieces
//!
//! - [`Courier`]: the facade. Owns the registries and the dispatcher.
//! - Handler traits ([`RequestHandler`], [`TransferHandler`],
//!   [`GlobalHandler`], [`CombinedHandler`], [`LogHandler`],
//!   [`TreeProcessor`]): what the application implements.
//! - Delegates ([`RequestDelegate`], [`TransferDelegate`], ...): what the
//!   engine calls.
//! - [`EngineBridge`]: fans engine callbacks out to durable delegates.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod bridge;
mod courier;
mod delegate;
mod delivery;
mod handle;
mod handler;
pub mod logging;

pub use bridge::EngineBridge;
pub use courier::{Courier, CourierBuilder};
pub use delegate::{
    CombinedDelegate, GlobalDelegate, LoggerDelegate, RequestDelegate, TransferDelegate,
    TreeDelegate,
};
pub use delivery::{Delivery, GlobalEvent, RequestEvent, TransferEvent};
pub use handle::{Lifecycle, ListenerHandle, Scope};
pub use handler::{
    CombinedHandler, GlobalHandler, LogHandler, RequestHandler, TransferHandler, TreeProcessor,
};

pub use courier_core::{
    Capture, Categories, Category, CombinedCallbacks, ContactRequestSnapshot, DispatchError,
    DynContactRequestList, DynError, DynEvent, DynNode, DynNodeList, DynRequest,
    DynSetElementList, DynSetList, DynTransfer, DynUserAlertList, DynUserList,
    EngineEventSnapshot, ErrorCode, ErrorSnapshot, FolderProgress, GlobalCallbacks, Handle,
    ListenerId, LogLevel, LogRecord, LoggerCallbacks, Message, NodeKind, NodeSnapshot,
    PayloadList, RequestCallbacks, RequestSnapshot, SetElementSnapshot, SetSnapshot,
    TransferCallbacks, TransferDirection, TransferSnapshot, TransferState, TreeCallbacks,
    UserAlertSnapshot, UserSnapshot,
};

/// Dispatch strategies.
pub mod dispatch {
    pub use courier_std::dispatch::{
        AsyncLoop, AsyncPump, Deliver, Direct, DispatchTarget, Dispatcher, MainLoop,
        MainLoopPump,
    };
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use courier_std::testing::*;
}

/// Prelude module - common imports for courier.
///
/// # Usage
///
/// ```rust,ignore
/// use courier::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Facade
        Courier,
        CourierBuilder,
        // Handlers
        CombinedHandler,
        GlobalHandler,
        LogHandler,
        RequestHandler,
        TransferHandler,
        TreeProcessor,
        // Registration
        Categories,
        Category,
        ListenerHandle,
        // Snapshots
        ErrorCode,
        ErrorSnapshot,
        NodeSnapshot,
        RequestSnapshot,
        TransferSnapshot,
        // Dispatch
        dispatch::DispatchTarget,
    };
    pub use std::sync::Arc;
}
