//! # courier-core
//!
//! Core data model for the courier dispatch layer.
//!
//! This crate has minimal dependencies and is what an engine binding needs to
//! import: it defines the engine-facing callback contracts and the owned
//! snapshot types, but none of the registry or dispatch machinery.
//!
//! # Pieces
//!
//! - [`Capture`] / [`PayloadList`]: how a transient engine payload becomes an
//!   owned snapshot.
//! - Snapshot types ([`RequestSnapshot`], [`TransferSnapshot`],
//!   [`ErrorSnapshot`], ...): what handlers observe.
//! - Engine contracts ([`RequestCallbacks`], [`TransferCallbacks`],
//!   [`GlobalCallbacks`], [`CombinedCallbacks`], [`LoggerCallbacks`],
//!   [`TreeCallbacks`]): what the engine calls.
//! - [`ListenerId`], [`Category`], [`Categories`]: registration identity.
//! - [`DispatchError`]: failures at the dispatch boundary.

#![warn(missing_docs)]
#![deny(clippy::wildcard_imports)]

mod engine;
mod error;
mod id;
mod message;
mod payload;
mod snapshot;

pub use engine::{
    CombinedCallbacks, DynContactRequestList, DynError, DynEvent, DynNode, DynNodeList,
    DynRequest, DynSetElementList, DynSetList, DynTransfer, DynUserAlertList, DynUserList,
    GlobalCallbacks, LoggerCallbacks, RequestCallbacks, TransferCallbacks, TreeCallbacks,
};
pub use error::DispatchError;
pub use id::{Categories, Category, ListenerId};
pub use message::Message;
pub use payload::{
    ContactRequestSnapshot, EngineEventSnapshot, ErrorCode, ErrorSnapshot, FolderProgress, Handle,
    LogLevel, LogRecord, NodeKind, NodeSnapshot, RequestSnapshot, SetElementSnapshot, SetSnapshot,
    TransferDirection, TransferSnapshot, TransferState, UserAlertSnapshot, UserSnapshot,
};
pub use snapshot::{Capture, PayloadList, capture, capture_list};
