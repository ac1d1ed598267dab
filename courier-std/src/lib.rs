//! # courier-std
//!
//! Standard machinery for the courier dispatch layer.
//!
//! This crate provides:
//! - **Registries**: [`Registry`], a thread-safe, insertion-ordered set of
//!   registrations that tolerates mutation during broadcast
//! - **Dispatch strategies**: [`Direct`], [`MainLoop`], [`AsyncLoop`] behind
//!   the [`Dispatcher`] trait
//! - **Testing**: engine payload doubles in [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use courier_core;

pub mod dispatch;
pub mod registry;
pub mod testing;

pub use dispatch::{
    AsyncLoop, AsyncPump, Deliver, Direct, DispatchTarget, Dispatcher, MainLoop, MainLoopPump,
    execute, guard,
};
pub use registry::{Registrant, Registry};
