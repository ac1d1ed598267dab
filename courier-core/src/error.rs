//! Error types for the dispatch layer.
//!
//! Nothing in this module is ever returned to the engine. Dispatch errors
//! surface to the delegate that submitted the delivery, which logs them and
//! carries on.

use thiserror::Error;

/// Errors that can occur while submitting or executing a delivery.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The receiving end of a queued dispatcher has gone away.
    #[error("dispatch target has been disconnected")]
    Disconnected,

    /// The handler panicked while the delivery was executing.
    #[error("handler panicked: {0}")]
    HandlerPanicked(String),
}
