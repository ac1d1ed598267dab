//! Message trait for snapshot and notification types.

/// A marker trait for owned values that may cross from the engine thread to
/// a handler thread.
///
/// Every snapshot produced by a [`Capture`](crate::Capture) implementation is
/// a `Message`: it owns all of its data and is safe to move into a deferred
/// delivery.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone)]
/// struct QuotaSnapshot { used: u64 }
///
/// impl Message for QuotaSnapshot {}
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must be `Send + Sync + 'static`",
    note = "Snapshots must own their data so they can outlive the engine callback."
)]
pub trait Message: Send + Sync + 'static {}

impl Message for () {}
impl Message for String {}
impl<T: Message> Message for Box<T> {}
impl<T: Message> Message for std::sync::Arc<T> {}
impl<T: Message> Message for Vec<T> {}
impl<T: Message> Message for Option<T> {}
