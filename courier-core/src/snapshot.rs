//! # Event Snapshot
//!
//! The engine lends its payload objects to a callback and is free to mutate or
//! free them the instant the callback returns. Everything that leaves the
//! callback therefore has to be an owned copy.
//!
//! The engine binding implements [`Capture`] on each payload type, producing
//! the matching owned snapshot. Engine-facing callbacks only ever receive
//! `&dyn Capture<...>` borrows, so the borrow checker rejects any attempt to
//! hold on to the original past the callback.
//!
//! A capture may fail (the engine hands back a null or invalid clone). That
//! is modelled as `None` and handlers see the field as absent; it is never an
//! error.

use crate::message::Message;

/// A transient, engine-owned payload that can be copied into an owned snapshot.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be captured into an owned snapshot",
    label = "missing `Capture` implementation",
    note = "Engine payload types implement `Capture` to produce an independent copy."
)]
pub trait Capture {
    /// The owned copy.
    type Snapshot: Message;

    /// Deep-copy the payload. `None` when the engine could not produce a copy.
    fn capture(&self) -> Option<Self::Snapshot>;
}

/// An engine-owned list of payloads (updated nodes, users, sets...).
pub trait PayloadList<S> {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Deep-copy the element at `index`.
    fn capture_at(&self, index: usize) -> Option<S>;

    /// `true` if the list has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P: Capture> PayloadList<P::Snapshot> for [P] {
    fn len(&self) -> usize {
        <[P]>::len(self)
    }

    fn capture_at(&self, index: usize) -> Option<P::Snapshot> {
        self.get(index).and_then(Capture::capture)
    }
}

impl<P: Capture> PayloadList<P::Snapshot> for Vec<P> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn capture_at(&self, index: usize) -> Option<P::Snapshot> {
        self.as_slice().capture_at(index)
    }
}

/// Snapshot an optional payload. An absent payload yields an absent snapshot.
pub fn capture<P>(payload: Option<&P>) -> Option<P::Snapshot>
where
    P: Capture + ?Sized,
{
    payload.and_then(Capture::capture)
}

/// Eagerly deep-copy every element of an optional engine list.
///
/// An absent list stays absent. Elements whose copy fails are left out; the
/// list itself is still present so handlers can tell "no list" from
/// "list with unreadable entries".
pub fn capture_list<S, L>(list: Option<&L>) -> Option<Vec<S>>
where
    L: PayloadList<S> + ?Sized,
{
    let list = list?;
    Some(
        (0..list.len())
            .filter_map(|index| list.capture_at(index))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Size(u64);
    impl Message for Size {}

    struct Raw(Option<u64>);

    impl Capture for Raw {
        type Snapshot = Size;

        fn capture(&self) -> Option<Size> {
            self.0.map(Size)
        }
    }

    #[test]
    fn test_capture_absent_payload_is_absent() {
        assert_eq!(capture::<Raw>(None), None);
        assert_eq!(capture(Some(&Raw(None))), None);
        assert_eq!(capture(Some(&Raw(Some(3)))), Some(Size(3)));
    }

    #[test]
    fn test_capture_list_absent_list_is_absent() {
        assert_eq!(capture_list::<Size, [Raw]>(None), None);
    }

    #[test]
    fn test_capture_list_skips_failed_elements() {
        let raw = vec![Raw(Some(1)), Raw(None), Raw(Some(3))];
        let captured = capture_list(Some(&raw as &dyn PayloadList<Size>));
        assert_eq!(captured, Some(vec![Size(1), Size(3)]));
    }

    #[test]
    fn test_capture_list_empty_list_is_present() {
        let raw: Vec<Raw> = Vec::new();
        assert!(raw.is_empty());
        let captured = capture_list(Some(&raw as &dyn PayloadList<Size>));
        assert_eq!(captured, Some(Vec::new()));
    }
}
