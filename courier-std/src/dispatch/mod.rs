//! # Dispatch strategies
//!
//! A [`Dispatcher`] decides *where* a deferred unit of work runs:
//!
//! - [`Direct`]: inline, on the calling (engine) thread.
//! - [`MainLoop`]: queued for one designated thread that drains a
//!   [`MainLoopPump`] (a GUI main loop, a dedicated worker...).
//! - [`AsyncLoop`]: queued for one async task that awaits an [`AsyncPump`].
//!
//! Anything else implementing [`Dispatcher`] is a custom strategy.
//!
//! Queued strategies never block the submitting thread and preserve
//! submission order, so two jobs submitted for the same listener run in the
//! order the engine produced them.

mod async_loop;
mod direct;
mod main_loop;

pub use async_loop::{AsyncLoop, AsyncPump};
pub use direct::Direct;
pub use main_loop::{MainLoop, MainLoopPump};

use courier_core::DispatchError;
use std::{
    any::Any,
    fmt,
    panic::{self, AssertUnwindSafe},
};

/// A deferred unit of work.
pub trait Deliver: Send + 'static {
    /// Run the work on the current thread.
    fn deliver(self);
}

impl Deliver for Box<dyn FnOnce() + Send + 'static> {
    fn deliver(self) {
        self()
    }
}

/// Where a dispatcher runs its jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchTarget {
    /// Synchronously on the submitting thread.
    Direct,
    /// On one designated thread or task.
    SingleThreadAffine,
    /// A user-provided strategy.
    Custom,
}

impl fmt::Display for DispatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DispatchTarget::Direct => "direct",
            DispatchTarget::SingleThreadAffine => "single_thread_affine",
            DispatchTarget::Custom => "custom",
        })
    }
}

/// Executes deferred units of work according to a thread discipline.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot dispatch jobs of type `{J}`",
    label = "missing `Dispatcher` implementation",
    note = "Implement `Dispatcher<{J}>` to choose where jobs run."
)]
pub trait Dispatcher<J: Deliver>: Send + Sync + 'static {
    /// Hand a job over for execution.
    ///
    /// Must not wait for the job to run unless the strategy runs it inline.
    fn submit(&self, job: J) -> Result<(), DispatchError>;

    /// The thread discipline this dispatcher implements.
    fn target(&self) -> DispatchTarget {
        DispatchTarget::Custom
    }
}

impl<J: Deliver, D: Dispatcher<J> + ?Sized> Dispatcher<J> for std::sync::Arc<D> {
    fn submit(&self, job: J) -> Result<(), DispatchError> {
        (**self).submit(job)
    }

    fn target(&self) -> DispatchTarget {
        (**self).target()
    }
}

/// Run one job, containing any panic it raises.
///
/// This is the dispatch boundary: a misbehaving handler is logged here and
/// never unwinds into the engine thread or the loop that drives it.
pub fn execute<J: Deliver>(job: J) -> Result<(), DispatchError> {
    guard(|| job.deliver())
}

/// Run `f`, turning a panic into [`DispatchError::HandlerPanicked`].
///
/// Used for the synchronous callbacks that need the handler's answer on the
/// engine thread.
pub fn guard<T, F>(f: F) -> Result<T, DispatchError>
where
    F: FnOnce() -> T,
{
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = panic_message(payload.as_ref());
        tracing::error!(panic = %message, "handler panicked at the dispatch boundary");
        DispatchError::HandlerPanicked(message)
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// A job that appends its label to a shared log.
    pub(crate) struct Push {
        pub(crate) log: Arc<Mutex<Vec<&'static str>>>,
        pub(crate) label: &'static str,
    }

    impl Deliver for Push {
        fn deliver(self) {
            self.log.lock().unwrap().push(self.label);
        }
    }

    pub(crate) struct Explode;

    impl Deliver for Explode {
        fn deliver(self) {
            panic!("boom");
        }
    }

    #[test]
    fn test_execute_contains_panics() {
        let result = execute(Explode);
        assert_eq!(result, Err(DispatchError::HandlerPanicked("boom".into())));
    }

    #[test]
    fn test_guard_returns_value() {
        assert_eq!(guard(|| 7), Ok(7));
        let formatted = guard(|| -> u8 { panic!("{} failed", "write") });
        assert_eq!(
            formatted,
            Err(DispatchError::HandlerPanicked("write failed".into()))
        );
    }

    #[test]
    fn test_arc_dispatcher_forwards() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let dispatcher: Arc<dyn Dispatcher<Push>> = Arc::new(Direct);
        dispatcher
            .submit(Push {
                log: log.clone(),
                label: "a",
            })
            .unwrap();
        assert_eq!(dispatcher.target(), DispatchTarget::Direct);
        assert_eq!(*log.lock().unwrap(), vec!["a"]);
    }
}
