//! Inline dispatch on the calling thread.

use super::{Deliver, DispatchTarget, Dispatcher, execute};
use courier_core::DispatchError;

/// Runs every job synchronously on the thread that submits it.
///
/// Appropriate when the application is prepared to receive handler calls on
/// the engine's own threads. Ordering follows the engine's call order.
#[derive(Debug, Default, Clone, Copy)]
pub struct Direct;

impl<J: Deliver> Dispatcher<J> for Direct {
    fn submit(&self, job: J) -> Result<(), DispatchError> {
        // A panicking handler has already been logged by `execute`; the
        // submitting engine thread only needs to know the job was accepted.
        let _ = execute(job);
        Ok(())
    }

    fn target(&self) -> DispatchTarget {
        DispatchTarget::Direct
    }
}
