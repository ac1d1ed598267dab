//! Single-thread affine dispatch over a crossbeam channel.
//!
//! The engine side holds a [`MainLoop`] and only ever enqueues. The thread
//! that owns the matching [`MainLoopPump`] drains the queue and runs each job
//! locally, in submission order.

use super::{Deliver, DispatchTarget, Dispatcher, execute};
use courier_core::DispatchError;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, unbounded};
use std::time::Duration;

/// The submitting half of a main-loop queue.
pub struct MainLoop<J> {
    sender: Sender<J>,
}

impl<J: Deliver> MainLoop<J> {
    /// Create a queue and the pump that drains it.
    ///
    /// The queue is unbounded: submitting never blocks the engine thread.
    pub fn channel() -> (MainLoop<J>, MainLoopPump<J>) {
        let (sender, receiver) = unbounded();
        (MainLoop { sender }, MainLoopPump { receiver })
    }
}

impl<J> Clone for MainLoop<J> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<J: Deliver> Dispatcher<J> for MainLoop<J> {
    fn submit(&self, job: J) -> Result<(), DispatchError> {
        self.sender
            .send(job)
            .map_err(|_| DispatchError::Disconnected)
    }

    fn target(&self) -> DispatchTarget {
        DispatchTarget::SingleThreadAffine
    }
}

/// The draining half of a main-loop queue.
///
/// There is exactly one pump per queue; whichever thread calls its methods is
/// the thread handlers run on. Integrate it with a GUI loop by calling
/// [`MainLoopPump::run_pending`] from an idle or timer callback, or dedicate a
/// thread to [`MainLoopPump::run`].
pub struct MainLoopPump<J> {
    receiver: Receiver<J>,
}

impl<J: Deliver> MainLoopPump<J> {
    /// Run every job queued so far without waiting. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(job) => {
                    let _ = execute(job);
                    ran += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return ran,
            }
        }
    }

    /// Wait up to `timeout` for one job and run it.
    ///
    /// Returns `false` on timeout or when every submitter is gone and the
    /// queue is empty.
    pub fn run_next(&self, timeout: Duration) -> bool {
        match self.receiver.recv_timeout(timeout) {
            Ok(job) => {
                let _ = execute(job);
                true
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Run jobs until every [`MainLoop`] handle has been dropped and the
    /// queue is drained. Returns how many ran.
    pub fn run(self) -> usize {
        let mut ran = 0;
        for job in self.receiver.iter() {
            let _ = execute(job);
            ran += 1;
        }
        tracing::debug!(ran, "main loop drained, all submitters gone");
        ran
    }

    /// Number of jobs waiting.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}
