//! Task-affine dispatch for async applications.
//!
//! Same contract as [`MainLoop`](super::MainLoop), but the consumer is an
//! async task: the application spawns (or awaits) [`AsyncPump::run`] on the
//! single-threaded runtime its handlers expect to run on.

use super::{Deliver, DispatchTarget, Dispatcher, execute};
use courier_core::DispatchError;
use futures::{
    StreamExt,
    channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded},
};

/// The submitting half of an async queue.
pub struct AsyncLoop<J> {
    sender: UnboundedSender<J>,
}

impl<J: Deliver> AsyncLoop<J> {
    /// Create a queue and the pump that drains it.
    pub fn channel() -> (AsyncLoop<J>, AsyncPump<J>) {
        let (sender, receiver) = unbounded();
        (AsyncLoop { sender }, AsyncPump { receiver })
    }
}

impl<J> Clone for AsyncLoop<J> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<J: Deliver> Dispatcher<J> for AsyncLoop<J> {
    fn submit(&self, job: J) -> Result<(), DispatchError> {
        self.sender
            .unbounded_send(job)
            .map_err(|_| DispatchError::Disconnected)
    }

    fn target(&self) -> DispatchTarget {
        DispatchTarget::SingleThreadAffine
    }
}

/// The draining half of an async queue.
pub struct AsyncPump<J> {
    receiver: UnboundedReceiver<J>,
}

impl<J: Deliver> AsyncPump<J> {
    /// Run jobs as they arrive until every [`AsyncLoop`] handle is dropped.
    /// Returns how many ran.
    pub async fn run(mut self) -> usize {
        let mut ran = 0;
        while let Some(job) = self.receiver.next().await {
            let _ = execute(job);
            ran += 1;
        }
        tracing::debug!(ran, "async loop drained, all submitters gone");
        ran
    }

    /// Run every job queued so far without waiting. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(Some(job)) = self.receiver.try_next() {
            let _ = execute(job);
            ran += 1;
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::tests::Push;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_async_pump_runs_jobs_in_order() {
        let (async_loop, pump) = AsyncLoop::channel();
        let log = Arc::new(Mutex::new(Vec::new()));

        let engine = {
            let log = log.clone();
            std::thread::spawn(move || {
                for label in ["start", "update", "finish"] {
                    async_loop
                        .submit(Push {
                            log: log.clone(),
                            label,
                        })
                        .unwrap();
                }
            })
        };
        engine.join().unwrap();

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(pump.run().await, 3);
        assert_eq!(*log.lock().unwrap(), vec!["start", "update", "finish"]);
    }

    #[test]
    fn test_run_pending_drains_without_waiting() {
        let (async_loop, mut pump) = AsyncLoop::channel();
        let log = Arc::new(Mutex::new(Vec::new()));
        async_loop
            .submit(Push {
                log: log.clone(),
                label: "a",
            })
            .unwrap();

        assert_eq!(pump.run_pending(), 1);
        assert_eq!(pump.run_pending(), 0);
        assert_eq!(*log.lock().unwrap(), vec!["a"]);
    }

    #[test]
    fn test_submit_after_pump_dropped_is_disconnected() {
        let (async_loop, pump) = AsyncLoop::<Push>::channel();
        drop(pump);
        let result = async_loop.submit(Push {
            log: Arc::new(Mutex::new(Vec::new())),
            label: "lost",
        });
        assert_eq!(result, Err(DispatchError::Disconnected));
    }
}
