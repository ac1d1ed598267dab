//! Logger delegate.

use super::DelegateCore;
use crate::{delivery::Route, handler::LogHandler};
use courier_core::{ListenerId, LogLevel, LogRecord, LoggerCallbacks};
use courier_std::Registrant;
use std::{fmt, sync::Arc};

/// Engine-facing wrapper around one [`LogHandler`]. Always durable.
pub struct LoggerDelegate {
    core: DelegateCore,
    handler: Arc<dyn LogHandler>,
}

impl LoggerDelegate {
    pub(crate) fn new(core: DelegateCore, handler: Arc<dyn LogHandler>) -> Self {
        Self { core, handler }
    }

    /// Identity of the registration.
    pub fn id(&self) -> ListenerId {
        self.core.id()
    }

    pub(crate) fn core(&self) -> &DelegateCore {
        &self.core
    }

    pub(crate) fn wraps(&self, target: *const ()) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.handler), target)
    }
}

impl LoggerCallbacks for LoggerDelegate {
    fn log(&self, time: &str, level: LogLevel, source: &str, message: &str) {
        self.core.submit(Route::Log {
            handler: Arc::clone(&self.handler),
            record: LogRecord {
                time: time.to_owned(),
                level,
                source: source.to_owned(),
                message: message.to_owned(),
            },
        });
    }
}

impl Registrant for LoggerDelegate {
    fn listener_id(&self) -> ListenerId {
        self.core.id()
    }
}

impl fmt::Debug for LoggerDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerDelegate")
            .field("id", &self.id())
            .finish()
    }
}
