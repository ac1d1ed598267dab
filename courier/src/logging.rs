//! Tracing bridge for engine log output.

use crate::handler::LogHandler;
use courier_core::{LogLevel, LogRecord};

/// A [`LogHandler`] that re-emits engine log lines as `tracing` events.
///
/// | engine level      | tracing level |
/// |-------------------|---------------|
/// | `Fatal`, `Error`  | `ERROR`       |
/// | `Warning`         | `WARN`        |
/// | `Info`            | `INFO`        |
/// | `Debug`           | `DEBUG`       |
/// | `Max`             | `TRACE`       |
///
/// # Example
///
/// ```rust,ignore
/// use courier::{Courier, logging::TracingLogger};
///
/// let courier = Courier::new();
/// courier.add_logger(Arc::new(TracingLogger::named("engine")));
/// ```
pub struct TracingLogger {
    name: &'static str,
}

impl TracingLogger {
    /// Create a logger with the default name.
    pub fn new() -> Self {
        Self { name: "engine" }
    }

    /// Create a logger with a custom name, recorded on every event.
    pub fn named(name: &'static str) -> Self {
        Self { name }
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl LogHandler for TracingLogger {
    fn log(&self, record: &LogRecord) {
        let LogRecord {
            time,
            level,
            source,
            message,
        } = record;
        match level {
            LogLevel::Fatal => {
                tracing::error!(logger = self.name, %time, %source, fatal = true, "{message}")
            }
            LogLevel::Error => tracing::error!(logger = self.name, %time, %source, "{message}"),
            LogLevel::Warning => tracing::warn!(logger = self.name, %time, %source, "{message}"),
            LogLevel::Info => tracing::info!(logger = self.name, %time, %source, "{message}"),
            LogLevel::Debug => tracing::debug!(logger = self.name, %time, %source, "{message}"),
            LogLevel::Max => tracing::trace!(logger = self.name, %time, %source, "{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        io,
        sync::{Arc, Mutex},
    };
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn record(level: LogLevel, message: &str) -> LogRecord {
        LogRecord {
            time: "2024-01-01T00:00:00".into(),
            level,
            source: "transfer.cpp:42".into(),
            message: message.into(),
        }
    }

    #[test]
    fn test_levels_map_onto_tracing() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let logger = TracingLogger::named("engine");
            logger.log(&record(LogLevel::Fatal, "disk gone"));
            logger.log(&record(LogLevel::Warning, "retrying"));
            logger.log(&record(LogLevel::Max, "chunk 17"));
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("ERROR") && lines[0].contains("disk gone"));
        assert!(lines[0].contains("fatal=true"));
        assert!(lines[1].contains("WARN") && lines[1].contains("retrying"));
        assert!(lines[2].contains("TRACE") && lines[2].contains("chunk 17"));
        assert!(lines[2].contains("source=transfer.cpp:42"));
    }
}
