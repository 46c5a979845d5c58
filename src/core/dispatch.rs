//! Detached execution of appender work
//!
//! Every accepted event is handed to its appenders as a task on a private
//! runtime with a single worker, so tasks start in submission order and the
//! log call never waits for output.

use super::appender::Appender;
use super::error::LoggerError;
use super::log_event::LogEvent;
use parking_lot::RwLock;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::Poll;
use std::thread;
use std::time::{Duration, Instant};
use tokio::runtime::{Builder, Runtime};

/// Default shutdown timeout for pending appender work (5 seconds)
///
/// Used when a dispatcher is dropped. Call [`Dispatcher::flush`] for a
/// different bound.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Receives failures of detached appender work: a context line and the error.
pub type ErrorSink = Arc<dyn Fn(&str, &LoggerError) + Send + Sync>;

/// Writes `[LOGGER ERROR] <context>: <error>` to stderr.
pub fn default_error_sink() -> ErrorSink {
    Arc::new(|context: &str, error: &LoggerError| eprintln!("[LOGGER ERROR] {}: {}", context, error))
}

pub struct Dispatcher {
    runtime: Option<Runtime>,
    in_flight: Arc<AtomicUsize>,
    sink: Arc<RwLock<ErrorSink>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        let sink = Arc::new(RwLock::new(default_error_sink()));
        let runtime = match Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("bit-log-dispatch")
            .enable_all()
            .build()
        {
            Ok(runtime) => Some(runtime),
            Err(e) => {
                let error = LoggerError::io_operation("starting dispatcher", e.to_string(), e);
                report(&sink, "appender output disabled", &error);
                None
            }
        };

        Self {
            runtime,
            in_flight: Arc::new(AtomicUsize::new(0)),
            sink,
        }
    }

    pub fn set_error_sink(&self, sink: ErrorSink) {
        *self.sink.write() = sink;
    }

    pub fn report(&self, context: &str, error: &LoggerError) {
        report(&self.sink, context, error);
    }

    /// Schedule `appender.handle(event)` and return immediately.
    ///
    /// Errors and panics of the handler go to the error sink and never reach
    /// the caller.
    pub fn dispatch(&self, name: &str, appender: Arc<dyn Appender>, event: Arc<LogEvent>) {
        let context = format!("error in appender.handle of {}", name);
        let Some(runtime) = &self.runtime else {
            self.report(&context, &LoggerError::DispatcherUnavailable);
            return;
        };

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let in_flight = Arc::clone(&self.in_flight);
        let sink = Arc::clone(&self.sink);

        runtime.spawn(async move {
            match catch_unwind(appender.handle(&event)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => report(&sink, &context, &e),
                Err(panic_info) => {
                    let error =
                        LoggerError::other(format!("appender panicked: {}", panic_message(&*panic_info)));
                    report(&sink, &context, &error);
                }
            }
            in_flight.fetch_sub(1, Ordering::SeqCst);
        });
    }

    /// Number of scheduled handler calls that have not finished yet
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Wait until every scheduled handler call has finished.
    ///
    /// Returns `false` if work was still pending when `timeout` elapsed.
    pub fn flush(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        while self.in_flight() > 0 {
            if start.elapsed() >= timeout {
                return false;
            }
            // Small sleep to avoid busy-waiting
            thread::sleep(Duration::from_millis(1));
        }
        true
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        if self.runtime.is_none() {
            return;
        }
        if !self.flush(DEFAULT_SHUTDOWN_TIMEOUT) {
            eprintln!(
                "[LOGGER WARNING] {} appender call(s) did not finish within timeout. \
                 Some logs may be lost.",
                self.in_flight()
            );
        }
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

fn report(sink: &RwLock<ErrorSink>, context: &str, error: &LoggerError) {
    let sink = Arc::clone(&sink.read());
    if std::panic::catch_unwind(AssertUnwindSafe(|| sink(context, error))).is_err() {
        eprintln!("[LOGGER ERROR] {}: {}", context, error);
    }
}

/// Poll `future`, turning a panic in any poll into an `Err`.
async fn catch_unwind<F: Future>(future: F) -> thread::Result<F::Output> {
    let mut future = pin!(future);
    std::future::poll_fn(move |cx| {
        match std::panic::catch_unwind(AssertUnwindSafe(|| future.as_mut().poll(cx))) {
            Ok(Poll::Pending) => Poll::Pending,
            Ok(Poll::Ready(output)) => Poll::Ready(Ok(output)),
            Err(panic_info) => Poll::Ready(Err(panic_info)),
        }
    })
    .await
}

pub(crate) fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Result;
    use crate::core::log_event::EventPayload;
    use crate::core::log_level::LogLevel;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct Recording {
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Appender for Recording {
        fn kind(&self) -> &str {
            "Recording"
        }

        fn level(&self) -> Option<LogLevel> {
            None
        }

        fn set_level(&mut self, _level: Option<LogLevel>) {}

        async fn handle(&self, event: &LogEvent) -> Result<()> {
            match &event.payload {
                EventPayload::Message(m) if m == "fail" => Err(LoggerError::other("refused")),
                EventPayload::Message(m) if m == "panic" => panic!("handler blew up"),
                EventPayload::Message(m) => {
                    self.seen.lock().push(m.clone());
                    Ok(())
                }
                EventPayload::Values(_) => Ok(()),
            }
        }
    }

    fn event(message: &str) -> Arc<LogEvent> {
        Arc::new(LogEvent::new(
            LogLevel::INFO,
            "test",
            EventPayload::Message(message.to_string()),
        ))
    }

    fn capture(dispatcher: &Dispatcher) -> Arc<Mutex<Vec<String>>> {
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink_reports = Arc::clone(&reports);
        dispatcher.set_error_sink(Arc::new(move |context: &str, error: &LoggerError| {
            sink_reports.lock().push(format!("{}: {}", context, error));
        }));
        reports
    }

    #[test]
    fn test_dispatch_preserves_order() {
        let dispatcher = Dispatcher::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let appender: Arc<dyn Appender> = Arc::new(Recording {
            seen: Arc::clone(&seen),
        });

        for i in 0..50 {
            dispatcher.dispatch("REC", Arc::clone(&appender), event(&i.to_string()));
        }
        assert!(dispatcher.flush(Duration::from_secs(5)));

        let expected: Vec<String> = (0..50).map(|i| i.to_string()).collect();
        assert_eq!(*seen.lock(), expected);
    }

    #[test]
    fn test_handler_error_goes_to_sink() {
        let dispatcher = Dispatcher::new();
        let reports = capture(&dispatcher);
        let appender: Arc<dyn Appender> = Arc::new(Recording {
            seen: Arc::new(Mutex::new(Vec::new())),
        });

        dispatcher.dispatch("REC", appender, event("fail"));
        assert!(dispatcher.flush(Duration::from_secs(5)));

        assert_eq!(
            *reports.lock(),
            vec!["error in appender.handle of REC: refused".to_string()]
        );
    }

    #[test]
    fn test_handler_panic_is_isolated() {
        let dispatcher = Dispatcher::new();
        let reports = capture(&dispatcher);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let appender: Arc<dyn Appender> = Arc::new(Recording {
            seen: Arc::clone(&seen),
        });

        dispatcher.dispatch("REC", Arc::clone(&appender), event("panic"));
        dispatcher.dispatch("REC", appender, event("after"));
        assert!(dispatcher.flush(Duration::from_secs(5)));

        let reports = reports.lock();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].contains("handler blew up"));
        assert_eq!(*seen.lock(), vec!["after".to_string()]);
    }

    #[test]
    fn test_flush_when_idle() {
        let dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.in_flight(), 0);
        assert!(dispatcher.flush(Duration::from_millis(1)));
    }
}
