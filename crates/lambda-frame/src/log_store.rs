//! Bounded per-invocation log buffer.
//!
//! A [`LogStore`] accumulates diagnostic entries while one pipeline run is in
//! flight and forwards them to an injected [`LogSink`] according to the
//! verbose-logging setting:
//!
//! - verbose ON: entries are emitted live at append time; flushing does not
//!   re-emit them
//! - verbose OFF: entries stay buffered silently and are printed only when
//!   the store is reset at pipeline completion
//!
//! Either way each entry reaches the sink exactly once. When the bounded
//! capacity is reached, one warning is emitted and further entries are
//! dropped until the store is reset.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

/// One buffered diagnostic entry: a message plus an optional structured payload.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Human-readable message.
    pub message: String,
    /// Structured payload attached to the message, if any.
    pub payload: Option<Value>,
}

/// Destination for log entries and capacity warnings.
///
/// The production implementation is [`TracingSink`]; tests inject recording
/// sinks to observe emission order and content.
pub trait LogSink: Send + Sync {
    /// Emit a debug-level entry.
    fn debug(&self, message: &str, payload: Option<&Value>);

    /// Emit a warning.
    fn warn(&self, message: &str);
}

/// [`LogSink`] backed by the `tracing` macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn debug(&self, message: &str, payload: Option<&Value>) {
        match payload {
            Some(payload) => tracing::debug!(payload = %payload, "{message}"),
            None => tracing::debug!("{message}"),
        }
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

struct StoreState {
    entries: Vec<LogEntry>,
    capacity_warned: bool,
}

/// Bounded in-memory log buffer owned by a single pipeline invocation.
pub struct LogStore {
    sink: Arc<dyn LogSink>,
    capacity: Option<usize>,
    verbose: bool,
    state: Mutex<StoreState>,
}

impl fmt::Debug for LogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogStore")
            .field("capacity", &self.capacity)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl LogStore {
    /// Create an empty store. `None` capacity means unbounded.
    pub fn new(sink: Arc<dyn LogSink>, capacity: Option<usize>, verbose: bool) -> Self {
        Self {
            sink,
            capacity,
            verbose,
            state: Mutex::new(StoreState {
                entries: Vec::new(),
                capacity_warned: false,
            }),
        }
    }

    /// Append a message-only entry.
    pub fn append(&self, message: impl Into<String>) {
        self.push(LogEntry {
            message: message.into(),
            payload: None,
        });
    }

    /// Append an entry with a structured payload.
    pub fn append_with(&self, message: impl Into<String>, payload: Value) {
        self.push(LogEntry {
            message: message.into(),
            payload: Some(payload),
        });
    }

    fn push(&self, entry: LogEntry) {
        let mut state = self.lock();

        if let Some(capacity) = self.capacity {
            if state.entries.len() >= capacity {
                if !state.capacity_warned {
                    self.sink.warn(&format!(
                        "maximum log store capacity exceeded ({capacity} logs)"
                    ));
                    state.capacity_warned = true;
                }
                return;
            }
        }

        if self.verbose {
            self.sink.debug(&entry.message, entry.payload.as_ref());
        }

        state.entries.push(entry);
    }

    /// Forward buffered entries to the sink, in insertion order.
    ///
    /// With verbose logging on, entries were already emitted live, so this is
    /// a no-op for printing (the no-duplicate-emission rule).
    pub fn flush(&self) {
        if self.verbose {
            return;
        }
        let state = self.lock();
        for entry in &state.entries {
            self.sink.debug(&entry.message, entry.payload.as_ref());
        }
    }

    /// Flush, then clear the buffer and reset capacity utilization.
    pub fn reset(&self) {
        self.flush();
        let mut state = self.lock();
        state.entries.clear();
        state.capacity_warned = false;
    }

    /// Diagnostic utilization string, `"<used>/<capacity>"`.
    pub fn capacity_report(&self) -> String {
        let used = self.lock().entries.len();
        match self.capacity {
            Some(capacity) => format!("{used}/{capacity}"),
            None => format!("{used}/inf"),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Recording sink capturing debug entries and warnings.
    #[derive(Default)]
    struct Recorder {
        debugs: Mutex<Vec<LogEntry>>,
        warns: Mutex<Vec<String>>,
    }

    impl LogSink for Recorder {
        fn debug(&self, message: &str, payload: Option<&Value>) {
            self.debugs.lock().unwrap().push(LogEntry {
                message: message.to_string(),
                payload: payload.cloned(),
            });
        }

        fn warn(&self, message: &str) {
            self.warns.lock().unwrap().push(message.to_string());
        }
    }

    impl Recorder {
        fn debug_count(&self) -> usize {
            self.debugs.lock().unwrap().len()
        }
    }

    #[test]
    fn append_prints_live_when_verbose() {
        let sink = Arc::new(Recorder::default());
        let store = LogStore::new(sink.clone(), None, true);

        store.append_with("foo baz bar", json!({"foo": 1, "baz": ["bar"]}));

        let debugs = sink.debugs.lock().unwrap();
        assert_eq!(debugs.len(), 1);
        assert_eq!(debugs[0].message, "foo baz bar");
        assert_eq!(debugs[0].payload, Some(json!({"foo": 1, "baz": ["bar"]})));
    }

    #[test]
    fn append_stays_silent_when_not_verbose() {
        let sink = Arc::new(Recorder::default());
        let store = LogStore::new(sink.clone(), None, false);

        store.append_with("foo baz bar", json!({"foo": 1}));

        assert_eq!(sink.debug_count(), 0);
    }

    #[test]
    fn overflow_warns_once_and_caps_storage() {
        let sink = Arc::new(Recorder::default());
        let store = LogStore::new(sink.clone(), Some(3), false);

        for _ in 0..5 {
            store.append("foo baz bar");
        }

        assert_eq!(store.capacity_report(), "3/3");
        let warns = sink.warns.lock().unwrap();
        assert_eq!(
            warns.as_slice(),
            ["maximum log store capacity exceeded (3 logs)"]
        );
    }

    #[test]
    fn reset_prints_buffer_when_not_verbose() {
        let sink = Arc::new(Recorder::default());
        let store = LogStore::new(sink.clone(), Some(3), false);

        store.append_with("foo baz bar", json!({"foo": 1, "baz": ["bar"]}));
        store.append("foobazbar");
        store.reset();

        let debugs = sink.debugs.lock().unwrap();
        assert_eq!(debugs.len(), 2);
        assert_eq!(debugs[0].message, "foo baz bar");
        assert_eq!(debugs[0].payload, Some(json!({"foo": 1, "baz": ["bar"]})));
        assert_eq!(debugs[1].message, "foobazbar");
        assert_eq!(debugs[1].payload, None);
    }

    #[test]
    fn reset_does_not_reprint_when_verbose() {
        let sink = Arc::new(Recorder::default());
        let store = LogStore::new(sink.clone(), Some(3), true);

        store.append("foo baz bar");
        store.append("foobazbar");
        store.reset();

        // Live emission only; exactly one sink call per entry.
        assert_eq!(sink.debug_count(), 2);
    }

    #[test]
    fn reset_clears_utilization() {
        let sink = Arc::new(Recorder::default());
        let store = LogStore::new(sink, Some(3), true);

        store.append("a");
        store.append("b");
        assert_eq!(store.capacity_report(), "2/3");

        store.reset();
        assert_eq!(store.capacity_report(), "0/3");
    }

    #[test]
    fn capacity_invariant_holds_for_any_append_count() {
        for n in 0..6usize {
            let sink = Arc::new(Recorder::default());
            let store = LogStore::new(sink.clone(), Some(2), false);
            for i in 0..n {
                store.append(format!("entry {i}"));
            }
            assert_eq!(store.capacity_report(), format!("{}/2", n.min(2)));
            let warns = sink.warns.lock().unwrap().len();
            assert_eq!(warns, usize::from(n > 2));
        }
    }

    #[test]
    fn unbounded_store_reports_inf() {
        let sink = Arc::new(Recorder::default());
        let store = LogStore::new(sink, None, false);
        store.append("a");
        assert_eq!(store.capacity_report(), "1/inf");
    }
}
