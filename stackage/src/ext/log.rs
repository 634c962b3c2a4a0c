//! Leveled, taggable event records and the sinks that receive them.
//!
//! Every stack and condition carries a [`LogConfig`]: a sink plus a [`LogLevels`] mask
//! selecting which categories of events the instance emits. Constructors copy the
//! process-wide defaults managed by [`init`], [`set_default_sink`] and
//! [`set_default_log_levels`]; named sinks can be registered and resolved later with
//! [`register_sink`] / [`resolve_sink`].
//!
//! The default sink is [`FacadeSink`], which forwards to the [`log`] facade under the
//! `stackage` target. Messages are only formatted when the instance's mask selects the
//! event category.
use std::{collections::BTreeMap, sync::Arc};

use bitflags::bitflags;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::FromRepr;
use uuid::Uuid;

/// Severity attached to every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FromRepr)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u32)]
pub enum Severity {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    /// Unrecoverable internal invariant violation. [`FacadeSink`] terminates the process.
    Fatal = 5,
}

impl Severity {
    pub fn to_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

bitflags! {
    /// Categories of events an instance may emit.
    #[derive(Default, Clone, Copy, PartialEq, Eq, Hash, Debug)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct LogLevels: u16 {
        /// Entry into public operations (push, pop, insert, ...).
        const CALLS = 1 << 0;

        /// Construction, configuration changes and release.
        const STATE = 1 << 1;

        /// Policy decisions: refusals by push policies, nesting or capacity guards.
        const POLICY = 1 << 2;

        /// Errors recorded on an instance.
        const ERRORS = 1 << 3;

        /// Acquisition of the opt-in mutex.
        const LOCKS = 1 << 4;

        /// Traversal steps.
        const TRAVERSAL = 1 << 5;

        /// Marshal and unmarshal.
        const TRANSCODE = 1 << 6;
    }
}

/// A single event record.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub id: Uuid,
    pub severity: Severity,
    /// Short operation tag, e.g. `"push"`.
    pub tag: String,
    /// Identifier of the emitting instance (may be empty).
    pub source: String,
    pub message: String,
    pub timepoint: chrono::NaiveDateTime,
    pub module: String,
    pub thread_name: Option<String>,
    /// Optional structured payload.
    pub data: BTreeMap<String, String>,
}

impl LogEvent {
    pub fn new(
        severity: Severity,
        tag: impl Into<String>,
        source: impl Into<String>,
        message: impl Into<String>,
        module: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity,
            tag: tag.into(),
            source: source.into(),
            message: message.into(),
            timepoint: chrono::Local::now().naive_local(),
            module: module.into(),
            thread_name: std::thread::current().name().map(|s| s.to_string()),
            data: BTreeMap::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.data.insert(key.into(), value.to_string());
        self
    }
}

/// Receiver of event records.
pub trait LogSink: Send + Sync {
    fn emit(&self, event: LogEvent);
}

/// Forwards events to the [`log`] facade (target `stackage`).
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeSink;

impl FacadeSink {
    pub const TARGET: &'static str = "stackage";
}

impl LogSink for FacadeSink {
    fn emit(&self, event: LogEvent) {
        let level = match event.severity {
            Severity::Trace => log::Level::Trace,
            Severity::Debug => log::Level::Debug,
            Severity::Info => log::Level::Info,
            Severity::Warn => log::Level::Warn,
            Severity::Error | Severity::Fatal => log::Level::Error,
        };

        if event.data.is_empty() {
            log::log!(target: Self::TARGET, level, "[{}:{}] {}", event.tag, event.source, event.message);
        } else {
            log::log!(target: Self::TARGET, level, "[{}:{}] {} {:?}", event.tag, event.source, event.message, event.data);
        }

        if event.severity == Severity::Fatal {
            log::logger().flush();
            std::process::exit(70);
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn emit(&self, _event: LogEvent) {}
}

/// Hands every event to a closure.
pub struct CallbackSink(pub Box<dyn Fn(LogEvent) + Send + Sync>);

impl CallbackSink {
    pub fn new(callback: impl Fn(LogEvent) + Send + Sync + 'static) -> Self {
        Self(Box::new(callback))
    }
}

impl LogSink for CallbackSink {
    fn emit(&self, event: LogEvent) {
        (self.0)(event)
    }
}

/// Buffers events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<LogEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every buffered event.
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().clone()
    }

    /// Drain the buffer.
    pub fn take(&self) -> Vec<LogEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Buffered events carrying the given tag.
    pub fn tagged(&self, tag: &str) -> Vec<LogEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.tag == tag)
            .cloned()
            .collect()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, event: LogEvent) {
        self.events.lock().push(event);
    }
}

/// Sink and category mask owned by one stack or condition.
#[derive(Clone)]
pub struct LogConfig {
    sink: Arc<dyn LogSink>,
    levels: LogLevels,
}

impl LogConfig {
    pub fn new(sink: Arc<dyn LogSink>, levels: LogLevels) -> Self {
        Self { sink, levels }
    }

    /// Snapshot of the process-wide defaults.
    pub fn from_defaults() -> Self {
        let defaults = DEFAULTS.read();
        Self {
            sink: defaults.sink.clone(),
            levels: defaults.levels,
        }
    }

    pub fn sink(&self) -> Arc<dyn LogSink> {
        self.sink.clone()
    }

    pub fn levels(&self) -> LogLevels {
        self.levels
    }

    pub fn set_sink(&mut self, sink: Arc<dyn LogSink>) {
        self.sink = sink;
    }

    pub fn set_levels(&mut self, levels: LogLevels) {
        self.levels = levels;
    }

    #[inline]
    pub fn enabled(&self, category: LogLevels) -> bool {
        self.levels.intersects(category)
    }

    /// Emit an event when `category` is selected; `message` is only built in that case.
    #[inline]
    pub fn emit(
        &self,
        category: LogLevels,
        severity: Severity,
        tag: &str,
        source: &str,
        module: &str,
        message: impl FnOnce() -> String,
    ) {
        if self.enabled(category) {
            self.sink
                .emit(LogEvent::new(severity, tag, source, message(), module));
        }
    }

    /// Like [`LogConfig::emit`] with a structured payload.
    pub fn emit_with(
        &self,
        category: LogLevels,
        severity: Severity,
        tag: &str,
        source: &str,
        module: &str,
        message: impl FnOnce() -> String,
        data: impl FnOnce() -> Vec<(&'static str, String)>,
    ) {
        if self.enabled(category) {
            let mut event = LogEvent::new(severity, tag, source, message(), module);
            for (key, value) in data() {
                event = event.with_data(key, value);
            }
            self.sink.emit(event);
        }
    }
}

impl std::fmt::Debug for LogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogConfig")
            .field("levels", &self.levels)
            .finish_non_exhaustive()
    }
}

struct LogDefaults {
    sink: Arc<dyn LogSink>,
    levels: LogLevels,
    named: BTreeMap<String, Arc<dyn LogSink>>,
}

static DEFAULTS: Lazy<RwLock<LogDefaults>> = Lazy::new(|| {
    RwLock::new(LogDefaults {
        sink: Arc::new(FacadeSink),
        levels: LogLevels::ERRORS | LogLevels::POLICY,
        named: BTreeMap::new(),
    })
});

/// Explicitly initialize the process-wide defaults picked up by new instances.
pub fn init(sink: Arc<dyn LogSink>, levels: LogLevels) {
    let mut defaults = DEFAULTS.write();
    defaults.sink = sink;
    defaults.levels = levels;
}

pub fn set_default_sink(sink: Arc<dyn LogSink>) {
    DEFAULTS.write().sink = sink;
}

pub fn default_sink() -> Arc<dyn LogSink> {
    DEFAULTS.read().sink.clone()
}

pub fn set_default_log_levels(levels: LogLevels) {
    DEFAULTS.write().levels = levels;
}

pub fn default_log_levels() -> LogLevels {
    DEFAULTS.read().levels
}

/// Register a sink under `name`, replacing any previous one.
pub fn register_sink(name: impl Into<String>, sink: Arc<dyn LogSink>) {
    DEFAULTS.write().named.insert(name.into(), sink);
}

/// Resolve a sink registered with [`register_sink`].
pub fn resolve_sink(name: &str) -> Option<Arc<dyn LogSink>> {
    DEFAULTS.read().named.get(name).cloned()
}

/// Emit an event through a [`LogConfig`].
#[macro_export]
macro_rules! stk_log {
    (
        $log:expr,
        $category:expr,
        $severity:expr,
        $tag:expr,
        $source:expr,
        $( $arg:tt )*
    ) => {
        ($log).emit(
            $category,
            $severity,
            $tag,
            $source,
            module_path!(),
            || format!($($arg)*),
        )
    };
}

#[macro_export]
macro_rules! stk_error {
    ($log:expr, $category:expr, $tag:expr, $source:expr, $( $arg:tt )*) => {
        $crate::stk_log!($log, $category, $crate::ext::log::Severity::Error, $tag, $source, $( $arg )*)
    };
}

/// Emit through the [`LogConfig`] of a stack or condition, if it selects `$category`.
macro_rules! stk_event {
    ($owner:expr, $category:expr, $severity:ident, $tag:expr, $( $arg:tt )*) => {
        if let Some((log, source)) = $owner.logger($category) {
            $crate::stk_log!(
                log,
                $category,
                $crate::ext::log::Severity::$severity,
                $tag,
                &source,
                $( $arg )*
            );
        }
    };
}
pub(crate) use stk_event;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_categories_skip_message_formatting() {
        let sink = Arc::new(MemorySink::new());
        let log = LogConfig::new(sink.clone(), LogLevels::ERRORS);

        let mut formatted = false;
        log.emit(LogLevels::CALLS, Severity::Debug, "push", "", "", || {
            formatted = true;
            String::from("never")
        });
        assert!(!formatted);
        assert!(sink.is_empty());

        crate::stk_error!(log, LogLevels::ERRORS, "push", "s1", "refused {}", 3);
        let events = sink.take();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].severity, Severity::Error);
        assert_eq!(events[0].tag, "push");
        assert_eq!(events[0].source, "s1");
        assert_eq!(events[0].message, "refused 3");
    }

    #[test]
    fn structured_payload_is_attached() {
        let sink = Arc::new(MemorySink::new());
        let log = LogConfig::new(sink.clone(), LogLevels::all());
        log.emit_with(
            LogLevels::CALLS,
            Severity::Info,
            "pop",
            "",
            module_path!(),
            || "popped".into(),
            || vec![("len", 2.to_string())],
        );
        let event = &sink.events()[0];
        assert_eq!(event.data.get("len").map(String::as_str), Some("2"));
        assert!(event.module.ends_with("tests"));
    }

    #[test]
    fn severity_from_repr() {
        assert_eq!(Severity::from_repr(3), Some(Severity::Warn));
        assert_eq!(Severity::from_repr(9), None);
        assert!(Severity::Fatal > Severity::Error);
    }

    #[test]
    fn named_sinks_resolve() {
        let sink: Arc<dyn LogSink> = Arc::new(NullSink);
        register_sink("log-tests-null", sink.clone());
        let resolved = resolve_sink("log-tests-null").expect("sink registered");
        assert!(Arc::ptr_eq(&resolved, &sink));
        assert!(resolve_sink("log-tests-missing").is_none());
    }
}
