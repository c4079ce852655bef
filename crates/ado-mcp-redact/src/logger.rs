//! Logging wrapper that sanitizes everything it emits.
//!
//! [`SecureLogger`] renders single-line messages for outbound requests,
//! inbound responses, errors, informational events and security events.
//! Structured payloads go through [`redact_map`](crate::filter::redact_map)
//! before rendering, and every line can carry a `[correlation-id] ` prefix.
//!
//! The logger writes to a [`LogSink`]. The default sink forwards to the
//! [`log`] facade using the logger's channel name as the record target.
//!
//! ```
//! use std::sync::Arc;
//! use ado_mcp_redact::{MemorySink, SecureLogger};
//!
//! let sink = Arc::new(MemorySink::new());
//! let logger = SecureLogger::with_sink("ado_mcp::client", Arc::clone(&sink));
//! logger.log_inbound_response(200, 512, Some("abcd1234"));
//!
//! assert_eq!(sink.messages(), vec!["[abcd1234] HTTP Response: status=200, size=512bytes"]);
//! ```

use std::fmt::{self, Display, Write};
use std::sync::{Arc, Mutex, PoisonError};

use log::Level;
use serde_json::{Map, Value};

use crate::filter::{FILTERED, redact_map, sanitize_request};

/// Ordered key/value context attached to a log line.
pub type LogContext = Map<String, Value>;

/// Converts a JSON object into a [`LogContext`]; any other value yields an
/// empty context.
#[must_use]
pub fn into_context(value: Value) -> LogContext {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Destination for rendered log lines.
pub trait LogSink: Send + Sync {
    /// Emits one message on a named channel.
    fn emit(&self, level: Level, channel: &str, message: &str);
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn emit(&self, level: Level, channel: &str, message: &str) {
        (**self).emit(level, channel, message);
    }
}

/// Sink that forwards to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCrateSink;

impl LogSink for LogCrateSink {
    fn emit(&self, level: Level, channel: &str, message: &str) {
        log::log!(target: channel, level, "{message}");
    }
}

/// A line captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRecord {
    pub level: Level,
    pub channel: String,
    pub message: String,
}

/// Sink that keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<CapturedRecord>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of captured records, oldest first.
    pub fn records(&self) -> Vec<CapturedRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Captured messages without level or channel.
    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.message).collect()
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl LogSink for MemorySink {
    fn emit(&self, level: Level, channel: &str, message: &str) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(CapturedRecord {
                level,
                channel: channel.to_string(),
                message: message.to_string(),
            });
    }
}

/// Severity of a security event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Log level a security event of this severity is emitted at.
    #[must_use]
    pub const fn level(self) -> Level {
        match self {
            Self::Info => Level::Info,
            Self::Warning => Level::Warn,
            Self::Error => Level::Error,
        }
    }
}

impl From<&str> for Severity {
    /// `ERROR` and `WARNING` are recognised case-insensitively; anything else
    /// is informational.
    fn from(label: &str) -> Self {
        if label.eq_ignore_ascii_case("ERROR") {
            Self::Error
        } else if label.eq_ignore_ascii_case("WARNING") {
            Self::Warning
        } else {
            Self::Info
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Logger that redacts payloads before they reach its sink.
#[derive(Debug, Clone)]
pub struct SecureLogger<S = LogCrateSink> {
    channel: String,
    sink: S,
}

/// Secure logger on the default `log` sink for the named channel.
#[must_use]
pub fn get_secure_logger(name: &str) -> SecureLogger {
    SecureLogger::new(name)
}

impl SecureLogger<LogCrateSink> {
    pub fn new(channel: impl Into<String>) -> Self {
        Self::with_sink(channel, LogCrateSink)
    }
}

/// Logger over a type-erased sink, for components that accept any sink.
pub type SharedLogger = SecureLogger<Arc<dyn LogSink>>;

impl SharedLogger {
    /// Shared logger on the default `log` sink.
    pub fn shared(channel: impl Into<String>) -> Self {
        Self::with_sink(channel, Arc::new(LogCrateSink))
    }
}

impl<S: LogSink> SecureLogger<S> {
    pub fn with_sink(channel: impl Into<String>, sink: S) -> Self {
        Self {
            channel: channel.into(),
            sink,
        }
    }

    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Logs an outbound HTTP request at debug level.
    ///
    /// The URL query, params and body are masked with `[FILTERED]`; headers
    /// are always masked with `[REDACTED]`.
    pub fn log_outbound_request(
        &self,
        method: &str,
        url: &str,
        params: Option<&LogContext>,
        headers: Option<&LogContext>,
        body: Option<&LogContext>,
        correlation_id: Option<&str>,
    ) {
        let snapshot = sanitize_request(method, url, params, headers, body);

        let mut parts = Vec::with_capacity(snapshot.len());
        for (section, value) in &snapshot {
            let rendered = match value {
                Value::Object(map) => format!("({})", render_pairs(map)),
                other => render_value(other),
            };
            parts.push(format!("{section}={rendered}"));
        }

        let message = format!("HTTP Request: {}", parts.join(", "));
        self.emit(Level::Debug, correlation_id, &message);
    }

    /// Logs an inbound HTTP response at debug level.
    pub fn log_inbound_response(
        &self,
        status_code: u16,
        size_bytes: usize,
        correlation_id: Option<&str>,
    ) {
        let message = format!("HTTP Response: status={status_code}, size={size_bytes}bytes");
        self.emit(Level::Debug, correlation_id, &message);
    }

    /// Logs an error with its kind and sanitized context at error level.
    ///
    /// The kind is the unqualified type name of `error`.
    pub fn log_error<E: Display + ?Sized>(
        &self,
        message: &str,
        error: &E,
        correlation_id: Option<&str>,
        context: &LogContext,
    ) {
        let mut line = format!("Error: {message} - {}: {error}", short_type_name::<E>());
        append_context(&mut line, context);
        self.emit(Level::Error, correlation_id, &line);
    }

    /// Logs a message with sanitized context at info level.
    pub fn log_info(&self, message: &str, correlation_id: Option<&str>, context: &LogContext) {
        let mut line = message.to_string();
        append_context(&mut line, context);
        self.emit(Level::Info, correlation_id, &line);
    }

    /// Logs a security-relevant event, leveled by `severity`.
    pub fn log_security_event(
        &self,
        event_type: &str,
        description: &str,
        severity: impl Into<Severity>,
        correlation_id: Option<&str>,
        context: &LogContext,
    ) {
        let mut line = format!("SECURITY_EVENT: {event_type} | {description}");
        append_context(&mut line, context);
        self.emit(severity.into().level(), correlation_id, &line);
    }

    fn emit(&self, level: Level, correlation_id: Option<&str>, message: &str) {
        match correlation_id.filter(|id| !id.is_empty()) {
            Some(id) => self.sink.emit(level, &self.channel, &format!("[{id}] {message}")),
            None => self.sink.emit(level, &self.channel, message),
        }
    }
}

fn append_context(line: &mut String, context: &LogContext) {
    let filtered = redact_map(context, FILTERED, true);
    if !filtered.is_empty() {
        let _ = write!(line, " | Context: {{{}}}", render_pairs(&filtered));
    }
}

fn render_pairs(map: &Map<String, Value>) -> String {
    map.iter()
        .map(|(k, v)| format!("{k}={}", render_value(v)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders any value on one line: strings raw, mappings as `{k=v}`,
/// sequences as `[a, b]`.
#[must_use]
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => format!(
            "[{}]",
            items.iter().map(render_value).collect::<Vec<_>>().join(", ")
        ),
        Value::Object(map) => format!("{{{}}}", render_pairs(map)),
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let full = full.strip_prefix("dyn ").unwrap_or(full);
    let base = full.split(['<', ' ']).next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
