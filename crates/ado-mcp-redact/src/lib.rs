//! # ado-mcp-redact
//!
//! Best-effort masking of secrets before data reaches a log line or a
//! client-facing payload.
//!
//! - [`classify`]: decides whether a key name or a value denotes secret material
//! - [`filter`]: walks nested JSON structures and URL query strings, replacing
//!   sensitive values with a placeholder
//! - [`logger`]: [`SecureLogger`], which sanitizes request, response, error and
//!   security-event messages before handing them to a [`LogSink`]
//! - [`correlation`]: short ids that tie the log lines of one operation together
//!
//! Nothing here holds mutable shared state; every call is independent and
//! safe to make from any thread.
//!
//! ## Example
//!
//! ```
//! use ado_mcp_redact::{redact, FILTERED};
//! use serde_json::json;
//!
//! let payload = json!({
//!     "project": "infra",
//!     "auth": {"scheme": "Basic", "client_secret": "hunter2"},
//! });
//!
//! let clean = redact(&payload, FILTERED, true);
//! assert_eq!(clean["auth"], FILTERED);
//! assert_eq!(clean["project"], "infra");
//! ```

pub mod classify;
pub mod correlation;
pub mod filter;
pub mod logger;

pub use classify::{is_sensitive_json, is_sensitive_key, is_sensitive_value};
pub use correlation::create_correlation_id;
pub use filter::{
    FILTERED, REDACTED, RedactOptions, redact, redact_map, redact_url_query, redact_with,
    sanitize_request,
};
pub use logger::{
    CapturedRecord, LogContext, LogCrateSink, LogSink, MemorySink, SecureLogger, Severity,
    SharedLogger, get_secure_logger, into_context, render_value,
};
