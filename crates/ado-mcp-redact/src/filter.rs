//! Structural redaction of JSON-like data and URL query strings.

use serde_json::{Map, Value};

use crate::classify::{is_sensitive_json, is_sensitive_key};

/// Placeholder used for general payloads.
pub const FILTERED: &str = "[FILTERED]";

/// Placeholder used for HTTP header maps.
pub const REDACTED: &str = "[REDACTED]";

/// Options controlling a redaction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactOptions {
    /// Text substituted for every sensitive value.
    pub placeholder: String,
    /// Walk nested mappings and sequences and apply value-shape detection.
    ///
    /// When disabled only top-level key names are considered.
    pub deep_scan: bool,
}

impl Default for RedactOptions {
    fn default() -> Self {
        Self {
            placeholder: FILTERED.to_string(),
            deep_scan: true,
        }
    }
}

impl RedactOptions {
    /// Options with a custom placeholder and deep scanning enabled.
    pub fn with_placeholder(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            ..Self::default()
        }
    }

    /// Sets whether nested structures and value shapes are inspected.
    #[must_use]
    pub const fn deep_scan(mut self, deep_scan: bool) -> Self {
        self.deep_scan = deep_scan;
        self
    }
}

/// Redacts sensitive entries from a mapping-rooted structure.
///
/// Anything that is not a JSON object is returned unchanged. Keys are never
/// dropped and their order is kept.
///
/// ```
/// use ado_mcp_redact::redact;
/// use serde_json::json;
///
/// let out = redact(&json!({"password": null, "user": "jo"}), "[FILTERED]", true);
/// assert_eq!(out, json!({"password": "[FILTERED]", "user": "jo"}));
/// ```
#[must_use]
pub fn redact(data: &Value, placeholder: &str, deep_scan: bool) -> Value {
    match data {
        Value::Object(map) => Value::Object(redact_map(map, placeholder, deep_scan)),
        other => other.clone(),
    }
}

/// [`redact`] driven by a [`RedactOptions`].
#[must_use]
pub fn redact_with(data: &Value, options: &RedactOptions) -> Value {
    redact(data, &options.placeholder, options.deep_scan)
}

/// Redacts a mapping, returning a new mapping with the same keys.
#[must_use]
pub fn redact_map(
    map: &Map<String, Value>,
    placeholder: &str,
    deep_scan: bool,
) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| {
            let filtered = if is_sensitive_key(key) {
                Value::String(placeholder.to_string())
            } else if deep_scan {
                redact_nested(value, placeholder)
            } else {
                value.clone()
            };
            (key.clone(), filtered)
        })
        .collect()
}

fn redact_nested(value: &Value, placeholder: &str) -> Value {
    match value {
        Value::Object(map) => Value::Object(redact_map(map, placeholder, true)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| match item {
                    Value::Object(map) => Value::Object(redact_map(map, placeholder, true)),
                    other => other.clone(),
                })
                .collect(),
        ),
        Value::String(_) if is_sensitive_json(value) => Value::String(placeholder.to_string()),
        other => other.clone(),
    }
}

/// Masks the values of sensitive query parameters in a URL.
///
/// Parameters without `=` are kept verbatim; they have no key to classify.
///
/// ```
/// use ado_mcp_redact::redact_url_query;
///
/// assert_eq!(
///     redact_url_query("https://x/y?api_key=secret123&project=test", "[FILTERED]"),
///     "https://x/y?api_key=[FILTERED]&project=test"
/// );
/// ```
#[must_use]
pub fn redact_url_query(url: &str, placeholder: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let params: Vec<String> = query
        .split('&')
        .map(|param| match param.split_once('=') {
            Some((key, _)) if is_sensitive_key(key) => format!("{key}={placeholder}"),
            _ => param.to_string(),
        })
        .collect();

    format!("{base}?{}", params.join("&"))
}

/// Builds the sanitized snapshot of an outbound HTTP request.
///
/// The snapshot keeps the order `method`, `url`, `params`, `headers`,
/// `body`. Optional sections are omitted when absent or empty. Headers are
/// always masked with [`REDACTED`]; everything else uses [`FILTERED`].
#[must_use]
pub fn sanitize_request(
    method: &str,
    url: &str,
    params: Option<&Map<String, Value>>,
    headers: Option<&Map<String, Value>>,
    body: Option<&Map<String, Value>>,
) -> Map<String, Value> {
    let mut snapshot = Map::new();
    snapshot.insert("method".to_string(), Value::String(method.to_string()));
    snapshot.insert(
        "url".to_string(),
        Value::String(redact_url_query(url, FILTERED)),
    );

    if let Some(params) = params.filter(|p| !p.is_empty()) {
        snapshot.insert(
            "params".to_string(),
            Value::Object(redact_map(params, FILTERED, true)),
        );
    }

    if let Some(headers) = headers.filter(|h| !h.is_empty()) {
        snapshot.insert(
            "headers".to_string(),
            Value::Object(redact_map(headers, REDACTED, true)),
        );
    }

    if let Some(body) = body.filter(|b| !b.is_empty()) {
        snapshot.insert(
            "body".to_string(),
            Value::Object(redact_map(body, FILTERED, true)),
        );
    }

    snapshot
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn test_redact_by_key() {
        let data = json!({
            "username": "john.doe",
            "password": "secret123",
            "api_token": "abc123def456",
            "project_name": "MyProject",
            "secret_key": "very-secret-value",
        });

        let filtered = redact(&data, FILTERED, true);

        assert_eq!(filtered["username"], "john.doe");
        assert_eq!(filtered["password"], FILTERED);
        assert_eq!(filtered["api_token"], FILTERED);
        assert_eq!(filtered["project_name"], "MyProject");
        assert_eq!(filtered["secret_key"], FILTERED);
    }

    #[test]
    fn test_redact_nested() {
        let data = json!({
            "config": {
                "username": "john.doe",
                "password": "secret123",
                "nested": {"api_key": "abc123"},
            },
            "metadata": {"version": "1.0", "secret": "hidden"},
        });

        let filtered = redact(&data, FILTERED, true);

        assert_eq!(filtered["config"]["username"], "john.doe");
        assert_eq!(filtered["config"]["password"], FILTERED);
        assert_eq!(filtered["config"]["nested"]["api_key"], FILTERED);
        assert_eq!(filtered["metadata"]["version"], "1.0");
        assert_eq!(filtered["metadata"]["secret"], FILTERED);
    }

    #[test]
    fn test_redact_lists() {
        let data = json!({
            "items": [
                {"name": "item1", "secret": "secret1"},
                {"name": "item2", "api_key": "key123"},
                "plain",
                42,
            ],
        });

        let filtered = redact(&data, FILTERED, true);

        assert_eq!(filtered["items"][0]["name"], "item1");
        assert_eq!(filtered["items"][0]["secret"], FILTERED);
        assert_eq!(filtered["items"][1]["name"], "item2");
        assert_eq!(filtered["items"][1]["api_key"], FILTERED);
        assert_eq!(filtered["items"][2], "plain");
        assert_eq!(filtered["items"][3], 42);
    }

    #[test]
    fn test_bare_secret_strings_inside_lists_pass_through() {
        let data = json!({"values": ["12345678-1234-1234-1234-123456789012"]});
        let filtered = redact(&data, FILTERED, true);
        assert_eq!(filtered, data);
    }

    #[test]
    fn test_value_signature_under_innocuous_key() {
        let data = json!({"value": "abcdefghijklmnopqrstuvwxyz0123456789"});
        let filtered = redact(&data, FILTERED, true);
        assert_eq!(filtered["value"], FILTERED);
    }

    #[test]
    fn test_null_under_sensitive_key_is_replaced() {
        let data = json!({"key1": null, "password": null, "key3": "value"});
        let filtered = redact(&data, FILTERED, true);

        assert!(filtered["key1"].is_null());
        assert_eq!(filtered["password"], FILTERED);
        assert_eq!(filtered["key3"], "value");
    }

    #[test]
    fn test_non_string_under_sensitive_key_is_replaced() {
        let data = json!({"token": {"inner": 1}, "auth": [1, 2], "pat": 7});
        let filtered = redact(&data, FILTERED, true);
        assert_eq!(filtered, json!({"token": FILTERED, "auth": FILTERED, "pat": FILTERED}));
    }

    #[test]
    fn test_custom_placeholder() {
        let filtered = redact(&json!({"password": "x", "username": "john"}), "***HIDDEN***", true);
        assert_eq!(filtered, json!({"password": "***HIDDEN***", "username": "john"}));
    }

    #[test]
    fn test_deep_scan_disabled() {
        let data = json!({
            "password": "secret1",
            "nested": {"api_key": "secret2"},
            "value": "abcdefghijklmnopqrstuvwxyz0123456789",
        });

        let filtered = redact_with(&data, &RedactOptions::default().deep_scan(false));

        assert_eq!(filtered["password"], FILTERED);
        assert_eq!(filtered["nested"]["api_key"], "secret2");
        assert_eq!(filtered["value"], "abcdefghijklmnopqrstuvwxyz0123456789");
    }

    #[test]
    fn test_non_mapping_passthrough() {
        assert_eq!(redact(&json!("not a dict"), FILTERED, true), json!("not a dict"));
        assert_eq!(redact(&json!([1, 2]), FILTERED, true), json!([1, 2]));
        assert_eq!(redact(&Value::Null, FILTERED, true), Value::Null);
        assert_eq!(redact(&json!({}), FILTERED, true), json!({}));
    }

    #[test]
    fn test_key_order_is_preserved() {
        let data = json!({"z": 1, "password": "p", "a": 2});
        let filtered = redact(&data, FILTERED, true);
        let keys: Vec<&str> = filtered.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "password", "a"]);
    }

    #[test]
    fn test_url_query() {
        let url = "https://api.example.com/data?username=john&api_key=secret123&project=test";
        assert_eq!(
            redact_url_query(url, FILTERED),
            "https://api.example.com/data?username=john&api_key=[FILTERED]&project=test"
        );

        let simple = "https://api.example.com/data";
        assert_eq!(redact_url_query(simple, FILTERED), simple);

        let safe = "https://api.example.com/data?username=john&project=test";
        assert_eq!(redact_url_query(safe, FILTERED), safe);
    }

    #[test]
    fn test_url_query_edge_cases() {
        assert_eq!(
            redact_url_query("https://example.com?api_key=", FILTERED),
            "https://example.com?api_key=[FILTERED]"
        );
        assert_eq!(
            redact_url_query("https://example.com?standalone_param", FILTERED),
            "https://example.com?standalone_param"
        );
        assert_eq!(
            redact_url_query("https://example.com?token", FILTERED),
            "https://example.com?token"
        );
        assert_eq!(
            redact_url_query("https://example.com?token=a=b&x=1", FILTERED),
            "https://example.com?token=[FILTERED]&x=1"
        );
        assert_eq!(
            redact_url_query("https://example.com?a=1?token=2", FILTERED),
            "https://example.com?a=1?token=2"
        );
    }

    #[test]
    fn test_sanitize_request() {
        let params = json!({"project": "test", "api_key": "secret123"});
        let headers = json!({"Authorization": "Bearer token123", "Content-Type": "application/json"});
        let body = json!({"username": "john", "password": "secret"});

        let sanitized = sanitize_request(
            "POST",
            "https://api.example.com/data?token=abc123",
            params.as_object(),
            headers.as_object(),
            body.as_object(),
        );

        assert_eq!(sanitized["method"], "POST");
        assert_eq!(sanitized["url"], "https://api.example.com/data?token=[FILTERED]");
        assert_eq!(sanitized["params"]["project"], "test");
        assert_eq!(sanitized["params"]["api_key"], FILTERED);
        assert_eq!(sanitized["headers"]["Authorization"], REDACTED);
        assert_eq!(sanitized["headers"]["Content-Type"], "application/json");
        assert_eq!(sanitized["body"]["username"], "john");
        assert_eq!(sanitized["body"]["password"], FILTERED);
    }

    #[test]
    fn test_sanitize_request_omits_absent_sections() {
        let empty = Map::new();
        let sanitized = sanitize_request("GET", "https://x", None, Some(&empty), None);
        let keys: Vec<&str> = sanitized.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["method", "url"]);
    }
}
