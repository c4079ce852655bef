//! Azure DevOps REST client over `reqwest`.
//!
//! Every request carries `api-version` and HTTP Basic credentials built from
//! the personal access token (empty user name, token as password). Transient
//! failures are retried with exponential backoff, honouring `Retry-After`
//! when the service throttles.
//!
//! Each request is logged through a [`SecureLogger`](ado_mcp_redact::SecureLogger)
//! under a fresh correlation id: the outbound request with its headers
//! redacted, the inbound status and size, and any failure. Rejected
//! credentials are also reported as an `AUTHENTICATION_FAILURE` security
//! event.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::debug;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest_middleware::ClientWithMiddleware;
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use reqwest_retry_after::RetryAfterMiddleware;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use ado_mcp_common::{ApiList, Config, Project, ServiceConnection, VariableGroup};
use ado_mcp_redact::{LogContext, SharedLogger, Severity, create_correlation_id, into_context};

use crate::DevOpsApi;
use crate::error::{ClientError, Result};

/// Log channel used by the client.
pub const LOG_CHANNEL: &str = "ado_mcp::client";

const JSON_CONTENT: &str = "application/json";

/// Client for the Azure DevOps REST API.
///
/// Cheap to clone; clones share the connection pool and logger.
#[derive(Clone)]
pub struct AzureDevOpsClient {
    client: ClientWithMiddleware,
    auth_header: Arc<SecretString>,
    config: Arc<Config>,
    logger: Arc<SharedLogger>,
}

// Custom Debug implementation to avoid exposing the credentials
impl fmt::Debug for AzureDevOpsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureDevOpsClient")
            .field("auth_header", &"[REDACTED]")
            .field("base_url", &self.config.base_url())
            .field("api_version", &self.config.api_version)
            .finish_non_exhaustive()
    }
}

impl AzureDevOpsClient {
    /// Creates a client that logs through the `log` facade.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_logger(config, SharedLogger::shared(LOG_CHANNEL))
    }

    /// Creates a client that logs through the given logger.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn with_logger(config: Config, logger: SharedLogger) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        let base_url = config.base_url();
        Url::parse(&base_url).map_err(|e| {
            ClientError::Configuration(format!("Invalid base URL '{base_url}': {e}"))
        })?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(
                config.retry_config.initial_delay,
                config.retry_config.max_delay,
            )
            .build_with_max_retries(config.retry_config.max_retries);

        let reqwest_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        // RetryAfterMiddleware goes first so throttling hints win over backoff
        let client = reqwest_middleware::ClientBuilder::new(reqwest_client)
            .with(RetryAfterMiddleware::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let credentials = STANDARD.encode(format!(
            ":{}",
            config.personal_access_token.expose_secret()
        ));
        let auth_header = SecretString::new(format!("Basic {credentials}").into());

        Ok(Self {
            client,
            auth_header: Arc::new(auth_header),
            config: Arc::new(config),
            logger: Arc::new(logger),
        })
    }

    /// The configuration this client was built from.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn build_url(&self, segments: &[&str]) -> Result<Url> {
        let base_url = self.config.base_url();
        let mut url = Url::parse(&base_url).map_err(|e| {
            ClientError::Configuration(format!("Invalid base URL '{base_url}': {e}"))
        })?;

        url.path_segments_mut()
            .map_err(|()| {
                ClientError::Configuration(format!("Base URL '{base_url}' cannot hold a path"))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    fn project_url(&self, project: &str, segments: &[&str]) -> Result<Url> {
        let mut all = Vec::with_capacity(segments.len() + 2);
        all.push(project);
        all.push("_apis");
        all.extend_from_slice(segments);
        self.build_url(&all)
    }

    fn authorization(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(self.auth_header.expose_secret())
            .map_err(|e| ClientError::Configuration(format!("Invalid credentials: {e}")))?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// Sends a GET and returns the body of a successful response.
    async fn make_request(&self, url: &Url, mut params: LogContext) -> Result<String> {
        params.insert(
            "api-version".to_string(),
            Value::String(self.config.api_version.clone()),
        );

        let correlation_id = create_correlation_id();
        let cid = Some(correlation_id.as_str());

        let headers = into_context(json!({
            "Authorization": self.auth_header.expose_secret(),
            "Content-Type": JSON_CONTENT,
            "Accept": JSON_CONTENT,
        }));
        self.logger.log_outbound_request(
            "GET",
            url.as_str(),
            Some(&params),
            Some(&headers),
            None,
            cid,
        );

        let query: Vec<(&str, String)> = params
            .iter()
            .map(|(key, value)| (key.as_str(), query_value(value)))
            .collect();

        let sent = self
            .client
            .get(url.clone())
            .header(AUTHORIZATION, self.authorization()?)
            .header(CONTENT_TYPE, JSON_CONTENT)
            .header(ACCEPT, JSON_CONTENT)
            .query(&query)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                let err = ClientError::from(e);
                let context = into_context(json!({"url": url.as_str()}));
                self.logger
                    .log_error("Azure DevOps request failed", &err, cid, &context);
                return Err(err);
            }
        };

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            let err = ClientError::Network(e);
            let context = into_context(json!({"url": url.as_str()}));
            self.logger
                .log_error("Failed to read response body", &err, cid, &context);
            err
        })?;
        self.logger
            .log_inbound_response(status.as_u16(), body.len(), cid);

        if status.is_success() {
            return Ok(body);
        }

        let err = api_error(status, &body);
        let context = into_context(json!({"url": url.as_str(), "status": status.as_u16()}));

        if err.is_authentication_error() {
            self.logger.log_security_event(
                "AUTHENTICATION_FAILURE",
                "Azure DevOps rejected the configured credentials",
                Severity::Warning,
                cid,
                &context,
            );
        }

        if err.is_not_found() {
            debug!("[{correlation_id}] Resource not found: {url}");
        } else {
            self.logger
                .log_error("Azure DevOps API request failed", &err, cid, &context);
        }

        Err(err)
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        url: &Url,
        params: LogContext,
    ) -> Result<Vec<T>> {
        let body = self.make_request(url, params).await?;
        if body.trim().is_empty() {
            return Err(ClientError::InvalidResponse(format!(
                "Empty response body from {url}"
            )));
        }

        let list: ApiList<T> = serde_json::from_str(&body)?;
        Ok(list.into_items())
    }

    /// Fetches a single resource; 404 and empty bodies mean it does not exist.
    async fn get_one<T: DeserializeOwned>(&self, url: &Url) -> Result<Option<T>> {
        let body = match self.make_request(url, LogContext::new()).await {
            Ok(body) => body,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(trimmed)?))
    }
}

#[async_trait]
impl DevOpsApi for AzureDevOpsClient {
    async fn get_projects(&self) -> Result<Vec<Project>> {
        let url = self.build_url(&["_apis", "projects"])?;
        self.get_list(&url, LogContext::new()).await
    }

    async fn get_project(&self, project: &str) -> Result<Option<Project>> {
        let url = self.build_url(&["_apis", "projects", project])?;
        self.get_one(&url).await
    }

    async fn get_variable_groups(
        &self,
        project: &str,
        group_name: Option<&str>,
    ) -> Result<Vec<VariableGroup>> {
        let url = self.project_url(project, &["distributedtask", "variablegroups"])?;

        let mut params = LogContext::new();
        if let Some(name) = group_name.filter(|n| !n.is_empty()) {
            params.insert("groupName".to_string(), Value::from(name));
        }

        self.get_list(&url, params).await
    }

    async fn get_variable_group(
        &self,
        project: &str,
        group_id: i64,
    ) -> Result<Option<VariableGroup>> {
        let id = group_id.to_string();
        let url = self.project_url(project, &["distributedtask", "variablegroups", &id])?;
        self.get_one(&url).await
    }

    async fn get_service_connections(
        &self,
        project: &str,
        connection_type: Option<&str>,
        include_shared: bool,
    ) -> Result<Vec<ServiceConnection>> {
        let url = self.project_url(project, &["serviceendpoint", "endpoints"])?;

        let mut params = LogContext::new();
        if let Some(kind) = connection_type.filter(|t| !t.is_empty()) {
            params.insert("type".to_string(), Value::from(kind));
        }
        if include_shared {
            params.insert("includeShared".to_string(), Value::from("true"));
        }

        self.get_list(&url, params).await
    }

    async fn get_service_connection(
        &self,
        project: &str,
        connection_id: &str,
    ) -> Result<Option<ServiceConnection>> {
        let url = self.project_url(project, &["serviceendpoint", "endpoints", connection_id])?;
        debug!("Fetching service connection from {url}");
        self.get_one(&url).await
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Builds an API error, preferring the `message` field of a JSON payload.
fn api_error(status: StatusCode, body: &str) -> ClientError {
    let parsed = serde_json::from_str::<Value>(body).ok();

    let detail = parsed
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .map_or_else(|| body.trim().to_string(), ToString::to_string);

    let message = if detail.is_empty() {
        status.canonical_reason().unwrap_or("Unknown error").to_string()
    } else {
        detail
    };

    ClientError::Api {
        status: status.as_u16(),
        message,
        body: parsed,
    }
}
