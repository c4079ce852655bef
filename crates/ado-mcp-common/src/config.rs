//! Server configuration.
//!
//! Settings are read from the process environment (after loading a `.env`
//! file when one exists), or from a TOML file given on the command line.
//!
//! ## Environment
//!
//! | variable | default |
//! |---|---|
//! | `AZURE_DEVOPS_ORGANIZATION` | required |
//! | `AZURE_DEVOPS_PAT` | required |
//! | `API_VERSION` | `7.0` |
//! | `LOG_LEVEL` | `INFO` |
//! | `LOG_FORMAT` | `json` |
//! | `REQUEST_TIMEOUT` | `30` |
//! | `MAX_RETRIES` | `3` |
//! | `CACHE_TTL_SECONDS` | `300` |
//! | `ENABLE_CACHING` | `true` |
//! | `AZURE_DEVOPS_BASE_URL` | `https://dev.azure.com/{organization}` |
//!
//! ## Example Configuration File
//!
//! ```toml
//! organization = "contoso"
//! # Read the token from this variable instead of storing it in the file.
//! pat_env = "AZURE_DEVOPS_PAT"
//! log_format = "text"
//! request_timeout = 60
//! max_retries = 5
//! enable_caching = false
//! ```

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Variable holding the organization name.
pub const ORGANIZATION_VAR: &str = "AZURE_DEVOPS_ORGANIZATION";
/// Variable holding the personal access token.
pub const PAT_VAR: &str = "AZURE_DEVOPS_PAT";
/// Variable overriding the service root URL.
pub const BASE_URL_VAR: &str = "AZURE_DEVOPS_BASE_URL";

/// Default REST API version sent with every request.
pub const DEFAULT_API_VERSION: &str = "7.0";
/// Default log level name.
pub const DEFAULT_LOG_LEVEL: &str = "INFO";
/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;
/// Default number of retries for transient failures.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default lifetime of cached project lookups in seconds.
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;

const CLOUD_ROOT: &str = "https://dev.azure.com";

/// Output format for the server's log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable lines.
    Text,
}

impl LogFormat {
    /// Returns the lower-case name of the format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "pretty" => Ok(Self::Text),
            other => Err(ConfigError::Invalid(format!(
                "Unsupported log format '{other}' (expected json or text)"
            ))),
        }
    }
}

/// Retry behaviour for transient HTTP failures.
///
/// Delays grow exponentially from `initial_delay` and are capped at
/// `max_delay`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use ado_mcp_common::RetryConfig;
///
/// let patient = RetryConfig {
///     max_retries: 5,
///     initial_delay: Duration::from_millis(500),
///     max_delay: Duration::from_secs(60),
/// };
/// assert_eq!(patient.max_retries, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts before failing.
    pub max_retries: u32,
    /// Delay before the first retry attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Configuration for the Azure DevOps MCP server.
///
/// The personal access token is held as a [`SecretString`]: it is never
/// serialized and `Debug` output shows it redacted.
///
/// # Examples
///
/// ```
/// use ado_mcp_common::Config;
///
/// let config = Config::new("contoso", "my-pat")
///     .with_api_version("7.1")
///     .with_request_timeout(60);
///
/// assert_eq!(config.base_url(), "https://dev.azure.com/contoso");
/// assert_eq!(config.project_api_url("web"), "https://dev.azure.com/contoso/web/_apis");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Azure DevOps organization name.
    pub organization: String,
    /// Personal access token used for Basic authentication.
    #[serde(skip_serializing)]
    pub personal_access_token: SecretString,
    /// REST API version sent as `api-version` on every request.
    pub api_version: String,
    /// Replaces `https://dev.azure.com/{organization}` as the service root.
    pub base_url: Option<String>,
    /// Log level name (`DEBUG`, `INFO`, `WARNING`, `ERROR`).
    pub log_level: String,
    /// Log line format.
    pub log_format: LogFormat,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Retry policy for transient failures.
    pub retry_config: RetryConfig,
    /// Lifetime of cached project lookups in seconds.
    pub cache_ttl_seconds: u64,
    /// Whether project lookups are cached.
    pub enable_caching: bool,
}

impl Config {
    /// Creates a configuration with default settings for an organization.
    pub fn new(organization: impl Into<String>, personal_access_token: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            personal_access_token: SecretString::new(personal_access_token.into().into()),
            api_version: DEFAULT_API_VERSION.to_string(),
            base_url: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormat::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry_config: RetryConfig::default(),
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            enable_caching: true,
        }
    }

    /// Loads configuration from the environment, reading `.env` first.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value fails
    /// validation.
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] when the organization or token is
    /// absent, and [`ConfigError::Invalid`] when a value fails validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let organization = non_empty(lookup(ORGANIZATION_VAR))
            .ok_or_else(|| ConfigError::MissingVar(ORGANIZATION_VAR.to_string()))?;
        let token = non_empty(lookup(PAT_VAR))
            .ok_or_else(|| ConfigError::MissingVar(PAT_VAR.to_string()))?;

        let raw = RawSettings {
            organization: Some(organization),
            personal_access_token: Some(token),
            pat_env: None,
            api_version: lookup("API_VERSION"),
            base_url: non_empty(lookup(BASE_URL_VAR)),
            log_level: lookup("LOG_LEVEL"),
            log_format: lookup("LOG_FORMAT"),
            request_timeout: parse_integer(&lookup, "REQUEST_TIMEOUT")?,
            max_retries: parse_integer(&lookup, "MAX_RETRIES")?,
            cache_ttl_seconds: parse_integer(&lookup, "CACHE_TTL_SECONDS")?,
            enable_caching: lookup("ENABLE_CACHING")
                .map(|v| v.trim().eq_ignore_ascii_case("true")),
        };

        raw.resolve()
    }

    /// Loads configuration from a TOML document.
    ///
    /// When the document has no `personal_access_token`, the token is read
    /// through `lookup` from the variable named by `pat_env`
    /// (`AZURE_DEVOPS_PAT` by default).
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not parse or fails validation.
    pub fn from_toml_str<F>(contents: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut raw: RawSettings = toml::from_str(contents)?;

        raw.personal_access_token = non_empty(raw.personal_access_token.take());
        if raw.personal_access_token.is_none() {
            let var = raw.pat_env.as_deref().unwrap_or(PAT_VAR);
            raw.personal_access_token = non_empty(lookup(var));
        }

        raw.resolve()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or fails
    /// validation.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        load_dotenv();
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents, |key| std::env::var(key).ok())
    }

    /// Loads from `path` when given, otherwise from the environment.
    ///
    /// # Errors
    ///
    /// See [`Config::from_toml_file`] and [`Config::from_env`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(Self::from_env, Self::from_toml_file)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The organization is empty
    /// - The personal access token is empty
    /// - The request timeout is zero
    pub fn validate(&self) -> Result<()> {
        if self.organization.trim().is_empty() {
            return Err(ConfigError::Invalid("Organization is required".to_string()));
        }

        if self.personal_access_token.expose_secret().is_empty() {
            return Err(ConfigError::Invalid(
                "Personal Access Token is required".to_string(),
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::Invalid(
                "Request timeout must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Service root URL, `https://dev.azure.com/{organization}` unless
    /// overridden.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.base_url.as_deref().map_or_else(
            || format!("{CLOUD_ROOT}/{}", self.organization),
            |url| url.trim_end_matches('/').to_string(),
        )
    }

    /// Organization-level API root, `{base}/_apis`.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("{}/_apis", self.base_url())
    }

    /// Project-level API root, `{base}/{project}/_apis`.
    #[must_use]
    pub fn project_api_url(&self, project: &str) -> String {
        format!("{}/{project}/_apis", self.base_url())
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Cache lifetime as a [`Duration`].
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Sets the REST API version.
    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Sets a custom service root URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the log level name.
    #[must_use]
    pub fn with_log_level(mut self, log_level: impl Into<String>) -> Self {
        self.log_level = log_level.into();
        self
    }

    /// Sets the log line format.
    #[must_use]
    pub const fn with_log_format(mut self, log_format: LogFormat) -> Self {
        self.log_format = log_format;
        self
    }

    /// Sets the request timeout in seconds.
    #[must_use]
    pub const fn with_request_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout = seconds;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub const fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Sets the project cache lifetime and whether caching is enabled.
    #[must_use]
    pub const fn with_caching(mut self, enabled: bool, ttl_seconds: u64) -> Self {
        self.enable_caching = enabled;
        self.cache_ttl_seconds = ttl_seconds;
        self
    }
}

/// Settings as written by the user, before defaults and validation.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSettings {
    organization: Option<String>,
    personal_access_token: Option<String>,
    pat_env: Option<String>,
    api_version: Option<String>,
    base_url: Option<String>,
    log_level: Option<String>,
    log_format: Option<String>,
    request_timeout: Option<i64>,
    max_retries: Option<i64>,
    cache_ttl_seconds: Option<i64>,
    enable_caching: Option<bool>,
}

impl RawSettings {
    fn resolve(self) -> Result<Config> {
        let request_timeout = match self.request_timeout {
            None => DEFAULT_REQUEST_TIMEOUT,
            Some(secs) => u64::try_from(secs)
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| invalid("Request timeout must be positive"))?,
        };

        let max_retries = match self.max_retries {
            None => DEFAULT_MAX_RETRIES,
            Some(n) if n < 0 => return Err(invalid("Max retries must be non-negative")),
            Some(n) => u32::try_from(n).map_err(|_| invalid("Max retries is out of range"))?,
        };

        let cache_ttl_seconds = match self.cache_ttl_seconds {
            None => DEFAULT_CACHE_TTL_SECONDS,
            Some(secs) => {
                u64::try_from(secs).map_err(|_| invalid("Cache TTL must be non-negative"))?
            }
        };

        let log_format = match self.log_format.as_deref() {
            Some(raw) => raw.parse::<LogFormat>()?,
            None => LogFormat::default(),
        };

        let config = Config {
            organization: self.organization.unwrap_or_default(),
            personal_access_token: SecretString::new(
                self.personal_access_token.unwrap_or_default().into(),
            ),
            api_version: non_empty(self.api_version)
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            base_url: non_empty(self.base_url),
            log_level: non_empty(self.log_level).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_format,
            request_timeout,
            retry_config: RetryConfig {
                max_retries,
                ..RetryConfig::default()
            },
            cache_ttl_seconds,
            enable_caching: self.enable_caching.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}

fn load_dotenv() {
    if let Err(e) = dotenv::dotenv() {
        log::debug!("No .env file loaded: {e}");
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_integer<F>(lookup: &F, key: &str) -> Result<Option<i64>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<i64>().map_err(|_| {
                ConfigError::Invalid(format!("{key} must be an integer, got '{raw}'"))
            })
        })
        .transpose()
}
