//! Client configuration for the auth API endpoint and request timeout. Build-time
//! environment variables provide the defaults and the CLI may override them at
//! runtime, so a packaged binary can target another API without rebuilding.
//! Configuration values are public; do not store secrets here.

use crate::api::ApiError;
use std::time::Duration;
use url::Url;

/// API base used when neither the build nor the CLI provides one.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api/auth";
/// Default request timeout (seconds) applied to every API call.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: Url,
    pub timeout: Duration,
}

/// Values supplied at runtime; `None` keeps the build-time default.
#[derive(Clone, Debug, Default)]
pub struct RuntimeConfig {
    pub api_base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl AppConfig {
    /// Loads build-time defaults and applies runtime overrides.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the base URL is not an absolute http(s)
    /// URL or the timeout is zero.
    pub fn load(runtime: RuntimeConfig) -> Result<Self, ApiError> {
        let mut api_base_url = option_env!("AUTHDECK_API_URL")
            .and_then(normalize_runtime_value)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let mut timeout_seconds = DEFAULT_TIMEOUT_SECONDS;

        if let Some(value) = runtime.api_base_url.as_deref().and_then(normalize_runtime_value) {
            api_base_url = value;
        }
        if let Some(value) = runtime.timeout_seconds {
            timeout_seconds = value;
        }

        Self::new(&api_base_url, timeout_seconds)
    }

    /// Builds a validated config from explicit values.
    ///
    /// # Errors
    /// Returns `ApiError::Config` on an invalid base URL or a zero timeout.
    pub fn new(api_base_url: &str, timeout_seconds: u64) -> Result<Self, ApiError> {
        let api_base_url = parse_base_url(api_base_url)?;
        if timeout_seconds == 0 {
            return Err(ApiError::Config(
                "Request timeout must be at least one second.".to_string(),
            ));
        }

        Ok(Self {
            api_base_url,
            timeout: Duration::from_secs(timeout_seconds),
        })
    }
}

fn parse_base_url(value: &str) -> Result<Url, ApiError> {
    let url = Url::parse(value.trim())
        .map_err(|err| ApiError::Config(format!("Invalid API base URL '{value}': {err}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ApiError::Config(format!(
            "Unsupported API URL scheme '{scheme}', expected http or https."
        ))),
    }
}

fn normalize_runtime_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
