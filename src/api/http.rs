//! HTTP client for the auth API with a shared cookie jar, a fixed timeout and
//! consistent error mapping. The server sets an `HttpOnly` session cookie on
//! signup/login; the jar replays it on every later call for the lifetime of
//! the process.

use super::{
    AuthApi, AuthResponse, LoginRequest, SignupRequest, VerifyEmailRequest, VerifyEmailResponse,
    errors::ApiError, types::ErrorBody,
};
use crate::config::AppConfig;
use reqwest::{Client, Response};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};

/// Maximum number of error message characters surfaced to the UI.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct HttpAuthApi {
    client: Client,
    base_url: String,
}

impl HttpAuthApi {
    /// Builds a client with a cookie store and the configured timeout.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the underlying HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.as_str().to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        build_url_with_base(&self.base_url, path)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(map_request_error)?;

        handle_json_response(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(map_request_error)?;

        handle_json_response(response).await
    }

    async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url(path))
            .send()
            .await
            .map_err(map_request_error)?;

        handle_empty_response(response).await
    }
}

impl AuthApi for HttpAuthApi {
    #[instrument(skip_all)]
    async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, ApiError> {
        self.post_json("/signup", request).await
    }

    #[instrument(skip_all)]
    async fn verify_email(
        &self,
        request: &VerifyEmailRequest,
    ) -> Result<VerifyEmailResponse, ApiError> {
        self.post_json("/verify-email", request).await
    }

    #[instrument(skip_all)]
    async fn check_auth(&self) -> Result<AuthResponse, ApiError> {
        self.get_json("/check-auth").await
    }

    #[instrument(skip_all)]
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.post_json("/login", request).await
    }

    #[instrument(skip_all)]
    async fn logout(&self) -> Result<(), ApiError> {
        self.post_empty("/logout").await
    }
}

/// Joins a base URL and a path without doubling or dropping the separator.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

fn map_request_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        ApiError::Config(format!("Failed to build request: {err}"))
    } else {
        ApiError::Network(format!("Unable to reach the server: {err}"))
    }
}

async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))
    } else {
        Err(error_from_response(response).await)
    }
}

async fn handle_empty_response(response: Response) -> Result<(), ApiError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(error_from_response(response).await)
    }
}

async fn error_from_response(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    debug!(status, "auth API returned an error");

    ApiError::Http {
        status,
        message: extract_message(&body),
    }
}

/// Pulls the `message` field out of a JSON error body, trimmed and truncated.
fn extract_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed.message?;
    let trimmed = message.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(MAX_ERROR_CHARS).collect())
    }
}
