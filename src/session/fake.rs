//! Scripted [`AuthApi`] used by unit tests. Each endpoint pops replies from its
//! own queue; a deferred reply lets a test decide when (and in which order)
//! in-flight calls complete.

use crate::api::{
    ApiError, AuthApi, AuthResponse, LoginRequest, SignupRequest, User, VerifyEmailRequest,
    VerifyEmailResponse,
};
use std::{collections::VecDeque, sync::Mutex};
use tokio::sync::oneshot;

pub(crate) enum Step<T> {
    Ready(Result<T, ApiError>),
    Deferred(oneshot::Receiver<Result<T, ApiError>>),
}

type Queue<T> = Mutex<VecDeque<Step<T>>>;
pub(crate) type Reply<T> = oneshot::Sender<Result<T, ApiError>>;

#[derive(Default)]
pub(crate) struct FakeApi {
    signup: Queue<AuthResponse>,
    verify: Queue<VerifyEmailResponse>,
    check: Queue<AuthResponse>,
    login: Queue<AuthResponse>,
    logout: Queue<()>,
    codes: Mutex<Vec<String>>,
}

fn push<T>(queue: &Queue<T>, step: Step<T>) {
    if let Ok(mut queue) = queue.lock() {
        queue.push_back(step);
    }
}

fn defer<T>(queue: &Queue<T>) -> Reply<T> {
    let (tx, rx) = oneshot::channel();
    push(queue, Step::Deferred(rx));
    tx
}

async fn next<T>(queue: &Queue<T>) -> Result<T, ApiError> {
    let step = queue.lock().ok().and_then(|mut queue| queue.pop_front());
    match step {
        Some(Step::Ready(result)) => result,
        Some(Step::Deferred(rx)) => rx
            .await
            .unwrap_or_else(|_| Err(ApiError::Network("reply dropped".to_string()))),
        None => Err(ApiError::Network("no scripted reply".to_string())),
    }
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_signup(&self, result: Result<AuthResponse, ApiError>) {
        push(&self.signup, Step::Ready(result));
    }

    pub(crate) fn defer_signup(&self) -> Reply<AuthResponse> {
        defer(&self.signup)
    }

    pub(crate) fn push_verify(&self, result: Result<VerifyEmailResponse, ApiError>) {
        push(&self.verify, Step::Ready(result));
    }

    pub(crate) fn defer_verify(&self) -> Reply<VerifyEmailResponse> {
        defer(&self.verify)
    }

    pub(crate) fn push_check(&self, result: Result<AuthResponse, ApiError>) {
        push(&self.check, Step::Ready(result));
    }

    pub(crate) fn defer_check(&self) -> Reply<AuthResponse> {
        defer(&self.check)
    }

    pub(crate) fn push_login(&self, result: Result<AuthResponse, ApiError>) {
        push(&self.login, Step::Ready(result));
    }

    pub(crate) fn defer_login(&self) -> Reply<AuthResponse> {
        defer(&self.login)
    }

    pub(crate) fn push_logout(&self, result: Result<(), ApiError>) {
        push(&self.logout, Step::Ready(result));
    }

    /// Codes submitted to verify-email, in call order.
    pub(crate) fn submitted_codes(&self) -> Vec<String> {
        self.codes.lock().map(|codes| codes.clone()).unwrap_or_default()
    }
}

impl AuthApi for FakeApi {
    async fn signup(&self, _request: &SignupRequest) -> Result<AuthResponse, ApiError> {
        next(&self.signup).await
    }

    async fn verify_email(
        &self,
        request: &VerifyEmailRequest,
    ) -> Result<VerifyEmailResponse, ApiError> {
        if let Ok(mut codes) = self.codes.lock() {
            codes.push(request.code.clone());
        }
        next(&self.verify).await
    }

    async fn check_auth(&self) -> Result<AuthResponse, ApiError> {
        next(&self.check).await
    }

    async fn login(&self, _request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        next(&self.login).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        next(&self.logout).await
    }
}

pub(crate) fn user(id: &str, verified: bool) -> User {
    User {
        id: id.to_string(),
        name: format!("User {id}"),
        email: format!("user{id}@example.com"),
        is_verified: verified,
        last_login: None,
        created_at: None,
        updated_at: None,
    }
}

pub(crate) fn auth(id: &str, verified: bool) -> AuthResponse {
    AuthResponse {
        user: user(id, verified),
    }
}

pub(crate) fn verified(id: &str) -> VerifyEmailResponse {
    VerifyEmailResponse {
        user: user(id, true),
        success: Some(true),
        message: Some("Email verified successfully".to_string()),
        extra: serde_json::Map::new(),
    }
}

pub(crate) fn rejected(status: u16, message: Option<&str>) -> ApiError {
    ApiError::Http {
        status,
        message: message.map(str::to_string),
    }
}
