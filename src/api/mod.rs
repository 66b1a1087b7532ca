//! Auth API surface consumed by the session store. The store only talks to the
//! [`AuthApi`] trait so tests and alternative transports can stand in for the
//! HTTP client. Requests carry passwords and verification codes, so nothing in
//! this module logs request bodies.
//!
//! Endpoints, relative to the configured base (default `/api/auth`):
//!
//! | Operation | Method & path | Body |
//! |---|---|---|
//! | signup | `POST /signup` | `{email, password, name}` |
//! | verify email | `POST /verify-email` | `{code}` |
//! | check auth | `GET /check-auth` | none |
//! | login | `POST /login` | `{email, password}` |
//! | logout | `POST /logout` | none |

mod errors;
pub mod http;
pub mod types;

use std::future::Future;

pub use errors::ApiError;
pub use http::HttpAuthApi;
pub use types::{
    AuthResponse, LoginRequest, SignupRequest, User, VerifyEmailRequest, VerifyEmailResponse,
};

/// Remote authentication service. Cookies (if any) are the implementation's
/// concern; callers only see decoded payloads or an [`ApiError`].
pub trait AuthApi: Send + Sync {
    fn signup(
        &self,
        request: &SignupRequest,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    fn verify_email(
        &self,
        request: &VerifyEmailRequest,
    ) -> impl Future<Output = Result<VerifyEmailResponse, ApiError>> + Send;

    fn check_auth(&self) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    fn logout(&self) -> impl Future<Output = Result<(), ApiError>> + Send;
}
