//! Email verification page: six code slots that auto-submit once full.

use super::{Notice, Outcome};
use crate::{
    api::{ApiError, AuthApi},
    routing::Route,
    session::{SessionError, SessionStore},
    verification::VerificationCode,
};
use tokio_util::sync::CancellationToken;

const VERIFIED_NOTICE: &str = "Email verified successfully!";
const FAILED_NOTICE: &str = "Failed to verify email";

#[derive(Debug, Default)]
pub struct VerifyEmailPage {
    pub code: VerificationCode,
}

impl VerifyEmailPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manual submit; does nothing while a call is in flight or a slot is empty.
    pub async fn submit_current<A: AuthApi>(
        &self,
        store: &SessionStore<A>,
        cancel: &CancellationToken,
    ) -> Option<Outcome> {
        if !self.code.can_submit(store.session().is_loading) {
            return None;
        }
        Some(Self::submit(store, &self.code.code(), cancel).await)
    }

    /// Sends `code` for verification. Success goes to the dashboard; failure
    /// stays with an error notice carrying the API message.
    pub async fn submit<A: AuthApi>(
        store: &SessionStore<A>,
        code: &str,
        cancel: &CancellationToken,
    ) -> Outcome {
        match store.verify_email_with_cancel(code, cancel).await {
            Ok(_) => Outcome::go(Route::Dashboard)
                .with_notice(Notice::Success(VERIFIED_NOTICE.to_string())),
            Err(SessionError::Cancelled) => Outcome::stay(),
            Err(err) => {
                let message = err
                    .api_error()
                    .and_then(ApiError::api_message)
                    .unwrap_or(FAILED_NOTICE);
                Outcome::stay().with_notice(Notice::Error(message.to_string()))
            }
        }
    }
}
