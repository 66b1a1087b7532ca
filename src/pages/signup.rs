use super::Outcome;
use crate::{
    api::AuthApi,
    routing::Route,
    session::{SessionError, SessionStore},
};
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Sign-up form. No client-side validation: the API owns the rules and its
/// message lands in the session `error`.
#[derive(Debug, Default)]
pub struct SignupPage {
    pub name: String,
    pub email: String,
    password: SecretString,
}

impl SignupPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_password(&mut self, password: SecretString) {
        self.password = password;
    }

    /// Submits the form; the password is consumed so it does not outlive the request.
    pub async fn submit<A: AuthApi>(
        &mut self,
        store: &SessionStore<A>,
        cancel: &CancellationToken,
    ) -> Outcome {
        let password = std::mem::take(&mut self.password);
        match store
            .signup_with_cancel(self.email.trim(), password, self.name.trim(), cancel)
            .await
        {
            Ok(_) => Outcome::go(Route::VerifyEmail),
            Err(SessionError::Cancelled) => Outcome::stay(),
            Err(err) => {
                debug!(error = %err, "signup rejected");
                Outcome::stay()
            }
        }
    }
}
