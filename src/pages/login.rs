use super::Outcome;
use crate::{
    api::AuthApi,
    routing::Route,
    session::{SessionError, SessionStore},
};
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Default)]
pub struct LoginPage {
    pub email: String,
    password: SecretString,
}

impl LoginPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_password(&mut self, password: SecretString) {
        self.password = password;
    }

    /// Signs in and heads to the dashboard; the gate forwards unverified users
    /// to email verification from there.
    pub async fn submit<A: AuthApi>(
        &mut self,
        store: &SessionStore<A>,
        cancel: &CancellationToken,
    ) -> Outcome {
        let password = std::mem::take(&mut self.password);
        match store
            .login_with_cancel(self.email.trim(), password, cancel)
            .await
        {
            Ok(_) => Outcome::go(Route::Dashboard),
            Err(SessionError::Cancelled) => Outcome::stay(),
            Err(err) => {
                debug!(error = %err, "login rejected");
                Outcome::stay()
            }
        }
    }
}
