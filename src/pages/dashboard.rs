use super::{Notice, Outcome};
use crate::{
    api::{AuthApi, User},
    routing::Route,
    session::{Session, SessionError, SessionStore},
};
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

/// Display-ready account details.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub joined: String,
    pub last_login: String,
}

impl Profile {
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            joined: format_date(user.created_at, "%B %-d, %Y"),
            last_login: format_date(user.last_login, "%B %-d, %Y at %H:%M UTC"),
        }
    }
}

fn format_date(value: Option<DateTime<Utc>>, pattern: &str) -> String {
    value.map_or_else(|| "Unknown".to_string(), |at| at.format(pattern).to_string())
}

#[derive(Debug, Default)]
pub struct DashboardPage;

impl DashboardPage {
    pub fn profile(session: &Session) -> Option<Profile> {
        session.user.as_ref().map(Profile::from_user)
    }

    pub async fn logout<A: AuthApi>(
        store: &SessionStore<A>,
        cancel: &CancellationToken,
    ) -> Outcome {
        match store.logout_with_cancel(cancel).await {
            Ok(()) => Outcome::go(Route::Login)
                .with_notice(Notice::Success("Logged out successfully".to_string())),
            Err(SessionError::Cancelled) => Outcome::stay(),
            Err(err) => Outcome::stay().with_notice(Notice::Error(err.to_string())),
        }
    }
}
