//! Page controllers. Each page owns its form state, calls the session store
//! and reports what the front end should do next as an [`Outcome`]. Rendering
//! is left to the front end; pages only decide navigation and notices.

mod dashboard;
mod login;
mod signup;
mod verify_email;

pub use dashboard::{DashboardPage, Profile};
pub use login::LoginPage;
pub use signup::SignupPage;
pub use verify_email::VerifyEmailPage;

use crate::routing::Route;

/// Toast-style message for the front end to display once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    pub navigate: Option<Route>,
    pub notice: Option<Notice>,
}

impl Outcome {
    pub fn stay() -> Self {
        Self::default()
    }

    pub fn go(route: Route) -> Self {
        Self {
            navigate: Some(route),
            notice: None,
        }
    }

    #[must_use]
    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }
}
