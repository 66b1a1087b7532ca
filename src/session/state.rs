use crate::api::User;

/// Client-held snapshot of authentication status.
///
/// A fresh session starts in the checking state so routing waits for the
/// initial probe instead of redirecting on a guess.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_checking_auth: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_checking_auth: true,
            is_loading: false,
            error: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Unknown,
    Unauthenticated,
    AuthenticatedUnverified,
    AuthenticatedVerified,
}

impl Session {
    pub fn phase(&self) -> SessionPhase {
        if self.is_checking_auth {
            return SessionPhase::Unknown;
        }
        match (&self.user, self.is_authenticated) {
            (Some(user), true) if user.is_verified => SessionPhase::AuthenticatedVerified,
            (Some(_), true) => SessionPhase::AuthenticatedUnverified,
            _ => SessionPhase::Unauthenticated,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.is_authenticated && self.user.as_ref().is_some_and(|user| user.is_verified)
    }

    /// Clears identity; used by failed probes and logout.
    pub(crate) fn sign_out(&mut self) {
        self.user = None;
        self.is_authenticated = false;
    }

    pub(crate) fn sign_in(&mut self, user: User) {
        self.user = Some(user);
        self.is_authenticated = true;
    }
}
