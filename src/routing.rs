//! Routing gate. Decides whether a page may render for the current session or
//! where to send the user instead. This is a UX guard only; the API enforces
//! real access control.

use crate::session::{Session, SessionPhase};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Signup,
    Login,
    VerifyEmail,
    NotFound(String),
}

impl Route {
    /// Parses a path, ignoring query, fragment and a trailing slash.
    pub fn parse(path: &str) -> Self {
        let path = path.trim();
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');

        match path {
            "" => Self::Dashboard,
            "/signup" => Self::Signup,
            "/login" => Self::Login,
            "/verify-email" => Self::VerifyEmail,
            other => Self::NotFound(other.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Dashboard => "/",
            Self::Signup => "/signup",
            Self::Login => "/login",
            Self::VerifyEmail => "/verify-email",
            Self::NotFound(path) => path,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// The initial session probe is still running.
    Pending,
    Allow,
    Redirect(Route),
}

/// Applies the access rules for `route` to `session`.
pub fn resolve(route: &Route, session: &Session) -> Decision {
    let phase = session.phase();
    if phase == SessionPhase::Unknown {
        return Decision::Pending;
    }

    match route {
        Route::Dashboard => match phase {
            SessionPhase::AuthenticatedVerified => Decision::Allow,
            SessionPhase::AuthenticatedUnverified => Decision::Redirect(Route::VerifyEmail),
            SessionPhase::Unauthenticated | SessionPhase::Unknown => {
                Decision::Redirect(Route::Login)
            }
        },
        Route::Signup | Route::Login => {
            if phase == SessionPhase::AuthenticatedVerified {
                Decision::Redirect(Route::Dashboard)
            } else {
                Decision::Allow
            }
        }
        Route::VerifyEmail | Route::NotFound(_) => Decision::Allow,
    }
}

/// Follows redirects from `route` to the page that will actually render.
/// Returns `None` while the probe is pending.
pub fn land(route: Route, session: &Session) -> Option<Route> {
    let mut current = route;
    for _ in 0..4 {
        match resolve(&current, session) {
            Decision::Pending => return None,
            Decision::Allow => return Some(current),
            Decision::Redirect(next) => current = next,
        }
    }
    Some(current)
}
