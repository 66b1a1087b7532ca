//! # Authdeck (account client for an authentication API)
//!
//! `authdeck` drives a remote authentication API: sign up, log in, verify the
//! email address with a six character code, probe the current session and log
//! out. The session cookie issued by the API is kept in memory by the HTTP
//! client and replayed on every request.
//!
//! ## Session
//!
//! A single [`session::SessionStore`] owns the observable client state (user,
//! authenticated flag, loading flags and last error). Every operation takes a
//! ticket when it starts, and only the newest ticket may publish its result, so
//! a slow response can never overwrite a newer one. Operations can be abandoned
//! through a `CancellationToken`.
//!
//! ## Navigation
//!
//! [`routing`] gates every page on the session: the dashboard needs a verified
//! user, the sign-up and login pages are for anonymous users, and the
//! verification page is for signed in users that are not verified yet. The
//! [`pages`] controllers hold form state and decide where to go next, and
//! [`terminal`] renders them as a line-oriented front end.

pub mod api;
pub mod cli;
pub mod config;
pub mod pages;
pub mod routing;
pub mod session;
pub mod terminal;
pub mod verification;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with("authdeck/"));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
