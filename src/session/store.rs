//! Session store: the single source of truth for authentication state. Every
//! operation flips its in-flight flag, calls the auth API, then records the
//! outcome and hands it back to the caller as well, so pages can both render
//! `error` passively and react to the returned `Result`.
//!
//! Overlapping calls are ordered by tickets. Each operation takes the next
//! ticket when it starts; only the newest ticket may write `user`,
//! `is_authenticated` or `error`, so a slow response can never overwrite a
//! newer one. A cancelled ticket gives up that claim: the newest ticket that
//! was not cancelled becomes the writer again. The in-flight flags
//! (`is_loading` for mutations, `is_checking_auth` for the probe) are cleared
//! by the newest operation of the same kind, even when it lost the race, so
//! the store never stays busy.

use super::state::Session;
use crate::api::{
    ApiError, AuthApi, LoginRequest, SignupRequest, User, VerifyEmailRequest, VerifyEmailResponse,
};
use secrecy::SecretString;
use std::{
    collections::BTreeSet,
    future::Future,
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
};
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const SIGNUP_FALLBACK: &str = "Error signing up";
const VERIFY_FALLBACK: &str = "Error verifying email";
const LOGIN_FALLBACK: &str = "Error logging in";
const LOGOUT_FALLBACK: &str = "Error logging out";
const CHECK_FALLBACK: &str = "Not authenticated";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The API rejected the call; `message` is what the session recorded.
    #[error("{message}")]
    Api {
        message: String,
        #[source]
        source: ApiError,
    },
    #[error("request cancelled")]
    Cancelled,
}

impl SessionError {
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api { source, .. } => Some(source),
            Self::Cancelled => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Mutation,
    Probe,
}

#[derive(Clone, Copy, Debug)]
struct Ticket {
    id: u64,
    kind: Kind,
}

pub struct SessionStore<A> {
    api: A,
    state: watch::Sender<Session>,
    latest: AtomicU64,
    latest_mutation: AtomicU64,
    latest_probe: AtomicU64,
    cancelled: Mutex<BTreeSet<u64>>,
}

impl<A> std::fmt::Debug for SessionStore<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &*self.state.borrow())
            .field("latest", &self.latest.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<A: AuthApi> SessionStore<A> {
    pub fn new(api: A) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            api,
            state,
            latest: AtomicU64::new(0),
            latest_mutation: AtomicU64::new(0),
            latest_probe: AtomicU64::new(0),
            cancelled: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Current snapshot of the session.
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Registers a new account and signs it in (unverified).
    ///
    /// # Errors
    /// Returns `SessionError::Api` with the recorded message when the API rejects the call.
    pub async fn signup(
        &self,
        email: &str,
        password: SecretString,
        name: &str,
    ) -> Result<User, SessionError> {
        self.signup_with_cancel(email, password, name, &CancellationToken::new())
            .await
    }

    /// [`signup`](Self::signup) that can be abandoned through `cancel`.
    ///
    /// # Errors
    /// Returns `SessionError::Cancelled` if `cancel` fires first.
    pub async fn signup_with_cancel(
        &self,
        email: &str,
        password: SecretString,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<User, SessionError> {
        let request = SignupRequest {
            email: email.to_string(),
            password,
            name: name.to_string(),
        };

        let ticket = self.begin(Kind::Mutation);
        info!(ticket = ticket.id, "signup started");
        let result = self.call(ticket, cancel, self.api.signup(&request)).await?;
        self.finish_sign_in(ticket, result.map(|response| response.user), SIGNUP_FALLBACK)
    }

    /// Submits the six-character verification code and returns the raw payload.
    ///
    /// # Errors
    /// Returns `SessionError::Api` with the recorded message when the API rejects the code.
    pub async fn verify_email(&self, code: &str) -> Result<VerifyEmailResponse, SessionError> {
        self.verify_email_with_cancel(code, &CancellationToken::new())
            .await
    }

    /// [`verify_email`](Self::verify_email) that can be abandoned through `cancel`.
    ///
    /// # Errors
    /// Returns `SessionError::Cancelled` if `cancel` fires first.
    pub async fn verify_email_with_cancel(
        &self,
        code: &str,
        cancel: &CancellationToken,
    ) -> Result<VerifyEmailResponse, SessionError> {
        let request = VerifyEmailRequest {
            code: code.to_string(),
        };

        let ticket = self.begin(Kind::Mutation);
        info!(ticket = ticket.id, "email verification started");
        let result = self
            .call(ticket, cancel, self.api.verify_email(&request))
            .await?;

        match result {
            Ok(payload) => {
                let snapshot = payload.user.clone();
                self.settle(ticket, move |session| session.sign_in(snapshot));
                Ok(payload)
            }
            Err(source) => Err(self.record_failure(ticket, source, VERIFY_FALLBACK)),
        }
    }

    /// Probes the server for an existing session. A failed probe means "not
    /// signed in": identity is cleared but `error` is left alone.
    ///
    /// # Errors
    /// Returns the probe failure so callers can log it; it is not user-facing.
    pub async fn check_auth(&self) -> Result<User, SessionError> {
        self.check_auth_with_cancel(&CancellationToken::new()).await
    }

    /// [`check_auth`](Self::check_auth) that can be abandoned through `cancel`.
    ///
    /// # Errors
    /// Returns `SessionError::Cancelled` if `cancel` fires first.
    pub async fn check_auth_with_cancel(
        &self,
        cancel: &CancellationToken,
    ) -> Result<User, SessionError> {
        let ticket = self.begin(Kind::Probe);
        debug!(ticket = ticket.id, "session probe started");
        let result = self.call(ticket, cancel, self.api.check_auth()).await?;

        match result {
            Ok(response) => {
                let user = response.user;
                let snapshot = user.clone();
                self.settle(ticket, move |session| session.sign_in(snapshot));
                debug!(verified = user.is_verified, "session probe found a session");
                Ok(user)
            }
            Err(source) => {
                self.settle(ticket, Session::sign_out);
                debug!(error = %source, "session probe found no session");
                Err(SessionError::Api {
                    message: source.message_or(CHECK_FALLBACK),
                    source,
                })
            }
        }
    }

    /// Signs in with email and password.
    ///
    /// # Errors
    /// Returns `SessionError::Api` with the recorded message when the API rejects the credentials.
    pub async fn login(&self, email: &str, password: SecretString) -> Result<User, SessionError> {
        self.login_with_cancel(email, password, &CancellationToken::new())
            .await
    }

    /// [`login`](Self::login) that can be abandoned through `cancel`.
    ///
    /// # Errors
    /// Returns `SessionError::Cancelled` if `cancel` fires first.
    pub async fn login_with_cancel(
        &self,
        email: &str,
        password: SecretString,
        cancel: &CancellationToken,
    ) -> Result<User, SessionError> {
        let request = LoginRequest {
            email: email.to_string(),
            password,
        };

        let ticket = self.begin(Kind::Mutation);
        info!(ticket = ticket.id, "login started");
        let result = self.call(ticket, cancel, self.api.login(&request)).await?;
        self.finish_sign_in(ticket, result.map(|response| response.user), LOGIN_FALLBACK)
    }

    /// Ends the server session and clears identity.
    ///
    /// # Errors
    /// Returns `SessionError::Api` when the server refuses; the session keeps its user.
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.logout_with_cancel(&CancellationToken::new()).await
    }

    /// [`logout`](Self::logout) that can be abandoned through `cancel`.
    ///
    /// # Errors
    /// Returns `SessionError::Cancelled` if `cancel` fires first.
    pub async fn logout_with_cancel(&self, cancel: &CancellationToken) -> Result<(), SessionError> {
        let ticket = self.begin(Kind::Mutation);
        info!(ticket = ticket.id, "logout started");
        let result = self.call(ticket, cancel, self.api.logout()).await?;

        match result {
            Ok(()) => {
                self.settle(ticket, Session::sign_out);
                Ok(())
            }
            Err(source) => Err(self.record_failure(ticket, source, LOGOUT_FALLBACK)),
        }
    }

    /// Takes the next ticket and marks the matching operation as in flight.
    fn begin(&self, kind: Kind) -> Ticket {
        let mut id = 0;
        self.state.send_modify(|session| {
            id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            session.error = None;
            match kind {
                Kind::Mutation => {
                    self.latest_mutation.store(id, Ordering::SeqCst);
                    session.is_loading = true;
                }
                Kind::Probe => {
                    self.latest_probe.store(id, Ordering::SeqCst);
                    session.is_checking_auth = true;
                }
            }
        });
        Ticket { id, kind }
    }

    /// Awaits the API call unless `cancel` fires first. A cancelled call
    /// writes nothing except releasing its in-flight flag and handing the
    /// writer role back to the newest live ticket.
    async fn call<T>(
        &self,
        ticket: Ticket,
        cancel: &CancellationToken,
        request: impl Future<Output = Result<T, ApiError>>,
    ) -> Result<Result<T, ApiError>, SessionError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(ticket = ticket.id, "request cancelled");
                self.abandon(ticket);
                Err(SessionError::Cancelled)
            }
            result = request => Ok(result),
        }
    }

    fn finish_sign_in(
        &self,
        ticket: Ticket,
        result: Result<User, ApiError>,
        fallback: &str,
    ) -> Result<User, SessionError> {
        match result {
            Ok(user) => {
                let snapshot = user.clone();
                self.settle(ticket, move |session| session.sign_in(snapshot));
                Ok(user)
            }
            Err(source) => Err(self.record_failure(ticket, source, fallback)),
        }
    }

    fn record_failure(&self, ticket: Ticket, source: ApiError, fallback: &str) -> SessionError {
        let message = source.message_or(fallback);
        warn!(ticket = ticket.id, status = source.status(), "{message}");
        let recorded = message.clone();
        self.settle(ticket, move |session| session.error = Some(recorded));
        SessionError::Api { message, source }
    }

    /// Releases the operation's in-flight flag and, if the ticket is still the
    /// newest, applies `update`. Returns whether `update` ran.
    fn settle(&self, ticket: Ticket, update: impl FnOnce(&mut Session)) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|session| {
            let released = self.release_flag(ticket, session);
            if self.latest.load(Ordering::SeqCst) == ticket.id {
                update(session);
                applied = true;
                self.forget_cancelled_through(ticket.id);
            }
            released || applied
        });

        if !applied {
            debug!(ticket = ticket.id, "discarding stale response");
        }
        applied
    }

    fn abandon(&self, ticket: Ticket) {
        self.state.send_if_modified(|session| {
            self.retire(ticket.id);
            self.release_flag(ticket, session)
        });
    }

    /// Marks `id` as cancelled. If it was the writer, the role falls back to
    /// the newest ticket below it that was not cancelled (0 when none).
    fn retire(&self, id: u64) {
        let Ok(mut cancelled) = self.cancelled.lock() else {
            return;
        };
        cancelled.insert(id);
        if self.latest.load(Ordering::SeqCst) != id {
            return;
        }

        let mut writer = id;
        while writer > 0 && cancelled.contains(&writer) {
            writer -= 1;
        }
        debug!(cancelled = id, writer, "writer handed back");
        self.latest.store(writer, Ordering::SeqCst);
    }

    /// Once `id` has written, no search will walk below it again.
    fn forget_cancelled_through(&self, id: u64) {
        if let Ok(mut cancelled) = self.cancelled.lock() {
            cancelled.retain(|&cancelled_id| cancelled_id > id);
        }
    }

    fn release_flag(&self, ticket: Ticket, session: &mut Session) -> bool {
        match ticket.kind {
            Kind::Mutation if self.latest_mutation.load(Ordering::SeqCst) == ticket.id => {
                session.is_loading = false;
                true
            }
            Kind::Probe if self.latest_probe.load(Ordering::SeqCst) == ticket.id => {
                session.is_checking_auth = false;
                true
            }
            _ => false,
        }
    }
}
