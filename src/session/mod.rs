//! Session state and the store that mutates it. Pages read snapshots or
//! subscribe to changes; only the store's operations write. Passwords pass
//! through as `SecretString` and are never stored or logged.

#[cfg(test)]
pub(crate) mod fake;
mod state;
mod store;

pub use state::{Session, SessionPhase};
pub use store::{SessionError, SessionStore};
