use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::AppError;

/// The signed-in user every data access is performed on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(Identity),
    SignedOut,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no user is signed in")]
    NotSignedIn,
    #[error("a user is already signed in")]
    AlreadySignedIn,
    #[error("session was signed out")]
    SignedOut,
}

impl SessionError {
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::NotSignedIn => "AUTH/REQUIRED",
            SessionError::AlreadySignedIn => "AUTH/ALREADY_SIGNED_IN",
            SessionError::SignedOut => "AUTH/SIGNED_OUT",
        }
    }
}

impl From<SessionError> for AppError {
    fn from(error: SessionError) -> Self {
        let message = match error {
            SessionError::NotSignedIn | SessionError::SignedOut => "Debes iniciar sesión",
            SessionError::AlreadySignedIn => "Ya hay una sesión activa",
        };
        AppError::new(error.code(), message)
    }
}

/// Explicit replacement for an ambient "current user": callers hold one
/// session and pass it into every repository or import call.
///
/// Lifecycle is `Unauthenticated -> Authenticated -> SignedOut`. A signed
/// out session is terminal; start a new one to sign in again.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Unauthenticated,
        }
    }

    /// Shorthand for a session that has already completed sign-in.
    pub fn authenticated(identity: Identity) -> Self {
        Self {
            state: SessionState::Authenticated(identity),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn sign_in(&mut self, identity: Identity) -> Result<(), SessionError> {
        match self.state {
            SessionState::Unauthenticated => {
                tracing::info!(target: "lexdesk", event = "session_signed_in", user_id = %identity.user_id);
                self.state = SessionState::Authenticated(identity);
                Ok(())
            }
            SessionState::Authenticated(_) => Err(SessionError::AlreadySignedIn),
            SessionState::SignedOut => Err(SessionError::SignedOut),
        }
    }

    pub fn sign_out(&mut self) -> Result<Identity, SessionError> {
        match std::mem::replace(&mut self.state, SessionState::SignedOut) {
            SessionState::Authenticated(identity) => {
                tracing::info!(target: "lexdesk", event = "session_signed_out", user_id = %identity.user_id);
                Ok(identity)
            }
            previous => {
                self.state = previous;
                Err(SessionError::NotSignedIn)
            }
        }
    }

    /// The signed-in user. Never signed in and signed out both fail with
    /// `AUTH/REQUIRED`.
    pub fn identity(&self) -> Result<&Identity, SessionError> {
        match &self.state {
            SessionState::Authenticated(identity) => Ok(identity),
            SessionState::Unauthenticated | SessionState::SignedOut => Err(SessionError::NotSignedIn),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> Identity {
        Identity::new("u-ana", "ana@bufete.co")
    }

    #[test]
    fn full_lifecycle() {
        let mut session = Session::new();
        assert_eq!(session.identity(), Err(SessionError::NotSignedIn));

        session.sign_in(ana()).expect("sign in");
        assert!(session.is_authenticated());
        assert_eq!(session.identity().map(|i| i.user_id.as_str()), Ok("u-ana"));

        let identity = session.sign_out().expect("sign out");
        assert_eq!(identity, ana());
        assert_eq!(session.state(), &SessionState::SignedOut);
        assert_eq!(session.identity(), Err(SessionError::NotSignedIn));
    }

    #[test]
    fn double_sign_in_is_rejected() {
        let mut session = Session::authenticated(ana());
        assert_eq!(session.sign_in(ana()), Err(SessionError::AlreadySignedIn));
    }

    #[test]
    fn signed_out_session_is_terminal() {
        let mut session = Session::authenticated(ana());
        session.sign_out().expect("sign out");
        assert_eq!(session.sign_in(ana()), Err(SessionError::SignedOut));
        assert_eq!(session.sign_out(), Err(SessionError::NotSignedIn));
        assert_eq!(session.state(), &SessionState::SignedOut);
    }

    #[test]
    fn errors_map_to_auth_codes() {
        let app: AppError = SessionError::NotSignedIn.into();
        assert_eq!(app.code(), "AUTH/REQUIRED");
        let app: AppError = SessionError::SignedOut.into();
        assert_eq!(app.code(), "AUTH/SIGNED_OUT");
    }
}
