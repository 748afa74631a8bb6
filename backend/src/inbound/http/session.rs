//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix cookie session behind typed accessors for the keys the
//! sign-in flow and the catalog handlers rely on, plus a small flash-notice
//! queue drained on the next rendered view. No key is trusted across login
//! flows without the nonce validation performed by the sign-in service.

use actix_session::Session;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, EstablishedSession, LoginNonce, SessionIdentity, UserId};

pub(crate) const STATE_KEY: &str = "state";
pub(crate) const ACCESS_TOKEN_KEY: &str = "access_token";
pub(crate) const SUBJECT_KEY: &str = "subject";
pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const USERNAME_KEY: &str = "username";
pub(crate) const EMAIL_KEY: &str = "email";
pub(crate) const PICTURE_KEY: &str = "picture";
pub(crate) const PROVIDER_KEY: &str = "provider";
pub(crate) const NOTICES_KEY: &str = "notices";

const LOGIN_KEYS: [&str; 7] = [
    ACCESS_TOKEN_KEY,
    SUBJECT_KEY,
    USER_ID_KEY,
    USERNAME_KEY,
    EMAIL_KEY,
    PICTURE_KEY,
    PROVIDER_KEY,
];

fn read_failure(error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to read session: {error}"))
}

fn write_failure(error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to persist session: {error}"))
}

/// Newtype wrapper exposing higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store a freshly issued anti-forgery nonce.
    pub fn issue_state(&self, nonce: &LoginNonce) -> Result<(), Error> {
        self.0
            .insert(STATE_KEY, nonce.as_ref())
            .map_err(write_failure)
    }

    /// Nonce stored by the last login page view, if any.
    pub fn state(&self) -> Result<Option<String>, Error> {
        self.0.get::<String>(STATE_KEY).map_err(read_failure)
    }

    /// Bind a successfully established sign-in to the session.
    pub fn establish(
        &self,
        established: &EstablishedSession,
        provider: &str,
    ) -> Result<(), Error> {
        self.0
            .insert(ACCESS_TOKEN_KEY, &established.access_token)
            .and_then(|()| self.0.insert(SUBJECT_KEY, &established.subject))
            .and_then(|()| self.0.insert(USER_ID_KEY, established.user.id().as_i32()))
            .and_then(|()| self.0.insert(USERNAME_KEY, established.user.name()))
            .and_then(|()| self.0.insert(EMAIL_KEY, established.user.email().as_ref()))
            .and_then(|()| self.0.insert(PICTURE_KEY, established.user.picture()))
            .and_then(|()| self.0.insert(PROVIDER_KEY, provider))
            .map_err(write_failure)
    }

    /// Provider identity bound to this session, if fully established.
    pub fn identity(&self) -> Result<Option<SessionIdentity>, Error> {
        let access_token = self.0.get::<String>(ACCESS_TOKEN_KEY).map_err(read_failure)?;
        let subject = self.0.get::<String>(SUBJECT_KEY).map_err(read_failure)?;
        Ok(match (access_token, subject) {
            (Some(access_token), Some(subject)) => Some(SessionIdentity {
                access_token,
                subject,
            }),
            _ => None,
        })
    }

    /// Access token stored at sign-in, if any.
    pub fn access_token(&self) -> Result<Option<String>, Error> {
        self.0.get::<String>(ACCESS_TOKEN_KEY).map_err(read_failure)
    }

    /// Provider name stored at sign-in, if any.
    pub fn provider(&self) -> Result<Option<String>, Error> {
        self.0.get::<String>(PROVIDER_KEY).map_err(read_failure)
    }

    /// Fetch the authenticated user's id, if present.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        Ok(self
            .0
            .get::<i32>(USER_ID_KEY)
            .map_err(read_failure)?
            .map(UserId::new))
    }

    /// Require an authenticated user id or fail with `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Remove every key the sign-in flow established.
    pub fn clear_login(&self) {
        for key in LOGIN_KEYS {
            let _ = self.0.remove(key);
        }
    }

    /// Queue a flash notice for the next rendered view.
    pub fn push_notice(&self, message: impl Into<String>) -> Result<(), Error> {
        let mut notices = self
            .0
            .get::<Vec<String>>(NOTICES_KEY)
            .map_err(read_failure)?
            .unwrap_or_default();
        notices.push(message.into());
        self.0.insert(NOTICES_KEY, notices).map_err(write_failure)
    }

    /// Drain queued flash notices.
    pub fn take_notices(&self) -> Result<Vec<String>, Error> {
        let notices = self
            .0
            .get::<Vec<String>>(NOTICES_KEY)
            .map_err(read_failure)?
            .unwrap_or_default();
        let _ = self.0.remove(NOTICES_KEY);
        Ok(notices)
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
