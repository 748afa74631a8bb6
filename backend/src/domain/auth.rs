//! Sign-in flow against the external identity provider.
//!
//! The flow is a short state machine: a nonce is issued with the login page,
//! the callback presents that nonce plus an authorization code, the code is
//! exchanged for tokens, the access token is introspected and checked against
//! the identity token's subject and this application's client id, and finally
//! the provider profile is resolved to a local user. Every failure collapses
//! back to the anonymous state as an authentication error.

use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;

use super::error::Error;
use super::ports::{
    IdentityProvider, IdentityProviderError, ProviderProfile, UserPersistenceError, UserRepository,
};
use super::user::{EmailAddress, NewUser, User};

/// Length of the anti-forgery nonce issued per login page view.
pub const STATE_NONCE_LEN: usize = 32;

/// Anti-forgery nonce bound to one login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginNonce(String);

impl LoginNonce {
    /// Generate a fresh random alphanumeric nonce.
    #[must_use]
    pub fn generate() -> Self {
        let value: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(STATE_NONCE_LEN)
            .map(char::from)
            .collect();
        Self(value)
    }
}

impl AsRef<str> for LoginNonce {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Provider identity already bound to the caller's session, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    /// Access token stored when the session was established.
    pub access_token: String,
    /// Provider subject the session is bound to.
    pub subject: String,
}

/// One callback attempt against the sign-in flow.
#[derive(Debug)]
pub struct ConnectAttempt<'a> {
    /// Nonce stored in the session when the login page was rendered.
    pub issued_state: Option<&'a str>,
    /// Nonce presented by the callback request.
    pub presented_state: &'a str,
    /// Authorization code posted by the client.
    pub code: &'a str,
    /// Identity already bound to this session, for idempotent reconnects.
    pub current: Option<SessionIdentity>,
}

/// Session data produced by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstablishedSession {
    /// Local user resolved (or created) from the provider profile.
    pub user: User,
    /// Access token to bind to the session.
    pub access_token: String,
    /// Provider subject the token belongs to.
    pub subject: String,
}

/// Outcome of a [`ConnectAttempt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The session is already bound to this identity; nothing changed.
    AlreadyConnected,
    /// A new session was established.
    Established(EstablishedSession),
}

fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
    }
}

fn map_exchange_error(error: IdentityProviderError) -> Error {
    Error::unauthorized(format!("failed to exchange authorization code: {error}"))
}

fn map_introspection_error(error: IdentityProviderError) -> Error {
    match error {
        // The provider answered but flagged the token; surface as an internal
        // failure per the provider-reported-error contract.
        IdentityProviderError::Rejected { message } => Error::internal(message),
        other => Error::unauthorized(format!("failed to validate access token: {other}")),
    }
}

fn map_profile_error(error: IdentityProviderError) -> Error {
    Error::unauthorized(format!("failed to fetch user profile: {error}"))
}

/// Domain service executing the sign-in state machine over provider and user
/// ports.
pub struct ConnectService {
    provider: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepository>,
    client_id: String,
}

impl ConnectService {
    /// Create a service for the given provider, user store, and registered
    /// client id.
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserRepository>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            users,
            client_id: client_id.into(),
        }
    }

    /// Run one callback attempt to completion.
    ///
    /// # Errors
    ///
    /// Returns an unauthorized error on nonce mismatch, exchange failure, or
    /// subject/audience mismatch; an internal error when the provider reports
    /// a token problem of its own.
    pub async fn connect(&self, attempt: ConnectAttempt<'_>) -> Result<ConnectOutcome, Error> {
        let ConnectAttempt {
            issued_state,
            presented_state,
            code,
            current,
        } = attempt;

        // Anti-CSRF check; nothing leaves the process until it passes.
        if issued_state != Some(presented_state) {
            return Err(Error::unauthorized("invalid state parameter"));
        }

        let tokens = self
            .provider
            .exchange_code(code)
            .await
            .map_err(map_exchange_error)?;

        let introspection = self
            .provider
            .introspect(&tokens.access_token)
            .await
            .map_err(map_introspection_error)?;
        if introspection.subject != tokens.subject {
            return Err(Error::unauthorized(
                "token subject does not match the signed-in user",
            ));
        }
        if introspection.audience != self.client_id {
            return Err(Error::unauthorized(
                "token audience does not match this application",
            ));
        }

        if let Some(current) = current {
            if current.subject == tokens.subject {
                return Ok(ConnectOutcome::AlreadyConnected);
            }
        }

        let profile = self
            .provider
            .user_info(&tokens.access_token)
            .await
            .map_err(map_profile_error)?;
        let user = self.resolve_user(profile).await?;

        Ok(ConnectOutcome::Established(EstablishedSession {
            user,
            access_token: tokens.access_token,
            subject: tokens.subject,
        }))
    }

    /// Revoke an access token with the provider.
    ///
    /// # Errors
    ///
    /// Returns an internal error when revocation fails; callers treat this as
    /// best-effort and clear local state regardless.
    pub async fn disconnect(&self, access_token: &str) -> Result<(), Error> {
        self.provider
            .revoke(access_token)
            .await
            .map_err(|err| Error::internal(format!("token revocation failed: {err}")))
    }

    async fn resolve_user(&self, profile: ProviderProfile) -> Result<User, Error> {
        let email = EmailAddress::new(profile.email).map_err(|err| {
            Error::unauthorized(format!("provider returned an invalid email address: {err}"))
        })?;

        let existing = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_persistence_error)?;
        if let Some(user) = existing {
            return Ok(user);
        }

        let draft = NewUser::new(profile.name, email, profile.picture)
            .map_err(|err| Error::unauthorized(format!("provider profile is invalid: {err}")))?;
        self.users
            .create(&draft)
            .await
            .map_err(map_user_persistence_error)
    }
}
