//! Port abstraction for the external identity provider.
//!
//! The provider's token-exchange protocol is a black box behind this trait:
//! the domain only sees exchanged tokens, token introspection results, and
//! profile fields. Adapters own every transport detail.

use async_trait::async_trait;

use super::macros::define_port_error;

define_port_error! {
    /// Failures raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// The provider refused to exchange the authorization code.
        Exchange { message: String } => "authorization code exchange failed: {message}",
        /// The provider reported an error for an otherwise well-formed request.
        Rejected { message: String } => "identity provider rejected the request: {message}",
        /// The provider could not be reached.
        Transport { message: String } => "identity provider request failed: {message}",
        /// The provider's response could not be decoded.
        Decode { message: String } => "identity provider response could not be decoded: {message}",
    }
}

/// Tokens obtained by exchanging an authorization code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderTokens {
    /// Bearer token for subsequent provider calls.
    pub access_token: String,
    /// Subject identifier asserted by the identity token.
    pub subject: String,
}

/// Result of introspecting an access token with the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIntrospection {
    /// Subject the access token was issued for.
    pub subject: String,
    /// Client identifier the access token was issued to.
    pub audience: String,
}

/// Profile fields returned by the provider's user-info endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Profile picture URL, if any.
    pub picture: Option<String>,
}

/// External OAuth2-style identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange an authorization code for tokens.
    async fn exchange_code(&self, code: &str) -> Result<ProviderTokens, IdentityProviderError>;

    /// Validate an access token and report its subject and audience.
    async fn introspect(
        &self,
        access_token: &str,
    ) -> Result<TokenIntrospection, IdentityProviderError>;

    /// Fetch the profile of the user the access token belongs to.
    async fn user_info(&self, access_token: &str)
        -> Result<ProviderProfile, IdentityProviderError>;

    /// Revoke an access token. Best-effort; callers decide how to react.
    async fn revoke(&self, access_token: &str) -> Result<(), IdentityProviderError>;
}
