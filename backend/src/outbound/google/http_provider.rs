//! Reqwest-backed identity provider adapter.
//!
//! This adapter owns transport details only: request serialisation, timeout
//! and HTTP error mapping, and JSON decoding into the port's token and
//! profile types. All calls are awaited inline with a client-level timeout so
//! a slow provider surfaces as an error instead of a hung request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::domain::ports::{
    IdentityProvider, IdentityProviderError, ProviderProfile, ProviderTokens, TokenIntrospection,
};

use super::credentials::ClientCredentials;
use super::dto::{id_token_subject, TokenInfoDto, TokenResponseDto, UserInfoDto};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const TOKEN_INFO_URL: &str = "https://www.googleapis.com/oauth2/v1/tokeninfo";
const USER_INFO_URL: &str = "https://www.googleapis.com/oauth2/v1/userinfo";
const REVOKE_URL: &str = "https://accounts.google.com/o/oauth2/revoke";

/// Provider endpoint set; overridable for tests against a local double.
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    /// Authorization-code exchange endpoint.
    pub token: Url,
    /// Access-token introspection endpoint.
    pub token_info: Url,
    /// Profile endpoint.
    pub user_info: Url,
    /// Token revocation endpoint.
    pub revoke: Url,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            token: parse_known(TOKEN_URL),
            token_info: parse_known(TOKEN_INFO_URL),
            user_info: parse_known(USER_INFO_URL),
            revoke: parse_known(REVOKE_URL),
        }
    }
}

fn parse_known(url: &str) -> Url {
    Url::parse(url).unwrap_or_else(|err| panic!("constant endpoint URL failed to parse: {err}"))
}

/// Identity provider adapter performing HTTPS calls against Google's OAuth2
/// endpoints.
pub struct GoogleIdentityProvider {
    client: Client,
    credentials: ClientCredentials,
    endpoints: GoogleEndpoints,
}

impl GoogleIdentityProvider {
    /// Build an adapter with the default endpoints and request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(credentials: ClientCredentials) -> Result<Self, reqwest::Error> {
        Self::with_endpoints(credentials, GoogleEndpoints::default(), DEFAULT_REQUEST_TIMEOUT)
    }

    /// Build an adapter with explicit endpoints and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_endpoints(
        credentials: ClientCredentials,
        endpoints: GoogleEndpoints,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            credentials,
            endpoints,
        })
    }
}

fn map_transport_error(error: reqwest::Error) -> IdentityProviderError {
    IdentityProviderError::transport(error.to_string())
}

fn map_decode_error(error: reqwest::Error) -> IdentityProviderError {
    IdentityProviderError::decode(error.to_string())
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    async fn exchange_code(&self, code: &str) -> Result<ProviderTokens, IdentityProviderError> {
        let response = self
            .client
            .post(self.endpoints.token.clone())
            .form(&[
                ("code", code),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                // The login page obtains the code via the provider's postmessage flow.
                ("redirect_uri", "postmessage"),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityProviderError::exchange(format!(
                "provider returned {status}"
            )));
        }

        let dto: TokenResponseDto = response.json().await.map_err(map_decode_error)?;
        let subject = id_token_subject(&dto.id_token).map_err(IdentityProviderError::decode)?;
        Ok(ProviderTokens {
            access_token: dto.access_token,
            subject,
        })
    }

    async fn introspect(
        &self,
        access_token: &str,
    ) -> Result<TokenIntrospection, IdentityProviderError> {
        let response = self
            .client
            .get(self.endpoints.token_info.clone())
            .query(&[("access_token", access_token)])
            .send()
            .await
            .map_err(map_transport_error)?;

        let dto: TokenInfoDto = response.json().await.map_err(map_decode_error)?;
        if let Some(error) = dto.error {
            return Err(IdentityProviderError::rejected(error));
        }
        match (dto.user_id, dto.issued_to) {
            (Some(subject), Some(audience)) => Ok(TokenIntrospection { subject, audience }),
            _ => Err(IdentityProviderError::decode(
                "tokeninfo response is missing user_id or issued_to",
            )),
        }
    }

    async fn user_info(
        &self,
        access_token: &str,
    ) -> Result<ProviderProfile, IdentityProviderError> {
        let response = self
            .client
            .get(self.endpoints.user_info.clone())
            .query(&[("access_token", access_token), ("alt", "json")])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityProviderError::rejected(format!(
                "userinfo returned {status}"
            )));
        }

        let dto: UserInfoDto = response.json().await.map_err(map_decode_error)?;
        Ok(ProviderProfile {
            name: dto.name,
            email: dto.email,
            picture: dto.picture,
        })
    }

    async fn revoke(&self, access_token: &str) -> Result<(), IdentityProviderError> {
        let response = self
            .client
            .get(self.endpoints.revoke.clone())
            .query(&[("token", access_token)])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityProviderError::rejected(format!(
                "revocation returned {status}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoints_parse() {
        let endpoints = GoogleEndpoints::default();
        assert_eq!(endpoints.token.as_str(), TOKEN_URL);
        assert_eq!(endpoints.token_info.as_str(), TOKEN_INFO_URL);
        assert_eq!(endpoints.user_info.as_str(), USER_INFO_URL);
        assert_eq!(endpoints.revoke.as_str(), REVOKE_URL);
    }

    #[test]
    fn adapter_builds_with_default_timeout() {
        let credentials = ClientCredentials {
            client_id: "abc.apps.example".to_owned(),
            client_secret: "s3cret".to_owned(),
        };
        assert!(GoogleIdentityProvider::new(credentials).is_ok());
    }
}
