//! Wire DTOs for the provider's token and profile endpoints.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

/// Response body of the code-exchange endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponseDto {
    pub access_token: String,
    pub id_token: String,
}

/// Response body of the tokeninfo endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenInfoDto {
    pub error: Option<String>,
    pub user_id: Option<String>,
    pub issued_to: Option<String>,
}

/// Response body of the userinfo endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct UserInfoDto {
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
}

/// Extract the `sub` claim from an identity token.
///
/// The token's signature is not verified here; the flow cross-checks the
/// subject against the provider's tokeninfo endpoint instead.
pub(crate) fn id_token_subject(id_token: &str) -> Result<String, String> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| "identity token is not a JWT".to_owned())?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|err| format!("identity token payload is not base64url: {err}"))?;
    let claims: IdTokenClaims = serde_json::from_slice(&bytes)
        .map_err(|err| format!("identity token claims are malformed: {err}"))?;
    Ok(claims.sub)
}
