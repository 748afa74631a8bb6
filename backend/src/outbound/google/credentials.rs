//! Provider client credentials loaded once at startup.
//!
//! The file uses the provider's own download format, so the registered
//! credentials can be dropped in unchanged:
//! `{"web":{"client_id":"...","client_secret":"..."}}`.

use std::path::Path;

use serde::Deserialize;

/// Failures raised while loading the credentials file.
#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    /// The file could not be read.
    #[error("failed to read client secrets at {path}: {message}")]
    Read { path: String, message: String },
    /// The file contents are not the expected JSON shape.
    #[error("failed to parse client secrets at {path}: {message}")]
    Parse { path: String, message: String },
}

#[derive(Debug, Clone, Deserialize)]
struct SecretsFile {
    web: WebSecrets,
}

#[derive(Debug, Clone, Deserialize)]
struct WebSecrets {
    client_id: String,
    client_secret: String,
}

/// Client id and secret registered with the identity provider.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    /// Registered client identifier; also the expected token audience.
    pub client_id: String,
    /// Shared secret presented during code exchange.
    pub client_secret: String,
}

impl ClientCredentials {
    /// Load credentials from the provider-format JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CredentialsError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| CredentialsError::Read {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        let file: SecretsFile =
            serde_json::from_str(&raw).map_err(|err| CredentialsError::Parse {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;
        Ok(Self {
            client_id: file.web.client_id,
            client_secret: file.web.client_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_provider_download_format() {
        let raw = r#"{"web":{"client_id":"abc.apps.example","client_secret":"s3cret","redirect_uris":["postmessage"]}}"#;
        let file: SecretsFile = serde_json::from_str(raw).expect("parse secrets");
        assert_eq!(file.web.client_id, "abc.apps.example");
        assert_eq!(file.web.client_secret, "s3cret");
    }

    #[test]
    fn load_reports_missing_files() {
        let err = ClientCredentials::load("/nonexistent/client_secret.json")
            .expect_err("missing file must fail");
        assert!(matches!(err, CredentialsError::Read { .. }));
    }
}
