//! Backend entry-point: configuration, adapter wiring, server bootstrap.

mod server;

use std::env;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use backend::outbound::google::{ClientCredentials, GoogleIdentityProvider};
use backend::outbound::persistence::{run_migrations, DbPool, PoolConfig};
use server::{build_http_state, ServerConfig};

fn session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let credentials_path =
        env::var("GOOGLE_CLIENT_SECRET_FILE").unwrap_or_else(|_| "client_secret.json".into());
    let credentials = ClientCredentials::load(&credentials_path).map_err(std::io::Error::other)?;
    let client_id = credentials.client_id.clone();

    let key = session_key()?;
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);
    let bind_addr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8000".into())
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid BIND_ADDR: {e}")))?;

    let pool = match env::var("DATABASE_URL") {
        Ok(database_url) => {
            run_migrations(&database_url).map_err(std::io::Error::other)?;
            let pool = DbPool::new(PoolConfig::new(database_url))
                .await
                .map_err(std::io::Error::other)?;
            Some(pool)
        }
        Err(_) => {
            warn!("DATABASE_URL not set; falling back to the in-memory store");
            None
        }
    };

    let provider = Arc::new(GoogleIdentityProvider::new(credentials).map_err(std::io::Error::other)?);
    let http_state = build_http_state(pool, provider, &client_id);

    let config = ServerConfig::new(key, cookie_secure, SameSite::Lax, bind_addr);
    info!(addr = %config.bind_addr(), "starting catalog backend");
    server::run(config, http_state)?.await
}
