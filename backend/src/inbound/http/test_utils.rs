//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::Key;

use crate::domain::ports::{MemoryStore, ProviderProfile, StaticIdentityProvider};
use crate::domain::{CatalogService, ConnectService};

use super::state::HttpState;

/// Client id the fixture provider issues tokens for.
pub const TEST_CLIENT_ID: &str = "test-client-id";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Profile the fixture identity provider reports.
pub fn test_profile() -> ProviderProfile {
    ProviderProfile {
        name: "Ada Lovelace".to_owned(),
        email: "ada@example.com".to_owned(),
        picture: Some("https://example.com/ada.png".to_owned()),
    }
}

/// Build an [`HttpState`] over an in-memory store and a fixture provider.
pub fn fixture_state(store: &MemoryStore, provider: Arc<StaticIdentityProvider>) -> HttpState {
    let users = Arc::new(store.users());
    let connect = Arc::new(ConnectService::new(
        provider,
        users.clone(),
        TEST_CLIENT_ID,
    ));
    let catalog = Arc::new(CatalogService::new(
        users,
        Arc::new(store.arrangements()),
        Arc::new(store.flowers()),
    ));
    HttpState::new(connect, catalog)
}
