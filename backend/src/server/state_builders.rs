//! Build the HTTP dependency bundle from configured adapters.
//!
//! With a database pool the Diesel repositories back the services; without
//! one the in-memory fixtures do, which keeps local runs and smoke tests
//! working with no PostgreSQL at hand.

use std::sync::Arc;

use backend::domain::ports::{
    ArrangementRepository, FlowerRepository, IdentityProvider, MemoryStore, UserRepository,
};
use backend::domain::{CatalogService, ConnectService};
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{
    DbPool, DieselArrangementRepository, DieselFlowerRepository, DieselUserRepository,
};

pub(crate) fn build_http_state(
    pool: Option<DbPool>,
    provider: Arc<dyn IdentityProvider>,
    client_id: &str,
) -> HttpState {
    let (users, arrangements, flowers): (
        Arc<dyn UserRepository>,
        Arc<dyn ArrangementRepository>,
        Arc<dyn FlowerRepository>,
    ) = match pool {
        Some(pool) => (
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselArrangementRepository::new(pool.clone())),
            Arc::new(DieselFlowerRepository::new(pool)),
        ),
        None => {
            let store = MemoryStore::new();
            (
                Arc::new(store.users()),
                Arc::new(store.arrangements()),
                Arc::new(store.flowers()),
            )
        }
    };

    let connect = Arc::new(ConnectService::new(provider, users.clone(), client_id));
    let catalog = Arc::new(CatalogService::new(users, arrangements, flowers));
    HttpState::new(connect, catalog)
}
