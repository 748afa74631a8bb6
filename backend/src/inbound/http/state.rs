//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain services and remain testable without real I/O behind them.

use std::sync::Arc;

use crate::domain::{CatalogService, ConnectService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Sign-in flow against the external identity provider.
    pub connect: Arc<ConnectService>,
    /// Catalog reads and owner-gated mutations.
    pub catalog: Arc<CatalogService>,
}

impl HttpState {
    /// Bundle the two domain services handlers depend on.
    pub fn new(connect: Arc<ConnectService>, catalog: Arc<CatalogService>) -> Self {
        Self { connect, catalog }
    }
}
