//! Catalog backend library modules.
//!
//! A small catalog web application: authenticated users create arrangements
//! of flowers, with ownership-gated mutation and a read-only JSON export.
//! Sign-in is delegated to an external OAuth2 identity provider.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
