//! Port traits decoupling the domain from persistence and the identity
//! provider, plus in-memory fixtures used by tests and the no-database
//! fallback.

mod arrangement_repository;
mod fixtures;
mod flower_repository;
mod identity_provider;
mod macros;
mod user_repository;

pub use arrangement_repository::{ArrangementPersistenceError, ArrangementRepository};
pub use fixtures::{
    MemoryArrangementRepository, MemoryFlowerRepository, MemoryStore, MemoryUserRepository,
    StaticIdentityProvider,
};
pub use flower_repository::{FlowerPersistenceError, FlowerRepository};
pub use identity_provider::{
    IdentityProvider, IdentityProviderError, ProviderProfile, ProviderTokens, TokenIntrospection,
};
pub use user_repository::{UserPersistenceError, UserRepository};
