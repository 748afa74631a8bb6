//! In-memory port implementations.
//!
//! `MemoryStore` backs the server when no database is configured and gives
//! integration tests a fully functional catalog without PostgreSQL. Ids are
//! assigned sequentially starting from 1, mirroring the serial columns of the
//! real schema. `StaticIdentityProvider` stands in for the external provider
//! and records how often the exchange endpoint was hit.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::{
    Arrangement, ArrangementAttributes, ArrangementId, ArrangementPatch, EmailAddress, Flower,
    FlowerAttributes, FlowerId, FlowerPatch, NewUser, User, UserId,
};

use super::arrangement_repository::{ArrangementPersistenceError, ArrangementRepository};
use super::flower_repository::{FlowerPersistenceError, FlowerRepository};
use super::identity_provider::{
    IdentityProvider, IdentityProviderError, ProviderProfile, ProviderTokens, TokenIntrospection,
};
use super::user_repository::{UserPersistenceError, UserRepository};

#[derive(Default)]
struct StoreState {
    users: Vec<User>,
    arrangements: Vec<Arrangement>,
    flowers: Vec<Flower>,
    next_user_id: i32,
    next_arrangement_id: i32,
    next_flower_id: i32,
}

/// Shared in-memory catalog state handed out as repository adapters.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// User repository view of this store.
    #[must_use]
    pub fn users(&self) -> MemoryUserRepository {
        MemoryUserRepository {
            store: self.clone(),
        }
    }

    /// Arrangement repository view of this store.
    #[must_use]
    pub fn arrangements(&self) -> MemoryArrangementRepository {
        MemoryArrangementRepository {
            store: self.clone(),
        }
    }

    /// Flower repository view of this store.
    #[must_use]
    pub fn flowers(&self) -> MemoryFlowerRepository {
        MemoryFlowerRepository {
            store: self.clone(),
        }
    }

    /// Insert a user directly, bypassing the repository trait. Test helper.
    pub fn seed_user(&self, user: &NewUser) -> User {
        let mut state = self.lock();
        state.next_user_id += 1;
        let stored = User::new(
            UserId::new(state.next_user_id),
            user.name().to_owned(),
            user.email().clone(),
            user.picture().map(str::to_owned),
        );
        state.users.push(stored.clone());
        stored
    }

    /// Insert an arrangement directly. Test helper.
    pub fn seed_arrangement(
        &self,
        attributes: &ArrangementAttributes,
        owner: UserId,
    ) -> Arrangement {
        let mut state = self.lock();
        state.next_arrangement_id += 1;
        let stored = Arrangement::new(
            ArrangementId::new(state.next_arrangement_id),
            attributes.clone(),
            owner,
        );
        state.arrangements.push(stored.clone());
        stored
    }

    /// Insert a flower directly. Test helper.
    pub fn seed_flower(
        &self,
        attributes: &FlowerAttributes,
        arrangement: ArrangementId,
        owner: UserId,
    ) -> Flower {
        let mut state = self.lock();
        state.next_flower_id += 1;
        let stored = Flower::new(
            FlowerId::new(state.next_flower_id),
            attributes.clone(),
            arrangement,
            owner,
        );
        state.flowers.push(stored.clone());
        stored
    }
}

/// In-memory [`UserRepository`].
#[derive(Clone)]
pub struct MemoryUserRepository {
    store: MemoryStore,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        Ok(self.store.seed_user(user))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.store.lock();
        Ok(state.users.iter().find(|user| user.id() == id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let state = self.store.lock();
        Ok(state
            .users
            .iter()
            .find(|user| user.email() == email)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self.store.lock().users.clone())
    }
}

fn patched_arrangement(
    existing: &Arrangement,
    patch: &ArrangementPatch,
) -> Result<Arrangement, ArrangementPersistenceError> {
    let attributes = ArrangementAttributes::new(
        patch.name().unwrap_or_else(|| existing.name()),
        patch.description().unwrap_or_else(|| existing.description()),
        patch
            .base_price()
            .unwrap_or_else(|| existing.base_price())
            .clone(),
        patch
            .picture()
            .or_else(|| existing.picture())
            .map(str::to_owned),
    )
    .map_err(|err| ArrangementPersistenceError::query(err.to_string()))?;
    Ok(Arrangement::new(
        existing.id(),
        attributes,
        existing.owner(),
    ))
}

/// In-memory [`ArrangementRepository`].
#[derive(Clone)]
pub struct MemoryArrangementRepository {
    store: MemoryStore,
}

#[async_trait]
impl ArrangementRepository for MemoryArrangementRepository {
    async fn create(
        &self,
        attributes: &ArrangementAttributes,
        owner: UserId,
    ) -> Result<Arrangement, ArrangementPersistenceError> {
        Ok(self.store.seed_arrangement(attributes, owner))
    }

    async fn find_by_id(
        &self,
        id: ArrangementId,
    ) -> Result<Option<Arrangement>, ArrangementPersistenceError> {
        let state = self.store.lock();
        Ok(state
            .arrangements
            .iter()
            .find(|arrangement| arrangement.id() == id)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Arrangement>, ArrangementPersistenceError> {
        Ok(self.store.lock().arrangements.clone())
    }

    async fn update(
        &self,
        id: ArrangementId,
        patch: &ArrangementPatch,
    ) -> Result<Arrangement, ArrangementPersistenceError> {
        let mut state = self.store.lock();
        let slot = state
            .arrangements
            .iter_mut()
            .find(|arrangement| arrangement.id() == id)
            .ok_or_else(|| ArrangementPersistenceError::not_found(id.as_i32()))?;
        let updated = patched_arrangement(slot, patch)?;
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: ArrangementId) -> Result<(), ArrangementPersistenceError> {
        let mut state = self.store.lock();
        let before = state.arrangements.len();
        state.arrangements.retain(|arrangement| arrangement.id() != id);
        if state.arrangements.len() == before {
            return Err(ArrangementPersistenceError::not_found(id.as_i32()));
        }
        state.flowers.retain(|flower| flower.arrangement() != id);
        Ok(())
    }
}

fn patched_flower(
    existing: &Flower,
    patch: &FlowerPatch,
) -> Result<Flower, FlowerPersistenceError> {
    let attributes = FlowerAttributes::new(
        patch.name().unwrap_or_else(|| existing.name()),
        patch.description().unwrap_or_else(|| existing.description()),
        patch.price().unwrap_or_else(|| existing.price()).clone(),
        patch
            .picture()
            .or_else(|| existing.picture())
            .map(str::to_owned),
    )
    .map_err(|err| FlowerPersistenceError::query(err.to_string()))?;
    Ok(Flower::new(
        existing.id(),
        attributes,
        existing.arrangement(),
        existing.owner(),
    ))
}

/// In-memory [`FlowerRepository`].
#[derive(Clone)]
pub struct MemoryFlowerRepository {
    store: MemoryStore,
}

#[async_trait]
impl FlowerRepository for MemoryFlowerRepository {
    async fn create(
        &self,
        attributes: &FlowerAttributes,
        arrangement: ArrangementId,
        owner: UserId,
    ) -> Result<Flower, FlowerPersistenceError> {
        Ok(self.store.seed_flower(attributes, arrangement, owner))
    }

    async fn find_by_id(&self, id: FlowerId) -> Result<Option<Flower>, FlowerPersistenceError> {
        let state = self.store.lock();
        Ok(state.flowers.iter().find(|flower| flower.id() == id).cloned())
    }

    async fn list_by_arrangement(
        &self,
        arrangement: ArrangementId,
    ) -> Result<Vec<Flower>, FlowerPersistenceError> {
        let state = self.store.lock();
        Ok(state
            .flowers
            .iter()
            .filter(|flower| flower.arrangement() == arrangement)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: FlowerId,
        patch: &FlowerPatch,
    ) -> Result<Flower, FlowerPersistenceError> {
        let mut state = self.store.lock();
        let slot = state
            .flowers
            .iter_mut()
            .find(|flower| flower.id() == id)
            .ok_or_else(|| FlowerPersistenceError::not_found(id.as_i32()))?;
        let updated = patched_flower(slot, patch)?;
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: FlowerId) -> Result<(), FlowerPersistenceError> {
        let mut state = self.store.lock();
        let before = state.flowers.len();
        state.flowers.retain(|flower| flower.id() != id);
        if state.flowers.len() == before {
            return Err(FlowerPersistenceError::not_found(id.as_i32()));
        }
        Ok(())
    }
}

/// Identity provider double serving one fixed identity.
///
/// Accepts any authorization code, introspects only its own access token, and
/// counts exchange calls so tests can assert the nonce check short-circuits
/// before any provider traffic.
pub struct StaticIdentityProvider {
    access_token: String,
    subject: String,
    audience: String,
    profile: ProviderProfile,
    exchange_calls: AtomicUsize,
    revoke_fails: AtomicBool,
}

impl StaticIdentityProvider {
    /// Create a provider asserting the given subject for the given audience.
    #[must_use]
    pub fn new(subject: impl Into<String>, audience: impl Into<String>, profile: ProviderProfile) -> Self {
        let subject = subject.into();
        Self {
            access_token: format!("access-token-{subject}"),
            subject,
            audience: audience.into(),
            profile,
            exchange_calls: AtomicUsize::new(0),
            revoke_fails: AtomicBool::new(false),
        }
    }

    /// Make subsequent `revoke` calls fail.
    pub fn fail_revocations(&self) {
        self.revoke_fails.store(true, Ordering::Relaxed);
    }

    /// Access token this provider issues.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.access_token.as_str()
    }

    /// Number of `exchange_code` calls observed.
    #[must_use]
    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn exchange_code(&self, _code: &str) -> Result<ProviderTokens, IdentityProviderError> {
        self.exchange_calls.fetch_add(1, Ordering::Relaxed);
        Ok(ProviderTokens {
            access_token: self.access_token.clone(),
            subject: self.subject.clone(),
        })
    }

    async fn introspect(
        &self,
        access_token: &str,
    ) -> Result<TokenIntrospection, IdentityProviderError> {
        if access_token != self.access_token {
            return Err(IdentityProviderError::rejected("invalid access token"));
        }
        Ok(TokenIntrospection {
            subject: self.subject.clone(),
            audience: self.audience.clone(),
        })
    }

    async fn user_info(
        &self,
        access_token: &str,
    ) -> Result<ProviderProfile, IdentityProviderError> {
        if access_token != self.access_token {
            return Err(IdentityProviderError::rejected("invalid access token"));
        }
        Ok(self.profile.clone())
    }

    async fn revoke(&self, _access_token: &str) -> Result<(), IdentityProviderError> {
        if self.revoke_fails.load(Ordering::Relaxed) {
            return Err(IdentityProviderError::rejected("revocation refused"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Price;

    fn email(raw: &str) -> EmailAddress {
        EmailAddress::new(raw).expect("valid email")
    }

    fn attributes(name: &str) -> ArrangementAttributes {
        ArrangementAttributes::new(name, "", Price::new("19.99").expect("valid price"), None)
            .expect("valid attributes")
    }

    #[tokio::test]
    async fn ids_are_assigned_sequentially_from_one() {
        let store = MemoryStore::new();
        let users = store.users();
        let first = users
            .create(&NewUser::new("Ada", email("ada@example.com"), None).expect("draft"))
            .await
            .expect("create");
        let second = users
            .create(&NewUser::new("Grace", email("grace@example.com"), None).expect("draft"))
            .await
            .expect("create");
        assert_eq!(first.id().as_i32(), 1);
        assert_eq!(second.id().as_i32(), 2);
    }

    #[tokio::test]
    async fn deleting_an_arrangement_removes_its_flowers() {
        let store = MemoryStore::new();
        let owner = store
            .seed_user(&NewUser::new("Ada", email("ada@example.com"), None).expect("draft"))
            .id();
        let arrangement = store.seed_arrangement(&attributes("Spring Bouquet"), owner);
        let flower_attributes =
            FlowerAttributes::new("Rose", "", Price::new("2.50").expect("price"), None)
                .expect("valid attributes");
        store.seed_flower(&flower_attributes, arrangement.id(), owner);

        store
            .arrangements()
            .delete(arrangement.id())
            .await
            .expect("delete");

        let remaining = store
            .flowers()
            .list_by_arrangement(arrangement.id())
            .await
            .expect("list");
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn update_keeps_unpatched_fields() {
        let store = MemoryStore::new();
        let owner = store
            .seed_user(&NewUser::new("Ada", email("ada@example.com"), None).expect("draft"))
            .id();
        let arrangement = store.seed_arrangement(&attributes("Spring Bouquet"), owner);

        let patch = ArrangementPatch::new(Some("Summer Bouquet".to_owned()), None, None, None)
            .expect("valid patch");
        let updated = store
            .arrangements()
            .update(arrangement.id(), &patch)
            .await
            .expect("update");

        assert_eq!(updated.name(), "Summer Bouquet");
        assert_eq!(updated.base_price().as_ref(), "19.99");
        assert_eq!(updated.owner(), owner);
    }

    #[tokio::test]
    async fn static_provider_counts_exchanges() {
        let provider = StaticIdentityProvider::new(
            "subject-1",
            "client-1",
            ProviderProfile {
                name: "Ada".to_owned(),
                email: "ada@example.com".to_owned(),
                picture: None,
            },
        );
        assert_eq!(provider.exchange_calls(), 0);
        let tokens = provider.exchange_code("any-code").await.expect("exchange");
        assert_eq!(provider.exchange_calls(), 1);
        let introspection = provider
            .introspect(&tokens.access_token)
            .await
            .expect("introspect");
        assert_eq!(introspection.subject, "subject-1");
        assert_eq!(introspection.audience, "client-1");
    }
}
