//! Catalog use-cases over the repository ports.
//!
//! All ownership checks live here: handlers hand over the acting user id and
//! the service refuses mutations on records the actor does not own. The
//! repositories below this service perform no authorization of their own.

use std::sync::Arc;

use super::catalog::{
    Arrangement, ArrangementAttributes, ArrangementId, ArrangementPatch, Flower, FlowerAttributes,
    FlowerId, FlowerPatch,
};
use super::error::Error;
use super::ports::{
    ArrangementPersistenceError, ArrangementRepository, FlowerPersistenceError, FlowerRepository,
    UserPersistenceError, UserRepository,
};
use super::user::{User, UserId};

const EDIT_ARRANGEMENT_DENIED: &str =
    "You are not authorized to edit this arrangement. Please create your own arrangement in order to edit.";
const DELETE_ARRANGEMENT_DENIED: &str =
    "You are not authorized to delete this arrangement. Please create your own arrangement in order to delete.";
const ADD_FLOWER_DENIED: &str =
    "You are not authorized to add flowers to this arrangement. Please create your own arrangement in order to add flowers.";
const EDIT_FLOWER_DENIED: &str =
    "You are not authorized to edit flowers in this arrangement. Please create your own arrangement in order to edit flowers.";
const DELETE_FLOWER_DENIED: &str =
    "You are not authorized to delete flowers in this arrangement. Please create your own arrangement in order to delete flowers.";

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
    }
}

fn map_arrangement_error(error: ArrangementPersistenceError) -> Error {
    match error {
        ArrangementPersistenceError::Connection { message } => Error::service_unavailable(message),
        ArrangementPersistenceError::Query { message } => Error::internal(message),
        ArrangementPersistenceError::NotFound { id } => {
            Error::not_found(format!("no arrangement with id {id}"))
        }
    }
}

fn map_flower_error(error: FlowerPersistenceError) -> Error {
    match error {
        FlowerPersistenceError::Connection { message } => Error::service_unavailable(message),
        FlowerPersistenceError::Query { message } => Error::internal(message),
        FlowerPersistenceError::NotFound { id } => {
            Error::not_found(format!("no flower with id {id}"))
        }
    }
}

/// An arrangement together with its creator and flowers, as shown on the
/// detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrangementDetail {
    /// The arrangement itself.
    pub arrangement: Arrangement,
    /// The user who created it.
    pub creator: User,
    /// Its flowers in stable id order.
    pub flowers: Vec<Flower>,
}

/// Domain service for catalog reads and owner-gated mutations.
pub struct CatalogService {
    users: Arc<dyn UserRepository>,
    arrangements: Arc<dyn ArrangementRepository>,
    flowers: Arc<dyn FlowerRepository>,
}

impl CatalogService {
    /// Create a service over the given repositories.
    pub fn new(
        users: Arc<dyn UserRepository>,
        arrangements: Arc<dyn ArrangementRepository>,
        flowers: Arc<dyn FlowerRepository>,
    ) -> Self {
        Self {
            users,
            arrangements,
            flowers,
        }
    }

    /// List all arrangements.
    pub async fn list_arrangements(&self) -> Result<Vec<Arrangement>, Error> {
        self.arrangements.list().await.map_err(map_arrangement_error)
    }

    /// Create an arrangement owned by `owner`.
    pub async fn create_arrangement(
        &self,
        owner: UserId,
        attributes: ArrangementAttributes,
    ) -> Result<Arrangement, Error> {
        self.arrangements
            .create(&attributes, owner)
            .await
            .map_err(map_arrangement_error)
    }

    /// Fetch an arrangement or fail with a typed not-found error.
    pub async fn arrangement(&self, id: ArrangementId) -> Result<Arrangement, Error> {
        self.arrangements
            .find_by_id(id)
            .await
            .map_err(map_arrangement_error)?
            .ok_or_else(|| Error::not_found(format!("no arrangement with id {id}")))
    }

    /// Fetch an arrangement with its creator and flowers.
    pub async fn arrangement_detail(&self, id: ArrangementId) -> Result<ArrangementDetail, Error> {
        let arrangement = self.arrangement(id).await?;
        let creator = self
            .users
            .find_by_id(arrangement.owner())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| {
                Error::internal(format!("arrangement {id} has no owner record"))
            })?;
        let flowers = self
            .flowers
            .list_by_arrangement(id)
            .await
            .map_err(map_flower_error)?;
        Ok(ArrangementDetail {
            arrangement,
            creator,
            flowers,
        })
    }

    /// Fetch an arrangement for its owner's edit form.
    pub async fn arrangement_for_edit(
        &self,
        actor: UserId,
        id: ArrangementId,
    ) -> Result<Arrangement, Error> {
        self.owned_arrangement(actor, id, EDIT_ARRANGEMENT_DENIED)
            .await
    }

    /// Apply an owner-gated partial update to an arrangement.
    pub async fn edit_arrangement(
        &self,
        actor: UserId,
        id: ArrangementId,
        patch: ArrangementPatch,
    ) -> Result<Arrangement, Error> {
        let arrangement = self
            .owned_arrangement(actor, id, EDIT_ARRANGEMENT_DENIED)
            .await?;
        if patch.is_empty() {
            return Ok(arrangement);
        }
        self.arrangements
            .update(id, &patch)
            .await
            .map_err(map_arrangement_error)
    }

    /// Fetch an arrangement for its owner's delete confirmation view.
    pub async fn arrangement_for_delete(
        &self,
        actor: UserId,
        id: ArrangementId,
    ) -> Result<Arrangement, Error> {
        self.owned_arrangement(actor, id, DELETE_ARRANGEMENT_DENIED)
            .await
    }

    /// Delete an arrangement and its flowers; returns the deleted record.
    pub async fn delete_arrangement(
        &self,
        actor: UserId,
        id: ArrangementId,
    ) -> Result<Arrangement, Error> {
        let arrangement = self
            .owned_arrangement(actor, id, DELETE_ARRANGEMENT_DENIED)
            .await?;
        self.arrangements
            .delete(id)
            .await
            .map_err(map_arrangement_error)?;
        Ok(arrangement)
    }

    /// Add a flower to an arrangement, copying the arrangement's owner.
    pub async fn add_flower(
        &self,
        actor: UserId,
        arrangement_id: ArrangementId,
        attributes: FlowerAttributes,
    ) -> Result<Flower, Error> {
        let arrangement = self
            .owned_arrangement(actor, arrangement_id, ADD_FLOWER_DENIED)
            .await?;
        self.flowers
            .create(&attributes, arrangement.id(), arrangement.owner())
            .await
            .map_err(map_flower_error)
    }

    /// Fetch the arrangement an authenticated user may add flowers to.
    pub async fn arrangement_for_new_flower(
        &self,
        actor: UserId,
        id: ArrangementId,
    ) -> Result<Arrangement, Error> {
        self.owned_arrangement(actor, id, ADD_FLOWER_DENIED).await
    }

    /// Fetch a flower for its owner's edit form.
    pub async fn flower_for_edit(
        &self,
        actor: UserId,
        arrangement_id: ArrangementId,
        flower_id: FlowerId,
    ) -> Result<Flower, Error> {
        let arrangement = self
            .owned_arrangement(actor, arrangement_id, EDIT_FLOWER_DENIED)
            .await?;
        self.flower_in(&arrangement, flower_id).await
    }

    /// Apply an owner-gated partial update to a flower.
    pub async fn edit_flower(
        &self,
        actor: UserId,
        arrangement_id: ArrangementId,
        flower_id: FlowerId,
        patch: FlowerPatch,
    ) -> Result<Flower, Error> {
        let arrangement = self
            .owned_arrangement(actor, arrangement_id, EDIT_FLOWER_DENIED)
            .await?;
        let flower = self.flower_in(&arrangement, flower_id).await?;
        if patch.is_empty() {
            return Ok(flower);
        }
        self.flowers
            .update(flower_id, &patch)
            .await
            .map_err(map_flower_error)
    }

    /// Fetch a flower for its owner's delete confirmation view.
    pub async fn flower_for_delete(
        &self,
        actor: UserId,
        arrangement_id: ArrangementId,
        flower_id: FlowerId,
    ) -> Result<Flower, Error> {
        let arrangement = self
            .owned_arrangement(actor, arrangement_id, DELETE_FLOWER_DENIED)
            .await?;
        self.flower_in(&arrangement, flower_id).await
    }

    /// Delete a flower; returns the deleted record.
    pub async fn delete_flower(
        &self,
        actor: UserId,
        arrangement_id: ArrangementId,
        flower_id: FlowerId,
    ) -> Result<Flower, Error> {
        let arrangement = self
            .owned_arrangement(actor, arrangement_id, DELETE_FLOWER_DENIED)
            .await?;
        let flower = self.flower_in(&arrangement, flower_id).await?;
        self.flowers
            .delete(flower_id)
            .await
            .map_err(map_flower_error)?;
        Ok(flower)
    }

    /// List all registered users for the export endpoint.
    pub async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.users.list().await.map_err(map_user_error)
    }

    /// List the flowers of one arrangement for the export endpoint.
    pub async fn arrangement_flowers(&self, id: ArrangementId) -> Result<Vec<Flower>, Error> {
        // Distinguish "empty arrangement" from "no such arrangement".
        self.arrangement(id).await?;
        self.flowers
            .list_by_arrangement(id)
            .await
            .map_err(map_flower_error)
    }

    /// Fetch one flower of one arrangement for the export endpoint.
    pub async fn flower(
        &self,
        arrangement_id: ArrangementId,
        flower_id: FlowerId,
    ) -> Result<Flower, Error> {
        let arrangement = self.arrangement(arrangement_id).await?;
        self.flower_in(&arrangement, flower_id).await
    }

    async fn owned_arrangement(
        &self,
        actor: UserId,
        id: ArrangementId,
        denial: &str,
    ) -> Result<Arrangement, Error> {
        let arrangement = self.arrangement(id).await?;
        if !arrangement.is_owned_by(actor) {
            return Err(Error::forbidden(denial));
        }
        Ok(arrangement)
    }

    async fn flower_in(
        &self,
        arrangement: &Arrangement,
        flower_id: FlowerId,
    ) -> Result<Flower, Error> {
        let flower = self
            .flowers
            .find_by_id(flower_id)
            .await
            .map_err(map_flower_error)?
            .ok_or_else(|| Error::not_found(format!("no flower with id {flower_id}")))?;
        if flower.arrangement() != arrangement.id() {
            return Err(Error::not_found(format!(
                "arrangement {} has no flower with id {flower_id}",
                arrangement.id()
            )));
        }
        Ok(flower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MemoryStore;
    use crate::domain::{EmailAddress, ErrorCode, NewUser, Price};

    fn service(store: &MemoryStore) -> CatalogService {
        CatalogService::new(
            Arc::new(store.users()),
            Arc::new(store.arrangements()),
            Arc::new(store.flowers()),
        )
    }

    fn seed_user(store: &MemoryStore, name: &str, email: &str) -> UserId {
        let email = EmailAddress::new(email).expect("valid email");
        store
            .seed_user(&NewUser::new(name, email, None).expect("draft"))
            .id()
    }

    fn attributes(name: &str, price: &str) -> ArrangementAttributes {
        ArrangementAttributes::new(name, "", Price::new(price).expect("price"), None)
            .expect("valid attributes")
    }

    fn flower_attributes(name: &str, price: &str) -> FlowerAttributes {
        FlowerAttributes::new(name, "", Price::new(price).expect("price"), None)
            .expect("valid attributes")
    }

    #[tokio::test]
    async fn create_then_fetch_round_trips_all_fields() {
        let store = MemoryStore::new();
        let catalog = service(&store);
        let owner = seed_user(&store, "Ada", "ada@example.com");

        let attributes = ArrangementAttributes::new(
            "Spring Bouquet",
            "Tulips and daffodils",
            Price::new("19.99").expect("price"),
            Some("https://example.com/spring.png".to_owned()),
        )
        .expect("valid attributes");
        let created = catalog
            .create_arrangement(owner, attributes)
            .await
            .expect("create");

        let fetched = catalog.arrangement(created.id()).await.expect("fetch");
        assert_eq!(fetched.id().as_i32(), 1);
        assert_eq!(fetched.name(), "Spring Bouquet");
        assert_eq!(fetched.description(), "Tulips and daffodils");
        assert_eq!(fetched.base_price().as_ref(), "19.99");
        assert_eq!(fetched.picture(), Some("https://example.com/spring.png"));
        assert_eq!(fetched.owner(), owner);
    }

    #[tokio::test]
    async fn missing_arrangement_is_a_typed_not_found() {
        let store = MemoryStore::new();
        let catalog = service(&store);

        let err = catalog
            .arrangement(ArrangementId::new(42))
            .await
            .expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "no arrangement with id 42");
    }

    #[tokio::test]
    async fn non_owner_cannot_edit_and_nothing_is_mutated() {
        let store = MemoryStore::new();
        let catalog = service(&store);
        let owner = seed_user(&store, "Ada", "ada@example.com");
        let intruder = seed_user(&store, "Mallory", "mallory@example.com");
        let arrangement = store.seed_arrangement(&attributes("Spring Bouquet", "19.99"), owner);

        let patch = ArrangementPatch::new(Some("Stolen Bouquet".to_owned()), None, None, None)
            .expect("patch");
        let err = catalog
            .edit_arrangement(intruder, arrangement.id(), patch)
            .await
            .expect_err("must be denied");

        assert_eq!(err.code(), ErrorCode::Forbidden);
        let unchanged = catalog
            .arrangement(arrangement.id())
            .await
            .expect("fetch");
        assert_eq!(unchanged.name(), "Spring Bouquet");
    }

    #[tokio::test]
    async fn non_owner_cannot_delete() {
        let store = MemoryStore::new();
        let catalog = service(&store);
        let owner = seed_user(&store, "Ada", "ada@example.com");
        let intruder = seed_user(&store, "Mallory", "mallory@example.com");
        let arrangement = store.seed_arrangement(&attributes("Spring Bouquet", "19.99"), owner);

        let err = catalog
            .delete_arrangement(intruder, arrangement.id())
            .await
            .expect_err("must be denied");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert!(catalog.arrangement(arrangement.id()).await.is_ok());
    }

    #[tokio::test]
    async fn partial_update_touches_only_supplied_fields() {
        let store = MemoryStore::new();
        let catalog = service(&store);
        let owner = seed_user(&store, "Ada", "ada@example.com");
        let arrangement = store.seed_arrangement(&attributes("Spring Bouquet", "19.99"), owner);
        let flower = store.seed_flower(
            &FlowerAttributes::new(
                "Rose",
                "A red rose",
                Price::new("2.50").expect("price"),
                Some("https://example.com/rose.png".to_owned()),
            )
            .expect("valid attributes"),
            arrangement.id(),
            owner,
        );

        let patch = FlowerPatch::new(Some("Peony".to_owned()), None, None, None).expect("patch");
        let updated = catalog
            .edit_flower(owner, arrangement.id(), flower.id(), patch)
            .await
            .expect("edit");

        assert_eq!(updated.name(), "Peony");
        assert_eq!(updated.description(), "A red rose");
        assert_eq!(updated.price().as_ref(), "2.50");
        assert_eq!(updated.picture(), Some("https://example.com/rose.png"));
    }

    #[tokio::test]
    async fn added_flower_copies_the_arrangement_owner() {
        let store = MemoryStore::new();
        let catalog = service(&store);
        let owner = seed_user(&store, "Ada", "ada@example.com");
        let arrangement = store.seed_arrangement(&attributes("Spring Bouquet", "19.99"), owner);

        let flower = catalog
            .add_flower(owner, arrangement.id(), flower_attributes("Rose", "2.50"))
            .await
            .expect("add");

        assert_eq!(flower.owner(), owner);
        assert_eq!(flower.arrangement(), arrangement.id());
    }

    #[tokio::test]
    async fn flower_lookup_rejects_mismatched_parent() {
        let store = MemoryStore::new();
        let catalog = service(&store);
        let owner = seed_user(&store, "Ada", "ada@example.com");
        let first = store.seed_arrangement(&attributes("Spring Bouquet", "19.99"), owner);
        let second = store.seed_arrangement(&attributes("Winter Wreath", "24.00"), owner);
        let flower = store.seed_flower(&flower_attributes("Rose", "2.50"), first.id(), owner);

        let err = catalog
            .flower(second.id(), flower.id())
            .await
            .expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn export_flower_list_is_empty_until_one_is_added() {
        let store = MemoryStore::new();
        let catalog = service(&store);
        let owner = seed_user(&store, "Ada", "ada@example.com");
        let arrangement = store.seed_arrangement(&attributes("Spring Bouquet", "19.99"), owner);

        let flowers = catalog
            .arrangement_flowers(arrangement.id())
            .await
            .expect("list");
        assert!(flowers.is_empty());

        catalog
            .add_flower(owner, arrangement.id(), flower_attributes("Rose", "2.50"))
            .await
            .expect("add");
        let flowers = catalog
            .arrangement_flowers(arrangement.id())
            .await
            .expect("list");
        assert_eq!(flowers.len(), 1);
    }

    #[tokio::test]
    async fn detail_resolves_the_creator() {
        let store = MemoryStore::new();
        let catalog = service(&store);
        let owner = seed_user(&store, "Ada", "ada@example.com");
        let arrangement = store.seed_arrangement(&attributes("Spring Bouquet", "19.99"), owner);

        let detail = catalog
            .arrangement_detail(arrangement.id())
            .await
            .expect("detail");
        assert_eq!(detail.creator.name(), "Ada");
        assert!(detail.flowers.is_empty());
    }
}
