//! Port abstraction for flower persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{ArrangementId, Flower, FlowerAttributes, FlowerId, FlowerPatch, UserId};

use super::macros::define_port_error;

define_port_error! {
    /// Persistence errors raised by flower repository adapters.
    pub enum FlowerPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "flower repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "flower repository query failed: {message}",
        /// The targeted flower does not exist.
        NotFound { id: i32 } => "no flower with id {id}",
    }
}

/// Durable storage for flower records.
///
/// The repository performs no authorization; callers resolve ownership via the
/// parent arrangement before invoking `update` or `delete`.
#[async_trait]
pub trait FlowerRepository: Send + Sync {
    /// Persist a new flower and return the stored record.
    ///
    /// `owner` is the parent arrangement's owner, copied at creation time.
    async fn create(
        &self,
        attributes: &FlowerAttributes,
        arrangement: ArrangementId,
        owner: UserId,
    ) -> Result<Flower, FlowerPersistenceError>;

    /// Fetch a flower by identifier.
    async fn find_by_id(&self, id: FlowerId) -> Result<Option<Flower>, FlowerPersistenceError>;

    /// List the flowers of one arrangement in stable id order.
    async fn list_by_arrangement(
        &self,
        arrangement: ArrangementId,
    ) -> Result<Vec<Flower>, FlowerPersistenceError>;

    /// Apply a partial update and return the stored record.
    async fn update(
        &self,
        id: FlowerId,
        patch: &FlowerPatch,
    ) -> Result<Flower, FlowerPersistenceError>;

    /// Delete a flower.
    async fn delete(&self, id: FlowerId) -> Result<(), FlowerPersistenceError>;
}
