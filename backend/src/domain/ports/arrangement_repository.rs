//! Port abstraction for arrangement persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{
    Arrangement, ArrangementAttributes, ArrangementId, ArrangementPatch, UserId,
};

use super::macros::define_port_error;

define_port_error! {
    /// Persistence errors raised by arrangement repository adapters.
    pub enum ArrangementPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "arrangement repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "arrangement repository query failed: {message}",
        /// The targeted arrangement does not exist.
        NotFound { id: i32 } => "no arrangement with id {id}",
    }
}

/// Durable storage for arrangement records.
///
/// The repository performs no authorization; callers resolve ownership before
/// invoking `update` or `delete`.
#[async_trait]
pub trait ArrangementRepository: Send + Sync {
    /// Persist a new arrangement and return the stored record.
    async fn create(
        &self,
        attributes: &ArrangementAttributes,
        owner: UserId,
    ) -> Result<Arrangement, ArrangementPersistenceError>;

    /// Fetch an arrangement by identifier.
    async fn find_by_id(
        &self,
        id: ArrangementId,
    ) -> Result<Option<Arrangement>, ArrangementPersistenceError>;

    /// List all arrangements in stable id order.
    async fn list(&self) -> Result<Vec<Arrangement>, ArrangementPersistenceError>;

    /// Apply a partial update and return the stored record.
    ///
    /// Fields the patch leaves as `None` keep their stored values. Fails with
    /// [`ArrangementPersistenceError::NotFound`] when the id has no row.
    async fn update(
        &self,
        id: ArrangementId,
        patch: &ArrangementPatch,
    ) -> Result<Arrangement, ArrangementPersistenceError>;

    /// Delete an arrangement and all flowers belonging to it.
    async fn delete(&self, id: ArrangementId) -> Result<(), ArrangementPersistenceError>;
}
