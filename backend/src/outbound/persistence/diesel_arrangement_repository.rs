//! PostgreSQL-backed `ArrangementRepository` implementation using Diesel ORM.
//!
//! Deleting an arrangement removes its flowers in the same transaction. The
//! schema's `ON DELETE CASCADE` would cover this on its own; the explicit
//! child delete keeps the behavior visible and testable here.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{ArrangementPersistenceError, ArrangementRepository};
use crate::domain::{Arrangement, ArrangementAttributes, ArrangementId, ArrangementPatch, UserId};

use super::models::{ArrangementChangeset, ArrangementRow, NewArrangementRow};
use super::pool::{DbPool, PoolError};
use super::schema::{arrangements, flowers};

/// Diesel-backed implementation of the `ArrangementRepository` port.
#[derive(Clone)]
pub struct DieselArrangementRepository {
    pool: DbPool,
}

impl DieselArrangementRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ArrangementPersistenceError {
    match error {
        PoolError::Checkout(message) | PoolError::Build(message) => {
            ArrangementPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> ArrangementPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    debug!(error = %error, "arrangement query failed");
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            ArrangementPersistenceError::connection("database connection error")
        }
        other => ArrangementPersistenceError::query(other.to_string()),
    }
}

fn row_to_arrangement(row: ArrangementRow) -> Result<Arrangement, ArrangementPersistenceError> {
    row.into_domain()
        .map_err(ArrangementPersistenceError::query)
}

#[async_trait]
impl ArrangementRepository for DieselArrangementRepository {
    async fn create(
        &self,
        attributes: &ArrangementAttributes,
        owner: UserId,
    ) -> Result<Arrangement, ArrangementPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewArrangementRow {
            name: attributes.name(),
            description: attributes.description(),
            base_price: attributes.base_price().as_ref(),
            user_id: owner.as_i32(),
            picture: attributes.picture(),
        };

        let row: ArrangementRow = diesel::insert_into(arrangements::table)
            .values(&new_row)
            .returning(ArrangementRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_arrangement(row)
    }

    async fn find_by_id(
        &self,
        id: ArrangementId,
    ) -> Result<Option<Arrangement>, ArrangementPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ArrangementRow> = arrangements::table
            .find(id.as_i32())
            .select(ArrangementRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_arrangement).transpose()
    }

    async fn list(&self) -> Result<Vec<Arrangement>, ArrangementPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ArrangementRow> = arrangements::table
            .order(arrangements::id.asc())
            .select(ArrangementRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_arrangement).collect()
    }

    async fn update(
        &self,
        id: ArrangementId,
        patch: &ArrangementPatch,
    ) -> Result<Arrangement, ArrangementPersistenceError> {
        // An all-None changeset would be a Diesel error, not a no-op.
        if patch.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| ArrangementPersistenceError::not_found(id.as_i32()));
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ArrangementRow> = diesel::update(arrangements::table.find(id.as_i32()))
            .set(&ArrangementChangeset::from_patch(patch))
            .returning(ArrangementRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_arrangement)
            .transpose()?
            .ok_or_else(|| ArrangementPersistenceError::not_found(id.as_i32()))
    }

    async fn delete(&self, id: ArrangementId) -> Result<(), ArrangementPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let raw_id = id.as_i32();

        let deleted = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    diesel::delete(
                        flowers::table.filter(flowers::arrangement_id.eq(raw_id)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(arrangements::table.find(raw_id))
                        .execute(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        if deleted == 0 {
            return Err(ArrangementPersistenceError::not_found(raw_id));
        }
        Ok(())
    }
}
