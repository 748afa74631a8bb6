//! PostgreSQL-backed `FlowerRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{FlowerPersistenceError, FlowerRepository};
use crate::domain::{ArrangementId, Flower, FlowerAttributes, FlowerId, FlowerPatch, UserId};

use super::models::{FlowerChangeset, FlowerRow, NewFlowerRow};
use super::pool::{DbPool, PoolError};
use super::schema::flowers;

/// Diesel-backed implementation of the `FlowerRepository` port.
#[derive(Clone)]
pub struct DieselFlowerRepository {
    pool: DbPool,
}

impl DieselFlowerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FlowerPersistenceError {
    match error {
        PoolError::Checkout(message) | PoolError::Build(message) => {
            FlowerPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> FlowerPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    debug!(error = %error, "flower query failed");
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            FlowerPersistenceError::connection("database connection error")
        }
        other => FlowerPersistenceError::query(other.to_string()),
    }
}

fn row_to_flower(row: FlowerRow) -> Result<Flower, FlowerPersistenceError> {
    row.into_domain().map_err(FlowerPersistenceError::query)
}

#[async_trait]
impl FlowerRepository for DieselFlowerRepository {
    async fn create(
        &self,
        attributes: &FlowerAttributes,
        arrangement: ArrangementId,
        owner: UserId,
    ) -> Result<Flower, FlowerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewFlowerRow {
            name: attributes.name(),
            description: attributes.description(),
            price: attributes.price().as_ref(),
            arrangement_id: arrangement.as_i32(),
            user_id: owner.as_i32(),
            picture: attributes.picture(),
        };

        let row: FlowerRow = diesel::insert_into(flowers::table)
            .values(&new_row)
            .returning(FlowerRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_flower(row)
    }

    async fn find_by_id(&self, id: FlowerId) -> Result<Option<Flower>, FlowerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<FlowerRow> = flowers::table
            .find(id.as_i32())
            .select(FlowerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_flower).transpose()
    }

    async fn list_by_arrangement(
        &self,
        arrangement: ArrangementId,
    ) -> Result<Vec<Flower>, FlowerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<FlowerRow> = flowers::table
            .filter(flowers::arrangement_id.eq(arrangement.as_i32()))
            .order(flowers::id.asc())
            .select(FlowerRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_flower).collect()
    }

    async fn update(
        &self,
        id: FlowerId,
        patch: &FlowerPatch,
    ) -> Result<Flower, FlowerPersistenceError> {
        // An all-None changeset would be a Diesel error, not a no-op.
        if patch.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| FlowerPersistenceError::not_found(id.as_i32()));
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<FlowerRow> = diesel::update(flowers::table.find(id.as_i32()))
            .set(&FlowerChangeset::from_patch(patch))
            .returning(FlowerRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_flower)
            .transpose()?
            .ok_or_else(|| FlowerPersistenceError::not_found(id.as_i32()))
    }

    async fn delete(&self, id: FlowerId) -> Result<(), FlowerPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(flowers::table.find(id.as_i32()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(FlowerPersistenceError::not_found(id.as_i32()));
        }
        Ok(())
    }
}
