//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use diesel::prelude::*;

use crate::domain::{
    Arrangement, ArrangementAttributes, ArrangementId, ArrangementPatch, EmailAddress, Flower,
    FlowerAttributes, FlowerId, FlowerPatch, User, UserId,
};

use super::schema::{arrangements, flowers, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

impl UserRow {
    /// Convert into the domain aggregate, validating the stored email.
    pub(crate) fn into_domain(self) -> Result<User, String> {
        let email = EmailAddress::new(self.email)
            .map_err(|err| format!("user {} has an invalid stored email: {err}", self.id))?;
        Ok(User::new(UserId::new(self.id), self.name, email, self.picture))
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub picture: Option<&'a str>,
}

/// Row struct for reading from the arrangements table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = arrangements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ArrangementRow {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub base_price: String,
    pub user_id: i32,
    pub picture: Option<String>,
}

impl ArrangementRow {
    /// Convert into the domain aggregate, re-validating stored fields.
    pub(crate) fn into_domain(self) -> Result<Arrangement, String> {
        let price = crate::domain::Price::new(self.base_price)
            .map_err(|err| format!("arrangement {} has an invalid stored price: {err}", self.id))?;
        let attributes =
            ArrangementAttributes::new(self.name, self.description, price, self.picture)
                .map_err(|err| format!("arrangement {} fails validation: {err}", self.id))?;
        Ok(Arrangement::new(
            ArrangementId::new(self.id),
            attributes,
            UserId::new(self.user_id),
        ))
    }
}

/// Insertable struct for creating new arrangement records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = arrangements)]
pub(crate) struct NewArrangementRow<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub base_price: &'a str,
    pub user_id: i32,
    pub picture: Option<&'a str>,
}

/// Changeset struct for partial arrangement updates; `None` fields are
/// skipped by Diesel and keep their stored values.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = arrangements)]
pub(crate) struct ArrangementChangeset<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub base_price: Option<&'a str>,
    pub picture: Option<&'a str>,
}

impl<'a> ArrangementChangeset<'a> {
    pub(crate) fn from_patch(patch: &'a ArrangementPatch) -> Self {
        Self {
            name: patch.name(),
            description: patch.description(),
            base_price: patch.base_price().map(|price| price.as_ref()),
            picture: patch.picture(),
        }
    }
}

/// Row struct for reading from the flowers table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = flowers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FlowerRow {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: String,
    pub arrangement_id: i32,
    pub user_id: i32,
    pub picture: Option<String>,
}

impl FlowerRow {
    /// Convert into the domain aggregate, re-validating stored fields.
    pub(crate) fn into_domain(self) -> Result<Flower, String> {
        let price = crate::domain::Price::new(self.price)
            .map_err(|err| format!("flower {} has an invalid stored price: {err}", self.id))?;
        let attributes = FlowerAttributes::new(self.name, self.description, price, self.picture)
            .map_err(|err| format!("flower {} fails validation: {err}", self.id))?;
        Ok(Flower::new(
            FlowerId::new(self.id),
            attributes,
            ArrangementId::new(self.arrangement_id),
            UserId::new(self.user_id),
        ))
    }
}

/// Insertable struct for creating new flower records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = flowers)]
pub(crate) struct NewFlowerRow<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub price: &'a str,
    pub arrangement_id: i32,
    pub user_id: i32,
    pub picture: Option<&'a str>,
}

/// Changeset struct for partial flower updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = flowers)]
pub(crate) struct FlowerChangeset<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub price: Option<&'a str>,
    pub picture: Option<&'a str>,
}

impl<'a> FlowerChangeset<'a> {
    pub(crate) fn from_patch(patch: &'a FlowerPatch) -> Self {
        Self {
            name: patch.name(),
            description: patch.description(),
            price: patch.price().map(|price| price.as_ref()),
            picture: patch.picture(),
        }
    }
}
