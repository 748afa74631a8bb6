//! Catalog aggregates: arrangements and their flowers.
//!
//! An arrangement is a named collection of flowers owned by a user. Flowers
//! belong to exactly one arrangement and inherit its owner at creation time.
//! Prices are deliberately stored as short free-form strings so the exported
//! JSON shape matches what clients already consume; the domain only enforces
//! that they are non-empty and fit the column width.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::user::UserId;

/// Validation errors raised when constructing catalog values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogValidationError {
    EmptyName,
    NameTooLong { max: usize },
    DescriptionTooLong { max: usize },
    EmptyPrice,
    PriceTooLong { max: usize },
    PictureTooLong { max: usize },
}

impl fmt::Display for CatalogValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::DescriptionTooLong { max } => {
                write!(f, "description must be at most {max} characters")
            }
            Self::EmptyPrice => write!(f, "price must not be empty"),
            Self::PriceTooLong { max } => write!(f, "price must be at most {max} characters"),
            Self::PictureTooLong { max } => {
                write!(f, "picture url must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for CatalogValidationError {}

/// Maximum length for an arrangement name, description, or picture URL.
pub const ARRANGEMENT_FIELD_MAX: usize = 250;
/// Maximum length for a flower name.
pub const FLOWER_NAME_MAX: usize = 80;
/// Maximum length for a price string.
pub const PRICE_MAX: usize = 8;

/// Stable arrangement identifier assigned by the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArrangementId(i32);

impl ArrangementId {
    /// Wrap a raw database identifier.
    #[must_use]
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    /// Access the raw identifier.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ArrangementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for ArrangementId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// Stable flower identifier assigned by the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowerId(i32);

impl FlowerId {
    /// Wrap a raw database identifier.
    #[must_use]
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    /// Access the raw identifier.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Display for FlowerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for FlowerId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// Short free-form price string, e.g. `"19.99"` or `"£7"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Price(String);

impl Price {
    /// Validate and construct a [`Price`].
    pub fn new(price: impl Into<String>) -> Result<Self, CatalogValidationError> {
        let price = price.into();
        if price.trim().is_empty() {
            return Err(CatalogValidationError::EmptyPrice);
        }
        if price.chars().count() > PRICE_MAX {
            return Err(CatalogValidationError::PriceTooLong { max: PRICE_MAX });
        }
        Ok(Self(price))
    }
}

impl AsRef<str> for Price {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Price> for String {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl TryFrom<String> for Price {
    type Error = CatalogValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

fn validate_name(name: &str, max: usize) -> Result<(), CatalogValidationError> {
    if name.trim().is_empty() {
        return Err(CatalogValidationError::EmptyName);
    }
    if name.chars().count() > max {
        return Err(CatalogValidationError::NameTooLong { max });
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), CatalogValidationError> {
    if description.chars().count() > ARRANGEMENT_FIELD_MAX {
        return Err(CatalogValidationError::DescriptionTooLong {
            max: ARRANGEMENT_FIELD_MAX,
        });
    }
    Ok(())
}

fn validate_picture(picture: Option<&str>) -> Result<(), CatalogValidationError> {
    if let Some(picture) = picture {
        if picture.chars().count() > ARRANGEMENT_FIELD_MAX {
            return Err(CatalogValidationError::PictureTooLong {
                max: ARRANGEMENT_FIELD_MAX,
            });
        }
    }
    Ok(())
}

/// A named collection of flowers owned by a user.
///
/// ## Invariants
/// - `owner` references an existing user and never changes; transfer is
///   unsupported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrangement {
    id: ArrangementId,
    name: String,
    description: String,
    base_price: Price,
    owner: UserId,
    picture: Option<String>,
}

impl Arrangement {
    /// Build an [`Arrangement`] from stored components.
    #[must_use]
    pub fn new(
        id: ArrangementId,
        attributes: ArrangementAttributes,
        owner: UserId,
    ) -> Self {
        let ArrangementAttributes {
            name,
            description,
            base_price,
            picture,
        } = attributes;
        Self {
            id,
            name,
            description,
            base_price,
            owner,
            picture,
        }
    }

    /// Stable arrangement identifier.
    #[must_use]
    pub fn id(&self) -> ArrangementId {
        self.id
    }

    /// Arrangement name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Free-form description, possibly empty.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Base price string.
    #[must_use]
    pub fn base_price(&self) -> &Price {
        &self.base_price
    }

    /// Identifier of the owning user.
    #[must_use]
    pub fn owner(&self) -> UserId {
        self.owner
    }

    /// Picture URL, if any.
    #[must_use]
    pub fn picture(&self) -> Option<&str> {
        self.picture.as_deref()
    }

    /// Whether the given user may mutate this arrangement.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == user
    }
}

/// Validated caller-supplied fields for creating an arrangement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrangementAttributes {
    name: String,
    description: String,
    base_price: Price,
    picture: Option<String>,
}

impl ArrangementAttributes {
    /// Validate and construct arrangement attributes.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        base_price: Price,
        picture: Option<String>,
    ) -> Result<Self, CatalogValidationError> {
        let name = name.into();
        let description = description.into();
        validate_name(&name, ARRANGEMENT_FIELD_MAX)?;
        validate_description(&description)?;
        validate_picture(picture.as_deref())?;
        Ok(Self {
            name,
            description,
            base_price,
            picture,
        })
    }

    /// Arrangement name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Free-form description, possibly empty.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Base price string.
    #[must_use]
    pub fn base_price(&self) -> &Price {
        &self.base_price
    }

    /// Picture URL, if any.
    #[must_use]
    pub fn picture(&self) -> Option<&str> {
        self.picture.as_deref()
    }
}

/// Partial update for an arrangement.
///
/// `None` means "leave the stored value unchanged"; the HTTP form boundary
/// maps empty inputs to `None` so unset and untouched fields are explicit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrangementPatch {
    name: Option<String>,
    description: Option<String>,
    base_price: Option<Price>,
    picture: Option<String>,
}

impl ArrangementPatch {
    /// Validate and construct a patch from optional fields.
    pub fn new(
        name: Option<String>,
        description: Option<String>,
        base_price: Option<Price>,
        picture: Option<String>,
    ) -> Result<Self, CatalogValidationError> {
        if let Some(name) = &name {
            validate_name(name, ARRANGEMENT_FIELD_MAX)?;
        }
        if let Some(description) = &description {
            validate_description(description)?;
        }
        validate_picture(picture.as_deref())?;
        Ok(Self {
            name,
            description,
            base_price,
            picture,
        })
    }

    /// Replacement name, if supplied.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Replacement description, if supplied.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Replacement base price, if supplied.
    #[must_use]
    pub fn base_price(&self) -> Option<&Price> {
        self.base_price.as_ref()
    }

    /// Replacement picture URL, if supplied.
    #[must_use]
    pub fn picture(&self) -> Option<&str> {
        self.picture.as_deref()
    }

    /// Whether the patch changes anything at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.base_price.is_none()
            && self.picture.is_none()
    }
}

/// A line item belonging to exactly one arrangement.
///
/// ## Invariants
/// - `arrangement` references an existing arrangement.
/// - `owner` equals the owner of the parent arrangement at creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flower {
    id: FlowerId,
    name: String,
    description: String,
    price: Price,
    arrangement: ArrangementId,
    owner: UserId,
    picture: Option<String>,
}

impl Flower {
    /// Build a [`Flower`] from stored components.
    #[must_use]
    pub fn new(
        id: FlowerId,
        attributes: FlowerAttributes,
        arrangement: ArrangementId,
        owner: UserId,
    ) -> Self {
        let FlowerAttributes {
            name,
            description,
            price,
            picture,
        } = attributes;
        Self {
            id,
            name,
            description,
            price,
            arrangement,
            owner,
            picture,
        }
    }

    /// Stable flower identifier.
    #[must_use]
    pub fn id(&self) -> FlowerId {
        self.id
    }

    /// Flower name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Free-form description, possibly empty.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Price string.
    #[must_use]
    pub fn price(&self) -> &Price {
        &self.price
    }

    /// Identifier of the parent arrangement.
    #[must_use]
    pub fn arrangement(&self) -> ArrangementId {
        self.arrangement
    }

    /// Identifier of the owning user, copied from the parent arrangement.
    #[must_use]
    pub fn owner(&self) -> UserId {
        self.owner
    }

    /// Picture URL, if any.
    #[must_use]
    pub fn picture(&self) -> Option<&str> {
        self.picture.as_deref()
    }
}

/// Validated caller-supplied fields for creating a flower.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowerAttributes {
    name: String,
    description: String,
    price: Price,
    picture: Option<String>,
}

impl FlowerAttributes {
    /// Validate and construct flower attributes.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Price,
        picture: Option<String>,
    ) -> Result<Self, CatalogValidationError> {
        let name = name.into();
        let description = description.into();
        validate_name(&name, FLOWER_NAME_MAX)?;
        validate_description(&description)?;
        validate_picture(picture.as_deref())?;
        Ok(Self {
            name,
            description,
            price,
            picture,
        })
    }

    /// Flower name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Free-form description, possibly empty.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Price string.
    #[must_use]
    pub fn price(&self) -> &Price {
        &self.price
    }

    /// Picture URL, if any.
    #[must_use]
    pub fn picture(&self) -> Option<&str> {
        self.picture.as_deref()
    }
}

/// Partial update for a flower, with the same `None` semantics as
/// [`ArrangementPatch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowerPatch {
    name: Option<String>,
    description: Option<String>,
    price: Option<Price>,
    picture: Option<String>,
}

impl FlowerPatch {
    /// Validate and construct a patch from optional fields.
    pub fn new(
        name: Option<String>,
        description: Option<String>,
        price: Option<Price>,
        picture: Option<String>,
    ) -> Result<Self, CatalogValidationError> {
        if let Some(name) = &name {
            validate_name(name, FLOWER_NAME_MAX)?;
        }
        if let Some(description) = &description {
            validate_description(description)?;
        }
        validate_picture(picture.as_deref())?;
        Ok(Self {
            name,
            description,
            price,
            picture,
        })
    }

    /// Replacement name, if supplied.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Replacement description, if supplied.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Replacement price, if supplied.
    #[must_use]
    pub fn price(&self) -> Option<&Price> {
        self.price.as_ref()
    }

    /// Replacement picture URL, if supplied.
    #[must_use]
    pub fn picture(&self) -> Option<&str> {
        self.picture.as_deref()
    }

    /// Whether the patch changes anything at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.picture.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn price(raw: &str) -> Price {
        Price::new(raw).expect("valid price")
    }

    #[rstest]
    #[case("19.99")]
    #[case("£7")]
    #[case("0")]
    fn accepts_short_price_strings(#[case] raw: &str) {
        assert_eq!(price(raw).as_ref(), raw);
    }

    #[rstest]
    #[case("", CatalogValidationError::EmptyPrice)]
    #[case("   ", CatalogValidationError::EmptyPrice)]
    #[case("123456789", CatalogValidationError::PriceTooLong { max: PRICE_MAX })]
    fn rejects_bad_prices(#[case] raw: &str, #[case] expected: CatalogValidationError) {
        assert_eq!(Price::new(raw).expect_err("must fail"), expected);
    }

    #[test]
    fn arrangement_attributes_reject_empty_name() {
        let err = ArrangementAttributes::new("", "", price("19.99"), None).expect_err("must fail");
        assert_eq!(err, CatalogValidationError::EmptyName);
    }

    #[test]
    fn flower_name_is_capped_at_eighty_characters() {
        let err = FlowerAttributes::new("x".repeat(81), "", price("1"), None)
            .expect_err("must fail");
        assert_eq!(
            err,
            CatalogValidationError::NameTooLong {
                max: FLOWER_NAME_MAX
            }
        );
    }

    #[test]
    fn default_patch_is_empty() {
        assert!(ArrangementPatch::default().is_empty());
        assert!(FlowerPatch::default().is_empty());
    }

    #[test]
    fn patch_with_only_name_reports_non_empty() {
        let patch = ArrangementPatch::new(Some("Spring Bouquet".to_owned()), None, None, None)
            .expect("valid patch");
        assert!(!patch.is_empty());
        assert_eq!(patch.name(), Some("Spring Bouquet"));
        assert_eq!(patch.description(), None);
    }

    #[test]
    fn ownership_check_compares_user_ids() {
        let attributes = ArrangementAttributes::new("Spring Bouquet", "", price("19.99"), None)
            .expect("valid attributes");
        let arrangement = Arrangement::new(ArrangementId::new(1), attributes, UserId::new(7));
        assert!(arrangement.is_owned_by(UserId::new(7)));
        assert!(!arrangement.is_owned_by(UserId::new(8)));
    }
}
