//! User identity model.
//!
//! Users are created on first successful external login and never updated or
//! deleted afterwards, so the model only needs a validated draft for creation
//! and an immutable aggregate for reads.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validation errors raised when constructing user values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    NameTooLong { max: usize },
    EmptyEmail,
    EmailTooLong { max: usize },
    InvalidEmail,
    PictureTooLong { max: usize },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "user name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "user name must be at most {max} characters")
            }
            Self::EmptyEmail => write!(f, "email address must not be empty"),
            Self::EmailTooLong { max } => {
                write!(f, "email address must be at most {max} characters")
            }
            Self::InvalidEmail => write!(f, "email address is not well formed"),
            Self::PictureTooLong { max } => {
                write!(f, "picture url must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Maximum length for names, email addresses, and picture URLs.
pub const USER_FIELD_MAX: usize = 250;

/// Stable user identifier assigned by the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
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

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for UserId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Intentionally loose: one @, non-empty local part, dotted domain.
        let pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Validated email address used to resolve local users during login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if email.chars().count() > USER_FIELD_MAX {
            return Err(UserValidationError::EmailTooLong {
                max: USER_FIELD_MAX,
            });
        }
        if !email_regex().is_match(&email) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user resolved from the identity provider's profile.
///
/// ## Invariants
/// - `email` is well formed and unique across users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: String,
    email: EmailAddress,
    picture: Option<String>,
}

impl User {
    /// Build a [`User`] from stored components.
    #[must_use]
    pub fn new(id: UserId, name: String, email: EmailAddress, picture: Option<String>) -> Self {
        Self {
            id,
            name,
            email,
            picture,
        }
    }

    /// Stable user identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Display name from the provider profile.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Email address the user is keyed by.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Profile picture URL, if the provider supplied one.
    #[must_use]
    pub fn picture(&self) -> Option<&str> {
        self.picture.as_deref()
    }
}

/// Validated draft for creating a user on first login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    name: String,
    email: EmailAddress,
    picture: Option<String>,
}

impl NewUser {
    /// Validate and construct a [`NewUser`].
    pub fn new(
        name: impl Into<String>,
        email: EmailAddress,
        picture: Option<String>,
    ) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if name.chars().count() > USER_FIELD_MAX {
            return Err(UserValidationError::NameTooLong {
                max: USER_FIELD_MAX,
            });
        }
        if let Some(picture) = &picture {
            if picture.chars().count() > USER_FIELD_MAX {
                return Err(UserValidationError::PictureTooLong {
                    max: USER_FIELD_MAX,
                });
            }
        }
        Ok(Self {
            name,
            email,
            picture,
        })
    }

    /// Display name for the new user.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Email address the user will be keyed by.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Profile picture URL, if any.
    #[must_use]
    pub fn picture(&self) -> Option<&str> {
        self.picture.as_deref()
    }
}
