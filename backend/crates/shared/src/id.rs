//! Common ID Types
//!
//! Type-safe wrappers for provider-assigned identifiers. Movie ids come
//! from the catalog provider and user ids from the identity provider; both
//! are opaque strings that must never be mixed up.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::app_error::{AppError, AppResult};

/// Maximum identifier length accepted from a provider
const ID_MAX_LENGTH: usize = 128;

/// Generic typed ID wrapper
///
/// Usage:
/// ```
/// use kernel::id::{Id, markers};
/// type MovieId = Id<markers::Movie>;
/// let id = MovieId::parse("27205").unwrap();
/// assert_eq!(id.as_str(), "27205");
/// ```
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// Validate and wrap a provider-assigned identifier
    ///
    /// Surrounding whitespace is trimmed. Empty identifiers, identifiers
    /// containing whitespace or `/`, and overly long identifiers are
    /// rejected with `InvalidReference`.
    pub fn parse(value: impl AsRef<str>) -> AppResult<Self> {
        let value = value.as_ref().trim();

        if value.is_empty() {
            return Err(AppError::invalid_reference("Identifier cannot be empty"));
        }

        if value.len() > ID_MAX_LENGTH {
            return Err(AppError::invalid_reference(format!(
                "Identifier must be at most {} characters",
                ID_MAX_LENGTH
            )));
        }

        if value.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(AppError::invalid_reference(
                "Identifier contains forbidden characters",
            ));
        }

        Ok(Self::from_trusted(value))
    }

    /// Wrap a value that was already validated (e.g. read back from a store)
    pub fn from_trusted(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Convert into the inner string
    pub fn into_string(self) -> String {
        self.value
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::from_trusted(self.value.clone())
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> std::str::FromStr for Id<T> {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Self::parse(s)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(|e| serde::de::Error::custom(e.message().to_string()))
    }
}

/// Marker types for different entity IDs
pub mod markers {
    /// Marker for catalog movie IDs
    pub enum Movie {}

    /// Marker for identity-provider user IDs
    pub enum User {}
}

/// Type aliases for common IDs
pub type MovieId = Id<markers::Movie>;
pub type UserId = Id<markers::User>;
