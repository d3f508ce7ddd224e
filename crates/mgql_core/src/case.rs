//! Key case normalization and inflection.
//!
//! The same [`KeyCase`] must be used when building a query and when parsing
//! its response, otherwise the keys requested and the keys read back drift
//! apart.

use crate::model::RelationshipKind;
use inflector::Inflector;
use std::fmt;
use std::sync::Arc;

/// A caller supplied key transformation.
pub type CaseFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// How model keys map to field names on the wire.
#[derive(Clone, Default)]
pub enum KeyCase {
    /// `first_name` -> `firstName`.
    #[default]
    Camel,
    /// `firstName` -> `first_name`.
    Snake,
    /// Any other policy.
    Custom(CaseFn),
}

impl KeyCase {
    /// Wraps a closure as a custom policy.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Applies the policy to a key.
    pub fn normalize(&self, key: &str) -> String {
        match self {
            Self::Camel => key.to_camel_case(),
            Self::Snake => key.to_snake_case(),
            Self::Custom(f) => f(key),
        }
    }
}

impl fmt::Debug for KeyCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Camel => f.write_str("Camel"),
            Self::Snake => f.write_str("Snake"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Returns the plural form of a word.
pub fn pluralize(word: &str) -> String {
    word.to_plural()
}

/// Returns the singular form of a word.
pub fn singularize(word: &str) -> String {
    word.to_singular()
}

/// Returns the id-reference key for a relationship, before case normalization.
///
/// `author` (belongsTo) becomes `authorId`, `comments` (hasMany) becomes
/// `commentIds`.
pub fn relationship_id_key(key: &str, kind: RelationshipKind) -> String {
    let suffix = match kind {
        RelationshipKind::BelongsTo => "Id",
        RelationshipKind::HasMany => "Ids",
    };
    format!("{}{suffix}", singularize(key))
}
