//! Model descriptions.
//!
//! A model description is the read-only view the planner and serializer have
//! of an entity: its name, its attribute names and its relationships, all in
//! declaration order.

use serde::{Deserialize, Serialize};

/// Kind of relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipKind {
    /// To-one relationship.
    BelongsTo,
    /// To-many relationship.
    HasMany,
}

impl RelationshipKind {
    /// Returns true for to-many relationships.
    pub const fn is_many(self) -> bool {
        matches!(self, Self::HasMany)
    }
}

/// Relationship options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipOptions {
    /// Related records are fetched separately; only ids travel with the owner.
    #[serde(rename = "async")]
    pub is_async: bool,
    /// The related record may be of any type.
    pub polymorphic: bool,
}

/// A relationship descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// The key the relationship is declared under.
    pub key: String,
    /// `belongsTo` or `hasMany`.
    pub kind: RelationshipKind,
    /// Name of the related model.
    #[serde(rename = "type")]
    pub target: String,
    #[serde(default)]
    pub options: RelationshipOptions,
}

impl Relationship {
    /// Creates a synchronous `belongsTo` relationship.
    pub fn belongs_to(key: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: RelationshipKind::BelongsTo,
            target: target.into(),
            options: RelationshipOptions::default(),
        }
    }

    /// Creates a synchronous `hasMany` relationship.
    pub fn has_many(key: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: RelationshipKind::HasMany,
            target: target.into(),
            options: RelationshipOptions::default(),
        }
    }

    /// Marks the relationship as asynchronous.
    #[must_use]
    pub fn asynchronous(mut self) -> Self {
        self.options.is_async = true;
        self
    }

    /// Marks the relationship as polymorphic.
    #[must_use]
    pub fn polymorphic(mut self) -> Self {
        self.options.polymorphic = true;
        self
    }

    pub fn is_async(&self) -> bool {
        self.options.is_async
    }

    pub fn is_polymorphic(&self) -> bool {
        self.options.polymorphic
    }
}

/// A model description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescription {
    /// Model (type) name.
    pub name: String,
    /// Attribute names in declaration order.
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Relationships in declaration order.
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl ModelDescription {
    /// Creates a model with no attributes or relationships.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(name.into());
        self
    }

    /// Adds several attributes.
    #[must_use]
    pub fn attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds a relationship.
    #[must_use]
    pub fn relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Iterates attribute names in declaration order.
    pub fn each_attribute(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(String::as_str)
    }

    /// Iterates relationships in declaration order.
    pub fn each_relationship(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.iter()
    }
}
