//! Core types for mgql.
//!
//! This crate provides the pieces shared by the planner and the serializer:
//! - `model`: Model descriptions and relationship descriptors
//! - `registry`: Type-name to model lookup
//! - `case`: Key case normalization and inflection
//! - `config`: Per-call configuration
//! - `error`: Error reporting

pub mod case;
pub mod config;
pub mod error;
pub mod model;
pub mod registry;

pub use case::{pluralize, relationship_id_key, singularize, KeyCase};
pub use config::Config;
pub use error::{Error, Result};
pub use model::{ModelDescription, Relationship, RelationshipKind, RelationshipOptions};
pub use registry::{ModelRegistry, SchemaRegistry};

/// The kind of store request a document answers.
///
/// Record-level requests produce a single primary record, collection-level
/// requests produce a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    FindRecord,
    FindMany,
    FindAll,
    Query,
    QueryRecord,
    CreateRecord,
    UpdateRecord,
    DeleteRecord,
}

impl RequestKind {
    /// Returns true if the response carries a single primary record.
    pub const fn is_singular(self) -> bool {
        !matches!(self, Self::FindMany | Self::FindAll | Self::Query)
    }

    /// Returns the store method name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FindRecord => "findRecord",
            Self::FindMany => "findMany",
            Self::FindAll => "findAll",
            Self::Query => "query",
            Self::QueryRecord => "queryRecord",
            Self::CreateRecord => "createRecord",
            Self::UpdateRecord => "updateRecord",
            Self::DeleteRecord => "deleteRecord",
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
