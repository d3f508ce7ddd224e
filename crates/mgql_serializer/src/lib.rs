//! Serializer for mgql.
//!
//! Converts in both directions between store records and the GraphQL wire
//! shape:
//! - `serialize`: A record snapshot into a nested argument object
//! - `normalize`: A nested response into a flat, linked document
//! - `document`: The normalized document types
//! - `response`: The GraphQL error envelope

pub mod document;
pub mod normalize;
pub mod response;
pub mod serialize;

pub use document::{Linkage, NormalizedDocument, PrimaryData, Record, Relationship, ResourceIdentifier};
pub use normalize::Normalizer;
pub use response::{ensure_no_errors, error_messages};
pub use serialize::{RecordSnapshot, Serializer, SnapshotRelationship};
