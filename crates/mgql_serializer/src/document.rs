//! Normalized document types.
//!
//! The shape follows JSON:API: primary `data`, a flat `included` list and
//! `{ type, id }` references between them.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// A `{ type, id }` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub type_name: String,
    pub id: String,
}

impl ResourceIdentifier {
    pub fn new(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: id.into(),
        }
    }
}

/// Relationship linkage: one (possibly empty) reference or a list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Linkage {
    One(Option<ResourceIdentifier>),
    Many(Vec<ResourceIdentifier>),
}

/// A relationship entry of a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    pub data: Linkage,
}

/// A flat record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "type")]
    pub type_name: String,
    pub id: String,
    pub attributes: IndexMap<String, Value>,
    pub relationships: IndexMap<String, Relationship>,
}

impl Record {
    pub fn new(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: id.into(),
            attributes: IndexMap::new(),
            relationships: IndexMap::new(),
        }
    }

    /// Returns the reference to this record.
    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(&self.type_name, &self.id)
    }
}

/// Primary data: a single (possibly missing) record or a list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimaryData {
    Single(Option<Record>),
    Many(Vec<Record>),
}

impl PrimaryData {
    /// Iterates the primary records.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        let slice = match self {
            Self::Single(record) => record.as_slice(),
            Self::Many(records) => records.as_slice(),
        };
        slice.iter()
    }
}

/// The normalized document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedDocument {
    pub data: PrimaryData,
    pub included: Vec<Record>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl NormalizedDocument {
    /// A document with no primary record.
    pub fn empty_single() -> Self {
        Self {
            data: PrimaryData::Single(None),
            included: Vec::new(),
            meta: None,
        }
    }

    /// Converts the document into a JSON value.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_as_json_api() {
        let mut record = Record::new("user", "1");
        record.attributes.insert("name".into(), json!("Dan Brown"));
        record.relationships.insert(
            "profile".into(),
            Relationship {
                data: Linkage::One(Some(ResourceIdentifier::new("profile", "1"))),
            },
        );

        let document = NormalizedDocument {
            data: PrimaryData::Single(Some(record)),
            included: Vec::new(),
            meta: None,
        };

        assert_eq!(
            document.to_value(),
            json!({
                "data": {
                    "type": "user",
                    "id": "1",
                    "attributes": { "name": "Dan Brown" },
                    "relationships": { "profile": { "data": { "type": "profile", "id": "1" } } }
                },
                "included": []
            })
        );
    }

    #[test]
    fn test_empty_single() {
        assert_eq!(
            NormalizedDocument::empty_single().to_value(),
            json!({ "data": null, "included": [] })
        );
    }

    #[test]
    fn test_primary_records() {
        let data = PrimaryData::Many(vec![Record::new("post", "1"), Record::new("post", "2")]);
        assert_eq!(data.records().count(), 2);
        assert_eq!(PrimaryData::Single(None).records().count(), 0);
    }
}
