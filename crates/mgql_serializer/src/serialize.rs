//! Record serialization.
//!
//! A [`RecordSnapshot`] is turned into the nested object sent as the root
//! field arguments of a create or update mutation.

use indexmap::IndexMap;
use mgql_core::{relationship_id_key, Config, ModelDescription, ModelRegistry, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A point-in-time copy of a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSnapshot {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub attributes: IndexMap<String, Value>,
    #[serde(default)]
    pub relationships: IndexMap<String, SnapshotRelationship>,
}

/// The related records captured by a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotRelationship {
    HasMany(Vec<RecordSnapshot>),
    BelongsTo(Option<Box<RecordSnapshot>>),
}

impl RecordSnapshot {
    pub fn new(id: Option<&str>) -> Self {
        Self {
            id: id.map(str::to_owned),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn belongs_to(mut self, key: impl Into<String>, related: Option<RecordSnapshot>) -> Self {
        self.relationships.insert(
            key.into(),
            SnapshotRelationship::BelongsTo(related.map(Box::new)),
        );
        self
    }

    #[must_use]
    pub fn has_many(mut self, key: impl Into<String>, related: Vec<RecordSnapshot>) -> Self {
        self.relationships
            .insert(key.into(), SnapshotRelationship::HasMany(related));
        self
    }
}

/// Serializes snapshots using the model descriptions of a registry.
pub struct Serializer<'a, R: ModelRegistry + ?Sized> {
    registry: &'a R,
    config: &'a Config,
}

impl<'a, R: ModelRegistry + ?Sized> Serializer<'a, R> {
    pub fn new(registry: &'a R, config: &'a Config) -> Self {
        Self { registry, config }
    }

    /// Serializes a snapshot of `model`.
    ///
    /// Declared attributes missing from the snapshot serialize as `null`.
    /// Relationships missing from the snapshot are left out.
    pub fn serialize(
        &self,
        model: &ModelDescription,
        snapshot: &RecordSnapshot,
        include_id: bool,
    ) -> Result<Map<String, Value>> {
        let mut hash = Map::new();

        if include_id {
            if let Some(id) = &snapshot.id {
                hash.insert("id".to_owned(), Value::String(id.clone()));
            }
        }

        for attr in model.each_attribute() {
            let value = snapshot.attributes.get(attr).cloned().unwrap_or(Value::Null);
            hash.insert(self.config.normalize(attr), value);
        }

        for rel in model.each_relationship() {
            let Some(related) = snapshot.relationships.get(&rel.key) else {
                continue;
            };

            if rel.is_async() {
                let key = self.config.normalize(&relationship_id_key(&rel.key, rel.kind));
                hash.insert(key, Self::serialize_ids(related));
                continue;
            }

            let target = self.registry.model_for(&rel.target)?;
            let value = match related {
                SnapshotRelationship::BelongsTo(None) => Value::Null,
                SnapshotRelationship::BelongsTo(Some(record)) => {
                    Value::Object(self.serialize(target, record, true)?)
                }
                SnapshotRelationship::HasMany(records) => Value::Array(
                    records
                        .iter()
                        .map(|record| self.serialize(target, record, true).map(Value::Object))
                        .collect::<Result<_>>()?,
                ),
            };
            hash.insert(self.config.normalize(&rel.key), value);
        }

        Ok(hash)
    }

    fn serialize_ids(related: &SnapshotRelationship) -> Value {
        match related {
            SnapshotRelationship::BelongsTo(record) => record
                .as_ref()
                .and_then(|record| record.id.clone())
                .map_or(Value::Null, Value::String),
            SnapshotRelationship::HasMany(records) => records
                .iter()
                .filter_map(|record| record.id.clone().map(Value::String))
                .collect(),
        }
    }
}
