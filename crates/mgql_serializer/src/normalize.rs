//! Response normalization.
//!
//! A GraphQL response nests related objects inside their owner. The
//! normalizer lifts every embedded object into the flat `included` list and
//! leaves a `{ type, id }` reference behind.

use crate::document::{Linkage, NormalizedDocument, PrimaryData, Record, Relationship, ResourceIdentifier};
use inflector::Inflector;
use mgql_core::{
    pluralize, relationship_id_key, Config, Error, ModelDescription, ModelRegistry,
    Relationship as RelationshipDescriptor, RequestKind, Result,
};
use serde_json::{Map, Value};
use tracing::{debug, trace};

const TYPENAME_KEY: &str = "__typename";

/// Normalizes raw responses using the model descriptions of a registry.
pub struct Normalizer<'a, R: ModelRegistry + ?Sized> {
    registry: &'a R,
    config: &'a Config,
}

impl<'a, R: ModelRegistry + ?Sized> Normalizer<'a, R> {
    pub fn new(registry: &'a R, config: &'a Config) -> Self {
        Self { registry, config }
    }

    /// Normalizes a raw `{ data: { <root>: ... }, meta? }` payload.
    ///
    /// The root is looked up under the case-normalized model name, then its
    /// plural. `primary_id` stands in for the id of a singular primary record
    /// that does not echo one back.
    pub fn normalize_response(
        &self,
        model: &ModelDescription,
        payload: &Value,
        primary_id: Option<&str>,
        request: RequestKind,
    ) -> Result<NormalizedDocument> {
        let singular = self.config.normalize(&model.name);
        let plural = self.config.normalize(&pluralize(&model.name));

        let root = payload
            .get("data")
            .and_then(Value::as_object)
            .and_then(|data| data.get(&singular).or_else(|| data.get(&plural)))
            .ok_or_else(|| Error::MissingRootKey {
                singular: singular.clone(),
                plural: plural.clone(),
            })?;

        let meta = payload.get("meta").cloned();
        let is_singular = request.is_singular();

        let items: Vec<&Value> = match root {
            Value::Null => Vec::new(),
            Value::Array(items) => items.iter().collect(),
            item => vec![item],
        };

        let fallback_id = if is_singular { primary_id } else { None };
        let mut records = Vec::with_capacity(items.len());
        let mut included = Vec::new();
        for item in items {
            if let Some(record) = self.normalize_record(model, &model.name, item, fallback_id, &mut included)? {
                records.push(record);
            }
        }

        debug!(
            model = %model.name,
            %request,
            records = records.len(),
            included = included.len(),
            "normalized response"
        );

        let data = if is_singular {
            PrimaryData::Single(records.into_iter().next())
        } else {
            PrimaryData::Many(records)
        };

        Ok(NormalizedDocument {
            data,
            included,
            meta,
        })
    }

    fn normalize_record(
        &self,
        model: &ModelDescription,
        type_name: &str,
        item: &Value,
        fallback_id: Option<&str>,
        included: &mut Vec<Record>,
    ) -> Result<Option<Record>> {
        let empty = Map::new();
        let hash = item.as_object().unwrap_or(&empty);

        let Some(id) = hash
            .get("id")
            .and_then(id_of)
            .or_else(|| fallback_id.map(str::to_owned))
        else {
            trace!(type_name, "skipping record without id");
            return Ok(None);
        };

        let mut record = Record::new(type_name, id);

        for attr in model.each_attribute() {
            if let Some(value) = hash.get(&self.config.normalize(attr)) {
                record.attributes.insert(attr.to_owned(), value.clone());
            }
        }

        for rel in model.each_relationship() {
            let linkage = if rel.is_async() {
                let key = self.config.normalize(&relationship_id_key(&rel.key, rel.kind));
                hash.get(&key).map(|value| reference_linkage(rel, value))
            } else {
                match hash.get(&self.config.normalize(&rel.key)) {
                    Some(value) => self.embedded_linkage(rel, value, included)?,
                    None => None,
                }
            };

            if let Some(data) = linkage {
                record
                    .relationships
                    .insert(rel.key.clone(), Relationship { data });
            }
        }

        Ok(Some(record))
    }

    /// Returns `None` when the relationship holds a single object that could
    /// not be identified, so no linkage is recorded for it.
    fn embedded_linkage(
        &self,
        rel: &RelationshipDescriptor,
        value: &Value,
        included: &mut Vec<Record>,
    ) -> Result<Option<Linkage>> {
        match value {
            Value::Array(items) => {
                let mut identifiers = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(identifier) = self.embedded_identifier(rel, item, included)? {
                        identifiers.push(identifier);
                    }
                }
                Ok(Some(Linkage::Many(identifiers)))
            }
            Value::Null if rel.kind.is_many() => Ok(Some(Linkage::Many(Vec::new()))),
            item => {
                let identifier = self.embedded_identifier(rel, item, included)?;
                if identifier.is_none() && item.is_object() {
                    return Ok(None);
                }
                Ok(Some(if rel.kind.is_many() {
                    Linkage::Many(identifier.into_iter().collect())
                } else {
                    Linkage::One(identifier)
                }))
            }
        }
    }

    /// Lifts one embedded object into `included`, ahead of its own embedded
    /// records. Bare ids become references without a record. Objects without
    /// an id are dropped along with everything nested in them.
    fn embedded_identifier(
        &self,
        rel: &RelationshipDescriptor,
        item: &Value,
        included: &mut Vec<Record>,
    ) -> Result<Option<ResourceIdentifier>> {
        let Value::Object(hash) = item else {
            return Ok(id_of(item).map(|id| ResourceIdentifier::new(&rel.target, id)));
        };

        let type_name = match hash.get(TYPENAME_KEY).and_then(Value::as_str) {
            Some(typename) if rel.is_polymorphic() => typename.to_kebab_case(),
            _ => rel.target.clone(),
        };
        let target = self.registry.model_for(&type_name)?;

        let mut nested = Vec::new();
        let Some(record) = self.normalize_record(target, &type_name, item, None, &mut nested)? else {
            return Ok(None);
        };
        let identifier = record.identifier();
        included.push(record);
        included.append(&mut nested);

        Ok(Some(identifier))
    }
}

fn reference_linkage(rel: &RelationshipDescriptor, value: &Value) -> Linkage {
    let identifier = |value: &Value| id_of(value).map(|id| ResourceIdentifier::new(&rel.target, id));
    match value {
        Value::Array(items) => Linkage::Many(items.iter().filter_map(identifier).collect()),
        _ if rel.kind.is_many() => Linkage::Many(identifier(value).into_iter().collect()),
        _ => Linkage::One(identifier(value)),
    }
}

/// Reads an id from a string, a number or an object carrying an `id`.
fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(hash) => hash.get("id").and_then(id_of),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_of() {
        assert_eq!(id_of(&json!("1")), Some("1".into()));
        assert_eq!(id_of(&json!(7)), Some("7".into()));
        assert_eq!(id_of(&json!({ "id": 3 })), Some("3".into()));
        assert_eq!(id_of(&json!(null)), None);
    }

    #[test]
    fn test_reference_linkage() {
        let many = RelationshipDescriptor::has_many("posts", "post").asynchronous();
        assert_eq!(
            reference_linkage(&many, &json!(["3", 4])),
            Linkage::Many(vec![
                ResourceIdentifier::new("post", "3"),
                ResourceIdentifier::new("post", "4")
            ])
        );
        assert_eq!(reference_linkage(&many, &json!(null)), Linkage::Many(Vec::new()));

        let one = RelationshipDescriptor::belongs_to("author", "user").asynchronous();
        assert_eq!(
            reference_linkage(&one, &json!("9")),
            Linkage::One(Some(ResourceIdentifier::new("user", "9")))
        );
        assert_eq!(reference_linkage(&one, &json!(null)), Linkage::One(None));
    }
}
