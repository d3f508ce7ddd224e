//! Operation options for the standard store requests.
//!
//! | request        | operation                       | root field                  |
//! |----------------|---------------------------------|-----------------------------|
//! | `FindRecord`   | `query post`                    | `post(id: ...)`             |
//! | `FindMany`     | `query posts`                   | `posts(ids: [...])`         |
//! | `FindAll`      | `query posts`                   | `posts`                     |
//! | `Query`        | `query posts`                   | `posts(...)`                |
//! | `QueryRecord`  | `query post`                    | `post(...)`                 |
//! | `CreateRecord` | `mutation postCreate`           | `post: postCreate(...)`     |
//! | `UpdateRecord` | `mutation postUpdate`           | `post: postUpdate(id, ...)` |
//! | `DeleteRecord` | `mutation postDelete`           | `post: postDelete(id: ...)` |

use crate::compiler::compile;
use crate::planner::OperationOptions;
use mgql_core::{pluralize, Config, ModelDescription, ModelRegistry, RequestKind, Result};
use mgql_serializer::{RecordSnapshot, Serializer};
use serde_json::{Map, Value};

/// A store request.
#[derive(Debug, Clone, Copy)]
pub enum Request<'a> {
    FindRecord { id: &'a str },
    /// Several records by id in one round trip.
    FindMany { ids: &'a [Value] },
    FindAll,
    Query { query: &'a Map<String, Value> },
    QueryRecord { query: &'a Map<String, Value> },
    CreateRecord { snapshot: &'a RecordSnapshot },
    UpdateRecord { snapshot: &'a RecordSnapshot },
    DeleteRecord { id: &'a str },
}

impl Request<'_> {
    /// Returns the kind of request, which decides the response shape.
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::FindRecord { .. } => RequestKind::FindRecord,
            Self::FindMany { .. } => RequestKind::FindMany,
            Self::FindAll => RequestKind::FindAll,
            Self::Query { .. } => RequestKind::Query,
            Self::QueryRecord { .. } => RequestKind::QueryRecord,
            Self::CreateRecord { .. } => RequestKind::CreateRecord,
            Self::UpdateRecord { .. } => RequestKind::UpdateRecord,
            Self::DeleteRecord { .. } => RequestKind::DeleteRecord,
        }
    }

    /// Builds the operation options for this request against `model`.
    pub fn operation_options<R: ModelRegistry + ?Sized>(
        &self,
        model: &ModelDescription,
        registry: &R,
        config: &Config,
    ) -> Result<OperationOptions> {
        let singular = config.normalize(&model.name);
        let plural = config.normalize(&pluralize(&model.name));
        let mutation_name = |suffix: &str| config.normalize(&format!("{}{suffix}", model.name));

        let options = match *self {
            Self::FindRecord { id } => OperationOptions::query(singular).root_field_query(id_query(id)),
            Self::FindMany { ids } => {
                let mut query = Map::new();
                query.insert("ids".to_owned(), Value::Array(ids.to_vec()));
                OperationOptions::query(plural).root_field_query(query)
            }
            Self::FindAll => OperationOptions::query(plural),
            Self::Query { query } => OperationOptions::query(plural).root_field_query(query.clone()),
            Self::QueryRecord { query } => {
                OperationOptions::query(singular).root_field_query(query.clone())
            }
            Self::CreateRecord { snapshot } => {
                let data = Serializer::new(registry, config).serialize(model, snapshot, false)?;
                OperationOptions::mutation(mutation_name("Create"))
                    .root_field_alias(singular)
                    .root_field_query(data)
            }
            Self::UpdateRecord { snapshot } => {
                let data = Serializer::new(registry, config).serialize(model, snapshot, true)?;
                OperationOptions::mutation(mutation_name("Update"))
                    .root_field_alias(singular)
                    .root_field_query(data)
            }
            Self::DeleteRecord { id } => OperationOptions::mutation(mutation_name("Delete"))
                .root_field_alias(singular)
                .root_field_query(id_query(id))
                .parse_selection_set(false),
        };

        Ok(options)
    }

    /// Builds and renders the query text for this request.
    pub fn compile<R: ModelRegistry + ?Sized>(
        &self,
        model: &ModelDescription,
        registry: &R,
        config: &Config,
    ) -> Result<String> {
        let options = self.operation_options(model, registry, config)?;
        compile(model, registry, &options, config)
    }
}

fn id_query(id: &str) -> Map<String, Value> {
    let mut query = Map::new();
    query.insert("id".to_owned(), Value::String(id.to_owned()));
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use mgql_core::SchemaRegistry;

    #[test]
    fn test_kinds() {
        assert_eq!(Request::FindAll.kind(), RequestKind::FindAll);
        assert!(Request::FindRecord { id: "1" }.kind().is_singular());
        assert!(!Request::FindAll.kind().is_singular());
        assert!(!Request::FindMany { ids: &[] }.kind().is_singular());
    }

    #[test]
    fn test_delete_disables_selection_parsing() {
        let registry = SchemaRegistry::new().with(ModelDescription::new("post").attribute("name"));
        let config = Config::default();
        let options = Request::DeleteRecord { id: "1" }
            .operation_options(registry.model_for("post").unwrap(), &registry, &config)
            .unwrap();

        assert!(!options.parse_selection_set);
        assert_eq!(options.root_field_name, "postDelete");
        assert_eq!(options.root_field_alias.as_deref(), Some("post"));
    }

    #[test]
    fn test_update_sends_id_first() {
        let registry = SchemaRegistry::new().with(ModelDescription::new("post").attribute("name"));
        let config = Config::default();
        let snapshot = RecordSnapshot::new(Some("3")).attribute("name", "Renamed");
        let options = Request::UpdateRecord { snapshot: &snapshot }
            .operation_options(registry.model_for("post").unwrap(), &registry, &config)
            .unwrap();

        let keys: Vec<_> = options.root_field_query.keys().map(String::as_str).collect();
        assert_eq!(keys, ["id", "name"]);
    }
}
