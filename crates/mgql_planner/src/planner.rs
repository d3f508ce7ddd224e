//! Query planning.
//!
//! The planner walks a model description and its relationship graph and
//! builds the field tree that says what to ask for. Every object field starts
//! with `id`.

use mgql_core::{
    pluralize, relationship_id_key, Config, ModelDescription, ModelRegistry, Relationship,
    Result,
};
use mgql_syntax::{ArgumentSet, Field, Operation, OperationType, SelectionSet};
use rustc_hash::FxHashSet;
use serde_json::{Map, Value};
use tracing::{debug, trace};

const ID_FIELD: &str = "id";
const TYPENAME_FIELD: &str = "__typename";

/// Options describing the operation to build.
#[derive(Debug, Clone)]
pub struct OperationOptions {
    pub operation_type: OperationType,
    pub operation_name: String,
    pub root_field_name: String,
    pub root_field_alias: Option<String>,
    /// Root field arguments, in key order.
    pub root_field_query: Map<String, Value>,
    /// Request attributes and relationships, not only `id`.
    pub parse_selection_set: bool,
}

impl OperationOptions {
    pub fn new(
        operation_type: OperationType,
        operation_name: impl Into<String>,
        root_field_name: impl Into<String>,
    ) -> Self {
        Self {
            operation_type,
            operation_name: operation_name.into(),
            root_field_name: root_field_name.into(),
            root_field_alias: None,
            root_field_query: Map::new(),
            parse_selection_set: true,
        }
    }

    /// A `query` whose operation and root field share a name.
    pub fn query(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(OperationType::Query, name.clone(), name)
    }

    /// A `mutation` whose operation and root field share a name.
    pub fn mutation(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(OperationType::Mutation, name.clone(), name)
    }

    #[must_use]
    pub fn root_field_alias(mut self, alias: impl Into<String>) -> Self {
        self.root_field_alias = Some(alias.into());
        self
    }

    #[must_use]
    pub fn root_field_query(mut self, query: Map<String, Value>) -> Self {
        self.root_field_query = query;
        self
    }

    #[must_use]
    pub fn parse_selection_set(mut self, parse: bool) -> Self {
        self.parse_selection_set = parse;
        self
    }
}

/// Builds operation trees from model descriptions.
pub struct Planner<'a, R: ModelRegistry + ?Sized> {
    registry: &'a R,
    config: &'a Config,
}

impl<'a, R: ModelRegistry + ?Sized> Planner<'a, R> {
    pub fn new(registry: &'a R, config: &'a Config) -> Self {
        Self { registry, config }
    }

    /// Builds the operation described by `options` for `model`.
    pub fn plan(&self, model: &ModelDescription, options: &OperationOptions) -> Result<Operation> {
        let operation = Operation::new(options.operation_type, options.operation_name.clone());
        let root_field = Field::new(options.root_field_name.clone())
            .with_alias(options.root_field_alias.clone())
            .with_arguments(ArgumentSet::from_query(&options.root_field_query));

        self.parse(model, operation, root_field, options.parse_selection_set)
    }

    /// Fills the root field's selection set and attaches it to the operation.
    ///
    /// Without `parse_selection_set` only `id` is requested.
    pub fn parse(
        &self,
        model: &ModelDescription,
        mut operation: Operation,
        mut root_field: Field,
        parse_selection_set: bool,
    ) -> Result<Operation> {
        root_field.selection_set.push(Field::new(ID_FIELD));

        if parse_selection_set {
            let mut expanded = FxHashSet::default();
            expanded.insert(model.name.clone());
            self.visit_model(model, &mut root_field.selection_set, &mut expanded)?;
        }

        debug!(
            model = %model.name,
            operation = %operation.name,
            fields = root_field.selection_set.len(),
            "planned operation"
        );

        operation.selection_set.push(root_field);
        Ok(operation)
    }

    fn visit_model(
        &self,
        model: &ModelDescription,
        selection_set: &mut SelectionSet,
        expanded: &mut FxHashSet<String>,
    ) -> Result<()> {
        for attr in model.each_attribute() {
            selection_set.push(Field::new(self.config.normalize(attr)));
        }

        for rel in model.each_relationship() {
            self.visit_relationship(rel, selection_set, expanded)?;
        }

        Ok(())
    }

    /// `expanded` holds every model type whose fields have been requested in
    /// this operation, starting with the root model. A synchronous
    /// relationship to a type already in the set only requests `id` (and
    /// `__typename` when polymorphic), so each type is expanded at most once.
    fn visit_relationship(
        &self,
        rel: &Relationship,
        selection_set: &mut SelectionSet,
        expanded: &mut FxHashSet<String>,
    ) -> Result<()> {
        if rel.is_async() {
            let key = relationship_id_key(&rel.key, rel.kind);
            selection_set.push(Field::new(self.config.normalize(&key)));
            return Ok(());
        }

        let target = self.registry.model_for(&rel.target)?;

        let normalized_key = self.config.normalize(&rel.key);
        let normalized_type = if rel.kind.is_many() {
            self.config.normalize(&pluralize(&rel.target))
        } else {
            self.config.normalize(&rel.target)
        };

        let mut field = if normalized_key == normalized_type {
            Field::new(normalized_key)
        } else {
            Field::new(normalized_type).with_alias(Some(normalized_key))
        };

        field.selection_set.push(Field::new(ID_FIELD));
        if rel.is_polymorphic() {
            field.selection_set.push(Field::new(TYPENAME_FIELD));
        }

        if expanded.insert(target.name.clone()) {
            self.visit_model(target, &mut field.selection_set, expanded)?;
        } else {
            trace!(relationship = %rel.key, target = %rel.target, "target already expanded, requesting id only");
        }

        selection_set.push(field);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mgql_core::{Error, KeyCase, SchemaRegistry};

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new()
            .with(
                ModelDescription::new("project")
                    .attributes(["status", "name"])
                    .relationship(Relationship::belongs_to("user", "user")),
            )
            .with(
                ModelDescription::new("user")
                    .attribute("name")
                    .relationship(Relationship::belongs_to("address", "address"))
                    .relationship(Relationship::belongs_to("project", "project")),
            )
            .with(
                ModelDescription::new("address")
                    .attributes(["city", "country"])
                    .relationship(Relationship::belongs_to("user", "user")),
            )
            .with(
                ModelDescription::new("node")
                    .attribute("name")
                    .relationship(Relationship::belongs_to("parent", "node"))
                    .relationship(Relationship::has_many("children", "node")),
            )
    }

    fn plan(model: &str) -> Operation {
        let registry = registry();
        let config = Config::default();
        let options = OperationOptions::query(format!("{model}Query"));
        Planner::new(&registry, &config)
            .plan(registry.model_for(model).unwrap(), &options)
            .unwrap()
    }

    fn names(set: &SelectionSet) -> Vec<&str> {
        set.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_root_is_operation() {
        let operation = plan("project");
        assert_eq!(operation.operation_type, OperationType::Query);
        assert_eq!(operation.name, "projectQuery");
        assert_eq!(operation.selection_set.len(), 1);
        assert_eq!(operation.root_field().unwrap().name, "projectQuery");
    }

    #[test]
    fn test_attributes_and_relationships() {
        let operation = plan("project");
        let root = operation.root_field().unwrap();
        assert_eq!(names(&root.selection_set), ["id", "status", "name", "user"]);

        let user = root.selection_set.get(3).unwrap();
        assert_eq!(names(&user.selection_set), ["id", "name", "address", "project"]);

        let address = user.selection_set.get(2).unwrap();
        assert_eq!(names(&address.selection_set), ["id", "city", "country", "user"]);
        assert_eq!(names(&address.selection_set.get(3).unwrap().selection_set), ["id"]);

        let project = user.selection_set.get(3).unwrap();
        assert_eq!(names(&project.selection_set), ["id"]);
    }

    #[test]
    fn test_reflexive_relationships() {
        let operation = plan("node");
        let root = operation.root_field().unwrap();
        assert_eq!(names(&root.selection_set), ["id", "name", "node", "nodes"]);

        let parent = root.selection_set.get(2).unwrap();
        assert_eq!(parent.alias.as_deref(), Some("parent"));
        assert_eq!(names(&parent.selection_set), ["id"]);

        let children = root.selection_set.get(3).unwrap();
        assert_eq!(children.alias.as_deref(), Some("children"));
        assert_eq!(names(&children.selection_set), ["id"]);
    }

    #[test]
    fn test_mutual_references_terminate() {
        let registry = SchemaRegistry::new()
            .with(ModelDescription::new("a").relationship(Relationship::belongs_to("b", "b")))
            .with(ModelDescription::new("b").relationship(Relationship::belongs_to("a", "a")));
        let config = Config::default();

        let operation = Planner::new(&registry, &config)
            .plan(registry.model_for("a").unwrap(), &OperationOptions::query("a"))
            .unwrap();

        let root = operation.root_field().unwrap();
        assert_eq!(names(&root.selection_set), ["id", "b"]);

        let b = root.selection_set.get(1).unwrap();
        assert_eq!(names(&b.selection_set), ["id", "a"]);
        assert_eq!(names(&b.selection_set.get(1).unwrap().selection_set), ["id"]);
    }

    fn count_fields(set: &SelectionSet) -> usize {
        set.iter().map(|f| 1 + count_fields(&f.selection_set)).sum()
    }

    #[test]
    fn test_many_self_references_stay_bounded() {
        let model = (0..12).fold(ModelDescription::new("user").attribute("name"), |model, i| {
            model.relationship(Relationship::belongs_to(format!("rel{i}"), "user"))
        });
        let registry = SchemaRegistry::new().with(model);
        let config = Config::default();

        let operation = Planner::new(&registry, &config)
            .plan(registry.model_for("user").unwrap(), &OperationOptions::query("user"))
            .unwrap();

        let root = operation.root_field().unwrap();
        // id, name, then twelve `relN: user { id }` fields.
        assert_eq!(count_fields(&root.selection_set), 26);
        assert!(root.selection_set.iter().skip(2).all(|f| names(&f.selection_set) == ["id"]));
    }

    #[test]
    fn test_has_many_back_reference_is_not_expanded_again() {
        let registry = SchemaRegistry::new()
            .with(
                ModelDescription::new("post")
                    .attribute("title")
                    .relationship(Relationship::belongs_to("author", "user")),
            )
            .with(
                ModelDescription::new("user")
                    .attribute("name")
                    .relationship(Relationship::has_many("posts", "post")),
            );
        let config = Config::default();

        let operation = Planner::new(&registry, &config)
            .plan(registry.model_for("post").unwrap(), &OperationOptions::query("post"))
            .unwrap();

        let author = operation.root_field().unwrap().selection_set.get(2).unwrap();
        assert_eq!(author.name, "user");
        assert_eq!(names(&author.selection_set), ["id", "name", "posts"]);
        assert_eq!(names(&author.selection_set.get(2).unwrap().selection_set), ["id"]);
    }

    #[test]
    fn test_expanded_once_per_operation() {
        let registry = SchemaRegistry::new()
            .with(
                ModelDescription::new("post")
                    .relationship(Relationship::belongs_to("author", "user"))
                    .relationship(Relationship::belongs_to("editor", "user")),
            )
            .with(ModelDescription::new("user").attribute("name"));
        let config = Config::default();

        let operation = Planner::new(&registry, &config)
            .plan(registry.model_for("post").unwrap(), &OperationOptions::query("post"))
            .unwrap();

        let root = operation.root_field().unwrap();
        assert_eq!(names(&root.selection_set.get(1).unwrap().selection_set), ["id", "name"]);
        assert_eq!(names(&root.selection_set.get(2).unwrap().selection_set), ["id"]);
    }

    #[test]
    fn test_async_relationships_request_ids() {
        let registry = SchemaRegistry::new()
            .with(
                ModelDescription::new("post")
                    .attribute("title")
                    .relationship(Relationship::belongs_to("author", "user").asynchronous())
                    .relationship(Relationship::has_many("comments", "comment").asynchronous()),
            );
        let config = Config::default();

        let operation = Planner::new(&registry, &config)
            .plan(registry.model_for("post").unwrap(), &OperationOptions::query("post"))
            .unwrap();

        let root = operation.root_field().unwrap();
        assert_eq!(names(&root.selection_set), ["id", "title", "authorId", "commentIds"]);
        assert!(root.selection_set.iter().all(Field::is_leaf));
    }

    #[test]
    fn test_alias_only_when_key_differs_from_type() {
        let registry = SchemaRegistry::new()
            .with(
                ModelDescription::new("post")
                    .relationship(Relationship::has_many("topComments", "comment"))
                    .relationship(Relationship::has_many("comments", "comment")),
            )
            .with(ModelDescription::new("comment").attribute("body"));
        let config = Config::default();

        let operation = Planner::new(&registry, &config)
            .plan(registry.model_for("post").unwrap(), &OperationOptions::query("post"))
            .unwrap();

        let root = operation.root_field().unwrap();
        let top = root.selection_set.get(1).unwrap();
        assert_eq!(top.name, "comments");
        assert_eq!(top.alias.as_deref(), Some("topComments"));

        let plain = root.selection_set.get(2).unwrap();
        assert_eq!(plain.name, "comments");
        assert!(plain.alias.is_none());
    }

    #[test]
    fn test_polymorphic_requests_typename() {
        let registry = SchemaRegistry::new()
            .with(
                ModelDescription::new("comment")
                    .relationship(Relationship::belongs_to("subject", "post").polymorphic()),
            )
            .with(ModelDescription::new("post").attribute("title"));
        let config = Config::default();

        let operation = Planner::new(&registry, &config)
            .plan(registry.model_for("comment").unwrap(), &OperationOptions::query("comment"))
            .unwrap();

        let subject = operation.root_field().unwrap().selection_set.get(1).unwrap();
        assert_eq!(names(&subject.selection_set), ["id", "__typename", "title"]);
    }

    #[test]
    fn test_selection_parsing_disabled() {
        let registry = registry();
        let config = Config::default();
        let options = OperationOptions::mutation("projectDelete").parse_selection_set(false);

        let operation = Planner::new(&registry, &config)
            .plan(registry.model_for("project").unwrap(), &options)
            .unwrap();

        assert_eq!(names(&operation.root_field().unwrap().selection_set), ["id"]);
    }

    #[test]
    fn test_case_policy_applies_to_fields() {
        let registry = SchemaRegistry::new().with(
            ModelDescription::new("account")
                .attribute("firstName")
                .relationship(Relationship::has_many("posts", "post").asynchronous()),
        );
        let config = Config::new().key_case(KeyCase::Snake);

        let operation = Planner::new(&registry, &config)
            .plan(registry.model_for("account").unwrap(), &OperationOptions::query("account"))
            .unwrap();

        assert_eq!(
            names(&operation.root_field().unwrap().selection_set),
            ["id", "first_name", "post_ids"]
        );
    }

    #[test]
    fn test_unknown_target_is_fatal() {
        let registry = SchemaRegistry::new()
            .with(ModelDescription::new("post").relationship(Relationship::belongs_to("author", "user")));
        let config = Config::default();

        let result = Planner::new(&registry, &config)
            .plan(registry.model_for("post").unwrap(), &OperationOptions::query("post"));

        assert!(matches!(result, Err(Error::UnknownModel { name }) if name == "user"));
    }
}
