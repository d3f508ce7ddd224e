//! Type-name to model description lookup.

use crate::error::{Error, Result};
use crate::model::{ModelDescription, Relationship};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::Deserialize;

/// Resolves a type name to its model description.
pub trait ModelRegistry {
    /// Looks up a model by name.
    fn lookup(&self, name: &str) -> Option<&ModelDescription>;

    /// Looks up a model by name, failing if it is not registered.
    fn model_for(&self, name: &str) -> Result<&ModelDescription> {
        self.lookup(name).ok_or_else(|| Error::unknown_model(name))
    }
}

/// The model registry. Models iterate in registration order.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    models: IndexMap<String, ModelDescription, FxBuildHasher>,
}

#[derive(Deserialize)]
struct SchemaDocument {
    models: Vec<ModelDescription>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `{ "models": [...] }` schema document.
    pub fn from_json(source: &str) -> Result<Self> {
        let document: SchemaDocument = serde_json::from_str(source)?;
        let mut registry = Self::new();
        for model in document.models {
            registry.register(model);
        }
        tracing::trace!(models = registry.len(), "loaded schema");
        Ok(registry)
    }

    /// Registers a model, replacing any model with the same name in place.
    pub fn register(&mut self, model: ModelDescription) {
        self.models.insert(model.name.clone(), model);
    }

    /// Registers a model and returns the registry.
    #[must_use]
    pub fn with(mut self, model: ModelDescription) -> Self {
        self.register(model);
        self
    }

    /// Returns true if a model exists.
    pub fn has_model(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Iterates models in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelDescription> {
        self.models.values()
    }

    /// Returns every relationship whose target is not registered.
    pub fn dangling_relationships(&self) -> Vec<(&ModelDescription, &Relationship)> {
        self.iter()
            .flat_map(|model| {
                model
                    .each_relationship()
                    .filter(|rel| !self.has_model(&rel.target))
                    .map(move |rel| (model, rel))
            })
            .collect()
    }

    /// Returns the number of models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns true if no model is registered.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl ModelRegistry for SchemaRegistry {
    fn lookup(&self, name: &str) -> Option<&ModelDescription> {
        self.models.get(name)
    }
}
