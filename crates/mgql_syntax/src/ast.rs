//! Query tree types for mgql.
//!
//! An [`Operation`] owns a root [`SelectionSet`], each [`Field`] owns its own
//! [`ArgumentSet`] and nested selection. Trees are built per request and
//! rendered once.

use serde_json::{Map, Number, Value};
use std::fmt;

/// Type of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OperationType {
    #[default]
    Query,
    Mutation,
}

impl OperationType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    Null,
    Boolean(bool),
    Number(Number),
    String(String),
    List(Vec<ArgumentValue>),
    /// Nested object argument.
    Object(ArgumentSet),
}

impl From<&str> for ArgumentValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ArgumentValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ArgumentValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for ArgumentValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<i64> for ArgumentValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for ArgumentValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

/// Non-finite floats have no literal form and become `null`.
impl From<f64> for ArgumentValue {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<ArgumentSet> for ArgumentValue {
    fn from(value: ArgumentSet) -> Self {
        Self::Object(value)
    }
}

impl<T: Into<ArgumentValue>> From<Vec<T>> for ArgumentValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<&Value> for ArgumentValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Boolean(*b),
            Value::Number(n) => Self::Number(n.clone()),
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from).collect()),
            Value::Object(map) => Self::Object(ArgumentSet::from_query(map)),
        }
    }
}

impl From<Value> for ArgumentValue {
    fn from(value: Value) -> Self {
        Self::from(&value)
    }
}

/// A named argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub value: ArgumentValue,
}

impl Argument {
    pub fn new(name: impl Into<String>, value: impl Into<ArgumentValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An ordered list of arguments.
///
/// Insertion order is kept and duplicate names are allowed; both affect only
/// the rendered text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentSet {
    arguments: Vec<Argument>,
}

impl ArgumentSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from a query object, following its key order.
    ///
    /// Nested objects become nested argument sets at any depth. Arrays and
    /// `null` are kept as they are.
    pub fn from_query(query: &Map<String, Value>) -> Self {
        query
            .iter()
            .map(|(key, value)| Argument::new(key.clone(), value))
            .collect()
    }

    /// Appends an argument unless its value is absent.
    ///
    /// `None` stands for an undefined value and is dropped; an explicit
    /// [`ArgumentValue::Null`] is kept.
    pub fn push<V: Into<ArgumentValue>>(&mut self, name: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.arguments.push(Argument::new(name, value));
        }
    }

    /// Appends an argument and returns the set.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ArgumentValue>) -> Self {
        self.arguments.push(Argument::new(name, value));
        self
    }

    pub fn pop(&mut self) -> Option<Argument> {
        self.arguments.pop()
    }

    pub fn get(&self, index: usize) -> Option<&Argument> {
        self.arguments.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Argument> {
        self.arguments.iter()
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }
}

impl FromIterator<Argument> for ArgumentSet {
    fn from_iter<I: IntoIterator<Item = Argument>>(iter: I) -> Self {
        Self {
            arguments: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ArgumentSet {
    type Item = &'a Argument;
    type IntoIter = std::slice::Iter<'a, Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.arguments.iter()
    }
}

/// A requested field.
///
/// A field with an empty selection set is a scalar leaf; anything else is an
/// object field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Field {
    pub name: String,
    pub alias: Option<String>,
    pub arguments: ArgumentSet,
    pub selection_set: SelectionSet,
}

impl Field {
    /// Creates a leaf field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_alias(mut self, alias: Option<String>) -> Self {
        self.alias = alias;
        self
    }

    #[must_use]
    pub fn with_arguments(mut self, arguments: ArgumentSet) -> Self {
        self.arguments = arguments;
        self
    }

    #[must_use]
    pub fn with_selection(mut self, selection_set: SelectionSet) -> Self {
        self.selection_set = selection_set;
        self
    }

    /// Returns the key this field appears under in the response.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn is_leaf(&self) -> bool {
        self.selection_set.is_empty()
    }
}

/// An ordered list of fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSet {
    fields: Vec<Field>,
}

impl SelectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn pop(&mut self) -> Option<Field> {
        self.fields.pop()
    }

    pub fn get(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Finds a field by its response key.
    pub fn find(&self, response_key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.response_key() == response_key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<Field> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// The root request unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    pub operation_type: OperationType,
    pub name: String,
    pub arguments: ArgumentSet,
    pub selection_set: SelectionSet,
}

impl Operation {
    pub fn new(operation_type: OperationType, name: impl Into<String>) -> Self {
        Self {
            operation_type,
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_arguments(mut self, arguments: ArgumentSet) -> Self {
        self.arguments = arguments;
        self
    }

    /// Returns the first root field.
    pub fn root_field(&self) -> Option<&Field> {
        self.selection_set.get(0)
    }
}
