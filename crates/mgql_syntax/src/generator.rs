//! Query text generation for mgql.
//!
//! Rendering is a single pass over the tree. Fields and arguments come out in
//! the order they were inserted.

use crate::ast::*;

const OPENING_TOKEN: &str = "{ ";
const CLOSING_TOKEN: &str = " }";
const ALIAS_SEPARATOR: &str = ": ";
const ARGUMENT_SEPARATOR: &str = ", ";
const LIST_SEPARATOR: char = ',';
const SEPARATOR: char = ' ';

/// Query text generator.
#[derive(Debug, Default)]
pub struct Generator {
    output: String,
}

impl Generator {
    /// Creates a new generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders an operation.
    pub fn generate(&mut self, operation: &Operation) -> String {
        self.output.clear();

        self.output.push_str(operation.operation_type.as_str());
        if !operation.name.is_empty() {
            self.output.push(SEPARATOR);
            self.output.push_str(&operation.name);
        }
        self.generate_arguments(&operation.arguments);
        self.generate_selection_set(&operation.selection_set);

        std::mem::take(&mut self.output)
    }

    fn generate_field(&mut self, field: &Field) {
        if let Some(alias) = &field.alias {
            self.output.push_str(alias);
            self.output.push_str(ALIAS_SEPARATOR);
        }
        self.output.push_str(&field.name);
        self.generate_arguments(&field.arguments);
        self.generate_selection_set(&field.selection_set);
    }

    fn generate_selection_set(&mut self, set: &SelectionSet) {
        if set.is_empty() {
            return;
        }
        self.output.push(SEPARATOR);
        self.output.push_str(OPENING_TOKEN);
        for (i, field) in set.iter().enumerate() {
            if i > 0 {
                self.output.push(SEPARATOR);
            }
            self.generate_field(field);
        }
        self.output.push_str(CLOSING_TOKEN);
    }

    fn generate_arguments(&mut self, set: &ArgumentSet) {
        if set.is_empty() {
            return;
        }
        self.output.push('(');
        self.generate_argument_list(set);
        self.output.push(')');
    }

    fn generate_argument_list(&mut self, set: &ArgumentSet) {
        for (i, argument) in set.iter().enumerate() {
            if i > 0 {
                self.output.push_str(ARGUMENT_SEPARATOR);
            }
            self.output.push_str(&argument.name);
            self.output.push_str(ALIAS_SEPARATOR);
            self.generate_value(&argument.value);
        }
    }

    fn generate_value(&mut self, value: &ArgumentValue) {
        match value {
            ArgumentValue::String(s) => self.generate_string(s),
            ArgumentValue::List(items) => {
                self.output.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.output.push(LIST_SEPARATOR);
                    }
                    self.generate_value(item);
                }
                self.output.push(']');
            }
            ArgumentValue::Object(set) if set.is_empty() => self.output.push_str("{}"),
            ArgumentValue::Object(set) => {
                self.output.push_str(OPENING_TOKEN);
                self.generate_argument_list(set);
                self.output.push_str(CLOSING_TOKEN);
            }
            ArgumentValue::Number(n) => self.output.push_str(&n.to_string()),
            ArgumentValue::Boolean(b) => self.output.push_str(if *b { "true" } else { "false" }),
            ArgumentValue::Null => self.output.push_str("null"),
        }
    }

    /// Backslashes are escaped before quotes so a quote escape is never doubled.
    fn generate_string(&mut self, s: &str) {
        self.output.push('"');
        for c in s.chars() {
            match c {
                '\\' => self.output.push_str("\\\\"),
                '"' => self.output.push_str("\\\""),
                _ => self.output.push(c),
            }
        }
        self.output.push('"');
    }
}

/// Renders an operation to query text.
pub fn generate(operation: &Operation) -> String {
    Generator::new().generate(operation)
}
