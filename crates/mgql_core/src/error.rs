//! Error reporting for mgql.

use miette::Diagnostic;
use thiserror::Error;

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while planning a query or normalizing a response.
#[derive(Debug, Error, Diagnostic)]
#[non_exhaustive]
pub enum Error {
    /// A relationship (or the caller) names a type the registry does not know.
    #[error("no model description registered for `{name}`")]
    #[diagnostic(
        code(mgql::unknown_model),
        help("register `{name}` in the schema before compiling or normalizing")
    )]
    UnknownModel { name: String },

    /// The response has neither the singular nor the plural root key.
    #[error("expected the response data to contain `{singular}` or `{plural}`")]
    #[diagnostic(code(mgql::missing_root_key))]
    MissingRootKey { singular: String, plural: String },

    /// The server answered with a GraphQL `errors` array.
    #[error("server returned errors: {}", messages.join("; "))]
    #[diagnostic(code(mgql::server))]
    Server { messages: Vec<String> },

    /// A schema or payload could not be decoded.
    #[error(transparent)]
    #[diagnostic(code(mgql::json))]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates an unknown model error.
    pub fn unknown_model(name: impl Into<String>) -> Self {
        Self::UnknownModel { name: name.into() }
    }
}
