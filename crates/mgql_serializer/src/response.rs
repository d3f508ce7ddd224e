//! The GraphQL response envelope.

use mgql_core::{Error, Result};
use serde_json::Value;

/// Collects the messages of a GraphQL `errors` array.
pub fn error_messages(payload: &Value) -> Vec<String> {
    payload
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .map(|error| match error.get("message").and_then(Value::as_str) {
                    Some(message) => message.to_owned(),
                    None => error.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Fails with [`Error::Server`] if the payload carries GraphQL errors.
pub fn ensure_no_errors(payload: &Value) -> Result<()> {
    let messages = error_messages(payload);
    if messages.is_empty() {
        Ok(())
    } else {
        Err(Error::Server { messages })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_errors() {
        assert!(ensure_no_errors(&json!({ "data": { "post": null } })).is_ok());
        assert!(ensure_no_errors(&json!({ "errors": [] })).is_ok());
    }

    #[test]
    fn test_errors_are_collected() {
        let payload = json!({
            "errors": [
                { "message": "name can't be blank" },
                { "code": 42 }
            ]
        });

        let Err(Error::Server { messages }) = ensure_no_errors(&payload) else {
            panic!("expected a server error");
        };
        assert_eq!(messages, ["name can't be blank", r#"{"code":42}"#]);
    }
}
