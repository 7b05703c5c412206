//! Raw response payloads returned by the database endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque JSON payload returned by the remote endpoint.
///
/// An empty body is represented as `Value::Null` and means "no data", not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawResponse(pub Value);

impl RawResponse {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parse a response body; an empty or whitespace-only body is no data.
    pub fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        if body.trim().is_empty() {
            return Ok(Self(Value::Null));
        }
        serde_json::from_str(body).map(Self)
    }

    /// The top-level `data` member, if present and not null.
    pub fn data(&self) -> Option<&Value> {
        self.0.get("data").filter(|data| !data.is_null())
    }

    pub fn has_data(&self) -> bool {
        self.data().is_some()
    }

    /// GraphQL-style `errors` array, if the endpoint reported any.
    pub fn errors(&self) -> Option<&Vec<Value>> {
        self.0
            .get("errors")
            .and_then(Value::as_array)
            .filter(|errors| !errors.is_empty())
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Text form stored as a document's result.
    pub fn to_text(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}

impl From<Value> for RawResponse {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_body_is_no_data() {
        let raw = RawResponse::from_body("").unwrap();
        assert_eq!(raw.as_value(), &Value::Null);
        assert!(!raw.has_data());
    }

    #[test]
    fn test_null_data_is_no_data() {
        let raw = RawResponse::new(json!({ "data": null, "extensions": {} }));
        assert!(!raw.has_data());
    }

    #[test]
    fn test_errors_array() {
        let raw = RawResponse::new(json!({ "errors": [{ "message": "boom" }] }));
        assert_eq!(raw.errors().map(Vec::len), Some(1));
        assert!(RawResponse::new(json!({ "errors": [] })).errors().is_none());
    }

    #[test]
    fn test_invalid_body_is_error() {
        assert!(RawResponse::from_body("<html>").is_err());
    }
}
