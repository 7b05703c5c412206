//! Structured form of a schema introspection response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::DecodeError;
use crate::models::RawResponse;

/// Prefix of system-internal predicates and types.
pub const RESERVED_PREFIX: &str = "dgraph.";

pub fn is_reserved(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}

/// One predicate declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WirePredicate", into = "WirePredicate")]
pub struct PredicateDescriptor {
    pub name: String,
    pub value_type: String,
    pub is_list: bool,
    pub has_reverse: bool,
    pub has_count: bool,
    pub has_lang: bool,
    pub has_upsert: bool,
    /// Tokenizer names, in server order
    pub indices: Vec<String>,
}

impl PredicateDescriptor {
    pub fn new(name: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: value_type.into(),
            ..Self::default()
        }
    }

    pub fn list(mut self) -> Self {
        self.is_list = true;
        self
    }

    pub fn with_index<I, S>(mut self, tokenizers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indices = tokenizers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reverse(mut self) -> Self {
        self.has_reverse = true;
        self
    }

    pub fn with_count(mut self) -> Self {
        self.has_count = true;
        self
    }

    pub fn with_lang(mut self) -> Self {
        self.has_lang = true;
        self
    }

    pub fn with_upsert(mut self) -> Self {
        self.has_upsert = true;
        self
    }

    pub fn is_reserved(&self) -> bool {
        is_reserved(&self.name)
    }
}

/// Predicate as the database reports it under `data.schema`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WirePredicate {
    predicate: String,
    #[serde(rename = "type", default = "default_value_type")]
    value_type: String,
    #[serde(default, skip_serializing_if = "is_false")]
    index: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tokenizer: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    list: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    reverse: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    count: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    lang: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    upsert: bool,
}

fn default_value_type() -> String {
    "default".to_string()
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl From<WirePredicate> for PredicateDescriptor {
    fn from(wire: WirePredicate) -> Self {
        // A tokenizer list without the index flag is not an active index.
        let indices = if wire.index { wire.tokenizer } else { Vec::new() };
        Self {
            name: wire.predicate,
            value_type: wire.value_type,
            is_list: wire.list,
            has_reverse: wire.reverse,
            has_count: wire.count,
            has_lang: wire.lang,
            has_upsert: wire.upsert,
            indices,
        }
    }
}

impl From<PredicateDescriptor> for WirePredicate {
    fn from(pred: PredicateDescriptor) -> Self {
        Self {
            predicate: pred.name,
            value_type: pred.value_type,
            index: !pred.indices.is_empty(),
            tokenizer: pred.indices,
            list: pred.is_list,
            reverse: pred.has_reverse,
            count: pred.has_count,
            lang: pred.has_lang,
            upsert: pred.has_upsert,
        }
    }
}

/// One type declaration and its field names, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireType", into = "WireType")]
pub struct TypeDescriptor {
    pub name: String,
    pub field_names: Vec<String>,
}

impl TypeDescriptor {
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            field_names: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_reserved(&self) -> bool {
        is_reserved(&self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireType {
    name: String,
    #[serde(default)]
    fields: Vec<WireField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireField {
    name: String,
}

impl From<WireType> for TypeDescriptor {
    fn from(wire: WireType) -> Self {
        Self {
            name: wire.name,
            field_names: wire.fields.into_iter().map(|f| f.name).collect(),
        }
    }
}

impl From<TypeDescriptor> for WireType {
    fn from(ty: TypeDescriptor) -> Self {
        Self {
            name: ty.name,
            fields: ty
                .field_names
                .into_iter()
                .map(|name| WireField { name })
                .collect(),
        }
    }
}

/// Decoded schema introspection payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(rename = "schema", default)]
    pub predicates: Vec<PredicateDescriptor>,
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
}

impl SchemaDocument {
    pub fn new(predicates: Vec<PredicateDescriptor>, types: Vec<TypeDescriptor>) -> Self {
        Self { predicates, types }
    }

    /// Extract the schema from a response's `data` member.
    ///
    /// A missing `schema` or `types` array is read as empty; anything else that does
    /// not match the introspection shape is an error.
    pub fn from_response(raw: &RawResponse) -> Result<Self, DecodeError> {
        let data = raw
            .data()
            .ok_or_else(|| DecodeError::new("response has no data"))?;
        Self::from_data(data)
    }

    pub fn from_data(data: &Value) -> Result<Self, DecodeError> {
        if !data.is_object() {
            return Err(DecodeError::new("response data is not an object"));
        }
        Self::deserialize(data).map_err(|e| DecodeError::new(format!("invalid schema data: {}", e)))
    }

    /// Predicates visible to the user, in source order.
    pub fn user_predicates(&self) -> impl Iterator<Item = &PredicateDescriptor> {
        self.predicates.iter().filter(|p| !p.is_reserved())
    }

    /// Types visible to the user, in source order.
    pub fn user_types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.iter().filter(|t| !t.is_reserved())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_predicate_from_wire() {
        let pred: PredicateDescriptor = serde_json::from_value(json!({
            "predicate": "name",
            "type": "string",
            "index": true,
            "tokenizer": ["exact", "term"],
            "lang": true,
            "count": true
        }))
        .unwrap();

        assert_eq!(pred.name, "name");
        assert_eq!(pred.value_type, "string");
        assert_eq!(pred.indices, vec!["exact", "term"]);
        assert!(pred.has_lang && pred.has_count);
        assert!(!pred.is_list && !pred.has_reverse && !pred.has_upsert);
    }

    #[test]
    fn test_tokenizer_without_index_flag_is_ignored() {
        let pred: PredicateDescriptor = serde_json::from_value(json!({
            "predicate": "age", "type": "int", "tokenizer": ["int"]
        }))
        .unwrap();
        assert!(pred.indices.is_empty());
    }

    #[test]
    fn test_missing_type_is_default() {
        let pred: PredicateDescriptor =
            serde_json::from_value(json!({ "predicate": "loose" })).unwrap();
        assert_eq!(pred.value_type, "default");
    }

    #[test]
    fn test_predicate_serializes_to_wire_shape() {
        let pred = PredicateDescriptor::new("friend", "uid").list().with_reverse();
        let value = serde_json::to_value(&pred).unwrap();
        assert_eq!(
            value,
            json!({ "predicate": "friend", "type": "uid", "list": true, "reverse": true })
        );
    }

    #[test]
    fn test_document_from_response() {
        let raw = RawResponse::new(json!({
            "data": {
                "schema": [
                    { "predicate": "dgraph.type", "type": "string", "index": true, "tokenizer": ["exact"], "list": true },
                    { "predicate": "name", "type": "string" }
                ],
                "types": [
                    { "name": "Person", "fields": [{ "name": "name" }, { "name": "dgraph.type" }] }
                ]
            }
        }));

        let doc = SchemaDocument::from_response(&raw).unwrap();
        assert_eq!(doc.predicates.len(), 2);
        assert_eq!(doc.user_predicates().count(), 1);
        assert_eq!(doc.types[0].field_names, vec!["name", "dgraph.type"]);
        assert_eq!(
            doc.user_predicates().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["name"]
        );
    }

    #[test]
    fn test_missing_arrays_are_empty() {
        let doc = SchemaDocument::from_data(&json!({})).unwrap();
        assert!(doc.predicates.is_empty() && doc.types.is_empty());
    }

    #[test]
    fn test_non_object_data_is_rejected() {
        assert!(SchemaDocument::from_data(&json!([1, 2])).is_err());
        assert!(SchemaDocument::from_data(&json!({ "schema": "nope" })).is_err());
        assert!(SchemaDocument::from_response(&RawResponse::default()).is_err());
    }
}
