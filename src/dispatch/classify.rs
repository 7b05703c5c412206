//! Query response classification.
//!
//! Decided once per query from the submitted text and the raw response, then matched on
//! by the dispatcher.

use crate::models::RawResponse;

/// Marker that asks for the schema view to stay as undecoded JSON.
pub const JSON_MARKER: &str = "#JSON";

/// What a successful query response should do to its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Schema introspection without data; nothing to store
    Empty,
    /// Schema introspection to decode into schema text
    SchemaDecoded,
    /// Schema introspection the user wants as JSON
    SchemaRawJson,
    /// Any other query
    Ordinary,
}

pub fn classify(query_text: &str, response: &RawResponse) -> Classification {
    let text = query_text.trim();
    let has_data = response.has_data();

    if is_schema_shape(text) {
        if has_data {
            Classification::SchemaDecoded
        } else {
            Classification::Empty
        }
    } else if starts_schema_block(text) && text.contains(JSON_MARKER) && has_data {
        Classification::SchemaRawJson
    } else {
        Classification::Ordinary
    }
}

/// `schema { ... }` or `schema(...) { ... }` and nothing after the closing brace.
pub fn is_schema_shape(text: &str) -> bool {
    let text = text.trim();
    schema_block_end(text) == Some(text.len())
}

/// Byte offset just past the brace closing the leading schema block.
fn schema_block_end(text: &str) -> Option<usize> {
    let rest = text.strip_prefix("schema")?;
    let mut offset = text.len() - rest.trim_start().len();

    if text[offset..].starts_with('(') {
        offset = matching_close(text, offset, '(', ')')?;
        offset += text[offset..].len() - text[offset..].trim_start().len();
    }
    if !text[offset..].starts_with('{') {
        return None;
    }
    matching_close(text, offset, '{', '}')
}

/// Offset just past the delimiter closing the one at `start`. Delimiters inside string
/// literals and `#` comments do not count.
fn matching_close(text: &str, start: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut in_comment = false;
    let mut escaped = false;

    for (index, ch) in text[start..].char_indices() {
        if in_comment {
            in_comment = ch != '\n';
        } else if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
        } else if ch == '"' {
            in_string = true;
        } else if ch == '#' {
            in_comment = true;
        } else if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                return Some(start + index + ch.len_utf8());
            }
        }
    }
    None
}

fn starts_schema_block(text: &str) -> bool {
    text.strip_prefix("schema")
        .map(|rest| rest.trim_start())
        .is_some_and(|rest| rest.starts_with('{') || rest.starts_with('('))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_data() -> RawResponse {
        RawResponse::new(json!({ "data": { "schema": [] } }))
    }

    #[test]
    fn test_schema_without_data_is_empty() {
        assert_eq!(classify("schema {}", &RawResponse::default()), Classification::Empty);
        assert_eq!(
            classify("schema {}", &RawResponse::new(json!({ "extensions": {} }))),
            Classification::Empty
        );
    }

    #[test]
    fn test_schema_with_data_is_decoded() {
        assert_eq!(classify("schema {}", &with_data()), Classification::SchemaDecoded);
        assert_eq!(
            classify("  schema {\n  type\n  index\n}\n", &with_data()),
            Classification::SchemaDecoded
        );
        assert_eq!(
            classify("schema(pred: [name]) { type }", &with_data()),
            Classification::SchemaDecoded
        );
    }

    #[test]
    fn test_json_marker_after_block() {
        assert_eq!(
            classify("schema {}\n#JSON", &with_data()),
            Classification::SchemaRawJson
        );
        assert_eq!(
            classify("schema {}\n#JSON", &RawResponse::default()),
            Classification::Ordinary
        );
    }

    #[test]
    fn test_json_marker_inside_block_still_decodes() {
        assert_eq!(
            classify("schema { #JSON\n}", &with_data()),
            Classification::SchemaDecoded
        );
    }

    #[test]
    fn test_schema_block_followed_by_query_is_ordinary() {
        let data = RawResponse::new(json!({
            "data": { "schema": [], "q": [{ "name": "Alice" }] }
        }));
        assert_eq!(
            classify("schema {}\n{ q(func: has(name)) { name } }", &data),
            Classification::Ordinary
        );
        assert_eq!(
            classify("schema(pred: [name]) { type }\n{ q(func: uid(0x1)) { uid } }", &data),
            Classification::Ordinary
        );
        assert!(!is_schema_shape("schema { type } }"));
        assert!(!is_schema_shape("schema { type"));
    }

    #[test]
    fn test_delimiters_in_strings_and_comments_are_skipped() {
        assert!(is_schema_shape("schema { # closing } brace\n type }"));
        assert!(is_schema_shape("schema(pred: [\"a)b\"]) { type }"));
        assert!(is_schema_shape("schema(pred: [\"a\\\"}\"]) { type }"));
    }

    #[test]
    fn test_ordinary_queries() {
        let data = with_data();
        assert_eq!(
            classify("{ q(func: has(name)) { name } }", &data),
            Classification::Ordinary
        );
        assert_eq!(classify("schemas {}", &data), Classification::Ordinary);
        assert_eq!(
            classify("{ q(func: eq(tag, \"#JSON\")) { uid } }", &data),
            Classification::Ordinary
        );
    }
}
