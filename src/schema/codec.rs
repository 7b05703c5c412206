//! Renders introspection payloads as schema text.
//!
//! There is no inverse: text is turned back into a schema by the database itself when
//! it is submitted with an alter.

use std::fmt::Write;

use super::{DecodeError, PredicateDescriptor, SchemaDocument};
use crate::models::RawResponse;

/// Emitted instead of predicate groups when no user predicate exists.
pub const NO_PREDICATES_LINE: &str = "# No predicates found || Looks like a clean cluster";

/// Header emitted before type blocks.
pub const TYPES_HEADER: &str = "# Types";

/// Decode a schema introspection response into schema text.
pub fn decode(raw: &RawResponse) -> Result<String, DecodeError> {
    let document = SchemaDocument::from_response(raw)?;
    Ok(render(&document))
}

/// Render a decoded schema.
///
/// Predicates are grouped by value type in first-seen order and keep source order
/// within a group. Reserved `dgraph.` predicates, types and fields are never emitted.
pub fn render(document: &SchemaDocument) -> String {
    let groups = group_by_type(document);
    let mut text = String::new();

    for (value_type, predicates) in &groups {
        let _ = writeln!(text, "# {} Predicates", value_type.to_uppercase());
        for predicate in predicates {
            let _ = writeln!(text, "    {}", predicate_line(predicate));
        }
        text.push('\n');
    }

    if groups.is_empty() {
        text.push_str(NO_PREDICATES_LINE);
        text.push('\n');
    } else {
        text.push_str(TYPES_HEADER);
        text.push('\n');
    }

    for ty in document.user_types() {
        let _ = writeln!(text, "type <{}> {{", ty.name);
        for field in ty.field_names.iter().filter(|f| !super::is_reserved(f)) {
            let _ = writeln!(text, "  {}", field);
        }
        text.push_str("}\n\n");
    }

    text
}

fn group_by_type(document: &SchemaDocument) -> Vec<(&str, Vec<&PredicateDescriptor>)> {
    let mut groups: Vec<(&str, Vec<&PredicateDescriptor>)> = Vec::new();
    for predicate in document.user_predicates() {
        match groups
            .iter_mut()
            .find(|(value_type, _)| *value_type == predicate.value_type)
        {
            Some((_, members)) => members.push(predicate),
            None => groups.push((predicate.value_type.as_str(), vec![predicate])),
        }
    }
    groups
}

/// `<name>: type @lang @index(a, b) @reverse .` as shown in the schema view.
pub fn predicate_line(predicate: &PredicateDescriptor) -> String {
    let mut line = format!("<{}>: {}", predicate.name, type_expr(predicate));
    if predicate.has_lang {
        line.push_str(" @lang");
    }
    if !predicate.indices.is_empty() {
        let _ = write!(line, " @index({})", predicate.indices.join(", "));
    }
    if predicate.has_reverse {
        line.push_str(" @reverse");
    }
    line.push_str(" .");
    line
}

pub(crate) fn type_expr(predicate: &PredicateDescriptor) -> String {
    if predicate.is_list {
        format!("[{}]", predicate.value_type)
    } else {
        predicate.value_type.clone()
    }
}
