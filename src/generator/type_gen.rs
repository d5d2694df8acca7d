use std::collections::BTreeSet;

use indexmap::IndexMap;

use super::{ensure_not_reserved, to_identifier, Context};
use crate::deserializer::SchemaNode;
use crate::error::SchemaError;

/// Maps one schema node to a TypeScript type expression.
///
/// Named object shapes are emitted into the context as a side effect and
/// referenced by name; everything else renders inline. The rendering is a
/// pure function of the node, which the context's textual dedup depends on.
pub(crate) fn get_type(
    node: &SchemaNode,
    context: &mut Context<'_>,
) -> Result<String, SchemaError> {
    if let Some(any_of) = &node.any_of {
        // anyOf expresses "one of these concrete shapes"; the sorted set
        // keeps output deterministic and collapses repeated alternatives.
        let mut members = BTreeSet::new();
        for alternative in any_of {
            members.insert(get_type(alternative, context)?);
        }
        return Ok(members.into_iter().collect::<Vec<_>>().join(" | "));
    }

    let Some(type_set) = &node.schema_type else {
        return Err(SchemaError::MissingType { node: node.dump() });
    };
    let entries = type_set.entries();

    if entries.len() == 2 && entries.iter().any(|entry| entry == "null") {
        let mut concrete = entries.iter().filter(|entry| *entry != "null");
        // ["null", "null"] filters down to nothing
        let (Some(single), None) = (concrete.next(), concrete.next()) else {
            return Err(SchemaError::AmbiguousType { node: node.dump() });
        };
        return Ok(format!("null | {}", single_type(single, node, context)?));
    }

    let [single] = entries else {
        return Err(SchemaError::AmbiguousType { node: node.dump() });
    };
    single_type(single, node, context)
}

fn single_type(
    name: &str,
    node: &SchemaNode,
    context: &mut Context<'_>,
) -> Result<String, SchemaError> {
    match name {
        "string" => Ok("string".to_string()),
        "boolean" => Ok("boolean".to_string()),
        // JSON carries one numeric type; integer does not survive generation
        "integer" | "number" => Ok("number".to_string()),
        "object" => get_interface(node, context),
        "array" => match &node.items {
            Some(items) => Ok(format!("Array<{}>", get_type(items, context)?)),
            None => Ok("Array<any>".to_string()),
        },
        other => Err(SchemaError::UnknownType {
            name: other.to_string(),
            node: node.dump(),
        }),
    }
}

/// Renders an object node. Untitled shapes stay inline; a titled shape is
/// pushed to the context once and referenced by its normalized name.
fn get_interface(
    node: &SchemaNode,
    context: &mut Context<'_>,
) -> Result<String, SchemaError> {
    let Some(properties) = &node.properties else {
        return Ok("{}".to_string());
    };
    let Some(title) = &node.title else {
        return Ok(format!("{{\n{}\n}}", get_properties(properties, context)?));
    };
    let title = to_identifier(title)?;
    ensure_not_reserved(&title, "an interface name")?;
    let body = get_properties(properties, context)?;
    context.push(format!("export interface {} {{\n{}\n}}", title, body));
    Ok(title)
}

fn get_properties(
    properties: &IndexMap<String, SchemaNode>,
    context: &mut Context<'_>,
) -> Result<String, SchemaError> {
    let mut fields = Vec::new();
    for (name, property) in properties {
        let description = property.description.as_deref().unwrap_or("");
        let field_type = get_type(property, context)?;
        fields.push(format!(
            "  /**\n   * {}\n   */\n  readonly '{}': {};",
            description, name, field_type
        ));
    }
    Ok(fields.join("\n"))
}
