use indexmap::IndexMap;
use percent_encoding::percent_decode_str;

use super::type_gen::get_type;
use super::{
    ensure_not_reserved, to_identifier, to_lower_identifier, Context, METHOD_NAME_OVERRIDES,
};
use crate::deserializer::{Link, SchemaNode};
use crate::error::SchemaError;

/// Hrefs of root meta-links that carry no title and compile to nothing.
const ROOT_HREFS: [&str; 2] = ["https://api.heroku.com", "/schema"];

/// Recursively turns a titled definition into a client class, wiring every
/// titled sub-definition up as a nested client property. Untitled nodes
/// contribute nothing and return the empty string.
pub(crate) fn walk(
    node: &SchemaNode,
    context: &mut Context<'_>,
) -> Result<String, SchemaError> {
    let Some(title) = &node.title else {
        return Ok(String::new());
    };
    let title = to_identifier(title)?;

    let mut children = Vec::new();
    if let Some(definitions) = &node.definitions {
        for (name, definition) in definitions {
            let child_title = walk(definition, context)?;
            if !child_title.is_empty() {
                children.push((to_identifier(name)?, child_title));
            }
        }
    }

    let mut methods = Vec::new();
    let mut method_names: Vec<String> = Vec::new();
    for link in &node.links {
        let Some(compiled) = compile_link(link, context)? else {
            continue;
        };
        if method_names.iter().any(|name| *name == compiled.name) {
            return Err(SchemaError::DuplicateMethod {
                class: format!("{}Client", title),
                method: compiled.name,
            });
        }
        method_names.push(compiled.name);
        methods.push(compiled.source);
    }

    let mut lines = Vec::new();
    lines.push(format!("export class {}Client {{", title));
    lines.push("  private readonly _client: BaseApiClient;".to_string());
    for (name, child_title) in &children {
        lines.push(format!("  readonly {}: {}Client;", name, child_title));
    }
    lines.push("  constructor(client: BaseApiClient) {".to_string());
    lines.push("    this._client = client;".to_string());
    for (name, child_title) in &children {
        lines.push(format!("    this.{} = new {}Client(client);", name, child_title));
    }
    lines.push("  }".to_string());
    lines.extend(methods);
    lines.push("}".to_string());
    context.push(lines.join("\n"));

    Ok(title)
}

#[derive(Debug)]
struct CompiledLink {
    name: String,
    source: String,
}

/// Compiles one link into a client method. Returns `None` for the untitled
/// root meta-links, which represent the document itself rather than an
/// operation.
fn compile_link(
    link: &Link,
    context: &mut Context<'_>,
) -> Result<Option<CompiledLink>, SchemaError> {
    let Some(title) = &link.title else {
        if ROOT_HREFS.contains(&link.href.as_str()) {
            return Ok(None);
        }
        return Err(SchemaError::UntitledLink { node: link.dump() });
    };
    let name = match link
        .description
        .as_deref()
        .and_then(|description| METHOD_NAME_OVERRIDES.get(description))
    {
        Some(overridden) => (*overridden).to_string(),
        None => to_lower_identifier(title)?,
    };
    let method = link
        .method
        .as_deref()
        .ok_or_else(|| SchemaError::MissingMethod {
            title: title.clone(),
        })?;

    let root = context.root;
    let variables = url_variables(&link.href, root)?;

    let mut args = Vec::new();
    for variable in &variables {
        ensure_not_reserved(&variable.name, "a parameter name")?;
        let variable_type = get_type(variable.node, context)?;
        args.push(format!("{}: {}", variable.name, variable_type));
    }
    if let Some(schema) = &link.schema {
        args.push(format!("requestBody: {}", get_type(schema, context)?));
    }

    let return_type = match &link.target_schema {
        Some(target) => get_type(target, context)?,
        None => "void".to_string(),
    };

    // The href template goes through verbatim; substitution happens in the
    // runtime client, keyed by the raw template tokens.
    let uri_params = if variables.is_empty() {
        "{}".to_string()
    } else {
        let entries = variables
            .iter()
            .map(|variable| format!("\"{}\": {}", variable.token, variable.name))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{ {} }}", entries)
    };
    let body_arg = if link.schema.is_some() { ", requestBody" } else { "" };
    let description = link.description.as_deref().unwrap_or("");

    let source = format!(
        "  /**\n   * {}\n   */\n  {}({}): Promise<{}> {{\n    return this._client.request('{}', '{}', {}{});\n  }}",
        description,
        name,
        args.join(", "),
        return_type,
        method,
        link.href,
        uri_params,
        body_arg
    );
    Ok(Some(CompiledLink { name, source }))
}

/// A variable extracted from an href URI template: the raw token (braces
/// stripped), the collision-free camelCase parameter name, and the schema
/// node its JSON pointer resolves to.
#[derive(Debug)]
struct UrlVariable<'a> {
    token: String,
    name: String,
    node: &'a SchemaNode,
}

fn url_variables<'a>(
    href: &str,
    root: &'a SchemaNode,
) -> Result<Vec<UrlVariable<'a>>, SchemaError> {
    let mut variables = Vec::new();
    let mut used: Vec<String> = Vec::new();
    for token in template_tokens(href) {
        // e.g. (%23%2Fdefinitions%2Fapp%2Fdefinitions%2Fidentity):
        // strip the parens, percent-decode, and split the JSON pointer.
        // A token without parens is kept whole and fails pointer
        // resolution below instead of being mangled.
        let inner = token
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(token);
        let pointer = percent_decode_str(inner).decode_utf8().map_err(|_| {
            SchemaError::UnresolvedPointer {
                pointer: token.to_string(),
            }
        })?;
        let segments: Vec<&str> = pointer.split('/').collect();
        let node = resolve_pointer(&segments, root)?;
        let base = parameter_name(&segments)?;
        let mut index = 0;
        while used.contains(&format!("{}{}", base, index)) {
            index += 1;
        }
        used.push(format!("{}{}", base, index));
        let name = if index == 0 {
            base
        } else {
            format!("{}{}", base, index)
        };
        variables.push(UrlVariable {
            token: token.to_string(),
            name,
            node,
        });
    }
    Ok(variables)
}

/// The `{...}` spans of a URI template, in order, braces excluded.
fn template_tokens(href: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = href;
    while let Some(start) = rest.find('{') {
        let Some(length) = rest[start..].find('}') else {
            break;
        };
        tokens.push(&rest[start + 1..start + length]);
        rest = &rest[start + length + 1..];
    }
    tokens
}

/// Pointer walk position: either at a schema node or inside one of its
/// name → node maps.
enum Cursor<'a> {
    Node(&'a SchemaNode),
    Map(&'a IndexMap<String, SchemaNode>),
}

fn resolve_pointer<'a>(
    segments: &[&str],
    root: &'a SchemaNode,
) -> Result<&'a SchemaNode, SchemaError> {
    let missing = || SchemaError::UnresolvedPointer {
        pointer: segments.join("/"),
    };
    let mut cursor = Cursor::Node(root);
    for segment in segments {
        if *segment == "#" {
            cursor = Cursor::Node(root);
            continue;
        }
        cursor = match cursor {
            Cursor::Node(node) => match *segment {
                "definitions" => Cursor::Map(node.definitions.as_ref().ok_or_else(missing)?),
                "properties" => Cursor::Map(node.properties.as_ref().ok_or_else(missing)?),
                "items" => Cursor::Node(node.items.as_deref().ok_or_else(missing)?),
                _ => return Err(missing()),
            },
            Cursor::Map(map) => Cursor::Node(map.get(*segment).ok_or_else(missing)?),
        };
    }
    match cursor {
        Cursor::Node(node) => Ok(node),
        Cursor::Map(_) => Err(missing()),
    }
}

/// `#/definitions/app/definitions/identity` → `appIdentity`: drop the
/// `definitions` segments, capitalize and concatenate the rest, then
/// lowercase the first character.
fn parameter_name(segments: &[&str]) -> Result<String, SchemaError> {
    let mut concatenated = String::new();
    for segment in segments.iter().filter(|segment| **segment != "definitions") {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            concatenated.extend(first.to_uppercase());
            concatenated.push_str(chars.as_str());
        }
    }
    to_lower_identifier(&concatenated)
}
