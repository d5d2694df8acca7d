mod client_gen;
mod type_gen;

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;

use crate::deserializer::SchemaNode;
use crate::error::SchemaError;

/// The single mutable accumulator for one generator run: the dereferenced
/// root (used to resolve JSON-pointer references in href templates) and the
/// emitted declarations, in push order.
pub(crate) struct Context<'a> {
    root: &'a SchemaNode,
    output: Vec<String>,
}

impl<'a> Context<'a> {
    fn new(root: &'a SchemaNode) -> Self {
        Self {
            root,
            output: Vec::new(),
        }
    }

    /// Push-once: a declaration already in the buffer is dropped. Dedup is
    /// textual, so rendering must stay a pure function of the node; two
    /// reaches of the same named schema collapse only if they produce
    /// byte-identical text.
    fn push(&mut self, declaration: String) {
        if !self.output.iter().any(|existing| *existing == declaration) {
            self.output.push(declaration);
        }
    }
}

lazy_static! {
    /// Words TypeScript rejects in plain-identifier positions (parameter
    /// names, standalone type names). Class member names may legally collide
    /// with keywords and are not checked against this set.
    static ref RESERVED_WORDS: HashSet<&'static str> = [
        "await", "break", "case", "catch", "class", "const", "continue",
        "debugger", "default", "delete", "do", "else", "enum", "export",
        "extends", "false", "finally", "for", "function", "if", "implements",
        "import", "in", "instanceof", "interface", "let", "new", "null",
        "package", "private", "protected", "public", "return", "static",
        "super", "switch", "this", "throw", "true", "try", "typeof", "var",
        "void", "while", "with", "yield",
    ]
    .into_iter()
    .collect();

    /// Method names that cannot be derived from the link title without
    /// colliding with a sibling method, keyed by the link description.
    static ref METHOD_NAME_OVERRIDES: HashMap<&'static str, &'static str> =
        [("List existing log drains for an add-on.", "listForAddOn")]
            .into_iter()
            .collect();
}

/// Generates the full TypeScript source for a dereferenced hyperschema:
/// the runtime import, every interface and client class reachable from the
/// root, and a default export aliasing the root client.
pub(crate) fn generate_typescript(root: &SchemaNode) -> Result<String, SchemaError> {
    let mut context = Context::new(root);
    context.push("import BaseApiClient from './BaseApiClient';".to_string());
    let title = client_gen::walk(root, &mut context)?;
    if title.is_empty() {
        return Err(SchemaError::UntitledRoot);
    }
    log::debug!("emitted {} declarations", context.output.len());
    Ok(format!(
        "{}\nexport default {}Client;\n",
        context.output.join("\n"),
        title
    ))
}

/// Camel-cases hyphenated tokens (`add-on` → `addOn`) and strips everything
/// outside `[A-Za-z0-9]`. A name that normalizes to nothing is a
/// schema-authoring error, never emitted silently.
pub(crate) fn to_identifier(text: &str) -> Result<String, SchemaError> {
    let mut out = String::with_capacity(text.len());
    let mut upper_next = false;
    for c in text.chars() {
        if c == '-' {
            upper_next = true;
            continue;
        }
        if c.is_ascii_alphanumeric() {
            if upper_next {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        upper_next = false;
    }
    if out.is_empty() {
        return Err(SchemaError::EmptyIdentifier {
            source_text: text.to_string(),
        });
    }
    Ok(out)
}

/// [`to_identifier`] with the first character lowercased. Used for method,
/// property, and parameter names.
pub(crate) fn to_lower_identifier(text: &str) -> Result<String, SchemaError> {
    let id = to_identifier(text)?;
    // to_identifier output is non-empty ASCII
    let (head, tail) = id.split_at(1);
    Ok(head.to_ascii_lowercase() + tail)
}

pub(crate) fn ensure_not_reserved(
    name: &str,
    position: &'static str,
) -> Result<(), SchemaError> {
    if RESERVED_WORDS.contains(name) {
        return Err(SchemaError::ReservedWord {
            name: name.to_string(),
            position,
        });
    }
    Ok(())
}
