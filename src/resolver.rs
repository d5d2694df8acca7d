use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::SchemaError;

/// Expands every `$ref` in `schema` into an inlined copy of its target.
///
/// Internal references (`#/...`) resolve against the document itself;
/// `file#/pointer` and bare `file` references are read as JSON from
/// `base_dir`. The result contains no `$ref` keys. A reference chain that
/// revisits itself cannot be inlined and fails with
/// [`SchemaError::CircularRef`].
pub fn dereference(schema: &Value, base_dir: &Path) -> Result<Value, SchemaError> {
    let mut active = Vec::new();
    resolve(schema, schema, base_dir, "", &mut active)
}

/// `doc` names the document `root` came from: `""` for the main document,
/// the file path for an external one. The active set is keyed per document
/// so the same pointer string in flight in two documents is not a cycle.
fn resolve(
    node: &Value,
    root: &Value,
    base_dir: &Path,
    doc: &str,
    active: &mut Vec<(String, String)>,
) -> Result<Value, SchemaError> {
    match node {
        Value::Object(object) => {
            if let Some(reference) = object.get("$ref").and_then(Value::as_str) {
                return expand(reference, root, base_dir, doc, active);
            }
            let mut out = serde_json::Map::new();
            for (key, value) in object {
                out.insert(key.clone(), resolve(value, root, base_dir, doc, active)?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| resolve(item, root, base_dir, doc, active))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}

fn expand(
    reference: &str,
    root: &Value,
    base_dir: &Path,
    doc: &str,
    active: &mut Vec<(String, String)>,
) -> Result<Value, SchemaError> {
    let key = match reference.split_once('#') {
        Some(("", pointer)) => (doc.to_string(), pointer.to_string()),
        Some((file, pointer)) => (file.to_string(), pointer.to_string()),
        None => (reference.to_string(), String::new()),
    };
    if active.contains(&key) {
        return Err(SchemaError::CircularRef {
            reference: reference.to_string(),
        });
    }
    active.push(key);
    log::debug!("expanding $ref {reference}");

    let resolved = match reference.split_once('#') {
        Some(("", pointer)) => {
            let target = root
                .pointer(pointer)
                .ok_or_else(|| SchemaError::UnresolvedRef {
                    reference: reference.to_string(),
                })?;
            resolve(&strip_links(target), root, base_dir, doc, active)?
        }
        Some((file, pointer)) => {
            let external = read_external(file, base_dir)?;
            let target =
                external
                    .pointer(pointer)
                    .ok_or_else(|| SchemaError::UnresolvedRef {
                        reference: reference.to_string(),
                    })?;
            resolve(&strip_links(target), &external, base_dir, file, active)?
        }
        None => {
            let external = read_external(reference, base_dir)?;
            resolve(&external, &external, base_dir, reference, active)?
        }
    };

    active.pop();
    Ok(resolved)
}

/// A `$ref` to a resource inlines its data shape, not its operations: the
/// target's own `links` do not survive expansion. Real documents point every
/// link's `targetSchema` back at the owning resource, so keeping `links`
/// would make every resource a circular reference.
fn strip_links(target: &Value) -> Value {
    match target {
        Value::Object(object) => {
            let mut out = object.clone();
            out.remove("links");
            Value::Object(out)
        }
        other => other.clone(),
    }
}

fn read_external(file: &str, base_dir: &Path) -> Result<Value, SchemaError> {
    let text = fs::read_to_string(base_dir.join(file))?;
    Ok(serde_json::from_str(&text)?)
}
