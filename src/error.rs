use serde_json::Value;
use thiserror::Error;

/// Failures raised while dereferencing a hyperschema document or generating
/// client code from it. Every one of these is a schema-authoring error: the
/// run aborts on the first occurrence and no output is written.
///
/// Variants that blame a specific node carry it as a `Value` so the offending
/// structure ends up in the diagnostic.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("expected a type: {node}")]
    MissingType { node: Value },

    #[error("expected exactly one type: {node}")]
    AmbiguousType { node: Value },

    #[error("unknown type `{name}`: {node}")]
    UnknownType { name: String, node: Value },

    #[error("expected all links to have titles: {node}")]
    UntitledLink { node: Value },

    #[error("expected link `{title}` to have an HTTP method")]
    MissingMethod { title: String },

    #[error("could not find reference {pointer}")]
    UnresolvedPointer { pointer: String },

    #[error("could not resolve $ref `{reference}`")]
    UnresolvedRef { reference: String },

    #[error("circular $ref chain through `{reference}`")]
    CircularRef { reference: String },

    #[error("`{source_text}` does not normalize to a usable identifier")]
    EmptyIdentifier { source_text: String },

    #[error("`{name}` is a reserved word and cannot be used as {position}")]
    ReservedWord { name: String, position: &'static str },

    #[error("duplicate method `{method}` on {class}; retitle one of the links")]
    DuplicateMethod { class: String, method: String },

    #[error("expected the root schema to have a title")]
    UntitledRoot,

    #[error("failed to read a referenced schema file")]
    Io(#[from] std::io::Error),

    #[error("schema document does not deserialize")]
    Deserialize(#[from] serde_json::Error),
}
