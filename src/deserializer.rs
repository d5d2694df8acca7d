use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One node of a dereferenced JSON Hyper-Schema tree.
///
/// This deserializer expects `$ref`s to be gone already (see
/// [`crate::resolver`]): every field is the inlined shape. A node bearing a
/// `title` becomes a named declaration in the output; `definitions` is only
/// populated on resource nodes and the document root.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definitions: Option<IndexMap<String, SchemaNode>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

impl SchemaNode {
    /// Renders the node back to JSON for diagnostics.
    pub(crate) fn dump(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// A hyperschema link: one callable HTTP operation attached to a resource.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Box<SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_schema: Option<Box<SchemaNode>>,
}

impl Link {
    pub(crate) fn dump(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// `type` may be a bare string or an array of strings. The two-element
/// array form is only meaningful when one entry is `"null"`.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(untagged)]
pub enum TypeSet {
    One(String),
    Many(Vec<String>),
}

impl TypeSet {
    pub fn entries(&self) -> &[String] {
        match self {
            TypeSet::One(single) => std::slice::from_ref(single),
            TypeSet::Many(entries) => entries,
        }
    }
}
