use std::path::Path;

use serde_json::Value;

pub mod deserializer;
pub mod error;
mod generator;
pub mod resolver;

pub use error::SchemaError;

/// Generates the TypeScript client source for a JSON Hyper-Schema document.
///
/// `base_dir` anchors any file-relative `$ref`s encountered while
/// dereferencing. Generation is all-or-nothing: the first schema-authoring
/// error aborts the run with a [`SchemaError`].
pub fn generate_client(schema: &Value, base_dir: &Path) -> Result<String, SchemaError> {
    let dereferenced = resolver::dereference(schema, base_dir)?;
    let root: deserializer::SchemaNode = serde_json::from_value(dereferenced)?;
    generator::generate_typescript(&root)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn widget_schema() -> Value {
        json!({
            "title": "Example",
            "definitions": {
                "widget": {
                    "title": "Widget",
                    "type": ["object"],
                    "definitions": {
                        "id": {"type": ["string"], "description": "widget identifier"}
                    },
                    "properties": {
                        "id": {"$ref": "#/definitions/widget/definitions/id"}
                    },
                    "links": [
                        {
                            "title": "Info",
                            "method": "GET",
                            "href": "/widgets/{(%23%2Fdefinitions%2Fwidget%2Fdefinitions%2Fid)}",
                            "targetSchema": {"$ref": "#/definitions/widget"}
                        }
                    ]
                }
            }
        })
    }

    #[test]
    fn test_round_trip() {
        let source = generate_client(&widget_schema(), Path::new(".")).unwrap();
        assert!(source.starts_with("import BaseApiClient from './BaseApiClient';"));
        assert!(source.contains("export interface Widget {"));
        assert!(source.contains("readonly 'id': string;"));
        assert!(source.contains("export class WidgetClient {"));
        assert!(source.contains("info(widgetId: string): Promise<Widget>"));
        assert!(source.contains("export class ExampleClient {"));
        assert!(source.contains("readonly widget: WidgetClient;"));
        assert!(source.contains("this.widget = new WidgetClient(client);"));
        assert!(source.ends_with("export default ExampleClient;\n"));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let first = generate_client(&widget_schema(), Path::new(".")).unwrap();
        let second = generate_client(&widget_schema(), Path::new(".")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_shared_shape_is_declared_once() {
        // The same titled object is reachable through two resources; the
        // declaration must appear exactly once.
        let schema = json!({
            "title": "Example",
            "definitions": {
                "region": {
                    "title": "Region",
                    "type": ["object"],
                    "properties": {"name": {"type": ["string"]}}
                },
                "app": {
                    "title": "App",
                    "links": [
                        {"title": "Info", "method": "GET", "href": "/apps",
                         "targetSchema": {"$ref": "#/definitions/region"}}
                    ]
                },
                "space": {
                    "title": "Space",
                    "links": [
                        {"title": "Info", "method": "GET", "href": "/spaces",
                         "targetSchema": {"$ref": "#/definitions/region"}}
                    ]
                }
            }
        });
        let source = generate_client(&schema, Path::new(".")).unwrap();
        assert_eq!(source.matches("export interface Region {").count(), 1);
    }

    #[test]
    fn test_malformed_property_fails_generation() {
        // The typeless property only blows up once something maps the
        // resource's shape; a link's targetSchema is what reaches it.
        let schema = json!({
            "title": "Example",
            "definitions": {
                "widget": {
                    "title": "Widget",
                    "type": ["object"],
                    "properties": {"broken": {"description": "typeless"}},
                    "links": [
                        {"title": "Info", "method": "GET", "href": "/widgets",
                         "targetSchema": {"$ref": "#/definitions/widget"}}
                    ]
                }
            }
        });
        let err = generate_client(&schema, Path::new(".")).unwrap_err();
        assert!(matches!(err, SchemaError::MissingType { .. }));
    }

    #[test]
    fn test_untitled_root_fails_generation() {
        let schema = json!({"definitions": {}});
        let err = generate_client(&schema, Path::new(".")).unwrap_err();
        assert!(matches!(err, SchemaError::UntitledRoot));
    }
}
