//! Serialization of OpenAPI documents to YAML or JSON.

use crate::openapi::OpenApiDocument;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes an OpenAPI document to YAML format.
///
/// # Example
///
/// ```no_run
/// use openapi_from_rules::openapi_builder::Generator;
/// use openapi_from_rules::router::Router;
/// use openapi_from_rules::serializer::serialize_yaml;
///
/// let document = Generator::new().generate(&Router::new()).unwrap().unwrap();
/// println!("{}", serialize_yaml(&document).unwrap());
/// ```
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize OpenAPI document to YAML")
}

/// Serializes an OpenAPI document to indented JSON.
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize OpenAPI document to JSON")
}

/// Serializes an OpenAPI document to single-line JSON, for embedding
pub fn serialize_json_compact(doc: &OpenApiDocument) -> Result<String> {
    serde_json::to_string(doc).context("Failed to serialize OpenAPI document to JSON")
}

/// Writes string content to a file, creating parent directories as needed.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::{Components, Info, Operation, PathItem, Response, Server};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn create_test_document() -> OpenApiDocument {
        let mut responses = BTreeMap::new();
        responses.insert(
            "default".to_string(),
            Response {
                description: String::new(),
            },
        );
        let mut paths = BTreeMap::new();
        paths.insert(
            "/users".to_string(),
            PathItem {
                get: Some(Operation {
                    tags: vec!["users".to_string()],
                    description: Some("List users".to_string()),
                    responses,
                    ..Default::default()
                }),
                ..Default::default()
            },
        );

        OpenApiDocument {
            openapi: "3.0.0".to_string(),
            info: Info {
                title: "Test API".to_string(),
                version: "0.0.0".to_string(),
                description: None,
            },
            servers: vec![Server {
                url: "http://127.0.0.1:8080".to_string(),
            }],
            paths,
            components: Components::default(),
        }
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_document()).unwrap();

        assert!(yaml.contains("openapi:"));
        assert!(yaml.contains("3.0.0"));
        assert!(yaml.contains("Test API"));
        assert!(yaml.contains("/users"));
        assert!(yaml.contains("List users"));
        assert!(!yaml.contains("components"));
    }

    #[test]
    fn test_serialize_json() {
        let json = serialize_json(&create_test_document()).unwrap();

        assert!(json.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["paths"]["/users"]["get"]["tags"][0], "users");
        assert_eq!(value["paths"]["/users"]["get"]["responses"]["default"]["description"], "");
        assert_eq!(value["servers"][0]["url"], "http://127.0.0.1:8080");
    }

    #[test]
    fn test_serialize_json_compact() {
        let json = serialize_json_compact(&create_test_document()).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.starts_with(r#"{"openapi":"3.0.0""#));
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("docs/api/openapi.yaml");

        write_to_file("openapi: 3.0.0", &file_path).unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "openapi: 3.0.0");

        write_to_file("openapi: 3.0.1", &file_path).unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "openapi: 3.0.1");
    }

    #[test]
    fn test_roundtrip_yaml_serialization() {
        let original = create_test_document();
        let yaml = serialize_yaml(&original).unwrap();
        let parsed: OpenApiDocument = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, original);
    }
}
