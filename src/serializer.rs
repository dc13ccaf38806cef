//! Serialization of generated Swagger documents and diff reports.

use crate::openapi_builder::SpecDocument;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes a document to YAML.
///
/// # Example
///
/// ```
/// use openapi_typegraph::openapi_builder::OpenApiBuilder;
/// use openapi_typegraph::scalar::ScalarTable;
/// use openapi_typegraph::schema_generator::SchemaProjector;
/// use openapi_typegraph::serializer::serialize_yaml;
///
/// let scalars = ScalarTable::default();
/// let doc = OpenApiBuilder::new().build(SchemaProjector::new(&scalars));
/// let yaml = serialize_yaml(&doc).unwrap();
/// assert!(yaml.starts_with("swagger:"));
/// ```
pub fn serialize_yaml(doc: &SpecDocument) -> Result<String> {
    debug!("Serializing Swagger document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize Swagger document to YAML")
}

/// Serializes a document to pretty-printed JSON, keys in document order.
pub fn serialize_json(doc: &SpecDocument) -> Result<String> {
    debug!("Serializing Swagger document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize Swagger document to JSON")
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

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{EndpointDescriptor, EndpointResolver, HttpMethod};
    use crate::openapi_builder::OpenApiBuilder;
    use crate::scalar::ScalarTable;
    use crate::schema_generator::SchemaProjector;
    use crate::type_resolver::SourceCatalog;
    use crate::walker::{TypeGraphWalker, WalkerSettings};
    use tempfile::TempDir;

    fn sample_document() -> SpecDocument {
        let catalog = SourceCatalog::from_sources(&[(
            "src/model.rs",
            "pub struct SeaBody { pub name: String, pub depth: u32 }",
        )])
        .unwrap();
        let scalars = ScalarTable::default();
        let walker = TypeGraphWalker::new(&catalog, &catalog, &scalars, WalkerSettings::default());
        let mut descriptor = EndpointDescriptor::new("/seas", HttpMethod::Post);
        descriptor.form = Some("SeaBody".to_string());
        descriptor.response = Some("SeaBody".to_string());

        let endpoints = EndpointResolver::new(walker, 2)
            .resolve_all(&[descriptor])
            .unwrap();
        OpenApiBuilder::new()
            .assemble(&endpoints, SchemaProjector::new(&scalars))
            .unwrap()
    }

    #[test]
    fn test_serialize_json_keeps_document_order() {
        let json = serialize_json(&sample_document()).unwrap();

        let swagger = json.find("\"swagger\"").unwrap();
        let paths = json.find("\"paths\"").unwrap();
        let definitions = json.find("\"definitions\"").unwrap();
        assert!(swagger < paths && paths < definitions);
        assert!(json.contains("\"$ref\": \"#/definitions/SeaBody\""));
    }

    #[test]
    fn test_serialize_yaml_round_trips() {
        let doc = sample_document();
        let yaml = serialize_yaml(&doc).unwrap();

        let parsed: SpecDocument = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_write_to_file_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("build/api/swagger.json");

        write_to_file("{}", &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }
}
