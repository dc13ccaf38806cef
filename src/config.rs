//! API manifest: document metadata, generation settings and endpoint descriptors.
//!
//! Manifests are YAML or JSON. Every field has a default, so an empty file is a valid (if
//! pointless) manifest.
//!
//! ```yaml
//! info:
//!   title: Harbour API
//!   version: 2.1.0
//! base_path: /api
//! settings:
//!   depth: 3
//!   naming: camelCase
//!   status_overrides:
//!     POST /seas: 201
//! endpoints:
//!   - url: /seas/{id}
//!     method: GET
//!     path_parameters:
//!       - { name: id, type: u64 }
//!     response: ApiResult<SeaBody>
//! ```

use crate::endpoint::EndpointDescriptor;
use crate::openapi_builder::{AssemblerSettings, Info, SecurityScheme};
use crate::scalar::{FormattingPolicy, ScalarKind, ScalarTable};
use crate::walker::{default_nested_suffixes, NamingPolicy, WalkerSettings};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiManifest {
    pub info: Info,
    pub base_path: String,
    pub schemes: Vec<String>,
    pub security_definitions: IndexMap<String, SecurityScheme>,
    pub security: Vec<IndexMap<String, Vec<String>>>,
    pub settings: Settings,
    pub endpoints: Vec<EndpointDescriptor>,
}

impl Default for ApiManifest {
    fn default() -> Self {
        Self {
            info: Info::default(),
            base_path: "/".to_string(),
            schemes: Vec::new(),
            security_definitions: IndexMap::new(),
            security: Vec::new(),
            settings: Settings::default(),
            endpoints: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Depth budget for type graph expansion
    pub depth: i32,
    pub nested_suffixes: Vec<String>,
    pub naming: NamingPolicy,
    #[serde(flatten)]
    pub formatting: FormattingPolicy,
    pub root_tag: String,
    /// Success status keyed by `"METHOD url"`
    pub status_overrides: IndexMap<String, u16>,
    /// Project type names treated as a built-in scalar, e.g. `UserId: i64`
    pub scalar_aliases: IndexMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            depth: 4,
            nested_suffixes: default_nested_suffixes(),
            naming: NamingPolicy::Identity,
            formatting: FormattingPolicy::default(),
            root_tag: "root".to_string(),
            status_overrides: IndexMap::new(),
            scalar_aliases: IndexMap::new(),
        }
    }
}

impl Settings {
    pub fn walker_settings(&self) -> WalkerSettings {
        WalkerSettings {
            nested_suffixes: self.nested_suffixes.clone(),
            naming: self.naming,
        }
    }

    pub fn assembler_settings(&self) -> AssemblerSettings {
        AssemblerSettings {
            root_tag: self.root_tag.clone(),
            status_overrides: self.status_overrides.clone(),
        }
    }

    pub fn scalar_table(&self) -> ScalarTable {
        let mut table = ScalarTable::new(self.formatting.clone());
        for (alias, target) in &self.scalar_aliases {
            match ScalarKind::from_type_name(target) {
                Some(kind) => table = table.with_alias(alias.clone(), kind),
                None => warn!("Scalar alias {} -> {}: unknown scalar type", alias, target),
            }
        }
        table
    }
}

impl ApiManifest {
    /// Load a manifest; `.json` files are read as JSON, anything else as YAML
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading manifest {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let manifest = if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON manifest: {}", path.display()))?
        } else {
            Self::from_yaml(&content)
                .with_context(|| format!("Invalid YAML manifest: {}", path.display()))?
        };
        Ok(manifest)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::HttpMethod;
    use tempfile::TempDir;

    #[test]
    fn test_empty_manifest_uses_defaults() {
        let manifest = ApiManifest::from_yaml("").unwrap();
        assert_eq!(manifest, ApiManifest::default());
        assert_eq!(manifest.settings.depth, 4);
        assert_eq!(manifest.settings.root_tag, "root");
        assert_eq!(manifest.settings.formatting.date_pattern, "%Y-%m-%d");
    }

    #[test]
    fn test_yaml_manifest() {
        let yaml = r#"
info:
  title: Harbour API
  version: 2.1.0
base_path: /api
schemes: [https]
security_definitions:
  token:
    type: apiKey
    name: X-Token
    in: header
security:
  - token: []
settings:
  depth: 2
  naming: camelCase
  date_pattern: "%d/%m/%Y"
  status_overrides:
    POST /seas: 201
  scalar_aliases:
    SeaId: u64
endpoints:
  - url: /seas
    method: POST
    form: SeaBody
"#;
        let manifest = ApiManifest::from_yaml(yaml).unwrap();

        assert_eq!(manifest.info.title, "Harbour API");
        assert_eq!(manifest.base_path, "/api");
        assert_eq!(
            manifest.security_definitions["token"].location.as_deref(),
            Some("header")
        );
        assert_eq!(manifest.settings.depth, 2);
        assert_eq!(manifest.settings.naming, NamingPolicy::CamelCase);
        assert_eq!(manifest.settings.formatting.date_pattern, "%d/%m/%Y");
        assert_eq!(manifest.settings.formatting.time_pattern, "%H:%M:%S");
        assert_eq!(manifest.settings.status_overrides["POST /seas"], 201);
        assert_eq!(manifest.endpoints[0].method, HttpMethod::Post);

        let scalars = manifest.settings.scalar_table();
        assert_eq!(scalars.lookup("SeaId"), Some(ScalarKind::U64));
    }

    #[test]
    fn test_load_json_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("api.json");
        fs::write(
            &path,
            r#"{"info": {"title": "Json API"}, "endpoints": [{"url": "/seas"}]}"#,
        )
        .unwrap();

        let manifest = ApiManifest::load(&path).unwrap();
        assert_eq!(manifest.info.title, "Json API");
        assert_eq!(manifest.info.version, "1.0.0");
        assert_eq!(manifest.endpoints[0].method, HttpMethod::Get);
    }

    #[test]
    fn test_load_missing_manifest_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = ApiManifest::load(&temp_dir.path().join("missing.yaml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("missing.yaml"));
    }
}
