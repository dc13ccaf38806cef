use crate::config::ApiManifest;
use crate::endpoint::{Endpoint, EndpointResolver, FormEncoding, HttpMethod};
use crate::error::Result;
use crate::schema_generator::{Schema, SchemaProjector};
use crate::type_resolver::{DocLookup, TypeCatalog};
use crate::walker::{PropertyNode, TypeGraphWalker};
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Swagger document builder
pub struct OpenApiBuilder {
    info: Info,
    schemes: Vec<String>,
    base_path: String,
    security_definitions: IndexMap<String, SecurityScheme>,
    security: Vec<IndexMap<String, Vec<String>>>,
    settings: AssemblerSettings,
    tags: Vec<Tag>,
    /// URL -> method key -> operation
    paths: IndexMap<String, IndexMap<String, Operation>>,
    /// (URL, method key) pairs declared by an endpoint rather than generated from one
    explicit: HashSet<(String, String)>,
}

/// Swagger Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for Info {
    fn default() -> Self {
        Self {
            title: "Generated API".to_string(),
            version: "1.0.0".to_string(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// Swagger Security Scheme object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityScheme {
    /// `basic`, `apiKey` or `oauth2`
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Header or query parameter name for `apiKey`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(rename = "authorizationUrl", default, skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(rename = "tokenUrl", default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub scopes: IndexMap<String, String>,
}

/// Swagger Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// `path`, `query`, `formData` or `body`
    #[serde(rename = "in")]
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(rename = "collectionFormat", skip_serializing_if = "Option::is_none")]
    pub collection_format: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(rename = "x-example", skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Only for `in: body`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl Parameter {
    /// A non-body parameter described by a projected schema.
    ///
    /// Object-typed values have no parameter representation and are sent as strings.
    pub fn from_schema(name: &str, location: &str, required: bool, schema: Schema) -> Self {
        let is_array = schema.schema_type.as_deref() == Some("array");
        let param_type = match schema.schema_type.as_deref() {
            None | Some("object") => "string".to_string(),
            Some(other) => other.to_string(),
        };
        Self {
            name: name.to_string(),
            location: location.to_string(),
            description: schema.description,
            required,
            param_type: Some(param_type),
            format: schema.format,
            items: schema.items,
            collection_format: is_array.then(|| "multi".to_string()),
            enum_values: schema.enum_values,
            minimum: schema.minimum,
            maximum: schema.maximum,
            min_length: schema.min_length,
            max_length: schema.max_length,
            example: schema.example,
            schema: None,
        }
    }

    /// The single `in: body` parameter of a structured request
    pub fn body(schema: Schema, description: Option<String>) -> Self {
        Self {
            name: "body".to_string(),
            location: "body".to_string(),
            description,
            required: true,
            param_type: None,
            format: None,
            items: None,
            collection_format: None,
            enum_values: None,
            minimum: None,
            maximum: None,
            min_length: None,
            max_length: None,
            example: None,
            schema: Some(schema),
        }
    }
}

/// Swagger Operation object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    pub tags: Vec<String>,
    pub responses: IndexMap<String, Response>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
}

/// Swagger Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Complete Swagger 2.0 document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecDocument {
    pub swagger: String,
    pub info: Info,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
    #[serde(rename = "basePath")]
    pub base_path: String,
    pub tags: Vec<Tag>,
    #[serde(
        rename = "securityDefinitions",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub security_definitions: IndexMap<String, SecurityScheme>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<IndexMap<String, Vec<String>>>,
    pub paths: IndexMap<String, IndexMap<String, Operation>>,
    pub definitions: IndexMap<String, Schema>,
}

/// Document-wide assembly settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerSettings {
    /// Tag given to endpoints flagged as root
    pub root_tag: String,
    /// Success status keyed by `"METHOD url"`, e.g. `"POST /seas"`
    pub status_overrides: IndexMap<String, u16>,
}

impl Default for AssemblerSettings {
    fn default() -> Self {
        Self {
            root_tag: "root".to_string(),
            status_overrides: IndexMap::new(),
        }
    }
}

impl OpenApiBuilder {
    pub fn new() -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info: Info::default(),
            schemes: Vec::new(),
            base_path: "/".to_string(),
            security_definitions: IndexMap::new(),
            security: Vec::new(),
            settings: AssemblerSettings::default(),
            tags: Vec::new(),
            paths: IndexMap::new(),
            explicit: HashSet::new(),
        }
    }

    /// A builder carrying the document-level fields of a manifest
    pub fn from_manifest(manifest: &ApiManifest) -> Self {
        Self {
            info: manifest.info.clone(),
            schemes: manifest.schemes.clone(),
            base_path: manifest.base_path.clone(),
            security_definitions: manifest.security_definitions.clone(),
            security: manifest.security.clone(),
            settings: manifest.settings.assembler_settings(),
            ..Self::new()
        }
    }

    pub fn with_info(mut self, info: Info) -> Self {
        self.info = info;
        self
    }

    pub fn with_settings(mut self, settings: AssemblerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Add one endpoint, projecting its types through `projector`
    pub fn add_endpoint(&mut self, endpoint: &Endpoint, projector: &mut SchemaProjector) -> Result<()> {
        debug!("Adding endpoint: {} {}", endpoint.method, endpoint.url);

        let tag = self.tag_for(endpoint);
        self.register_tag(&tag);

        let mut parameters = Vec::new();
        let mut optional_segments = Vec::new();
        for node in &endpoint.path_parameters {
            let schema = projector.project(node)?;
            parameters.push(Parameter::from_schema(&node.public_name, "path", true, schema));
            if node.optional {
                optional_segments.push(node.public_name.clone());
            }
        }

        let mut consumes = Vec::new();
        if let Some(form) = &endpoint.request_form {
            match form.encoding {
                FormEncoding::Structured => {
                    let schema = projector.project(&form.node)?;
                    parameters.push(Parameter::body(schema, form.node.description.clone()));
                    consumes.push("application/json".to_string());
                }
                FormEncoding::FormEncoded => {
                    let location = if endpoint.method.is_read() { "query" } else { "formData" };
                    let mut fields = Vec::new();
                    if form.node.children.is_empty() {
                        let schema = projector.project(&form.node)?;
                        fields.push(Parameter::from_schema(&form.node.public_name, location, true, schema));
                    } else {
                        flatten_form(&form.node.children, None, location, projector, &mut fields)?;
                    }
                    if location == "formData" {
                        let multipart = fields.iter().any(|p| p.param_type.as_deref() == Some("file"));
                        consumes.push(
                            if multipart {
                                "multipart/form-data"
                            } else {
                                "application/x-www-form-urlencoded"
                            }
                            .to_string(),
                        );
                    }
                    parameters.extend(fields);
                }
            }
        }

        let responses = self.responses(endpoint, projector)?;
        let operation = Operation {
            summary: endpoint
                .summary
                .clone()
                .or_else(|| Some(format!("{} {}", endpoint.method, endpoint.url))),
            description: endpoint.description.clone(),
            parameters,
            tags: vec![tag],
            responses,
            consumes,
            produces: vec![endpoint.response_kind.produces().to_string()],
        };

        self.insert_with_optional_segments(&endpoint.url, endpoint.method, operation, &optional_segments);
        Ok(())
    }

    /// Add every endpoint and build the document
    pub fn assemble(mut self, endpoints: &[Endpoint], mut projector: SchemaProjector) -> Result<SpecDocument> {
        for endpoint in endpoints {
            self.add_endpoint(endpoint, &mut projector)?;
        }
        Ok(self.build(projector))
    }

    pub fn build(self, projector: SchemaProjector) -> SpecDocument {
        debug!("Building final Swagger document");
        let definitions = projector.into_definitions();
        info!(
            "Document has {} paths and {} definitions",
            self.paths.len(),
            definitions.len()
        );

        SpecDocument {
            swagger: "2.0".to_string(),
            info: self.info,
            schemes: self.schemes,
            base_path: self.base_path,
            tags: self.tags,
            security_definitions: self.security_definitions,
            security: self.security,
            paths: self.paths,
            definitions,
        }
    }

    fn tag_for(&self, endpoint: &Endpoint) -> String {
        if let Some(tag) = &endpoint.tag {
            return tag.clone();
        }
        if endpoint.root {
            return self.settings.root_tag.clone();
        }
        endpoint
            .url
            .split('/')
            .find(|segment| !segment.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.settings.root_tag.clone())
    }

    fn register_tag(&mut self, name: &str) {
        if !self.tags.iter().any(|t| t.name == name) {
            self.tags.push(Tag {
                name: name.to_string(),
            });
        }
    }

    fn responses(
        &self,
        endpoint: &Endpoint,
        projector: &mut SchemaProjector,
    ) -> Result<IndexMap<String, Response>> {
        let override_key = format!("{} {}", endpoint.method, endpoint.url);
        let status = self
            .settings
            .status_overrides
            .get(&override_key)
            .copied()
            .or(endpoint.success_status)
            .unwrap_or(200);

        let schema = match &endpoint.response {
            Some(node) if endpoint.response_kind.has_schema() => Some(projector.project(node)?),
            _ => None,
        };

        let mut responses = IndexMap::new();
        responses.insert(
            status.to_string(),
            Response {
                description: success_description(status).to_string(),
                schema,
            },
        );

        if !endpoint.failure_statuses.is_empty() {
            for (code, causes) in &endpoint.failure_statuses {
                responses.insert(
                    code.to_string(),
                    Response {
                        description: causes.join("; "),
                        schema: None,
                    },
                );
            }
        } else if endpoint.structured_failures {
            responses.insert(
                "400".to_string(),
                Response {
                    description: "client error".to_string(),
                    schema: None,
                },
            );
        }
        Ok(responses)
    }

    /// Insert an operation plus one copy per suffix of its trailing optional path segments.
    ///
    /// With optional `{a}` and `{b}` trailing `/x/{a}/{b}`, the paths end up ordered
    /// `/x/{a}`, `/x`, `/x/{a}/{b}`. An optional segment followed by a required one stays in
    /// every path. Generated copies never replace an operation declared by an endpoint.
    fn insert_with_optional_segments(
        &mut self,
        url: &str,
        method: HttpMethod,
        operation: Operation,
        optional_segments: &[String],
    ) {
        let trailing = trailing_optional_segments(url, optional_segments);
        if trailing.len() < optional_segments.len() {
            debug!(
                "{} {}: optional segments before a required one are kept",
                method, url
            );
        }
        if trailing.is_empty() {
            self.insert(url, method, operation, true);
            return;
        }

        self.insert(url, method, operation.clone(), true);
        let segments: Vec<&str> = url.split('/').collect();
        for removed in 1..=trailing.len() {
            let dropped = &trailing[trailing.len() - removed..];
            let mut shortened = segments[..segments.len() - removed].join("/");
            if shortened.is_empty() {
                shortened = "/".to_string();
            }

            let mut copy = operation.clone();
            copy.parameters
                .retain(|p| !(p.location == "path" && dropped.contains(&p.name)));
            self.insert(&shortened, method, copy, false);
        }

        if let Some(full) = self.paths.shift_remove(url) {
            self.paths.insert(url.to_string(), full);
        }
    }

    fn insert(&mut self, url: &str, method: HttpMethod, operation: Operation, explicit: bool) {
        let key = (url.to_string(), method.key().to_string());
        if explicit {
            if !self.explicit.insert(key) {
                warn!("Duplicate operation {} {} replaced", method, url);
            }
        } else if self.explicit.contains(&key) {
            debug!("{} {} already declared; generated copy skipped", method, url);
            return;
        }

        let item = self.paths.entry(url.to_string()).or_default();
        if item.insert(method.key().to_string(), operation).is_some() && !explicit {
            warn!("Duplicate operation {} {} replaced", method, url);
        }
    }
}

/// Names of the optional `{name}` segments that end `url`, in path order
fn trailing_optional_segments(url: &str, optional_segments: &[String]) -> Vec<String> {
    let mut trailing: Vec<String> = url
        .split('/')
        .rev()
        .map_while(|segment| {
            segment
                .strip_prefix('{')
                .and_then(|rest| rest.strip_suffix('}'))
                .filter(|name| optional_segments.iter().any(|optional| optional == name))
                .map(str::to_string)
        })
        .collect();
    trailing.reverse();
    trailing
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn flatten_form(
    children: &[PropertyNode],
    prefix: Option<&str>,
    location: &str,
    projector: &mut SchemaProjector,
    out: &mut Vec<Parameter>,
) -> Result<()> {
    for child in children {
        let name = match prefix {
            Some(prefix) => format!("{}.{}", prefix, child.public_name),
            None => child.public_name.clone(),
        };
        if !child.children.is_empty() {
            flatten_form(&child.children, Some(&name), location, projector, out)?;
            continue;
        }
        let schema = projector.project(child)?;
        out.push(Parameter::from_schema(&name, location, child.is_required(), schema));
    }
    Ok(())
}

fn success_description(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        _ => "Success",
    }
}

/// Run the full pipeline for a manifest: resolve endpoints against the catalog, project and
/// assemble them into a document
pub fn generate_document(
    manifest: &ApiManifest,
    catalog: &dyn TypeCatalog,
    docs: &dyn DocLookup,
) -> Result<SpecDocument> {
    let scalars = manifest.settings.scalar_table();
    let walker = TypeGraphWalker::new(catalog, docs, &scalars, manifest.settings.walker_settings());
    let resolver = EndpointResolver::new(walker, manifest.settings.depth);
    let endpoints = resolver.resolve_all(&manifest.endpoints)?;
    info!("Resolved {} endpoints", endpoints.len());

    OpenApiBuilder::from_manifest(manifest).assemble(&endpoints, SchemaProjector::new(&scalars))
}
