//! Endpoint descriptors and their resolution into property trees.
//!
//! An [`EndpointDescriptor`] names the URL, method and Rust types of one operation, usually
//! as an entry of the API manifest. [`EndpointResolver`] walks those types into an [`Endpoint`]
//! ready for the [`OpenApiBuilder`](crate::openapi_builder::OpenApiBuilder).

use crate::error::{Error, Result};
use crate::type_resolver::TypeRef;
use crate::walker::{PropertyNode, TypeGraphWalker};
use indexmap::IndexMap;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `{name}` placeholders in a URL template
pub(crate) static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}/]+)\}").expect("placeholder pattern is valid"));

/// Wrappers that only select an extractor or encoding and are stripped before walking
const EXTRACTOR_WRAPPERS: &[&str] = &["Json", "Form", "Multipart", "Query", "Path", "Result"];
const STREAM_TYPES: &[&str] = &["Stream", "ByteStream", "StreamBody", "Bytes", "Body"];
const HTML_TYPES: &[&str] = &["Html", "HtmlTemplate"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Lowercase key used under a path item
    pub fn key(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
        }
    }

    /// Methods whose form fields travel in the query string
    pub fn is_read(self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Head | HttpMethod::Options)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathParameterDescriptor {
    pub name: String,
    /// Rust type as written, e.g. `u64` or `Option<String>`
    #[serde(rename = "type", default = "default_parameter_type")]
    pub ty: String,
    #[serde(default)]
    pub doc: Option<String>,
}

fn default_parameter_type() -> String {
    "String".to_string()
}

fn default_method() -> HttpMethod {
    HttpMethod::Get
}

fn default_true() -> bool {
    true
}

/// Declarative description of one operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    /// Path template, e.g. `/seas/{id}/{page}`
    pub url: String,
    #[serde(default = "default_method")]
    pub method: HttpMethod,
    /// Root endpoints are tagged with the configured root tag
    #[serde(default)]
    pub root: bool,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub path_parameters: Vec<PathParameterDescriptor>,
    /// Request input type (`SeaBody`, `Json<SeaBody>`, `SearchForm`, `Multipart<UploadForm>`)
    #[serde(default)]
    pub form: Option<String>,
    /// Response type; absent or `()` for no content
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub success_status: Option<u16>,
    /// Failure status -> causes
    #[serde(default)]
    pub failures: IndexMap<u16, Vec<String>>,
    #[serde(default = "default_true")]
    pub structured_failures: bool,
}

impl EndpointDescriptor {
    pub fn new(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            root: false,
            tag: None,
            summary: None,
            description: None,
            path_parameters: Vec::new(),
            form: None,
            response: None,
            success_status: None,
            failures: IndexMap::new(),
            structured_failures: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Json,
    Void,
    Stream,
    Html,
}

impl ResponseKind {
    pub fn produces(self) -> &'static str {
        match self {
            ResponseKind::Json | ResponseKind::Void => "application/json",
            ResponseKind::Stream => "application/octet-stream",
            ResponseKind::Html => "text/html",
        }
    }

    /// Whether the success response carries a schema
    pub fn has_schema(self) -> bool {
        self == ResponseKind::Json
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEncoding {
    /// A single JSON body parameter
    Structured,
    /// Flattened into query or formData parameters
    FormEncoded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestForm {
    pub encoding: FormEncoding,
    pub node: PropertyNode,
}

/// One resolved operation
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub url: String,
    pub method: HttpMethod,
    pub tag: Option<String>,
    pub root: bool,
    pub summary: Option<String>,
    pub description: Option<String>,
    /// One node per URL placeholder, in URL order
    pub path_parameters: Vec<PropertyNode>,
    pub request_form: Option<RequestForm>,
    pub response: Option<PropertyNode>,
    pub response_kind: ResponseKind,
    pub success_status: Option<u16>,
    pub failure_statuses: IndexMap<u16, Vec<String>>,
    pub structured_failures: bool,
}

/// Turns descriptors into endpoints by walking their declared types
pub struct EndpointResolver<'a> {
    walker: TypeGraphWalker<'a>,
    depth: i32,
}

impl<'a> EndpointResolver<'a> {
    pub fn new(walker: TypeGraphWalker<'a>, depth: i32) -> Self {
        Self { walker, depth }
    }

    pub fn resolve_all(&self, descriptors: &[EndpointDescriptor]) -> Result<Vec<Endpoint>> {
        descriptors.iter().map(|d| self.resolve(d)).collect()
    }

    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when a declared type is not valid Rust type syntax.
    pub fn resolve(&self, descriptor: &EndpointDescriptor) -> Result<Endpoint> {
        debug!("Resolving {} {}", descriptor.method, descriptor.url);

        let path_parameters = self.path_parameters(descriptor)?;
        let request_form = match &descriptor.form {
            Some(form) => Some(self.request_form(descriptor, form)?),
            None => None,
        };
        let (response, response_kind) = match &descriptor.response {
            Some(response) => self.response(descriptor, response)?,
            None => (None, ResponseKind::Void),
        };

        Ok(Endpoint {
            url: descriptor.url.clone(),
            method: descriptor.method,
            tag: descriptor.tag.clone(),
            root: descriptor.root,
            summary: descriptor.summary.clone(),
            description: descriptor.description.clone(),
            path_parameters,
            request_form,
            response,
            response_kind,
            success_status: descriptor.success_status,
            failure_statuses: descriptor.failures.clone(),
            structured_failures: descriptor.structured_failures,
        })
    }

    fn path_parameters(&self, descriptor: &EndpointDescriptor) -> Result<Vec<PropertyNode>> {
        let placeholders: Vec<&str> = PLACEHOLDER
            .captures_iter(&descriptor.url)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();

        for declared in &descriptor.path_parameters {
            if !placeholders.contains(&declared.name.as_str()) {
                warn!(
                    "{} {}: path parameter {} has no placeholder",
                    descriptor.method, descriptor.url, declared.name
                );
            }
        }

        placeholders
            .into_iter()
            .map(|name| {
                let declared = descriptor.path_parameters.iter().find(|p| p.name == name);
                let ty = match declared {
                    Some(p) => parse_type(descriptor, &p.ty)?,
                    None => TypeRef::named("String"),
                };
                let mut node = self.walker.root_node(name, &ty, 0);
                if let Some(doc) = declared.and_then(|p| p.doc.clone()) {
                    node = node.with_documentation(Some(doc));
                }
                Ok(node)
            })
            .collect()
    }

    fn request_form(&self, descriptor: &EndpointDescriptor, form: &str) -> Result<RequestForm> {
        let declared = parse_type(descriptor, form)?;
        let explicit = match declared.name.as_str() {
            "Json" => Some(FormEncoding::Structured),
            "Form" | "Multipart" | "Query" => Some(FormEncoding::FormEncoded),
            _ => None,
        };
        let inner = strip_extractors(&declared);
        let encoding = explicit.unwrap_or(if inner.name.ends_with("Body") {
            FormEncoding::Structured
        } else {
            FormEncoding::FormEncoded
        });

        Ok(RequestForm {
            encoding,
            node: self.walker.root_node("body", &inner, self.depth),
        })
    }

    fn response(
        &self,
        descriptor: &EndpointDescriptor,
        response: &str,
    ) -> Result<(Option<PropertyNode>, ResponseKind)> {
        let declared = parse_type(descriptor, response)?;
        let inner = strip_extractors(&declared);
        let kind = if inner.is_unit() {
            ResponseKind::Void
        } else if HTML_TYPES.contains(&inner.name.as_str()) {
            ResponseKind::Html
        } else if STREAM_TYPES.contains(&inner.name.as_str()) {
            ResponseKind::Stream
        } else {
            ResponseKind::Json
        };

        let node = kind
            .has_schema()
            .then(|| self.walker.root_node("response", &inner, self.depth));
        Ok((node, kind))
    }
}

fn parse_type(descriptor: &EndpointDescriptor, text: &str) -> Result<TypeRef> {
    TypeRef::parse(text).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "{} {}: `{}` is not a Rust type",
            descriptor.method, descriptor.url, text
        ))
    })
}

fn strip_extractors(ty: &TypeRef) -> TypeRef {
    if EXTRACTOR_WRAPPERS.contains(&ty.name.as_str()) {
        if let Some(inner) = ty.first_arg() {
            return strip_extractors(inner);
        }
    }
    ty.clone()
}
