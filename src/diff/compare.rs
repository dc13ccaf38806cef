//! Structural comparison of two spec documents.
//!
//! Both Swagger 2.0 and OpenAPI 3 documents are read into the same view: operations keyed by
//! method and path, parameters keyed by name and location, and request/response content keyed
//! by media type. Schemas are compared after `$ref` resolution, so renaming a definition
//! without changing its shape is not a change.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

const METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// `$ref` hops followed on a parameter, response or path item
const MAX_REF_DEPTH: usize = 8;

const DEFAULT_MEDIA_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationKey {
    /// Upper case
    pub method: String,
    pub path: String,
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterKey {
    pub name: String,
    pub location: String,
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.name, self.location)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiChanges {
    pub added: Vec<OperationKey>,
    pub removed: Vec<OperationKey>,
    pub changed: Vec<ChangedOperation>,
}

impl ApiChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangedOperation {
    pub key: OperationKey,
    pub parameters: Option<ChangedParameters>,
    pub request_body: Option<ChangedRequestBody>,
    pub responses: Option<ChangedResponses>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangedParameters {
    pub added: Vec<ParameterKey>,
    pub removed: Vec<ParameterKey>,
    pub changed: Vec<ChangedParameter>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangedParameter {
    pub key: ParameterKey,
    /// Old and new `required`
    pub required: Option<(bool, bool)>,
    /// Old and new schema labels
    pub schema: Option<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangedRequestBody {
    pub description: Option<(Option<String>, Option<String>)>,
    pub required: Option<(bool, bool)>,
    pub content: ChangedContent,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangedContent {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<ChangedMediaType>,
}

impl ChangedContent {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangedMediaType {
    pub media_type: String,
    pub old_schema: String,
    pub new_schema: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangedResponses {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<ChangedResponse>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangedResponse {
    pub status: String,
    pub content: ChangedContent,
}

/// Compare two (already pruned) documents
pub fn compare(left: &Value, right: &Value) -> ApiChanges {
    let old = SpecView::new(left);
    let new = SpecView::new(right);
    let old_operations = old.operations();
    let new_operations = new.operations();

    let mut changes = ApiChanges::default();
    for (key, new_operation) in &new_operations {
        match old_operations.get(key) {
            None => changes.added.push(key.clone()),
            Some(old_operation) => {
                if let Some(changed) =
                    compare_operation(key, &old, old_operation, &new, new_operation)
                {
                    changes.changed.push(changed);
                }
            }
        }
    }
    changes.removed = old_operations
        .keys()
        .filter(|key| !new_operations.contains_key(*key))
        .cloned()
        .collect();
    changes
}

fn compare_operation(
    key: &OperationKey,
    old: &SpecView,
    old_operation: &OperationView,
    new: &SpecView,
    new_operation: &OperationView,
) -> Option<ChangedOperation> {
    let parameters = compare_parameters(
        &old.parameters(old_operation),
        &new.parameters(new_operation),
    );
    let request_body = compare_request_body(
        old.request_body(old_operation),
        new.request_body(new_operation),
    );
    let responses = compare_responses(
        &old.responses(old_operation),
        &new.responses(new_operation),
    );

    if parameters.is_none() && request_body.is_none() && responses.is_none() {
        return None;
    }
    Some(ChangedOperation {
        key: key.clone(),
        parameters,
        request_body,
        responses,
    })
}

fn compare_parameters(
    old: &IndexMap<ParameterKey, ParameterView>,
    new: &IndexMap<ParameterKey, ParameterView>,
) -> Option<ChangedParameters> {
    let mut changes = ChangedParameters {
        added: new.keys().filter(|k| !old.contains_key(*k)).cloned().collect(),
        removed: old.keys().filter(|k| !new.contains_key(*k)).cloned().collect(),
        changed: Vec::new(),
    };
    for (key, new_parameter) in new {
        let Some(old_parameter) = old.get(key) else {
            continue;
        };
        let required = (old_parameter.required != new_parameter.required)
            .then_some((old_parameter.required, new_parameter.required));
        let schema = (old_parameter.schema.signature != new_parameter.schema.signature).then(|| {
            (
                old_parameter.schema.label.clone(),
                new_parameter.schema.label.clone(),
            )
        });
        if required.is_some() || schema.is_some() {
            changes.changed.push(ChangedParameter {
                key: key.clone(),
                required,
                schema,
            });
        }
    }

    let unchanged =
        changes.added.is_empty() && changes.removed.is_empty() && changes.changed.is_empty();
    (!unchanged).then_some(changes)
}

fn compare_request_body(
    old: Option<BodyView>,
    new: Option<BodyView>,
) -> Option<ChangedRequestBody> {
    let old = old.unwrap_or_default();
    let new = new.unwrap_or_default();

    let changes = ChangedRequestBody {
        description: (old.description != new.description)
            .then(|| (old.description.clone(), new.description.clone())),
        required: (old.required != new.required).then_some((old.required, new.required)),
        content: compare_content(&old.content, &new.content),
    };
    let unchanged =
        changes.description.is_none() && changes.required.is_none() && changes.content.is_empty();
    (!unchanged).then_some(changes)
}

fn compare_responses(
    old: &IndexMap<String, IndexMap<String, SchemaView>>,
    new: &IndexMap<String, IndexMap<String, SchemaView>>,
) -> Option<ChangedResponses> {
    let mut changes = ChangedResponses {
        added: new.keys().filter(|k| !old.contains_key(*k)).cloned().collect(),
        removed: old.keys().filter(|k| !new.contains_key(*k)).cloned().collect(),
        changed: Vec::new(),
    };
    for (status, new_content) in new {
        let Some(old_content) = old.get(status) else {
            continue;
        };
        let content = compare_content(old_content, new_content);
        if !content.is_empty() {
            changes.changed.push(ChangedResponse {
                status: status.clone(),
                content,
            });
        }
    }

    let unchanged =
        changes.added.is_empty() && changes.removed.is_empty() && changes.changed.is_empty();
    (!unchanged).then_some(changes)
}

fn compare_content(
    old: &IndexMap<String, SchemaView>,
    new: &IndexMap<String, SchemaView>,
) -> ChangedContent {
    let mut changes = ChangedContent {
        added: new.keys().filter(|k| !old.contains_key(*k)).cloned().collect(),
        removed: old.keys().filter(|k| !new.contains_key(*k)).cloned().collect(),
        changed: Vec::new(),
    };
    for (media_type, new_schema) in new {
        if let Some(old_schema) = old.get(media_type) {
            if old_schema.signature != new_schema.signature {
                changes.changed.push(ChangedMediaType {
                    media_type: media_type.clone(),
                    old_schema: old_schema.label.clone(),
                    new_schema: new_schema.label.clone(),
                });
            }
        }
    }
    changes
}

struct OperationView<'a> {
    operation: &'a Value,
    path_item: &'a Value,
}

struct ParameterView {
    required: bool,
    schema: SchemaView,
}

#[derive(Default)]
struct BodyView {
    description: Option<String>,
    required: bool,
    content: IndexMap<String, SchemaView>,
}

/// A schema reduced to what comparison needs: a short label for the report and a canonical
/// form with references resolved and keys sorted
struct SchemaView {
    label: String,
    signature: Value,
}

struct SpecView<'a> {
    root: &'a Value,
}

impl<'a> SpecView<'a> {
    fn new(root: &'a Value) -> Self {
        Self { root }
    }

    fn operations(&self) -> IndexMap<OperationKey, OperationView<'a>> {
        let mut operations = IndexMap::new();
        let Some(paths) = self.root.get("paths").and_then(Value::as_object) else {
            return operations;
        };
        for (path, path_item) in paths {
            let path_item = self.resolve(path_item);
            for method in METHODS {
                if let Some(operation) = path_item.get(*method) {
                    operations.insert(
                        OperationKey {
                            method: method.to_uppercase(),
                            path: path.clone(),
                        },
                        OperationView {
                            operation,
                            path_item,
                        },
                    );
                }
            }
        }
        operations
    }

    /// Path-level parameters overridden by operation-level ones. Swagger 2 `body` parameters
    /// are request bodies and are left out.
    fn parameters(&self, operation: &OperationView<'a>) -> IndexMap<ParameterKey, ParameterView> {
        let mut parameters = IndexMap::new();
        for parameter in self.raw_parameters(operation) {
            let (Some(name), Some(location)) = (
                parameter.get("name").and_then(Value::as_str),
                parameter.get("in").and_then(Value::as_str),
            ) else {
                continue;
            };
            if location == "body" {
                continue;
            }
            parameters.insert(
                ParameterKey {
                    name: name.to_string(),
                    location: location.to_string(),
                },
                ParameterView {
                    required: flag(parameter, "required"),
                    schema: self.parameter_schema(parameter),
                },
            );
        }
        parameters
    }

    fn raw_parameters(&self, operation: &OperationView<'a>) -> Vec<&'a Value> {
        [operation.path_item, operation.operation]
            .into_iter()
            .filter_map(|owner| owner.get("parameters").and_then(Value::as_array))
            .flatten()
            .map(|parameter| self.resolve(parameter))
            .collect()
    }

    /// OpenAPI 3 parameters carry a `schema`; Swagger 2 ones describe their type inline
    fn parameter_schema(&self, parameter: &Value) -> SchemaView {
        if let Some(schema) = parameter.get("schema") {
            return self.schema_view(schema);
        }
        let inline: Map<String, Value> = parameter
            .as_object()
            .into_iter()
            .flatten()
            .filter(|(key, _)| !matches!(key.as_str(), "name" | "in" | "required" | "description"))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        self.schema_view(&Value::Object(inline))
    }

    fn request_body(&self, operation: &OperationView<'a>) -> Option<BodyView> {
        if let Some(body) = operation.operation.get("requestBody") {
            let body = self.resolve(body);
            return Some(BodyView {
                description: text(body, "description"),
                required: flag(body, "required"),
                content: self.content(body),
            });
        }

        let body = self
            .raw_parameters(operation)
            .into_iter()
            .rev()
            .find(|p| p.get("in").and_then(Value::as_str) == Some("body"))?;
        let schema = body.get("schema").unwrap_or(&Value::Null);
        Some(BodyView {
            description: text(body, "description"),
            required: flag(body, "required"),
            content: self
                .media_types(operation, "consumes")
                .into_iter()
                .map(|media_type| (media_type, self.schema_view(schema)))
                .collect(),
        })
    }

    fn responses(
        &self,
        operation: &OperationView<'a>,
    ) -> IndexMap<String, IndexMap<String, SchemaView>> {
        let Some(responses) = operation
            .operation
            .get("responses")
            .and_then(Value::as_object)
        else {
            return IndexMap::new();
        };
        responses
            .iter()
            .map(|(status, response)| {
                let response = self.resolve(response);
                let content = if response.get("content").is_some() {
                    self.content(response)
                } else if let Some(schema) = response.get("schema") {
                    self.media_types(operation, "produces")
                        .into_iter()
                        .map(|media_type| (media_type, self.schema_view(schema)))
                        .collect()
                } else {
                    IndexMap::new()
                };
                (status.clone(), content)
            })
            .collect()
    }

    /// OpenAPI 3 `content` map
    fn content(&self, owner: &Value) -> IndexMap<String, SchemaView> {
        owner
            .get("content")
            .and_then(Value::as_object)
            .into_iter()
            .flatten()
            .map(|(media_type, entry)| {
                let schema = entry.get("schema").unwrap_or(&Value::Null);
                (media_type.clone(), self.schema_view(schema))
            })
            .collect()
    }

    /// Swagger 2 `consumes`/`produces`, operation level first, then document level
    fn media_types(&self, operation: &OperationView<'a>, field: &str) -> Vec<String> {
        let declared = operation
            .operation
            .get(field)
            .or_else(|| self.root.get(field))
            .and_then(Value::as_array)
            .map(|types| {
                types
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        if declared.is_empty() {
            vec![DEFAULT_MEDIA_TYPE.to_string()]
        } else {
            declared
        }
    }

    fn schema_view(&self, schema: &Value) -> SchemaView {
        SchemaView {
            label: schema_label(schema),
            signature: self.canonical(schema, &mut Vec::new()),
        }
    }

    /// Resolve a `$ref` chain on a parameter, response or path item
    fn resolve(&self, value: &'a Value) -> &'a Value {
        let mut current = value;
        for _ in 0..MAX_REF_DEPTH {
            match current
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|reference| self.lookup(reference))
            {
                Some(target) => current = target,
                None => break,
            }
        }
        current
    }

    fn lookup(&self, reference: &str) -> Option<&'a Value> {
        reference
            .strip_prefix('#')
            .and_then(|pointer| self.root.pointer(pointer))
    }

    /// Schema with keys sorted and references inlined.
    ///
    /// Each reference is inlined at its first occurrence only. Later occurrences, including
    /// cycles, become `{"$seen": n}` where `n` is the order of first expansion, so two schemas
    /// that differ only by definition names have the same canonical form.
    fn canonical(&self, schema: &Value, expanded: &mut Vec<String>) -> Value {
        match schema {
            Value::Object(map) => {
                if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                    if let Some(position) = expanded.iter().position(|seen| seen == reference) {
                        return Value::Object(Map::from_iter([(
                            "$seen".to_string(),
                            Value::from(position),
                        )]));
                    }
                    if let Some(target) = self.lookup(reference) {
                        expanded.push(reference.to_string());
                        return self.canonical(target, expanded);
                    }
                    return Value::Object(Map::from_iter([(
                        "$ref".to_string(),
                        Value::String(reference.to_string()),
                    )]));
                }
                let sorted: BTreeMap<&String, &Value> = map.iter().collect();
                Value::Object(
                    sorted
                        .into_iter()
                        .map(|(key, value)| (key.clone(), self.canonical(value, expanded)))
                        .collect(),
                )
            }
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.canonical(item, expanded))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

/// Short human label: definition name, `array<...>`, or `type(format)`
fn schema_label(schema: &Value) -> String {
    if schema.is_null() {
        return "none".to_string();
    }
    if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
        return reference.rsplit('/').next().unwrap_or(reference).to_string();
    }
    match schema.get("type").and_then(Value::as_str) {
        Some("array") => format!(
            "array<{}>",
            schema_label(schema.get("items").unwrap_or(&Value::Null))
        ),
        Some(ty) => match schema.get("format").and_then(Value::as_str) {
            Some(format) => format!("{}({})", ty, format),
            None => ty.to_string(),
        },
        None => "object".to_string(),
    }
}

fn flag(value: &Value, field: &str) -> bool {
    value.get(field).and_then(Value::as_bool).unwrap_or(false)
}

fn text(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn key(method: &str, path: &str) -> OperationKey {
        OperationKey {
            method: method.to_string(),
            path: path.to_string(),
        }
    }

    fn swagger(paths: Value, definitions: Value) -> Value {
        json!({"swagger": "2.0", "paths": paths, "definitions": definitions})
    }

    #[test]
    fn test_identical_documents_have_no_changes() {
        let doc = swagger(
            json!({"/seas": {"get": {"responses": {"200": {"schema": {"$ref": "#/definitions/Sea"}}}}}}),
            json!({"Sea": {"type": "object", "properties": {"name": {"type": "string"}}}}),
        );
        assert!(compare(&doc, &doc).is_empty());
    }

    #[test]
    fn test_added_and_removed_operations() {
        let old = swagger(
            json!({"/seas": {"get": {}, "delete": {}}}),
            json!({}),
        );
        let new = swagger(
            json!({"/seas": {"get": {}, "post": {}}, "/ships": {"get": {}}}),
            json!({}),
        );

        let changes = compare(&old, &new);
        assert_eq!(changes.added, vec![key("POST", "/seas"), key("GET", "/ships")]);
        assert_eq!(changes.removed, vec![key("DELETE", "/seas")]);
        assert!(changes.changed.is_empty());
    }

    #[test]
    fn test_parameter_changes() {
        let old = swagger(
            json!({"/seas/{id}": {
                "parameters": [{"name": "id", "in": "path", "required": true, "type": "integer"}],
                "get": {"parameters": [{"name": "size", "in": "query", "type": "integer"}]}
            }}),
            json!({}),
        );
        let new = swagger(
            json!({"/seas/{id}": {
                "parameters": [{"name": "id", "in": "path", "required": true, "type": "string"}],
                "get": {"parameters": [{"name": "page", "in": "query", "required": true, "type": "integer"}]}
            }}),
            json!({}),
        );

        let changes = compare(&old, &new);
        let parameters = changes.changed[0].parameters.as_ref().unwrap();
        assert_eq!(parameters.added[0].to_string(), "page in query");
        assert_eq!(parameters.removed[0].to_string(), "size in query");
        assert_eq!(
            parameters.changed[0].schema,
            Some(("integer".to_string(), "string".to_string()))
        );
        assert_eq!(parameters.changed[0].required, None);
    }

    #[test]
    fn test_definition_rename_with_same_shape_is_unchanged() {
        let old = swagger(
            json!({"/seas": {"post": {"parameters": [{"name": "body", "in": "body", "schema": {"$ref": "#/definitions/SeaBody"}}]}}}),
            json!({"SeaBody": {"type": "object", "properties": {"name": {"type": "string"}}}}),
        );
        let new = swagger(
            json!({"/seas": {"post": {"parameters": [{"name": "form", "in": "body", "schema": {"$ref": "#/definitions/SeaForm"}}]}}}),
            json!({"SeaForm": {"properties": {"name": {"type": "string"}}, "type": "object"}}),
        );
        assert!(compare(&old, &new).is_empty());
    }

    #[test]
    fn test_request_body_and_response_changes() {
        let old = swagger(
            json!({"/seas": {"post": {
                "consumes": ["application/json"],
                "parameters": [{"name": "body", "in": "body", "schema": {"$ref": "#/definitions/SeaBody"}}],
                "responses": {"200": {"schema": {"type": "string"}}}
            }}}),
            json!({"SeaBody": {"type": "object", "properties": {"name": {"type": "string"}}}}),
        );
        let new = swagger(
            json!({"/seas": {"post": {
                "consumes": ["application/json"],
                "parameters": [{"name": "body", "in": "body", "required": true, "schema": {"$ref": "#/definitions/SeaBody"}}],
                "responses": {"200": {"schema": {"type": "integer"}}, "201": {}}
            }}}),
            json!({"SeaBody": {"type": "object", "properties": {"name": {"type": "integer"}}}}),
        );

        let changes = compare(&old, &new);
        let operation = &changes.changed[0];
        let body = operation.request_body.as_ref().unwrap();
        assert_eq!(body.required, Some((false, true)));
        assert_eq!(
            body.content.changed,
            vec![ChangedMediaType {
                media_type: "application/json".to_string(),
                old_schema: "SeaBody".to_string(),
                new_schema: "SeaBody".to_string(),
            }]
        );

        let responses = operation.responses.as_ref().unwrap();
        assert_eq!(responses.added, vec!["201".to_string()]);
        assert_eq!(responses.changed[0].status, "200");
        assert_eq!(responses.changed[0].content.changed[0].new_schema, "integer");
    }

    #[test]
    fn test_openapi3_content() {
        let old = json!({
            "openapi": "3.0.0",
            "paths": {"/seas": {"post": {
                "requestBody": {"$ref": "#/components/requestBodies/Sea"},
                "responses": {"200": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Sea"}}}}}
            }}},
            "components": {
                "requestBodies": {"Sea": {"content": {"application/json": {"schema": {"type": "object"}}}}},
                "schemas": {"Sea": {"type": "object"}}
            }
        });
        let mut new = old.clone();
        new["components"]["requestBodies"]["Sea"]["content"]["application/xml"] =
            json!({"schema": {"type": "object"}});

        let changes = compare(&old, &new);
        let body = changes.changed[0].request_body.as_ref().unwrap();
        assert_eq!(body.content.added, vec!["application/xml".to_string()]);
        assert!(changes.changed[0].responses.is_none());
    }

    #[test]
    fn test_recursive_schema_is_bounded() {
        let doc = swagger(
            json!({"/nodes": {"get": {"responses": {"200": {"schema": {"$ref": "#/definitions/Node"}}}}}}),
            json!({"Node": {"type": "object", "properties": {"next": {"$ref": "#/definitions/Node"}}}}),
        );
        assert!(compare(&doc, &doc).is_empty());
    }

    #[test]
    fn test_densely_linked_definitions_compare_quickly() {
        let links = |target: &str| -> Map<String, Value> {
            let reference = json!({"$ref": format!("#/definitions/{}", target)});
            (0..10)
                .map(|i| (format!("link{}", i), reference.clone()))
                .collect()
        };
        let mut node = links("Node");
        node.insert("other".to_string(), json!({"$ref": "#/definitions/Edge"}));
        let mut edge = links("Edge");
        edge.insert("back".to_string(), json!({"$ref": "#/definitions/Node"}));
        let old = swagger(
            json!({"/nodes": {"get": {"responses": {"200": {"schema": {"$ref": "#/definitions/Node"}}}}}}),
            json!({
                "Node": {"type": "object", "properties": node},
                "Edge": {"type": "object", "properties": edge}
            }),
        );
        assert!(compare(&old, &old).is_empty());

        let mut new = old.clone();
        new["definitions"]["Edge"]["properties"]["weight"] = json!({"type": "number"});
        let changes = compare(&old, &new);
        assert_eq!(changes.changed.len(), 1);
    }

    #[test]
    fn test_renamed_recursive_definition_is_unchanged() {
        let old = swagger(
            json!({"/nodes": {"get": {"responses": {"200": {"schema": {"$ref": "#/definitions/Node"}}}}}}),
            json!({"Node": {"type": "object", "properties": {
                "left": {"$ref": "#/definitions/Node"},
                "right": {"$ref": "#/definitions/Node"}
            }}}),
        );
        let new = swagger(
            json!({"/nodes": {"get": {"responses": {"200": {"schema": {"$ref": "#/definitions/Tree"}}}}}}),
            json!({"Tree": {"type": "object", "properties": {
                "left": {"$ref": "#/definitions/Tree"},
                "right": {"$ref": "#/definitions/Tree"}
            }}}),
        );
        assert!(compare(&old, &new).is_empty());
    }

    #[test]
    fn test_schema_label() {
        assert_eq!(schema_label(&json!({"$ref": "#/definitions/SeaBody"})), "SeaBody");
        assert_eq!(
            schema_label(&json!({"type": "array", "items": {"type": "integer", "format": "int64"}})),
            "array<integer(int64)>"
        );
        assert_eq!(schema_label(&Value::Null), "none");
    }
}
