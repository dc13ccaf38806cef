use crate::default_miner::{DefaultValueMiner, MinerError};
use crate::scalar::{ScalarKind, ScalarTable};
use crate::type_resolver::TypeRef;
use crate::walker::{DeclaredType, EnumCandidate, PropertyNode};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Generic wrappers that contribute nothing to a definition name (`Vec<UserBody>` -> `UserBody`)
const TRANSPARENT_CONTAINERS: &[&str] = &[
    "Vec",
    "VecDeque",
    "HashSet",
    "BTreeSet",
    "IndexSet",
    "LinkedList",
    "Option",
    "Box",
    "Arc",
    "Rc",
    "Cow",
];

/// Swagger 2.0 schema object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(rename = "minItems", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
}

impl Schema {
    pub fn typed(schema_type: &str, format: Option<&str>) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            format: format.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn object() -> Self {
        Self::typed("object", None)
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::typed("array", None)
        }
    }

    /// A `$ref` into `#/definitions`
    pub fn reference(name: &str) -> Self {
        Self {
            reference: Some(format!("#/definitions/{}", name)),
            ..Self::default()
        }
    }

    pub fn scalar(kind: ScalarKind) -> Self {
        let (schema_type, format) = kind.type_and_format();
        Self::typed(schema_type, format)
    }

    /// Name of the definition this schema points at, if it is a reference
    pub fn definition_name(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .and_then(|r| r.strip_prefix("#/definitions/"))
    }
}

/// Append-only table of named definitions.
///
/// A name is reserved before its members are projected so that recursive references resolve
/// to the same entry. Once written, an entry is never replaced.
#[derive(Debug, Default)]
pub struct DefinitionTable {
    schemas: IndexMap<String, Schema>,
    /// Definition name -> type id that claimed it
    owners: HashMap<String, String>,
    sealed: HashSet<String>,
}

impl DefinitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name` for `type_id`. Returns `true` if the caller should build the definition.
    ///
    /// A second type id mapping to an already claimed name keeps the first definition.
    pub fn reserve(&mut self, name: &str, type_id: &str) -> bool {
        if let Some(owner) = self.owners.get(name) {
            if owner != type_id {
                warn!(
                    "Definition name {} is shared by {} and {}; keeping the first",
                    name, owner, type_id
                );
            }
            return false;
        }
        debug!("Reserving definition {} for {}", name, type_id);
        self.owners.insert(name.to_string(), type_id.to_string());
        self.schemas.insert(name.to_string(), Schema::object());
        true
    }

    fn complete(&mut self, name: &str, schema: Schema) {
        if !self.sealed.insert(name.to_string()) {
            return;
        }
        if let Some(slot) = self.schemas.get_mut(name) {
            *slot = schema;
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn into_inner(self) -> IndexMap<String, Schema> {
        self.schemas
    }
}

/// Projects property trees into Swagger schemas, accumulating named definitions
pub struct SchemaProjector<'a> {
    miner: DefaultValueMiner<'a>,
    definitions: DefinitionTable,
}

impl<'a> SchemaProjector<'a> {
    pub fn new(scalars: &'a ScalarTable) -> Self {
        debug!("Initializing SchemaProjector");
        Self {
            miner: DefaultValueMiner::new(scalars),
            definitions: DefinitionTable::new(),
        }
    }

    /// Project one node. Nested types become `$ref`s whose definitions are added to the table.
    ///
    /// # Errors
    ///
    /// Propagates a [`MinerError`] from a malformed documentation example anywhere in the tree.
    pub fn project(&mut self, node: &PropertyNode) -> Result<Schema, MinerError> {
        let mut schema = self.project_type(&node.declared_type, node)?;
        if schema.reference.is_some() {
            return Ok(schema);
        }

        schema.description = match (&node.declared_type, &node.description) {
            (DeclaredType::Enum(candidates), Some(description)) => {
                Some(format!("{} ({})", description, candidate_listing(candidates)))
            }
            (DeclaredType::Enum(candidates), None) if !candidates.is_empty() => {
                Some(candidate_listing(candidates))
            }
            (_, description) => description.clone(),
        };
        schema.example = self.miner.derive_default(node)?;
        apply_constraints(&mut schema, node);
        Ok(schema)
    }

    /// Build the object definition for a set of members
    pub fn definition_for(&mut self, children: &[PropertyNode]) -> Result<Schema, MinerError> {
        let mut schema = Schema::object();
        for child in children {
            if child.is_required() {
                schema.required.push(child.public_name.clone());
            }
            let projected = self.project(child)?;
            schema.properties.insert(child.public_name.clone(), projected);
        }
        Ok(schema)
    }

    pub fn definitions(&self) -> &DefinitionTable {
        &self.definitions
    }

    pub fn into_definitions(self) -> IndexMap<String, Schema> {
        self.definitions.into_inner()
    }

    fn project_type(
        &mut self,
        declared_type: &DeclaredType,
        node: &PropertyNode,
    ) -> Result<Schema, MinerError> {
        let schema = match declared_type {
            DeclaredType::Scalar(kind) => Schema::scalar(*kind),
            DeclaredType::Enum(candidates) => Schema {
                enum_values: Some(candidates.iter().map(|c| c.code.clone()).collect()),
                ..Schema::typed("string", None)
            },
            DeclaredType::Array(element) => Schema::array(self.project_type(element, node)?),
            DeclaredType::Map(_, value) => Schema {
                additional_properties: Some(Box::new(self.project_type(value, node)?)),
                ..Schema::object()
            },
            DeclaredType::Reference(type_id) => self.reference_schema(type_id, node)?,
        };
        Ok(schema)
    }

    fn reference_schema(&mut self, type_id: &str, node: &PropertyNode) -> Result<Schema, MinerError> {
        // depth exhausted
        if node.children.is_empty() {
            return Ok(Schema::object());
        }

        let name = definition_name(type_id);
        if self.definitions.reserve(&name, type_id) {
            let definition = self.definition_for(&node.children)?;
            self.definitions.complete(&name, definition);
        }
        Ok(Schema::reference(&name))
    }
}

/// Definition name for a type id: module qualifiers dropped, transparent containers collapsed
/// to their argument, other generics rendered as `Wrapper«Inner»`.
pub fn definition_name(type_id: &str) -> String {
    match TypeRef::parse(type_id) {
        Some(ty) => render_name(&ty),
        None => type_id
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_')
            .collect(),
    }
}

fn render_name(ty: &TypeRef) -> String {
    if TRANSPARENT_CONTAINERS.contains(&ty.name.as_str()) {
        if let Some(inner) = ty.first_arg() {
            return render_name(inner);
        }
    }
    if ty.args.is_empty() {
        return ty.name.clone();
    }
    let args: Vec<String> = ty.args.iter().map(render_name).collect();
    format!("{}«{}»", ty.name, args.join(","))
}

fn candidate_listing(candidates: &[EnumCandidate]) -> String {
    candidates
        .iter()
        .map(|c| format!("{}: {}", c.code, c.display))
        .collect::<Vec<_>>()
        .join(", ")
}

fn apply_constraints(schema: &mut Schema, node: &PropertyNode) {
    let is_array = matches!(node.declared_type, DeclaredType::Array(_));
    for marker in &node.markers {
        match marker.name.as_str() {
            "length" | "size" => {
                let min = marker.number("min").map(|v| v as u64);
                let max = marker.number("max").map(|v| v as u64);
                if is_array {
                    schema.min_items = min.or(schema.min_items);
                    schema.max_items = max.or(schema.max_items);
                } else {
                    schema.min_length = min.or(schema.min_length);
                    schema.max_length = max.or(schema.max_length);
                }
            }
            "range" => {
                schema.minimum = marker.number("min").or(schema.minimum);
                schema.maximum = marker.number("max").or(schema.maximum);
            }
            "min" => schema.minimum = marker.number("value").or(schema.minimum),
            "max" => schema.maximum = marker.number("value").or(schema.maximum),
            _ => {}
        }
    }
}
