//! Type graph walker.
//!
//! Expands a root type into a bounded-depth tree of [`PropertyNode`]s. Members whose type name
//! ends in one of the configured nested suffixes (`Form`, `Body`, `Bean`, `Result`, `Part` by
//! default) are expanded recursively; everything else becomes a leaf. Termination on cyclic
//! graphs relies only on the depth budget shrinking by one on every descent.

use crate::scalar::{ScalarKind, ScalarTable};
use crate::type_resolver::{
    DocLookup, EnumShape, MemberShape, MetadataMarker, StructShape, TypeCatalog, TypeRef, TypeShape,
};
use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutyKebabCase, ToShoutySnakeCase, ToSnakeCase,
    ToUpperCamelCase,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const TRANSPARENT_WRAPPERS: &[&str] = &["Box", "Arc", "Rc", "Cow", "RefCell", "Cell", "Mutex"];
const ARRAY_CONTAINERS: &[&str] = &[
    "Vec",
    "VecDeque",
    "HashSet",
    "BTreeSet",
    "IndexSet",
    "LinkedList",
];
const MAP_CONTAINERS: &[&str] = &["HashMap", "BTreeMap", "IndexMap"];

/// Marker that makes a property required in generated schemas
pub const REQUIRED_MARKER: &str = "required";

/// Converts internal member names to wire-visible names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamingPolicy {
    #[default]
    #[serde(rename = "identity")]
    Identity,
    #[serde(rename = "camelCase")]
    CamelCase,
    #[serde(rename = "snake_case")]
    SnakeCase,
    #[serde(rename = "kebab-case")]
    KebabCase,
    #[serde(rename = "PascalCase")]
    PascalCase,
    #[serde(rename = "SCREAMING_SNAKE_CASE")]
    ScreamingSnakeCase,
    #[serde(rename = "SCREAMING-KEBAB-CASE")]
    ScreamingKebabCase,
    #[serde(rename = "lowercase")]
    LowerCase,
    #[serde(rename = "UPPERCASE")]
    UpperCase,
}

impl NamingPolicy {
    /// Interpret a serde `rename_all` value
    pub fn from_serde(value: &str) -> Option<NamingPolicy> {
        let policy = match value {
            "camelCase" => NamingPolicy::CamelCase,
            "snake_case" => NamingPolicy::SnakeCase,
            "kebab-case" => NamingPolicy::KebabCase,
            "PascalCase" => NamingPolicy::PascalCase,
            "SCREAMING_SNAKE_CASE" => NamingPolicy::ScreamingSnakeCase,
            "SCREAMING-KEBAB-CASE" => NamingPolicy::ScreamingKebabCase,
            "lowercase" => NamingPolicy::LowerCase,
            "UPPERCASE" => NamingPolicy::UpperCase,
            _ => return None,
        };
        Some(policy)
    }

    pub fn apply(self, name: &str) -> String {
        match self {
            NamingPolicy::Identity => name.to_string(),
            NamingPolicy::CamelCase => name.to_lower_camel_case(),
            NamingPolicy::SnakeCase => name.to_snake_case(),
            NamingPolicy::KebabCase => name.to_kebab_case(),
            NamingPolicy::PascalCase => name.to_upper_camel_case(),
            NamingPolicy::ScreamingSnakeCase => name.to_shouty_snake_case(),
            NamingPolicy::ScreamingKebabCase => name.to_shouty_kebab_case(),
            NamingPolicy::LowerCase => name.to_lowercase(),
            NamingPolicy::UpperCase => name.to_uppercase(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WalkerSettings {
    /// Type name suffixes that mark a type as nested (expanded) rather than a leaf
    pub nested_suffixes: Vec<String>,
    /// Naming policy for members without serde renames
    pub naming: NamingPolicy,
}

impl Default for WalkerSettings {
    fn default() -> Self {
        Self {
            nested_suffixes: default_nested_suffixes(),
            naming: NamingPolicy::Identity,
        }
    }
}

pub fn default_nested_suffixes() -> Vec<String> {
    ["Form", "Body", "Bean", "Result", "Part"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// One declared enum constant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumCandidate {
    /// Wire value
    pub code: String,
    /// Human-readable name, the variant's doc comment when present
    pub display: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredType {
    Scalar(ScalarKind),
    Array(Box<DeclaredType>),
    Map(ScalarKind, Box<DeclaredType>),
    Enum(Vec<EnumCandidate>),
    /// A nested type, identified by its module-qualified name and generic instantiation
    Reference(String),
}

impl DeclaredType {
    /// The type after stripping every array level
    pub fn innermost(&self) -> &DeclaredType {
        match self {
            DeclaredType::Array(element) => element.innermost(),
            other => other,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.innermost(), DeclaredType::Scalar(ScalarKind::File))
    }
}

/// One property or type occurrence in the graph
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyNode {
    pub name: String,
    pub public_name: String,
    pub declared_type: DeclaredType,
    /// The declared Rust type as written, for diagnostics
    pub type_label: String,
    pub generic_argument: Option<TypeRef>,
    pub markers: Vec<MetadataMarker>,
    pub documentation: Option<String>,
    pub description: Option<String>,
    pub example_expression: Option<String>,
    /// Declared through `Option<T>`
    pub optional: bool,
    pub children: Vec<PropertyNode>,
}

impl PropertyNode {
    /// A leaf with no metadata, used when a member's type cannot be interpreted
    pub fn opaque(name: impl Into<String>, public_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            public_name: public_name.into(),
            declared_type: DeclaredType::Scalar(ScalarKind::Object),
            type_label: "?".to_string(),
            generic_argument: None,
            markers: Vec::new(),
            documentation: None,
            description: None,
            example_expression: None,
            optional: false,
            children: Vec::new(),
        }
    }

    pub fn marker(&self, name: &str) -> Option<&MetadataMarker> {
        self.markers.iter().find(|m| m.name == name)
    }

    pub fn is_required(&self) -> bool {
        self.marker(REQUIRED_MARKER).is_some()
    }

    /// Reference id of the node itself or of its innermost array element
    pub fn reference_id(&self) -> Option<&str> {
        match self.declared_type.innermost() {
            DeclaredType::Reference(id) => Some(id),
            _ => None,
        }
    }

    /// Attach raw documentation and derive `description` and `example_expression` from it.
    ///
    /// The description is the first sentence before any `e.g.` marker; the example expression is
    /// everything after the first `e.g.`, with one following space removed.
    pub fn with_documentation(mut self, documentation: Option<String>) -> Self {
        if let Some(text) = &documentation {
            let (before, after) = match text.find(EXAMPLE_MARKER) {
                Some(idx) => {
                    let rest = &text[idx + EXAMPLE_MARKER.len()..];
                    (&text[..idx], Some(rest.strip_prefix(' ').unwrap_or(rest).to_string()))
                }
                None => (text.as_str(), None),
            };
            self.description = first_sentence(before);
            self.example_expression = after;
        }
        self.documentation = documentation;
        self
    }
}

/// Literal marker that introduces an example value in documentation
pub const EXAMPLE_MARKER: &str = "e.g.";

fn first_sentence(text: &str) -> Option<String> {
    let text = text.trim();
    let end = text
        .char_indices()
        .find(|(i, c)| {
            *c == '\n'
                || (*c == '.'
                    && text[i + 1..]
                        .chars()
                        .next()
                        .map_or(true, char::is_whitespace))
        })
        .map(|(i, c)| if c == '.' { i + 1 } else { i })
        .unwrap_or(text.len());
    let sentence = text[..end].trim().trim_end_matches(',').trim();
    if sentence.is_empty() {
        None
    } else {
        Some(sentence.to_string())
    }
}

/// Generic type variable bindings keyed by (owning type, parameter name).
///
/// Built from the root instantiation and extended on every descent. An explicit instantiation
/// on a member (`islands: Page<IslandBody>`) rebinds that type for the member's subtree; an
/// argument that is still a type variable (`Page<T>` with `T` unbound) keeps the existing
/// binding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericBindings {
    entries: HashMap<(String, String), TypeRef>,
}

impl GenericBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_root(catalog: &dyn TypeCatalog, root: &TypeRef) -> Self {
        let mut bindings = Self::new();
        bindings.bind(catalog, root);
        bindings
    }

    /// A copy with the instantiation of `ty` (and its arguments) added
    pub fn extended(&self, catalog: &dyn TypeCatalog, ty: &TypeRef) -> Self {
        let mut bindings = self.clone();
        bindings.bind(catalog, ty);
        bindings
    }

    fn bind(&mut self, catalog: &dyn TypeCatalog, ty: &TypeRef) {
        if let Some(TypeShape::Struct(shape)) = catalog.describe(ty) {
            for (param, arg) in shape.generics.iter().zip(&ty.args) {
                let key = (shape.qualified_name.clone(), param.clone());
                if self.is_type_variable(catalog, shape, arg) {
                    self.entries.entry(key).or_insert_with(|| arg.clone());
                } else {
                    self.entries.insert(key, arg.clone());
                }
            }
        }
        for arg in &ty.args {
            self.bind(catalog, arg);
        }
    }

    /// A bare name that is a generic parameter of `shape` or of an already bound type, and not
    /// a type the catalog knows
    fn is_type_variable(
        &self,
        catalog: &dyn TypeCatalog,
        shape: &StructShape,
        arg: &TypeRef,
    ) -> bool {
        arg.args.is_empty()
            && arg.qualifier.is_empty()
            && catalog.describe(arg).is_none()
            && (shape.generics.contains(&arg.name)
                || self.entries.keys().any(|(_, param)| *param == arg.name))
    }

    /// Substitute bound type variables of `owner` inside `ty`
    pub fn resolve(&self, owner: &str, ty: &TypeRef) -> TypeRef {
        if ty.args.is_empty() && ty.qualifier.is_empty() {
            if let Some(bound) = self.entries.get(&(owner.to_string(), ty.name.clone())) {
                return bound.clone();
            }
        }
        TypeRef {
            name: ty.name.clone(),
            qualifier: ty.qualifier.clone(),
            args: ty.args.iter().map(|arg| self.resolve(owner, arg)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Walks type graphs exposed by a [`TypeCatalog`]
pub struct TypeGraphWalker<'a> {
    catalog: &'a dyn TypeCatalog,
    docs: &'a dyn DocLookup,
    scalars: &'a ScalarTable,
    settings: WalkerSettings,
}

impl<'a> TypeGraphWalker<'a> {
    pub fn new(
        catalog: &'a dyn TypeCatalog,
        docs: &'a dyn DocLookup,
        scalars: &'a ScalarTable,
        settings: WalkerSettings,
    ) -> Self {
        Self {
            catalog,
            docs,
            scalars,
            settings,
        }
    }

    pub fn catalog(&self) -> &'a dyn TypeCatalog {
        self.catalog
    }

    /// Expand the declared members of `ty`.
    ///
    /// A negative budget yields no members. Nested members are expanded with `depth - 1`.
    pub fn expand(&self, ty: &TypeRef, depth: i32, bindings: &GenericBindings) -> Vec<PropertyNode> {
        if depth < 0 {
            return Vec::new();
        }
        match self.catalog.describe(ty) {
            Some(TypeShape::Struct(shape)) => {
                self.expand_struct(shape, depth, bindings, &mut Vec::new())
            }
            _ => {
                debug!("{} has no declared members", ty);
                Vec::new()
            }
        }
    }

    /// Build the node for a parameter, request body or response root.
    ///
    /// Structs known to the catalog are always expanded at the root, whatever their name, and
    /// their members are expanded with the whole `depth` budget.
    pub fn root_node(&self, name: &str, ty: &TypeRef, depth: i32) -> PropertyNode {
        let (inner, optional) = self.unwrap_transparent(ty);
        let bindings = GenericBindings::for_root(self.catalog, &inner);
        // the root's own members get the full budget
        let (declared_type, children) =
            self.classify(&inner, depth.saturating_add(1), &bindings, true);

        let innermost = self.innermost_element(&inner);
        let documentation = self
            .catalog
            .describe(&innermost)
            .and_then(|shape| self.docs.doc(shape.qualified_name(), None));

        PropertyNode {
            name: name.to_string(),
            public_name: name.to_string(),
            declared_type,
            type_label: ty.to_string(),
            generic_argument: inner.first_arg().cloned(),
            markers: Vec::new(),
            documentation: None,
            description: None,
            example_expression: None,
            optional,
            children,
        }
        .with_documentation(documentation)
    }

    /// Stable identity of a type instantiation: module-qualified name plus generic arguments
    pub fn type_id(&self, ty: &TypeRef) -> String {
        let base = self
            .catalog
            .describe(ty)
            .map(|shape| shape.qualified_name().to_string())
            .unwrap_or_else(|| ty.path());
        if ty.args.is_empty() {
            base
        } else {
            let args: Vec<String> = ty.args.iter().map(|arg| self.type_id(arg)).collect();
            format!("{}<{}>", base, args.join(", "))
        }
    }

    fn expand_struct(
        &self,
        shape: &StructShape,
        depth: i32,
        bindings: &GenericBindings,
        flatten_chain: &mut Vec<String>,
    ) -> Vec<PropertyNode> {
        flatten_chain.push(shape.qualified_name.clone());
        let mut nodes = Vec::new();

        for member in &shape.members {
            if member.skip {
                continue;
            }
            if member.flatten {
                nodes.extend(self.flattened_members(shape, member, depth, bindings, flatten_chain));
                continue;
            }
            nodes.push(self.member_node(shape, member, depth, bindings));
        }

        flatten_chain.pop();
        nodes
    }

    fn flattened_members(
        &self,
        owner: &StructShape,
        member: &MemberShape,
        depth: i32,
        bindings: &GenericBindings,
        flatten_chain: &mut Vec<String>,
    ) -> Vec<PropertyNode> {
        let Some(ty) = &member.ty else {
            warn!("Cannot flatten {}.{}: unknown type", owner.qualified_name, member.name);
            return Vec::new();
        };
        let (inner, _) = self.unwrap_transparent(&bindings.resolve(&owner.qualified_name, ty));
        match self.catalog.describe(&inner) {
            Some(TypeShape::Struct(flat)) if !flatten_chain.contains(&flat.qualified_name) => {
                let inner_bindings = bindings.extended(self.catalog, &inner);
                self.expand_struct(flat, depth, &inner_bindings, flatten_chain)
            }
            Some(TypeShape::Struct(flat)) => {
                warn!("Recursive flatten of {} ignored", flat.qualified_name);
                Vec::new()
            }
            _ => {
                debug!("Flattened member {}.{} is not a known struct", owner.name, member.name);
                Vec::new()
            }
        }
    }

    fn member_node(
        &self,
        owner: &StructShape,
        member: &MemberShape,
        depth: i32,
        bindings: &GenericBindings,
    ) -> PropertyNode {
        let public_name = self.public_name(owner, member);
        let Some(ty) = &member.ty else {
            warn!(
                "Cannot interpret the type of {}.{}, using an opaque object",
                owner.qualified_name, member.name
            );
            return PropertyNode::opaque(&member.name, public_name);
        };

        let resolved = bindings.resolve(&owner.qualified_name, ty);
        let (inner, optional) = self.unwrap_transparent(&resolved);
        let (declared_type, children) = self.classify(&inner, depth, bindings, false);

        PropertyNode {
            name: member.name.clone(),
            public_name,
            declared_type,
            type_label: ty.to_string(),
            generic_argument: inner.first_arg().cloned(),
            markers: member.markers.clone(),
            documentation: None,
            description: None,
            example_expression: None,
            optional,
            children,
        }
        .with_documentation(self.docs.doc(&owner.qualified_name, Some(&member.name)))
    }

    /// Classify a type as scalar, container, enum, nested reference or opaque object.
    ///
    /// `force_nested` expands a known struct regardless of its name; it carries through array
    /// levels but not into map values.
    fn classify(
        &self,
        ty: &TypeRef,
        depth: i32,
        bindings: &GenericBindings,
        force_nested: bool,
    ) -> (DeclaredType, Vec<PropertyNode>) {
        if let Some(kind) = self.scalars.lookup(&ty.name) {
            return (DeclaredType::Scalar(kind), Vec::new());
        }

        if ARRAY_CONTAINERS.contains(&ty.name.as_str()) {
            let Some(element) = ty.first_arg() else {
                return (
                    DeclaredType::Array(Box::new(DeclaredType::Scalar(ScalarKind::Object))),
                    Vec::new(),
                );
            };
            let (element, _) = self.unwrap_transparent(element);
            let (element_type, children) = self.classify(&element, depth, bindings, force_nested);
            return (DeclaredType::Array(Box::new(element_type)), children);
        }

        if MAP_CONTAINERS.contains(&ty.name.as_str()) {
            let key_kind = ty
                .args
                .first()
                .and_then(|key| self.scalars.lookup(&key.name))
                .unwrap_or(ScalarKind::String);
            let (value_type, children) = match ty.args.get(1) {
                Some(value) => {
                    let (value, _) = self.unwrap_transparent(value);
                    self.classify(&value, depth, bindings, false)
                }
                None => (DeclaredType::Scalar(ScalarKind::Object), Vec::new()),
            };
            return (DeclaredType::Map(key_kind, Box::new(value_type)), children);
        }

        match self.catalog.describe(ty) {
            Some(TypeShape::Enum(shape)) => (DeclaredType::Enum(self.enum_candidates(shape)), Vec::new()),
            Some(TypeShape::Struct(_)) if force_nested || self.is_nested(ty) => {
                let inner_bindings = bindings.extended(self.catalog, ty);
                let children = self.expand(ty, depth - 1, &inner_bindings);
                (DeclaredType::Reference(self.type_id(ty)), children)
            }
            Some(TypeShape::Struct(_)) => (DeclaredType::Scalar(ScalarKind::Object), Vec::new()),
            None => {
                debug!("{} is not in the catalog, treating it as an object", ty);
                (DeclaredType::Scalar(ScalarKind::Object), Vec::new())
            }
        }
    }

    fn is_nested(&self, ty: &TypeRef) -> bool {
        let matches = |name: &str| {
            self.settings
                .nested_suffixes
                .iter()
                .any(|suffix| name.ends_with(suffix.as_str()))
        };
        matches(&ty.name) || ty.args.iter().any(|arg| matches(&arg.name))
    }

    /// Strip `Option` and smart-pointer wrappers; the flag reports whether `Option` was seen
    fn unwrap_transparent(&self, ty: &TypeRef) -> (TypeRef, bool) {
        let mut current = ty.clone();
        let mut optional = false;
        loop {
            let is_option = current.name == "Option";
            if !(is_option || TRANSPARENT_WRAPPERS.contains(&current.name.as_str())) {
                break;
            }
            let Some(inner) = current.args.first().cloned() else { break };
            optional |= is_option;
            current = inner;
        }
        (current, optional)
    }

    fn innermost_element(&self, ty: &TypeRef) -> TypeRef {
        if ARRAY_CONTAINERS.contains(&ty.name.as_str()) {
            if let Some(element) = ty.first_arg() {
                let (element, _) = self.unwrap_transparent(element);
                return self.innermost_element(&element);
            }
        }
        ty.clone()
    }

    fn public_name(&self, owner: &StructShape, member: &MemberShape) -> String {
        if let Some(rename) = &member.rename {
            return rename.clone();
        }
        match owner.rename_all.as_deref().and_then(NamingPolicy::from_serde) {
            Some(policy) => policy.apply(&member.name),
            None => self.settings.naming.apply(&member.name),
        }
    }

    fn enum_candidates(&self, shape: &EnumShape) -> Vec<EnumCandidate> {
        let policy = shape
            .rename_all
            .as_deref()
            .and_then(NamingPolicy::from_serde)
            .unwrap_or_default();
        shape
            .variants
            .iter()
            .map(|variant| {
                let code = variant
                    .rename
                    .clone()
                    .unwrap_or_else(|| policy.apply(&variant.name));
                let display = self
                    .docs
                    .doc(&shape.qualified_name, Some(&variant.name))
                    .unwrap_or_else(|| code.clone());
                EnumCandidate { code, display }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_resolver::{NoDocs, SourceCatalog};
    use pretty_assertions::assert_eq;

    const MODEL: &str = r#"
        /// A sea.
        pub struct SeaBody {
            /// Sea Name e.g. SeaOfDreams
            #[validate(required)]
            pub name: String,
            pub depth: Option<u32>,
            pub status: SeaStatus,
            pub islands: Vec<IslandBody>,
            pub tags: HashMap<String, i64>,
            pub coordinates: Coordinates,
            #[serde(skip)]
            pub secret: String,
            #[serde(flatten)]
            pub audit: AuditPart,
        }

        pub struct IslandBody {
            pub name: String,
            pub sea: Box<SeaBody>,
        }

        pub struct AuditPart {
            pub created_by: String,
        }

        pub struct Coordinates {
            pub lat: f64,
            pub lng: f64,
        }

        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum SeaStatus {
            /// Moored at the dock
            Dockside,
            Hangar,
        }

        pub struct ApiResult<T> {
            pub code: i32,
            pub data: Option<T>,
        }

        pub struct Page<T> {
            pub total: u64,
            pub items: Vec<T>,
        }
    "#;

    fn catalog() -> SourceCatalog {
        SourceCatalog::from_sources(&[("src/model.rs", MODEL)]).unwrap()
    }

    fn find<'n>(nodes: &'n [PropertyNode], name: &str) -> &'n PropertyNode {
        nodes
            .iter()
            .find(|n| n.name == name)
            .unwrap_or_else(|| panic!("no node named {}", name))
    }

    fn max_depth(nodes: &[PropertyNode]) -> usize {
        nodes
            .iter()
            .map(|n| 1 + max_depth(&n.children))
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_negative_depth_yields_nothing() {
        let catalog = catalog();
        let scalars = ScalarTable::default();
        let walker = TypeGraphWalker::new(&catalog, &catalog, &scalars, WalkerSettings::default());

        let nodes = walker.expand(&TypeRef::named("SeaBody"), -1, &GenericBindings::new());
        assert!(nodes.is_empty());
    }

    #[test]
    fn test_members_classified() {
        let catalog = catalog();
        let scalars = ScalarTable::default();
        let walker = TypeGraphWalker::new(&catalog, &catalog, &scalars, WalkerSettings::default());

        let nodes = walker.expand(&TypeRef::named("SeaBody"), 1, &GenericBindings::new());
        let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["name", "depth", "status", "islands", "tags", "coordinates", "created_by"]
        );

        let name = find(&nodes, "name");
        assert_eq!(name.declared_type, DeclaredType::Scalar(ScalarKind::String));
        assert!(name.is_required());
        assert_eq!(name.description.as_deref(), Some("Sea Name"));
        assert_eq!(name.example_expression.as_deref(), Some("SeaOfDreams"));

        let depth = find(&nodes, "depth");
        assert!(depth.optional);
        assert_eq!(depth.declared_type, DeclaredType::Scalar(ScalarKind::U32));

        let status = find(&nodes, "status");
        assert_eq!(
            status.declared_type,
            DeclaredType::Enum(vec![
                EnumCandidate {
                    code: "DOCKSIDE".to_string(),
                    display: "Moored at the dock".to_string()
                },
                EnumCandidate {
                    code: "HANGAR".to_string(),
                    display: "HANGAR".to_string()
                },
            ])
        );

        let islands = find(&nodes, "islands");
        assert_eq!(
            islands.declared_type,
            DeclaredType::Array(Box::new(DeclaredType::Reference(
                "model::IslandBody".to_string()
            )))
        );
        assert_eq!(islands.children.len(), 2);

        let tags = find(&nodes, "tags");
        assert_eq!(
            tags.declared_type,
            DeclaredType::Map(
                ScalarKind::String,
                Box::new(DeclaredType::Scalar(ScalarKind::I64))
            )
        );

        let coordinates = find(&nodes, "coordinates");
        assert_eq!(coordinates.declared_type, DeclaredType::Scalar(ScalarKind::Object));
        assert!(coordinates.children.is_empty());
    }

    #[test]
    fn test_cyclic_graph_is_bounded_by_depth() {
        let catalog = catalog();
        let scalars = ScalarTable::default();
        let walker = TypeGraphWalker::new(&catalog, &NoDocs, &scalars, WalkerSettings::default());

        for depth in 0..4 {
            let nodes = walker.expand(&TypeRef::named("SeaBody"), depth, &GenericBindings::new());
            // SeaBody -> islands -> sea -> islands ... one level per unit of budget
            assert_eq!(max_depth(&nodes), depth as usize + 1);
        }

        let root = walker.root_node("body", &TypeRef::named("SeaBody"), 0);
        let islands = find(&root.children, "islands");
        assert_eq!(islands.reference_id(), Some("model::IslandBody"));
        assert!(islands.children.is_empty());
    }

    #[test]
    fn test_generic_bindings_from_root() {
        let catalog = catalog();
        let scalars = ScalarTable::default();
        let walker = TypeGraphWalker::new(&catalog, &NoDocs, &scalars, WalkerSettings::default());
        let ty = TypeRef::parse("ApiResult<Page<IslandBody>>").unwrap();

        let root = walker.root_node("response", &ty, 3);
        assert_eq!(
            root.declared_type,
            DeclaredType::Reference("model::ApiResult<model::Page<model::IslandBody>>".to_string())
        );

        let data = find(&root.children, "data");
        assert!(data.optional);
        assert_eq!(data.reference_id(), Some("model::Page<model::IslandBody>"));

        let items = find(&data.children, "items");
        assert_eq!(items.reference_id(), Some("model::IslandBody"));
        assert_eq!(items.children.len(), 2);
    }

    #[test]
    fn test_member_instantiation_rebinds_its_subtree() {
        let catalog = catalog();
        let root = TypeRef::parse("Page<IslandBody>").unwrap();
        let bindings = GenericBindings::for_root(&catalog, &root);
        let extended = bindings.extended(&catalog, &TypeRef::parse("Page<SeaBody>").unwrap());

        let resolved = extended.resolve("model::Page", &TypeRef::named("T"));
        assert_eq!(resolved.name, "SeaBody");
        assert_eq!(extended.len(), 1);

        // the parent's bindings are untouched
        let parent = bindings.resolve("model::Page", &TypeRef::named("T"));
        assert_eq!(parent.name, "IslandBody");
    }

    #[test]
    fn test_unbound_type_variable_keeps_existing_binding() {
        let catalog = catalog();
        let bindings = GenericBindings::for_root(&catalog, &TypeRef::parse("Page<IslandBody>").unwrap());
        let extended = bindings.extended(&catalog, &TypeRef::parse("Page<T>").unwrap());

        let resolved = extended.resolve("model::Page", &TypeRef::named("T"));
        assert_eq!(resolved.name, "IslandBody");
    }

    #[test]
    fn test_two_instantiations_of_one_wrapper_in_a_tree() {
        let code = r#"
            pub struct Page<T> {
                pub total: u64,
                pub items: Vec<T>,
            }

            pub struct SeaBody {
                pub name: String,
                pub islands: Page<IslandBody>,
            }

            pub struct IslandBody {
                pub area: f64,
            }
        "#;
        let catalog = SourceCatalog::from_sources(&[("src/model.rs", code)]).unwrap();
        let scalars = ScalarTable::default();
        let walker = TypeGraphWalker::new(&catalog, &NoDocs, &scalars, WalkerSettings::default());

        let root = walker.root_node("response", &TypeRef::parse("Page<SeaBody>").unwrap(), 4);
        let sea = find(&root.children, "items");
        assert_eq!(sea.reference_id(), Some("model::SeaBody"));

        let islands = find(&sea.children, "islands");
        assert_eq!(
            islands.reference_id(),
            Some("model::Page<model::IslandBody>")
        );
        let island_items = find(&islands.children, "items");
        assert_eq!(island_items.reference_id(), Some("model::IslandBody"));
        assert_eq!(island_items.children.len(), 1);
        assert_eq!(island_items.children[0].name, "area");
    }

    #[test]
    fn test_naming_policy() {
        assert_eq!(NamingPolicy::CamelCase.apply("created_by"), "createdBy");
        assert_eq!(NamingPolicy::KebabCase.apply("created_by"), "created-by");
        assert_eq!(NamingPolicy::ScreamingSnakeCase.apply("Dockside"), "DOCKSIDE");
        assert_eq!(NamingPolicy::from_serde("camelCase"), Some(NamingPolicy::CamelCase));
        assert_eq!(NamingPolicy::from_serde("weird"), None);

        let catalog = catalog();
        let scalars = ScalarTable::default();
        let settings = WalkerSettings {
            naming: NamingPolicy::CamelCase,
            ..WalkerSettings::default()
        };
        let walker = TypeGraphWalker::new(&catalog, &NoDocs, &scalars, settings);
        let nodes = walker.expand(&TypeRef::named("SeaBody"), 0, &GenericBindings::new());
        assert_eq!(find(&nodes, "created_by").public_name, "createdBy");
    }

    #[test]
    fn test_uninterpretable_member_degrades_to_opaque_leaf() {
        let code = r#"
            pub struct HookForm {
                /// Callback e.g. 1
                #[validate(required)]
                pub callback: Box<dyn Fn(u32) -> u32>,
            }
        "#;
        let catalog = SourceCatalog::from_sources(&[("src/hook.rs", code)]).unwrap();
        let scalars = ScalarTable::default();
        let walker = TypeGraphWalker::new(&catalog, &catalog, &scalars, WalkerSettings::default());

        let nodes = walker.expand(&TypeRef::named("HookForm"), 1, &GenericBindings::new());
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].declared_type, DeclaredType::Scalar(ScalarKind::Object));
        assert!(nodes[0].markers.is_empty());
        assert!(nodes[0].documentation.is_none());
    }

    #[test]
    fn test_documentation_derivations() {
        let node = PropertyNode::opaque("a", "a")
            .with_documentation(Some("The count. Used for paging e.g. 10".to_string()));
        assert_eq!(node.description.as_deref(), Some("The count."));
        assert_eq!(node.example_expression.as_deref(), Some("10"));

        let node = PropertyNode::opaque("a", "a").with_documentation(Some("Plain text".to_string()));
        assert_eq!(node.description.as_deref(), Some("Plain text"));
        assert!(node.example_expression.is_none());

        let node = PropertyNode::opaque("a", "a").with_documentation(Some("e.g.x".to_string()));
        assert!(node.description.is_none());
        assert_eq!(node.example_expression.as_deref(), Some("x"));
    }
}
