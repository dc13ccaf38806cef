//! Structural type descriptors backed by Rust source.
//!
//! [`TypeCatalog`] is the seam the [walker](crate::walker) enumerates members through, and
//! [`DocLookup`] supplies documentation comments. [`SourceCatalog`] implements both from syn
//! syntax trees; other implementations (a pre-built registry, generated metadata) can be
//! substituted.

use crate::parser::ParsedFile;
use indexmap::IndexMap;
use log::debug;
use std::collections::HashMap;
use std::fmt;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, Fields, GenericArgument, Item, Lit, LitStr, Meta, PathArguments, Token, Type, UnOp};

/// A reference to a (possibly generic) type as written in source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    /// Last path segment (`Vec`, `UserBody`, `T`)
    pub name: String,
    /// Preceding path segments as written, minus `crate`/`self`/`super`
    pub qualifier: Vec<String>,
    /// Generic type arguments
    pub args: Vec<TypeRef>,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qualifier: Vec::new(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            qualifier: Vec::new(),
            args,
        }
    }

    /// The unit type `()`
    pub fn unit() -> Self {
        Self::named("()")
    }

    pub fn is_unit(&self) -> bool {
        self.name == "()"
    }

    /// Parse a type written in Rust syntax, e.g. `ApiResult<Vec<model::SeaBody>>`
    pub fn parse(text: &str) -> Option<TypeRef> {
        let ty: Type = syn::parse_str(text.trim()).ok()?;
        Self::from_syn(&ty)
    }

    /// Interpret a syn type. Returns `None` for shapes without a nominal name
    /// (trait objects, function pointers, non-empty tuples).
    pub fn from_syn(ty: &Type) -> Option<TypeRef> {
        match ty {
            Type::Path(type_path) if type_path.qself.is_none() => Self::from_path(&type_path.path),
            Type::Reference(reference) => Self::from_syn(&reference.elem),
            Type::Slice(slice) => Some(TypeRef::generic("Vec", vec![Self::from_syn(&slice.elem)?])),
            Type::Array(array) => Some(TypeRef::generic("Vec", vec![Self::from_syn(&array.elem)?])),
            Type::Paren(paren) => Self::from_syn(&paren.elem),
            Type::Group(group) => Self::from_syn(&group.elem),
            Type::Tuple(tuple) if tuple.elems.is_empty() => Some(TypeRef::unit()),
            _ => None,
        }
    }

    fn from_path(path: &syn::Path) -> Option<TypeRef> {
        let last = path.segments.last()?;
        let qualifier = path
            .segments
            .iter()
            .take(path.segments.len() - 1)
            .map(|s| s.ident.to_string())
            .filter(|s| !matches!(s.as_str(), "crate" | "self" | "super"))
            .collect();

        let mut args = Vec::new();
        if let PathArguments::AngleBracketed(angle) = &last.arguments {
            for arg in &angle.args {
                if let GenericArgument::Type(inner) = arg {
                    args.push(Self::from_syn(inner)?);
                }
            }
        }

        Some(TypeRef {
            name: last.ident.to_string(),
            qualifier,
            args,
        })
    }

    pub fn first_arg(&self) -> Option<&TypeRef> {
        self.args.first()
    }

    /// `qualifier::name` without generic arguments
    pub fn path(&self) -> String {
        if self.qualifier.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.qualifier.join("::"), self.name)
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())?;
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(ToString::to_string).collect();
            write!(f, "<{}>", args.join(", "))?;
        }
        Ok(())
    }
}

/// An opaque `{name, attributes}` tag attached to a declaration (`#[validate(length(max = 9))]`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataMarker {
    pub name: String,
    pub attributes: IndexMap<String, String>,
}

impl MetadataMarker {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Numeric attribute value, if present and parseable
    pub fn number(&self, key: &str) -> Option<f64> {
        self.attribute(key).and_then(|v| v.parse().ok())
    }
}

/// One declared member of a struct
#[derive(Debug, Clone)]
pub struct MemberShape {
    pub name: String,
    /// `None` when the declared type could not be interpreted
    pub ty: Option<TypeRef>,
    pub rename: Option<String>,
    pub flatten: bool,
    pub skip: bool,
    pub markers: Vec<MetadataMarker>,
}

#[derive(Debug, Clone)]
pub struct StructShape {
    pub name: String,
    pub qualified_name: String,
    /// Declared generic type parameters, in order
    pub generics: Vec<String>,
    pub rename_all: Option<String>,
    pub members: Vec<MemberShape>,
}

#[derive(Debug, Clone)]
pub struct VariantShape {
    pub name: String,
    pub rename: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EnumShape {
    pub name: String,
    pub qualified_name: String,
    pub rename_all: Option<String>,
    pub variants: Vec<VariantShape>,
}

#[derive(Debug, Clone)]
pub enum TypeShape {
    Struct(StructShape),
    Enum(EnumShape),
}

impl TypeShape {
    pub fn name(&self) -> &str {
        match self {
            TypeShape::Struct(s) => &s.name,
            TypeShape::Enum(e) => &e.name,
        }
    }

    pub fn qualified_name(&self) -> &str {
        match self {
            TypeShape::Struct(s) => &s.qualified_name,
            TypeShape::Enum(e) => &e.qualified_name,
        }
    }
}

/// Enumerates declared members of named types
pub trait TypeCatalog {
    /// Find the shape of a type, ignoring its generic arguments
    fn describe(&self, ty: &TypeRef) -> Option<&TypeShape>;
}

/// Supplies raw documentation comments for a type (`member == None`) or one of its members
pub trait DocLookup {
    fn doc(&self, type_name: &str, member: Option<&str>) -> Option<String>;
}

/// Documentation source for projects without doc comments
pub struct NoDocs;

impl DocLookup for NoDocs {
    fn doc(&self, _type_name: &str, _member: Option<&str>) -> Option<String> {
        None
    }
}

/// Type catalog built from parsed Rust source files
#[derive(Debug, Default)]
pub struct SourceCatalog {
    /// Shapes keyed by module-qualified name, in declaration order
    shapes: IndexMap<String, TypeShape>,
    /// Simple name -> qualified names
    simple_names: HashMap<String, Vec<String>>,
    docs: HashMap<(String, Option<String>), String>,
}

const NON_MARKER_ATTRIBUTES: &[&str] = &[
    "doc",
    "serde",
    "derive",
    "allow",
    "warn",
    "deny",
    "cfg",
    "cfg_attr",
    "must_use",
    "inline",
    "non_exhaustive",
    "repr",
];

impl SourceCatalog {
    pub fn new(parsed_files: &[ParsedFile]) -> Self {
        debug!("Building SourceCatalog from {} files", parsed_files.len());
        let mut catalog = Self::default();
        for parsed in parsed_files {
            catalog.index_items(&parsed.syntax_tree.items, &parsed.module_path);
        }
        debug!("Catalog holds {} types", catalog.shapes.len());
        catalog
    }

    /// Build a catalog from `(path, source)` pairs held in memory
    pub fn from_sources(sources: &[(&str, &str)]) -> anyhow::Result<Self> {
        let parsed = sources
            .iter()
            .map(|(path, code)| ParsedFile::from_source(*path, code))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self::new(&parsed))
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn qualified_names(&self) -> impl Iterator<Item = &str> {
        self.shapes.keys().map(String::as_str)
    }

    fn index_items(&mut self, items: &[Item], module: &[String]) {
        for item in items {
            match item {
                Item::Struct(item_struct) => self.index_struct(item_struct, module),
                Item::Enum(item_enum) => self.index_enum(item_enum, module),
                Item::Mod(item_mod) => {
                    if let Some((_, nested)) = &item_mod.content {
                        let mut inner = module.to_vec();
                        inner.push(item_mod.ident.to_string());
                        self.index_items(nested, &inner);
                    }
                }
                _ => {}
            }
        }
    }

    fn register(&mut self, shape: TypeShape) {
        let qualified = shape.qualified_name().to_string();
        let entry = self.simple_names.entry(shape.name().to_string()).or_default();
        if !entry.is_empty() {
            debug!(
                "Type name {} declared more than once ({} and {})",
                shape.name(),
                entry[0],
                qualified
            );
        }
        entry.push(qualified.clone());
        self.shapes.insert(qualified, shape);
    }

    fn index_struct(&mut self, item: &syn::ItemStruct, module: &[String]) {
        let name = item.ident.to_string();
        let qualified_name = qualify(module, &name);
        debug!("Indexing struct {}", qualified_name);

        if let Some(doc) = doc_text(&item.attrs) {
            self.docs.insert((qualified_name.clone(), None), doc);
        }

        let mut members = Vec::new();
        match &item.fields {
            Fields::Named(named) => {
                for field in &named.named {
                    let Some(ident) = &field.ident else { continue };
                    let field_name = ident.to_string();
                    if let Some(doc) = doc_text(&field.attrs) {
                        self.docs
                            .insert((qualified_name.clone(), Some(field_name.clone())), doc);
                    }
                    let serde = serde_options(&field.attrs);
                    members.push(MemberShape {
                        ty: TypeRef::from_syn(&field.ty),
                        name: field_name,
                        rename: serde.rename,
                        flatten: serde.flatten,
                        skip: serde.skip,
                        markers: markers(&field.attrs),
                    });
                }
            }
            Fields::Unnamed(_) => debug!("Tuple struct {} has no named members", qualified_name),
            Fields::Unit => {}
        }

        let shape = StructShape {
            name,
            qualified_name,
            generics: item.generics.type_params().map(|p| p.ident.to_string()).collect(),
            rename_all: serde_options(&item.attrs).rename_all,
            members,
        };
        self.register(TypeShape::Struct(shape));
    }

    fn index_enum(&mut self, item: &syn::ItemEnum, module: &[String]) {
        let name = item.ident.to_string();
        let qualified_name = qualify(module, &name);
        debug!("Indexing enum {}", qualified_name);

        if let Some(doc) = doc_text(&item.attrs) {
            self.docs.insert((qualified_name.clone(), None), doc);
        }

        let variants = item
            .variants
            .iter()
            .map(|variant| {
                let variant_name = variant.ident.to_string();
                if let Some(doc) = doc_text(&variant.attrs) {
                    self.docs
                        .insert((qualified_name.clone(), Some(variant_name.clone())), doc);
                }
                VariantShape {
                    rename: serde_options(&variant.attrs).rename,
                    name: variant_name,
                }
            })
            .collect();

        let shape = EnumShape {
            name,
            qualified_name,
            rename_all: serde_options(&item.attrs).rename_all,
            variants,
        };
        self.register(TypeShape::Enum(shape));
    }
}

impl TypeCatalog for SourceCatalog {
    fn describe(&self, ty: &TypeRef) -> Option<&TypeShape> {
        let candidates = self.simple_names.get(&ty.name)?;
        let qualified = if ty.qualifier.is_empty() {
            candidates.first()
        } else {
            let wanted = ty.path();
            let suffix = format!("::{}", wanted);
            candidates
                .iter()
                .find(|c| **c == wanted || c.ends_with(&suffix))
                .or_else(|| candidates.first())
        }?;
        self.shapes.get(qualified)
    }
}

impl DocLookup for SourceCatalog {
    fn doc(&self, type_name: &str, member: Option<&str>) -> Option<String> {
        self.docs
            .get(&(type_name.to_string(), member.map(str::to_string)))
            .cloned()
    }
}

fn qualify(module: &[String], name: &str) -> String {
    if module.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", module.join("::"), name)
    }
}

/// Join `///` lines, dropping the single space rustdoc conventionally leaves after `///`
fn doc_text(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|a| a.path().is_ident("doc"))
        .filter_map(|a| match &a.meta {
            Meta::NameValue(nv) => lit_text(&nv.value),
            _ => None,
        })
        .map(|line| line.strip_prefix(' ').unwrap_or(&line).to_string())
        .collect();

    let text = lines.join("\n").trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[derive(Debug, Default)]
struct SerdeOptions {
    rename: Option<String>,
    rename_all: Option<String>,
    skip: bool,
    flatten: bool,
}

fn serde_options(attrs: &[Attribute]) -> SerdeOptions {
    let mut options = SerdeOptions::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let metas = match attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated) {
            Ok(metas) => metas,
            Err(e) => {
                debug!("Ignoring unparseable serde attribute: {}", e);
                continue;
            }
        };
        for meta in metas {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") || p.is_ident("skip_serializing") => {
                    options.skip = true
                }
                Meta::Path(p) if p.is_ident("flatten") => options.flatten = true,
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    options.rename = lit_text(&nv.value)
                }
                Meta::NameValue(nv) if nv.path.is_ident("rename_all") => {
                    options.rename_all = lit_text(&nv.value)
                }
                // rename(serialize = "...", deserialize = "...")
                Meta::List(list) if list.path.is_ident("rename") => {
                    if let Ok(inner) =
                        list.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
                    {
                        options.rename = inner.iter().find_map(|m| match m {
                            Meta::NameValue(nv) if nv.path.is_ident("serialize") => {
                                lit_text(&nv.value)
                            }
                            _ => None,
                        });
                    }
                }
                _ => {}
            }
        }
    }
    options
}

/// Collect metadata markers; the contents of `#[validate(...)]` and `#[garde(...)]` are
/// unpacked into one marker per rule.
fn markers(attrs: &[Attribute]) -> Vec<MetadataMarker> {
    let mut markers = Vec::new();
    for attr in attrs {
        let Some(name) = last_segment(attr.path()) else { continue };
        if NON_MARKER_ATTRIBUTES.contains(&name.as_str()) {
            continue;
        }
        if name == "validate" || name == "garde" {
            if let Meta::List(list) = &attr.meta {
                match list.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated) {
                    Ok(rules) => markers.extend(rules.iter().map(marker_from_meta)),
                    Err(e) => debug!("Ignoring unparseable {} attribute: {}", name, e),
                }
            }
            continue;
        }
        markers.push(marker_from_meta(&attr.meta));
    }
    markers
}

fn marker_from_meta(meta: &Meta) -> MetadataMarker {
    let name = last_segment(meta.path()).unwrap_or_default();
    match meta {
        Meta::Path(_) => MetadataMarker::new(name),
        Meta::NameValue(nv) => {
            MetadataMarker::new(name).with_attribute("value", expr_text(&nv.value).unwrap_or_default())
        }
        Meta::List(list) => {
            let mut marker = MetadataMarker::new(name);
            if let Ok(inner) = list.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated) {
                for item in inner {
                    let key = last_segment(item.path()).unwrap_or_default();
                    let value = match &item {
                        Meta::Path(_) => Some("true".to_string()),
                        Meta::NameValue(nv) => expr_text(&nv.value),
                        Meta::List(nested) => Some(nested.tokens.to_string()),
                    };
                    marker = marker.with_attribute(key, value.unwrap_or_default());
                }
            } else if let Ok(lit) = list.parse_args::<LitStr>() {
                marker = marker.with_attribute("value", lit.value());
            } else {
                marker = marker.with_attribute("value", list.tokens.to_string());
            }
            marker
        }
    }
}

fn last_segment(path: &syn::Path) -> Option<String> {
    path.segments.last().map(|s| s.ident.to_string())
}

fn lit_text(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Str(s) => Some(s.value()),
            Lit::Int(i) => Some(i.base10_digits().to_string()),
            Lit::Float(f) => Some(f.base10_digits().to_string()),
            Lit::Bool(b) => Some(b.value.to_string()),
            Lit::Char(c) => Some(c.value().to_string()),
            _ => None,
        },
        _ => None,
    }
}

fn expr_text(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(_) => lit_text(expr),
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => {
            expr_text(&unary.expr).map(|inner| format!("-{}", inner))
        }
        Expr::Path(path) => last_segment(&path.path),
        Expr::Paren(paren) => expr_text(&paren.expr),
        _ => None,
    }
}
