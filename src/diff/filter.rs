//! Pruning applied to both documents before comparison.
//!
//! Two passes run in order: the optional [`PathFilter`] drops whole path items, then
//! [`target_nodes`] walks what is left and removes every field the [`NodePredicate`] rejects.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static SUCCESS_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^2\d\d$").expect("success code pattern"));

/// Fields that never take part in a comparison under the default predicate
const IGNORED_FIELDS: &[&str] = &["summary", "description", "examples"];

const OPERATION_KEYS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathFilter {
    /// Disabled filters leave `paths` untouched
    pub enabled: bool,
    pub excluded_prefixes: Vec<String>,
    pub excluded_content_types: Vec<String>,
}

impl PathFilter {
    /// Normalize path keys and drop excluded path items in place
    pub fn apply(&self, document: &mut Value) {
        if !self.enabled {
            return;
        }
        let Some(paths) = document.get_mut("paths").and_then(Value::as_object_mut) else {
            return;
        };

        for (key, item) in std::mem::take(paths) {
            let key = normalize_path_key(&key);
            if let Some(prefix) = self
                .excluded_prefixes
                .iter()
                .find(|prefix| key.starts_with(prefix.as_str()))
            {
                debug!("Dropping path {} (prefix {})", key, prefix);
                continue;
            }
            if self.has_excluded_content_type(&item) {
                debug!("Dropping path {} (excluded content type)", key);
                continue;
            }
            if paths.contains_key(&key) {
                debug!("Path {} already present after normalization", key);
                continue;
            }
            paths.insert(key, item);
        }
    }

    fn is_excluded(&self, content_type: &str) -> bool {
        self.excluded_content_types
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(content_type))
    }

    /// `produces` arrays (Swagger 2) and `content` maps (OpenAPI 3) anywhere below the value
    fn has_excluded_content_type(&self, value: &Value) -> bool {
        match value {
            Value::Object(map) => map.iter().any(|(key, child)| {
                let listed = match key.as_str() {
                    "produces" => child.as_array().is_some_and(|types| {
                        types
                            .iter()
                            .filter_map(Value::as_str)
                            .any(|t| self.is_excluded(t))
                    }),
                    "content" => child
                        .as_object()
                        .is_some_and(|content| content.keys().any(|t| self.is_excluded(t))),
                    _ => false,
                };
                listed || self.has_excluded_content_type(child)
            }),
            Value::Array(items) => items.iter().any(|item| self.has_excluded_content_type(item)),
            _ => false,
        }
    }
}

fn normalize_path_key(key: &str) -> String {
    match key.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => key.to_string(),
    }
}

/// Decides whether a field survives pruning.
///
/// `path` is the dotted location of the parent (`.paths./seas.get.responses`), `field` the key
/// being considered. Closures of the same shape work as predicates.
pub trait NodePredicate {
    fn keep(&self, path: &str, field: &str) -> bool;
}

impl<F> NodePredicate for F
where
    F: Fn(&str, &str) -> bool,
{
    fn keep(&self, path: &str, field: &str) -> bool {
        self(path, field)
    }
}

/// Ignores prose and examples, and keeps only 2xx entries of operation `responses` maps
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNodePredicate;

impl NodePredicate for DefaultNodePredicate {
    fn keep(&self, path: &str, field: &str) -> bool {
        if IGNORED_FIELDS.contains(&field) {
            return false;
        }
        if is_operation_responses(path) {
            return SUCCESS_CODE.is_match(field);
        }
        true
    }
}

/// `.paths.<path>.<method>.responses`. Path keys may contain dots but start with `/` and never
/// hold a method segment of their own.
fn is_operation_responses(path: &str) -> bool {
    let Some((item, method)) = path
        .strip_suffix(".responses")
        .and_then(|operation| operation.rsplit_once('.'))
    else {
        return false;
    };
    let Some(key) = item.strip_prefix(".paths.") else {
        return false;
    };
    OPERATION_KEYS.contains(&method)
        && key.starts_with('/')
        && !OPERATION_KEYS
            .iter()
            .any(|other| key.contains(&format!(".{}.", other)))
}

/// Remove rejected fields depth-first. Array elements share their parent's path.
pub fn target_nodes(value: &mut Value, path: &str, predicate: &dyn NodePredicate) {
    match value {
        Value::Object(map) => {
            map.retain(|field, _| predicate.keep(path, field));
            for (field, child) in map.iter_mut() {
                target_nodes(child, &format!("{}.{}", path, field), predicate);
            }
        }
        Value::Array(items) => {
            for item in items {
                target_nodes(item, path, predicate);
            }
        }
        _ => {}
    }
}
