//! Spec comparison: load two documents, prune them, compare, render markdown.
//!
//! The pipeline is expressed as a chain of stages so each step can only run after the one
//! before it:
//!
//! ```
//! use openapi_typegraph::diff::{DefaultNodePredicate, Loaded, PathFilter};
//! use serde_json::json;
//!
//! let old = json!({"swagger": "2.0", "paths": {"/seas": {"get": {}}}});
//! let new = json!({"swagger": "2.0", "paths": {"/seas": {"get": {}}, "/ships": {"get": {}}}});
//!
//! let report = Loaded::from_values(old, new)
//!     .filter(&PathFilter::default(), &DefaultNodePredicate)
//!     .compare()
//!     .render();
//! assert!(report.starts_with("### What's Added"));
//! ```

pub mod compare;
pub mod filter;
pub mod loader;
pub mod render;

pub use compare::{ApiChanges, ChangedOperation, OperationKey};
pub use filter::{target_nodes, DefaultNodePredicate, NodePredicate, PathFilter};
pub use loader::{LoadError, LoadOptions, SpecSource};

use log::{debug, info};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiffError {
    /// Either side failed to load; both sides are kept so the caller can tell what was compared
    #[error("failed to load specs for comparison (left: {left}, right: {right}): {source}")]
    Load {
        left: String,
        right: String,
        #[source]
        source: LoadError,
    },
}

/// Both documents parsed, nothing pruned yet
#[derive(Debug, Clone)]
pub struct Loaded {
    left: Value,
    right: Value,
}

/// Both documents pruned and ready to compare
#[derive(Debug, Clone)]
pub struct Filtered {
    left: Value,
    right: Value,
}

#[derive(Debug, Clone)]
pub struct Compared {
    changes: ApiChanges,
}

impl Loaded {
    pub fn load(
        left: &SpecSource,
        right: &SpecSource,
        options: &LoadOptions,
    ) -> Result<Self, DiffError> {
        let (left_doc, right_doc) =
            loader::load_pair(left, right, options).map_err(|source| DiffError::Load {
                left: left.describe().to_string(),
                right: right.describe().to_string(),
                source,
            })?;
        Ok(Self::from_values(left_doc, right_doc))
    }

    pub fn from_values(left: Value, right: Value) -> Self {
        Self { left, right }
    }

    pub fn filter(mut self, paths: &PathFilter, predicate: &dyn NodePredicate) -> Filtered {
        for document in [&mut self.left, &mut self.right] {
            paths.apply(document);
            target_nodes(document, "", predicate);
        }
        Filtered {
            left: self.left,
            right: self.right,
        }
    }
}

impl Filtered {
    pub fn left(&self) -> &Value {
        &self.left
    }

    pub fn right(&self) -> &Value {
        &self.right
    }

    pub fn compare(self) -> Compared {
        let changes = compare::compare(&self.left, &self.right);
        debug!(
            "Compared specs: {} added, {} removed, {} changed",
            changes.added.len(),
            changes.removed.len(),
            changes.changed.len()
        );
        Compared { changes }
    }
}

impl Compared {
    pub fn changes(&self) -> &ApiChanges {
        &self.changes
    }

    pub fn render(&self) -> String {
        render::render_markdown(&self.changes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffOptions {
    pub path_filter: PathFilter,
    pub load: LoadOptions,
}

/// One-call comparison with a configurable node predicate
pub struct SpecDiff {
    options: DiffOptions,
    predicate: Box<dyn NodePredicate>,
}

impl Default for SpecDiff {
    fn default() -> Self {
        Self::new(DiffOptions::default())
    }
}

impl SpecDiff {
    pub fn new(options: DiffOptions) -> Self {
        Self {
            options,
            predicate: Box::new(DefaultNodePredicate),
        }
    }

    /// Replace the default predicate
    pub fn with_predicate(mut self, predicate: impl NodePredicate + 'static) -> Self {
        self.predicate = Box::new(predicate);
        self
    }

    pub fn compare(&self, left: &SpecSource, right: &SpecSource) -> Result<Compared, DiffError> {
        info!(
            "Comparing {} against {}",
            short(left.describe()),
            short(right.describe())
        );
        Ok(Loaded::load(left, right, &self.options.load)?
            .filter(&self.options.path_filter, self.predicate.as_ref())
            .compare())
    }

    /// Markdown report, empty when nothing relevant changed
    pub fn diff(&self, left: &SpecSource, right: &SpecSource) -> Result<String, DiffError> {
        Ok(self.compare(left, right)?.render())
    }
}

/// First line of a source for log output; raw documents can be large
fn short(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> SpecSource {
        SpecSource::Raw(value.to_string())
    }

    #[test]
    fn test_description_only_changes_are_ignored() {
        let old = json!({"swagger": "2.0", "paths": {"/seas": {"get": {
            "summary": "List seas",
            "responses": {"200": {"description": "ok", "schema": {"type": "string"}}}
        }}}});
        let new = json!({"swagger": "2.0", "paths": {"/seas": {"get": {
            "summary": "List all the seas",
            "responses": {
                "200": {"description": "the seas", "schema": {"type": "string"}},
                "500": {"description": "boom", "schema": {"type": "object"}}
            }
        }}}});

        let report = SpecDiff::default().diff(&raw(old), &raw(new)).unwrap();
        assert_eq!(report, "");
    }

    #[test]
    fn test_custom_predicate_sees_descriptions() {
        let old = json!({"paths": {"/seas": {"post": {"requestBody": {"description": "a sea"}}}}});
        let new = json!({"paths": {"/seas": {"post": {"requestBody": {"description": "seas"}}}}});

        let compared = SpecDiff::default()
            .with_predicate(|_: &str, _: &str| true)
            .compare(&raw(old), &raw(new))
            .unwrap();
        let body = compared.changes().changed[0].request_body.as_ref().unwrap();
        assert_eq!(
            body.description,
            Some((Some("a sea".to_string()), Some("seas".to_string())))
        );
    }

    #[test]
    fn test_path_filter_runs_before_comparison() {
        let old = json!({"paths": {"/seas": {"get": {}}}});
        let new = json!({"paths": {"/seas/": {"get": {}}, "/internal/ping": {"get": {}}}});
        let options = DiffOptions {
            path_filter: PathFilter {
                enabled: true,
                excluded_prefixes: vec!["/internal".to_string()],
                excluded_content_types: Vec::new(),
            },
            ..Default::default()
        };

        let report = SpecDiff::new(options).diff(&raw(old), &raw(new)).unwrap();
        assert_eq!(report, "");
    }

    #[test]
    fn test_load_failure_names_both_sides() {
        let error = SpecDiff::default()
            .diff(
                &SpecSource::Location("/nowhere/old.json".to_string()),
                &SpecSource::Location("/nowhere/new.json".to_string()),
            )
            .unwrap_err();

        let DiffError::Load { left, right, .. } = &error;
        assert_eq!(left, "/nowhere/old.json");
        assert_eq!(right, "/nowhere/new.json");
        assert!(error.to_string().contains("/nowhere/old.json"));
    }
}
