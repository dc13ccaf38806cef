use openapi_typegraph::diff::{
    DiffError, DiffOptions, LoadError, LoadOptions, PathFilter, SpecDiff, SpecSource,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::path::PathBuf;

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/specs")
        .join(name)
        .display()
        .to_string()
}

fn location(name: &str) -> SpecSource {
    SpecSource::Location(fixture(name))
}

fn filtered() -> DiffOptions {
    DiffOptions {
        path_filter: PathFilter {
            enabled: true,
            excluded_prefixes: vec!["/internal".to_string()],
            excluded_content_types: vec!["text/csv".to_string()],
        },
        ..Default::default()
    }
}

#[test]
fn test_identical_specs_render_empty_report() {
    let report = SpecDiff::default()
        .diff(&location("harbour_v1.json"), &location("harbour_v1.json"))
        .expect("diff should succeed");
    assert_eq!(report, "");
}

#[test]
fn test_rewording_only_renders_empty_report() {
    // summaries, descriptions and non-2xx responses differ; nothing else does
    let report = SpecDiff::default()
        .diff(
            &location("harbour_v1.json"),
            &location("harbour_v1_reworded.yaml"),
        )
        .expect("diff should succeed");
    assert_eq!(report, "");
}

#[test]
fn test_added_path_renders_only_added_section() {
    let old: Value =
        serde_json::from_str(&std::fs::read_to_string(fixture("harbour_v1.json")).unwrap())
            .unwrap();
    let mut new = old.clone();
    new["paths"]["/ships"] = json!({
        "get": {"responses": {"200": {"description": "OK", "schema": {"type": "string"}}}}
    });

    let report = SpecDiff::default()
        .diff(
            &SpecSource::Raw(old.to_string()),
            &SpecSource::Raw(new.to_string()),
        )
        .unwrap();
    assert_eq!(report, "### What's Added\n---\n* `GET` /ships\n");
}

#[test]
fn test_filtered_report() {
    let report = SpecDiff::new(filtered())
        .diff(&location("harbour_v1.json"), &location("harbour_v2.json"))
        .unwrap();

    let expected = "\
### What's Added
---
* `GET` /seas/{id}

### What's Deleted
---
* `DELETE` /seas/{id}

### What's Changed
---
* `GET` /seas
  - Parameters
    - Add `keyword` in `query`
    - Modify `size` in `query`: required `false` -> `true`
  - Return Type
    - Changed `200`
      - Schema of `application/json` modified (`array<SeaBody>`)
* `POST` /seas
  - Request
    - Schema of `application/json` modified (`SeaBody`)
  - Return Type
    - Changed `201`
      - Schema of `application/json` modified (`SeaBody`)
";
    assert_eq!(report, expected);
}

#[test]
fn test_unfiltered_report_sees_every_path() {
    let compared = SpecDiff::default()
        .compare(&location("harbour_v1.json"), &location("harbour_v2.json"))
        .unwrap();
    let changes = compared.changes();

    let added: Vec<String> = changes.added.iter().map(|k| k.to_string()).collect();
    assert_eq!(
        added,
        vec![
            "GET /seas/",
            "POST /seas/",
            "GET /seas/{id}",
            "GET /internal/metrics",
            "GET /seas/export",
        ]
    );
    assert!(changes.changed.is_empty());
}

#[test]
fn test_classpath_resources() {
    let options = DiffOptions {
        load: LoadOptions {
            resource_roots: vec![PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")],
        },
        ..Default::default()
    };
    let report = SpecDiff::new(options)
        .diff(
            &SpecSource::Location("classpath:specs/harbour_v1.json".to_string()),
            &SpecSource::Location("classpath:/specs/harbour_v1_reworded.yaml".to_string()),
        )
        .unwrap();
    assert_eq!(report, "");
}

#[test]
fn test_load_error_carries_both_raw_contents() {
    let error = SpecDiff::default()
        .diff(
            &SpecSource::Raw("[1, 2, 3]".to_string()),
            &SpecSource::Raw(r#"{"swagger": "2.0"}"#.to_string()),
        )
        .unwrap_err();

    let DiffError::Load {
        left,
        right,
        source,
    } = error;
    assert_eq!(left, "[1, 2, 3]");
    assert_eq!(right, r#"{"swagger": "2.0"}"#);
    assert!(matches!(source, LoadError::Parse(_)));
}
