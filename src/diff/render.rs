//! Markdown rendering of [`ApiChanges`].

use super::compare::{ApiChanges, ChangedContent, ChangedOperation, OperationKey};

/// Render the change report. Sections appear only when they have entries; no changes at all
/// renders as an empty string.
pub fn render_markdown(changes: &ApiChanges) -> String {
    if changes.is_empty() {
        return String::new();
    }

    let mut sections = Vec::new();
    if !changes.added.is_empty() {
        sections.push(operation_section("What's Added", &changes.added));
    }
    if !changes.removed.is_empty() {
        sections.push(operation_section("What's Deleted", &changes.removed));
    }
    if !changes.changed.is_empty() {
        let mut lines = section_header("What's Changed");
        for operation in &changes.changed {
            render_changed_operation(operation, &mut lines);
        }
        sections.push(lines.join("\n"));
    }

    let mut report = sections.join("\n\n");
    report.push('\n');
    report
}

fn section_header(title: &str) -> Vec<String> {
    vec![format!("### {}", title), "---".to_string()]
}

fn operation_line(key: &OperationKey) -> String {
    format!("* `{}` {}", key.method, key.path)
}

fn operation_section(title: &str, operations: &[OperationKey]) -> String {
    let mut lines = section_header(title);
    lines.extend(operations.iter().map(operation_line));
    lines.join("\n")
}

fn render_changed_operation(operation: &ChangedOperation, lines: &mut Vec<String>) {
    lines.push(operation_line(&operation.key));

    if let Some(parameters) = &operation.parameters {
        lines.push("  - Parameters".to_string());
        for key in &parameters.added {
            lines.push(format!("    - Add `{}` in `{}`", key.name, key.location));
        }
        for key in &parameters.removed {
            lines.push(format!("    - Delete `{}` in `{}`", key.name, key.location));
        }
        for changed in &parameters.changed {
            let mut details = Vec::new();
            if let Some((old, new)) = changed.required {
                details.push(format!("required `{}` -> `{}`", old, new));
            }
            if let Some((old, new)) = &changed.schema {
                details.push(format!("type `{}` -> `{}`", old, new));
            }
            lines.push(format!(
                "    - Modify `{}` in `{}`: {}",
                changed.key.name,
                changed.key.location,
                details.join(", ")
            ));
        }
    }

    if let Some(body) = &operation.request_body {
        lines.push("  - Request".to_string());
        if let Some((old, new)) = &body.description {
            lines.push(format!(
                "    - Description `{}` -> `{}`",
                old.as_deref().unwrap_or(""),
                new.as_deref().unwrap_or("")
            ));
        }
        if let Some((old, new)) = body.required {
            lines.push(format!("    - Required `{}` -> `{}`", old, new));
        }
        render_content(&body.content, "    ", lines);
    }

    if let Some(responses) = &operation.responses {
        lines.push("  - Return Type".to_string());
        for status in &responses.added {
            lines.push(format!("    - Add `{}`", status));
        }
        for status in &responses.removed {
            lines.push(format!("    - Delete `{}`", status));
        }
        for changed in &responses.changed {
            lines.push(format!("    - Changed `{}`", changed.status));
            render_content(&changed.content, "      ", lines);
        }
    }
}

fn render_content(content: &ChangedContent, indent: &str, lines: &mut Vec<String>) {
    for media_type in &content.added {
        lines.push(format!("{}- New content type `{}`", indent, media_type));
    }
    for media_type in &content.removed {
        lines.push(format!("{}- Deleted content type `{}`", indent, media_type));
    }
    for changed in &content.changed {
        if changed.old_schema == changed.new_schema {
            lines.push(format!(
                "{}- Schema of `{}` modified (`{}`)",
                indent, changed.media_type, changed.new_schema
            ));
        } else {
            lines.push(format!(
                "{}- Schema of `{}` `{}` -> `{}`",
                indent, changed.media_type, changed.old_schema, changed.new_schema
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::compare::{
        ChangedMediaType, ChangedParameter, ChangedParameters, ChangedResponse, ChangedResponses,
        ParameterKey,
    };
    use pretty_assertions::assert_eq;

    fn key(method: &str, path: &str) -> OperationKey {
        OperationKey {
            method: method.to_string(),
            path: path.to_string(),
        }
    }

    #[test]
    fn test_empty_changes_render_nothing() {
        assert_eq!(render_markdown(&ApiChanges::default()), "");
    }

    #[test]
    fn test_only_populated_sections_appear() {
        let changes = ApiChanges {
            added: vec![key("GET", "/seas/{id}")],
            ..Default::default()
        };
        assert_eq!(
            render_markdown(&changes),
            "### What's Added\n---\n* `GET` /seas/{id}\n"
        );
    }

    #[test]
    fn test_changed_operation() {
        let changes = ApiChanges {
            removed: vec![key("DELETE", "/ships")],
            changed: vec![ChangedOperation {
                key: key("POST", "/seas"),
                parameters: Some(ChangedParameters {
                    added: vec![ParameterKey {
                        name: "page".to_string(),
                        location: "query".to_string(),
                    }],
                    removed: Vec::new(),
                    changed: vec![ChangedParameter {
                        key: ParameterKey {
                            name: "id".to_string(),
                            location: "path".to_string(),
                        },
                        required: None,
                        schema: Some(("integer".to_string(), "string".to_string())),
                    }],
                }),
                request_body: None,
                responses: Some(ChangedResponses {
                    added: vec!["201".to_string()],
                    removed: Vec::new(),
                    changed: vec![ChangedResponse {
                        status: "200".to_string(),
                        content: ChangedContent {
                            changed: vec![ChangedMediaType {
                                media_type: "application/json".to_string(),
                                old_schema: "SeaBody".to_string(),
                                new_schema: "SeaBody".to_string(),
                            }],
                            ..Default::default()
                        },
                    }],
                }),
            }],
            ..Default::default()
        };

        let expected = "\
### What's Deleted
---
* `DELETE` /ships

### What's Changed
---
* `POST` /seas
  - Parameters
    - Add `page` in `query`
    - Modify `id` in `path`: type `integer` -> `string`
  - Return Type
    - Add `201`
    - Changed `200`
      - Schema of `application/json` modified (`SeaBody`)
";
        assert_eq!(render_markdown(&changes), expected);
    }
}
