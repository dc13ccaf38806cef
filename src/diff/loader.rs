//! Loading spec documents from URLs, files, resource roots or raw text.

use log::debug;
use serde_json::{Map, Number, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use thiserror::Error;

/// Percent-escapes that are replaced literally in locations. Anything else, including a bare
/// `%`, is left alone.
const LOCATION_ESCAPES: &[(&str, &str)] = &[
    ("%20", " "),
    ("%7B", "{"),
    ("%7D", "}"),
    ("%5B", "["),
    ("%5D", "]"),
];

/// Where one side of a comparison comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecSource {
    /// `http(s)://` URL, `file://` URL, `classpath:` resource or filesystem path
    Location(String),
    /// The document itself, JSON or YAML
    Raw(String),
}

impl SpecSource {
    /// Treat input that already looks like a document as raw content, anything else as a location
    pub fn detect(input: &str) -> SpecSource {
        let trimmed = input.trim_start();
        if trimmed.starts_with('{') || trimmed.contains('\n') {
            SpecSource::Raw(input.to_string())
        } else {
            SpecSource::Location(input.to_string())
        }
    }

    /// The location, or the raw content itself
    pub fn describe(&self) -> &str {
        match self {
            SpecSource::Location(location) => location,
            SpecSource::Raw(content) => content,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Directories searched, in order, for `classpath:` resources
    pub resource_roots: Vec<PathBuf>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("resource {0} not found under any resource root")]
    ResourceNotFound(String),

    #[error("not a JSON or YAML spec document: {0}")]
    Parse(String),
}

/// Replace the supported percent-escapes in a location
pub fn unescape_location(location: &str) -> String {
    LOCATION_ESCAPES
        .iter()
        .fold(location.to_string(), |acc, (escape, literal)| acc.replace(escape, literal))
}

/// Load and parse one document
pub fn load(source: &SpecSource, options: &LoadOptions) -> Result<Value, LoadError> {
    let content = match source {
        SpecSource::Raw(content) => content.clone(),
        SpecSource::Location(location) => read_location(location, options)?,
    };
    parse_content(&content)
}

/// Load both documents concurrently
pub fn load_pair(
    left: &SpecSource,
    right: &SpecSource,
    options: &LoadOptions,
) -> Result<(Value, Value), LoadError> {
    let (left, right) = thread::scope(|scope| {
        let right_handle = scope.spawn(|| load(right, options));
        let left = load(left, options);
        let right = right_handle
            .join()
            .unwrap_or_else(|_| Err(LoadError::Parse("loader thread panicked".to_string())));
        (left, right)
    });
    Ok((left?, right?))
}

fn read_location(location: &str, options: &LoadOptions) -> Result<String, LoadError> {
    let location = unescape_location(location);
    debug!("Reading spec from {}", location);

    if location.starts_with("http://") || location.starts_with("https://") {
        return fetch(&location);
    }
    if let Some(path) = location.strip_prefix("file://") {
        return read_file(Path::new(path));
    }
    if let Some(resource) = location.strip_prefix("classpath:") {
        let resource = resource.trim_start_matches('/');
        return options
            .resource_roots
            .iter()
            .map(|root| root.join(resource))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| LoadError::ResourceNotFound(resource.to_string()))
            .and_then(|path| read_file(&path));
    }
    read_file(Path::new(&location))
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn fetch(url: &str) -> Result<String, LoadError> {
    let to_error = |source| LoadError::Http {
        url: url.to_string(),
        source,
    };
    reqwest::blocking::get(url)
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .map_err(to_error)
}

/// Parse JSON, falling back to YAML. The document must be a mapping.
pub fn parse_content(content: &str) -> Result<Value, LoadError> {
    let value = match serde_json::from_str::<Value>(content) {
        Ok(value) => value,
        Err(json_error) => match serde_yaml::from_str::<serde_yaml::Value>(content) {
            Ok(yaml) => yaml_to_json(yaml),
            Err(yaml_error) => {
                return Err(LoadError::Parse(format!(
                    "JSON: {}; YAML: {}",
                    json_error, yaml_error
                )))
            }
        },
    };
    if value.is_object() {
        Ok(value)
    } else {
        Err(LoadError::Parse("top level is not a mapping".to_string()))
    }
}

/// YAML allows non-string keys (`200:` under `responses`); they become their string form
fn yaml_to_json(value: serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;
    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => serde_yaml::to_string(&other)
                        .map(|s| s.trim().to_string())
                        .unwrap_or_default(),
                };
                map.insert(key, yaml_to_json(value));
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_unescape_location() {
        assert_eq!(
            unescape_location("/specs/my%20api/%7Bv1%7D%5B0%5D.json"),
            "/specs/my api/{v1}[0].json"
        );
        assert_eq!(unescape_location("/specs/100%25.json"), "/specs/100%25.json");
    }

    #[test]
    fn test_parse_json_and_yaml() {
        assert_eq!(
            parse_content(r#"{"swagger": "2.0"}"#).unwrap(),
            json!({"swagger": "2.0"})
        );

        let yaml = "swagger: '2.0'\nresponses:\n  200:\n    description: ok\n";
        assert_eq!(
            parse_content(yaml).unwrap(),
            json!({"swagger": "2.0", "responses": {"200": {"description": "ok"}}})
        );

        assert!(matches!(parse_content("just words"), Err(LoadError::Parse(_))));
        assert!(matches!(parse_content("{ broken"), Err(LoadError::Parse(_))));
    }

    #[test]
    fn test_detect_source() {
        assert_eq!(
            SpecSource::detect("specs/a.json"),
            SpecSource::Location("specs/a.json".to_string())
        );
        assert!(matches!(SpecSource::detect(r#"{"a": 1}"#), SpecSource::Raw(_)));
        assert!(matches!(SpecSource::detect("a: 1\nb: 2"), SpecSource::Raw(_)));
    }

    #[test]
    fn test_load_from_paths_and_resource_roots() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("my specs");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("old.json"), r#"{"swagger": "2.0"}"#).unwrap();
        fs::write(dir.join("new.yaml"), "swagger: '2.0'\n").unwrap();

        let escaped = dir.join("old.json").display().to_string().replace(' ', "%20");
        let options = LoadOptions {
            resource_roots: vec![temp_dir.path().join("missing"), dir.clone()],
        };

        let (left, right) = load_pair(
            &SpecSource::Location(escaped),
            &SpecSource::Location("classpath:/new.yaml".to_string()),
            &options,
        )
        .unwrap();
        assert_eq!(left, right);

        let file_url = format!("file://{}", dir.join("new.yaml").display());
        assert!(load(&SpecSource::Location(file_url), &options).is_ok());

        let missing = load(
            &SpecSource::Location("classpath:absent.json".to_string()),
            &options,
        );
        assert!(matches!(missing, Err(LoadError::ResourceNotFound(_))));
    }

    #[test]
    fn test_load_pair_reports_failing_side() {
        let result = load_pair(
            &SpecSource::Raw(r#"{"swagger": "2.0"}"#.to_string()),
            &SpecSource::Location("/definitely/not/here.json".to_string()),
            &LoadOptions::default(),
        );
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }
}
