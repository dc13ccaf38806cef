use crate::config::ApiManifest;
use crate::diff::{DiffOptions, LoadOptions, PathFilter, SpecDiff, SpecSource};
use crate::openapi_builder::generate_document;
use crate::parser::{AstParser, ParsedFile, SourceCache};
use crate::scanner::FileScanner;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::type_resolver::SourceCatalog;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// OpenAPI typegraph - Generate Swagger documents from Rust type graphs and diff API specs
#[derive(Parser, Debug)]
#[command(name = "openapi-typegraph")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a Swagger 2.0 document for the endpoints listed in a manifest
    Generate {
        /// Path to the Rust project whose types back the endpoints
        #[arg(value_name = "PROJECT_PATH")]
        project_path: PathBuf,

        /// API manifest (YAML or JSON)
        #[arg(short = 'm', long = "manifest", value_name = "FILE")]
        manifest: PathBuf,

        /// Output format (yaml or json)
        #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
        output_format: OutputFormat,

        /// Output file path (if not specified, outputs to stdout)
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output_path: Option<PathBuf>,
    },

    /// Compare two spec documents and print a markdown report of the differences
    Diff {
        /// Old spec: URL, file://, classpath:, path or raw document
        #[arg(value_name = "LEFT")]
        left: String,

        /// New spec: URL, file://, classpath:, path or raw document
        #[arg(value_name = "RIGHT")]
        right: String,

        /// Enable path filtering
        #[arg(long = "filter-paths")]
        filter_paths: bool,

        /// Path prefix to drop when filtering (repeatable)
        #[arg(long = "exclude-prefix", value_name = "PREFIX")]
        exclude_prefixes: Vec<String>,

        /// Content type to drop when filtering (repeatable)
        #[arg(long = "exclude-content-type", value_name = "TYPE")]
        exclude_content_types: Vec<String>,

        /// Directory searched for classpath: resources (repeatable)
        #[arg(long = "resource-root", value_name = "DIR")]
        resource_roots: Vec<PathBuf>,

        /// Output file path (if not specified, outputs to stdout)
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output_path: Option<PathBuf>,
    },
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    match &args.command {
        Command::Generate {
            project_path,
            manifest,
            output_format,
            output_path,
        } => {
            if !project_path.is_dir() {
                anyhow::bail!(
                    "Project path is not a directory: {}",
                    project_path.display()
                );
            }
            if !manifest.is_file() {
                anyhow::bail!("Manifest does not exist: {}", manifest.display());
            }
            info!("Project path: {}", project_path.display());
            info!("Manifest: {}", manifest.display());
            info!("Output format: {:?}", output_format);
            log_output(output_path);
        }
        Command::Diff {
            filter_paths,
            exclude_prefixes,
            exclude_content_types,
            output_path,
            ..
        } => {
            if !filter_paths && !(exclude_prefixes.is_empty() && exclude_content_types.is_empty()) {
                warn!("Exclusions are ignored unless --filter-paths is given");
            }
            log_output(output_path);
        }
    }

    Ok(args)
}

fn log_output(output_path: &Option<PathBuf>) {
    if let Some(output) = output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }
}

/// Run the selected subcommand
pub fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Command::Generate {
            project_path,
            manifest,
            output_format,
            output_path,
        } => run_generate(project_path, manifest, output_format, output_path),
        Command::Diff {
            left,
            right,
            filter_paths,
            exclude_prefixes,
            exclude_content_types,
            resource_roots,
            output_path,
        } => {
            let options = DiffOptions {
                path_filter: PathFilter {
                    enabled: filter_paths,
                    excluded_prefixes: exclude_prefixes,
                    excluded_content_types: exclude_content_types,
                },
                load: LoadOptions { resource_roots },
            };
            run_diff(&left, &right, options, output_path)
        }
    }
}

fn run_generate(
    project_path: PathBuf,
    manifest_path: PathBuf,
    output_format: OutputFormat,
    output_path: Option<PathBuf>,
) -> Result<()> {
    info!("Starting Swagger document generation...");

    let manifest = ApiManifest::load(&manifest_path)?;
    info!("Manifest lists {} endpoints", manifest.endpoints.len());

    // Step 1: Scan directory for Rust files
    info!("Scanning project directory...");
    let scan_result = FileScanner::new(project_path).scan()?;
    info!("Found {} Rust files", scan_result.rust_files.len());
    for warning in &scan_result.warnings {
        warn!("{}", warning);
    }
    if scan_result.rust_files.is_empty() {
        anyhow::bail!("No Rust files found in the project directory");
    }

    // Step 2: Parse files and index their types
    info!("Parsing Rust files...");
    let mut cache = SourceCache::new();
    let parsed_files: Vec<ParsedFile> = AstParser::parse_files(&scan_result.rust_files, &mut cache)
        .into_iter()
        .filter_map(|r| match r {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Skipping file due to parse error: {}", e);
                None
            }
        })
        .collect();
    info!("Successfully parsed {} files", parsed_files.len());

    let catalog = SourceCatalog::new(&parsed_files);
    info!("Indexed {} types", catalog.len());

    // Step 3: Walk, project and assemble
    let document = generate_document(&manifest, &catalog, &catalog)?;

    // Step 4: Serialize and output
    info!("Serializing to {:?} format...", output_format);
    let content = match output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };
    emit(&content, output_path.as_ref())?;

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files scanned: {}", scan_result.rust_files.len());
    info!("  - Types indexed: {}", catalog.len());
    info!("  - Paths: {}", document.paths.len());
    info!("  - Definitions: {}", document.definitions.len());

    Ok(())
}

fn run_diff(
    left: &str,
    right: &str,
    options: DiffOptions,
    output_path: Option<PathBuf>,
) -> Result<()> {
    let report = SpecDiff::new(options)
        .diff(&SpecSource::detect(left), &SpecSource::detect(right))
        .context("Spec comparison failed")?;

    if report.is_empty() {
        info!("No relevant differences");
    }
    emit(&report, output_path.as_ref())
}

fn emit(content: &str, output_path: Option<&PathBuf>) -> Result<()> {
    if let Some(output_path) = output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(content, output_path)?;
    } else if !content.is_empty() {
        println!("{}", content);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_generate_arguments() {
        let args = CliArgs::try_parse_from([
            "openapi-typegraph",
            "generate",
            "./project",
            "--manifest",
            "api.yaml",
            "-f",
            "json",
            "-v",
        ])
        .unwrap();

        assert!(args.verbose);
        match args.command {
            Command::Generate {
                project_path,
                manifest,
                output_format,
                output_path,
            } => {
                assert_eq!(project_path, PathBuf::from("./project"));
                assert_eq!(manifest, PathBuf::from("api.yaml"));
                assert!(matches!(output_format, OutputFormat::Json));
                assert!(output_path.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_diff_arguments() {
        let args = CliArgs::try_parse_from([
            "openapi-typegraph",
            "diff",
            "old.json",
            "new.json",
            "--filter-paths",
            "--exclude-prefix",
            "/internal",
            "--exclude-prefix",
            "/admin",
        ])
        .unwrap();

        match args.command {
            Command::Diff {
                filter_paths,
                exclude_prefixes,
                ..
            } => {
                assert!(filter_paths);
                assert_eq!(exclude_prefixes, vec!["/internal", "/admin"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_generate_requires_existing_project() {
        let args = CliArgs::try_parse_from([
            "openapi-typegraph",
            "generate",
            "/definitely/not/a/project",
            "--manifest",
            "api.yaml",
        ])
        .unwrap();
        assert!(parse_args_from_parsed(args).is_err());
    }

    #[test]
    fn test_run_diff_writes_report() {
        let temp_dir = TempDir::new().unwrap();
        let old = temp_dir.path().join("old.json");
        let new = temp_dir.path().join("new.json");
        fs::write(&old, r#"{"swagger": "2.0", "paths": {}}"#).unwrap();
        fs::write(&new, r#"{"swagger": "2.0", "paths": {"/seas": {"get": {}}}}"#).unwrap();
        let report = temp_dir.path().join("out/report.md");

        let args = CliArgs {
            command: Command::Diff {
                left: old.display().to_string(),
                right: new.display().to_string(),
                filter_paths: false,
                exclude_prefixes: Vec::new(),
                exclude_content_types: Vec::new(),
                resource_roots: Vec::new(),
                output_path: Some(report.clone()),
            },
            verbose: false,
        };
        run(args).unwrap();

        let content = fs::read_to_string(&report).unwrap();
        assert!(content.starts_with("### What's Added"));
        assert!(content.contains("* `GET` /seas"));
    }
}
