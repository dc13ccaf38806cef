use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// AST (Abstract Syntax Tree) parser for Rust source files.
///
/// The `AstParser` uses the `syn` crate to parse the source files that declare the request and
/// response types of an API. The resulting syntax trees feed the
/// [`SourceCatalog`](crate::type_resolver::SourceCatalog).
///
/// # Example
///
/// ```no_run
/// use openapi_typegraph::parser::AstParser;
/// use std::path::Path;
///
/// let parsed = AstParser::parse_file(Path::new("src/model.rs")).unwrap();
/// println!("Parsed {} items in module {:?}", parsed.syntax_tree.items.len(), parsed.module_path);
/// ```
pub struct AstParser;

/// A successfully parsed Rust file with its abstract syntax tree.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// Module path derived from the file location (`src/model/user.rs` -> `["model", "user"]`)
    pub module_path: Vec<String>,
    /// The parsed abstract syntax tree, shared with the [`SourceCache`]
    pub syntax_tree: Arc<syn::File>,
}

impl ParsedFile {
    /// Build a parsed file from in-memory source text
    pub fn from_source(path: impl Into<PathBuf>, source: &str) -> Result<ParsedFile> {
        let path = path.into();
        let syntax_tree = syn::parse_file(source)
            .with_context(|| format!("Failed to parse Rust syntax in {}", path.display()))?;
        Ok(ParsedFile {
            module_path: module_path_for(&path),
            path,
            syntax_tree: Arc::new(syntax_tree),
        })
    }
}

/// Identity of a file's content as seen by the filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl Fingerprint {
    fn of(path: &Path) -> Result<Fingerprint> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to stat file: {}", path.display()))?;
        Ok(Fingerprint {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

/// Parse results keyed by file path and [`Fingerprint`].
///
/// Owned by whoever supplies documentation and type shapes; an entry is reused only while the
/// file's modification time and size are unchanged.
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: HashMap<PathBuf, (Fingerprint, Arc<syn::File>)>,
    hits: usize,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of parses served from the cache so far
    pub fn hits(&self) -> usize {
        self.hits
    }

    fn lookup(&mut self, path: &Path, fingerprint: Fingerprint) -> Option<Arc<syn::File>> {
        match self.entries.get(path) {
            Some((cached, tree)) if *cached == fingerprint => {
                self.hits += 1;
                Some(Arc::clone(tree))
            }
            _ => None,
        }
    }

    fn store(&mut self, path: &Path, fingerprint: Fingerprint, tree: Arc<syn::File>) {
        self.entries.insert(path.to_path_buf(), (fingerprint, tree));
    }
}

impl AstParser {
    /// Parses a single Rust source file into an AST.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid Rust syntax.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let syntax_tree = syn::parse_file(&content)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;

        Ok(ParsedFile {
            path: path.to_path_buf(),
            module_path: module_path_for(path),
            syntax_tree: Arc::new(syntax_tree),
        })
    }

    /// Parses a file, reusing the cached syntax tree when its fingerprint is unchanged.
    pub fn parse_file_cached(path: &Path, cache: &mut SourceCache) -> Result<ParsedFile> {
        let fingerprint = Fingerprint::of(path)?;
        if let Some(tree) = cache.lookup(path, fingerprint) {
            debug!("Cache hit for {}", path.display());
            return Ok(ParsedFile {
                path: path.to_path_buf(),
                module_path: module_path_for(path),
                syntax_tree: tree,
            });
        }

        let parsed = Self::parse_file(path)?;
        cache.store(path, fingerprint, Arc::clone(&parsed.syntax_tree));
        Ok(parsed)
    }

    /// Parses multiple Rust source files, continuing even if some fail.
    ///
    /// Files that fail to parse are logged as warnings so that a partial catalog can still be
    /// built from the rest.
    pub fn parse_files(paths: &[PathBuf], cache: &mut SourceCache) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| match Self::parse_file_cached(path, cache) {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    Err(e)
                }
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}

/// Derive a module path from a source file location.
///
/// Components after the last `src` directory are used; `lib.rs`, `main.rs` and `mod.rs` do not
/// add a segment of their own.
pub fn module_path_for(path: &Path) -> Vec<String> {
    let components: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let start = components
        .iter()
        .rposition(|c| c == "src")
        .map(|i| i + 1)
        .unwrap_or_else(|| components.len().saturating_sub(1));

    let mut segments: Vec<String> = components[start..].to_vec();
    if let Some(last) = segments.pop() {
        let stem = last.strip_suffix(".rs").unwrap_or(&last).to_string();
        if !matches!(stem.as_str(), "lib" | "main" | "mod") {
            segments.push(stem);
        }
    }
    segments
}
