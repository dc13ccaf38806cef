//! openapi-typegraph - Swagger documents from Rust type graphs, and structural spec diffs.
//!
//! Endpoints are declared in an API manifest. Their request and response types are looked up
//! in the project's sources, walked into bounded-depth property trees, and projected into a
//! Swagger 2.0 document with deduplicated named definitions. Documentation comments feed
//! descriptions and example values (`e.g. [1, 2]`). Independently, two spec documents can be
//! compared and the relevant differences rendered as markdown.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Recursively scans project directories for Rust files
//! 2. [`parser`] - Parses Rust source files into syntax trees, cached by fingerprint
//! 3. [`type_resolver`] - Indexes structs and enums into a [`type_resolver::TypeCatalog`]
//! 4. [`scalar`] - Built-in scalar types and their Swagger type/format
//! 5. [`walker`] - Expands a root type into a tree of property nodes
//! 6. [`default_miner`] - Derives example values from documentation text
//! 7. [`schema_generator`] - Projects property nodes into schemas and definitions
//! 8. [`endpoint`] - Resolves manifest endpoint descriptors against the catalog
//! 9. [`openapi_builder`] - Assembles paths, tags and responses into the final document
//! 10. [`serializer`] - Serializes the document to YAML or JSON
//! 11. [`diff`] - Loads, prunes, compares and reports on two spec documents
//!
//! # Example Usage
//!
//! ```
//! use openapi_typegraph::config::ApiManifest;
//! use openapi_typegraph::openapi_builder::generate_document;
//! use openapi_typegraph::serializer::serialize_json;
//! use openapi_typegraph::type_resolver::SourceCatalog;
//!
//! let catalog = SourceCatalog::from_sources(&[(
//!     "src/model.rs",
//!     "/// A body of salt water\npub struct SeaBody { pub name: String, pub depth: u32 }",
//! )])
//! .unwrap();
//!
//! let manifest = ApiManifest::from_yaml(
//!     "endpoints:\n  - url: /seas\n    method: POST\n    form: SeaBody\n    response: SeaBody\n",
//! )
//! .unwrap();
//!
//! let document = generate_document(&manifest, &catalog, &catalog).unwrap();
//! assert!(document.definitions.contains_key("SeaBody"));
//! println!("{}", serialize_json(&document).unwrap());
//! ```

pub mod cli;
pub mod config;
pub mod default_miner;
pub mod diff;
pub mod endpoint;
pub mod error;
pub mod openapi_builder;
pub mod parser;
pub mod scalar;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;
pub mod type_resolver;
pub mod walker;
