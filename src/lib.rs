//! docurator - Opt-in documentation collection for Rust projects.
//!
//! Items carrying the `#[document_me]` attribute are discovered by static analysis, registered
//! per module, and their doc comments reconciled with their signatures into records that can be
//! rendered through Markdown templates or dumped as YAML and JSON.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Recursively scans project directories for Rust files and names their modules
//! 2. [`parser`] - Parses Rust source files into Abstract Syntax Trees (AST)
//! 3. [`extractor`] - Reports marked items as source objects with call signatures
//! 4. [`marker`] - Registers marked objects, or does nothing in production mode
//! 5. [`registry`] - Collects modules, classes and their members
//! 6. [`discovery`] - Drives steps 1 to 4 over a project
//! 7. [`docstring`] - Parses doc comments into sections
//! 8. [`signature`] - Normalizes call signatures into argument descriptors
//! 9. [`reconciler`] - Merges parsed doc comments with signatures
//! 10. [`config`] - Loads configuration and templates
//! 11. [`renderer`] - Renders records through templates
//! 12. [`writer`] - Serializes records and writes output files
//!
//! # Example Usage
//!
//! ```no_run
//! use docurator::{
//!     config::{ConfigBuilder, TemplateSetBuilder},
//!     discovery::Discovery,
//!     marker::Marker,
//!     registry::Registry,
//!     renderer::Renderer,
//! };
//! use std::path::Path;
//!
//! let config = ConfigBuilder::new(None).unwrap().get().unwrap();
//! let templates = TemplateSetBuilder::new(None).unwrap().get().unwrap();
//!
//! let mut registry = Registry::new();
//! Discovery::new(Marker::new("doc").unwrap())
//!     .run(Path::new("./my-project"), &mut registry)
//!     .unwrap();
//!
//! let renderer = Renderer::new(&config, &templates).unwrap();
//! for module in renderer.documents(&registry).unwrap() {
//!     println!("{}", renderer.render(&module).unwrap());
//! }
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod docstring;
pub mod error;
pub mod extractor;
pub mod marker;
pub mod parser;
pub mod reconciler;
pub mod registry;
pub mod renderer;
pub mod scanner;
pub mod signature;
pub mod writer;
