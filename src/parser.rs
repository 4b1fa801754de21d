use crate::error::Error;
use crate::scanner::SourceFile;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::PathBuf;

/// AST (Abstract Syntax Tree) parser for Rust source files.
///
/// The `AstParser` uses the `syn` crate to parse Rust source code into an abstract syntax tree,
/// which the introspector then walks for marked items.
///
/// # Example
///
/// ```no_run
/// use docurator::parser::AstParser;
/// use docurator::scanner::SourceFile;
/// use std::path::PathBuf;
///
/// let source = SourceFile::new(PathBuf::from("src/main.rs"), "crate");
/// let parsed = AstParser::parse_file(&source).unwrap();
/// println!("Parsed {} items", parsed.syntax_tree.items.len());
/// ```
pub struct AstParser;

/// A successfully parsed Rust file with its abstract syntax tree.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// Module defined by the file
    pub module_name: String,
    /// The parsed abstract syntax tree
    pub syntax_tree: syn::File,
}

impl ParsedFile {
    /// Parses source text held in memory.
    pub fn from_source(module_name: &str, source: &str) -> Result<Self> {
        let syntax_tree = syn::parse_file(source)
            .with_context(|| format!("Failed to parse Rust syntax in module: {}", module_name))?;
        Ok(Self {
            path: PathBuf::from(format!("<{}>", module_name)),
            module_name: module_name.to_string(),
            syntax_tree,
        })
    }
}

impl AstParser {
    /// Parses a single Rust source file into an AST.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file contains invalid Rust syntax
    pub fn parse_file(source: &SourceFile) -> Result<ParsedFile> {
        let path = &source.path;
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let syntax_tree = syn::parse_file(&content)
            .map_err(|e| Error::Parse {
                file: path.clone(),
                message: e.to_string(),
            })
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;

        Ok(ParsedFile {
            path: path.clone(),
            module_name: source.module_name.clone(),
            syntax_tree,
        })
    }

    /// Parses multiple Rust source files, continuing even if some fail.
    ///
    /// Files that fail to parse are logged as warnings, but parsing continues for the remaining
    /// files: a broken module never aborts the whole scan.
    ///
    /// Returns one `Result` per input file, in input order.
    pub fn parse_files(sources: &[SourceFile]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", sources.len());

        let results: Vec<Result<ParsedFile>> = sources
            .iter()
            .map(|source| {
                Self::parse_file(source).inspect_err(|e| {
                    warn!("Failed to parse {}: {:#}", source.path.display(), e);
                })
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
