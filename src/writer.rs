//! Serialization of documentation records and output of rendered documents.
//!
//! Records can be dumped as YAML or JSON for consumption by other tools, or rendered to
//! Markdown and written as one file per module.

use crate::renderer::ModuleDocs;
use anyhow::{Context, Result};
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Module name to module documentation, the shape of YAML and JSON dumps.
fn keyed(docs: &[ModuleDocs]) -> BTreeMap<&str, &ModuleDocs> {
    docs.iter().map(|module| (module.record.name.as_str(), module)).collect()
}

/// Serializes module documentation to YAML, keyed by module name.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(docs: &[ModuleDocs]) -> Result<String> {
    debug!("Serializing {} modules to YAML", docs.len());
    serde_yaml::to_string(&keyed(docs)).context("Failed to serialize documentation to YAML")
}

/// Serializes module documentation to pretty printed JSON, keyed by module name.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(docs: &[ModuleDocs]) -> Result<String> {
    debug!("Serializing {} modules to JSON", docs.len());
    serde_json::to_string_pretty(&keyed(docs)).context("Failed to serialize documentation to JSON")
}

/// Path of the Markdown file for a module: `a::b` becomes `<dir>/a/b.md`.
pub fn module_path(output_dir: &Path, module_name: &str) -> PathBuf {
    let mut path = output_dir.to_path_buf();
    for segment in module_name.split("::") {
        path.push(segment);
    }
    path.set_extension("md");
    path
}

/// Writes string content to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does. Parent directories are
/// created as needed.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content).with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
