//! Discovery driver: scan, parse, introspect, mark.
//!
//! Every `.rs` file below the root is parsed and walked for marked objects, which are handed to
//! the [`Marker`] in evaluation order. Files that cannot be read or parsed are logged and
//! skipped; a broken file never aborts the scan.

use crate::extractor::rust::RustIntrospector;
use crate::extractor::Introspector;
use crate::marker::Marker;
use crate::parser::{AstParser, ParsedFile};
use crate::registry::Registry;
use crate::scanner::FileScanner;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::Path;

/// Outcome of one discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub files_found: usize,
    pub files_parsed: usize,
    /// Objects handed to the marker
    pub objects_marked: usize,
    /// One message per file that was skipped
    pub failures: Vec<String>,
    /// Paths the scanner could not access
    pub warnings: Vec<String>,
}

/// Drives an [`Introspector`] over a directory tree.
///
/// # Example
///
/// ```no_run
/// use docurator::discovery::Discovery;
/// use docurator::marker::Marker;
/// use docurator::registry::Registry;
/// use std::path::Path;
///
/// let mut registry = Registry::new();
/// let discovery = Discovery::new(Marker::new("doc").unwrap());
/// let report = discovery.run(Path::new("./my-project"), &mut registry).unwrap();
/// println!("{} modules documented from {} files", registry.docs().len(), report.files_parsed);
/// ```
pub struct Discovery<I = RustIntrospector> {
    introspector: I,
    marker: Marker,
}

impl Discovery<RustIntrospector> {
    pub fn new(marker: Marker) -> Self {
        Self::with_introspector(RustIntrospector::default(), marker)
    }
}

impl<I: Introspector> Discovery<I> {
    pub fn with_introspector(introspector: I, marker: Marker) -> Self {
        Self { introspector, marker }
    }

    /// Scans `root` and marks every object found.
    ///
    /// # Errors
    ///
    /// Fails if `root` is not a directory, or if a marked object cannot be registered.
    pub fn run(&self, root: &Path, registry: &mut Registry) -> Result<DiscoveryReport> {
        info!("Scanning {}", root.display());
        let scan = FileScanner::new(root.to_path_buf()).scan()?;
        let mut report = DiscoveryReport {
            files_found: scan.source_files.len(),
            warnings: scan.warnings,
            ..DiscoveryReport::default()
        };

        for (source, parsed) in scan.source_files.iter().zip(AstParser::parse_files(&scan.source_files)) {
            match parsed {
                Ok(parsed) => {
                    report.files_parsed += 1;
                    report.objects_marked += self.mark_file(&parsed, registry)?;
                }
                Err(e) => report.failures.push(format!("{}: {:#}", source.path.display(), e)),
            }
        }

        info!(
            "Discovery complete: {} files found, {} parsed, {} objects marked",
            report.files_found, report.files_parsed, report.objects_marked
        );
        warn_unclaimed(registry);
        Ok(report)
    }

    /// Marks the objects of one parsed file, returning how many were marked.
    ///
    /// # Errors
    ///
    /// Propagates registration failures, with the file as context.
    pub fn mark_file(&self, parsed: &ParsedFile, registry: &mut Registry) -> Result<usize> {
        let objects = self.introspector.introspect(parsed);
        for object in &objects {
            debug!("Marking {}::{}", object.module.name, object.qualname);
            self.marker
                .apply(registry, object)
                .with_context(|| format!("Failed to register object in {}", parsed.path.display()))?;
        }
        Ok(objects.len())
    }
}

/// Logs every member whose owning class was never registered.
pub fn warn_unclaimed(registry: &Registry) {
    for (module, owner, members) in registry.pending() {
        warn!(
            "{} member(s) of {}::{} were marked but {} itself was not: {:?}",
            members.len(),
            module,
            owner,
            owner,
            members.names()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;
    use tempfile::TempDir;

    fn create_project(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for (path, content) in files {
            let path = temp_dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        temp_dir
    }

    #[test]
    fn test_broken_file_is_skipped() {
        let project = create_project(&[
            ("src/a.rs", "/// Adds.\n#[document_me]\npub fn add(a: i32, b: i32) -> i32 { a + b }"),
            ("src/b.rs", "pub fn broken( {"),
            ("src/c.rs", "/// A cache.\n#[document_me]\npub struct Cache;"),
        ]);
        let mut registry = Registry::new();

        let report = Discovery::new(Marker::new("doc").unwrap())
            .run(project.path(), &mut registry)
            .unwrap();

        assert_eq!(report.files_found, 3);
        assert_eq!(report.files_parsed, 2);
        assert_eq!(report.objects_marked, 2);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].contains("b.rs"));
        assert_eq!(registry.docs().keys().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn test_inert_mode_registers_nothing() {
        let project = create_project(&[("src/lib.rs", "#[document_me]\npub fn add() {}")]);
        let mut registry = Registry::new();

        let report = Discovery::new(Marker::new("production").unwrap())
            .run(project.path(), &mut registry)
            .unwrap();

        assert_eq!(report.objects_marked, 1);
        assert!(registry.docs().is_empty());
    }

    #[test]
    fn test_marked_constant_fails_registration() {
        let project = create_project(&[("src/lib.rs", "#[document_me]\npub const LIMIT: u32 = 3;")]);
        let mut registry = Registry::new();

        let err = Discovery::new(Marker::new("doc").unwrap())
            .run(project.path(), &mut registry)
            .unwrap_err();

        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NotCallable(_))));
        assert!(registry.docs().is_empty());
    }

    #[test]
    fn test_unclaimed_members_stay_pending() {
        let project = create_project(&[(
            "src/cache.rs",
            "pub struct Cache;\nimpl Cache {\n    #[document_me]\n    pub fn clear(&mut self) {}\n}",
        )]);
        let mut registry = Registry::new();

        Discovery::new(Marker::new("doc").unwrap())
            .run(project.path(), &mut registry)
            .unwrap();

        let pending: Vec<_> = registry.pending().map(|(module, owner, _)| (module, owner)).collect();
        assert_eq!(pending, vec![("cache", "Cache")]);
        assert!(registry.module("cache").unwrap().contents.is_empty());
    }

    #[test]
    fn test_missing_root_fails() {
        let mut registry = Registry::new();
        let result = Discovery::new(Marker::new("doc").unwrap())
            .run(Path::new("/nonexistent/project"), &mut registry);
        assert!(result.is_err());
    }
}
