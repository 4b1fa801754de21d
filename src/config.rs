//! Configuration and template loading.
//!
//! Both loaders start from built-in defaults and overlay a user-supplied override: a YAML file
//! for [`Config`], a directory of Markdown files for [`TemplateSet`]. Overrides are validated
//! strictly; every unknown key or template name is reported at once.

use crate::docstring::DocstringFormat;
use crate::error::{Error, Result};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Extra documentation sections recognized when no config is given.
pub const DEFAULT_EXTRA_SECTIONS: [&str; 4] = ["Classes", "Functions", "Decorators", "Usage"];

const CONFIG_KEYS: [&str; 2] = ["docstring_format", "extra_sections"];
const CONFIG_EXTENSIONS: [&str; 2] = ["yaml", "yml"];
const TEMPLATE_EXTENSION: &str = "md";

/// Settings that drive documentation parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub docstring_format: DocstringFormat,
    pub extra_sections: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docstring_format: DocstringFormat::default(),
            extra_sections: DEFAULT_EXTRA_SECTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Loads a [`Config`], optionally overridden by a YAML file.
///
/// # Example
///
/// ```
/// use docurator::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new(None).unwrap().get().unwrap();
/// assert_eq!(config.extra_sections.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
}

impl ConfigBuilder {
    /// Validates the override path, if any.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the path is not an existing file and [`Error::InvalidFileFormat`]
    /// if it is not a `.yaml`/`.yml` file.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            if !path.is_file() {
                return Err(Error::NotFound(path.to_path_buf()));
            }
            if !has_extension(path, &CONFIG_EXTENSIONS) {
                return Err(Error::InvalidFileFormat {
                    path: path.to_path_buf(),
                    valid: CONFIG_EXTENSIONS.iter().map(|e| format!(".{}", e)).collect(),
                });
            }
        }
        Ok(Self {
            config_path: config_path.map(Path::to_path_buf),
        })
    }

    /// Returns the defaults with the override's keys applied.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownConfigKeys`] lists every key of the override that is not a known
    /// setting. [`Error::UnsupportedDocstringFormat`] is returned for an unknown grammar.
    pub fn get(&self) -> Result<Config> {
        let mut config = Config::default();
        let Some(path) = &self.config_path else {
            return Ok(config);
        };

        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(config);
        }
        let custom: serde_yaml::Mapping = serde_yaml::from_str(&content)?;

        let unknown: Vec<String> = custom
            .keys()
            .map(key_name)
            .filter(|key| !CONFIG_KEYS.contains(&key.as_str()))
            .collect();
        if !unknown.is_empty() {
            return Err(Error::UnknownConfigKeys(unknown));
        }

        for (key, value) in custom {
            match key_name(&key).as_str() {
                "docstring_format" => {
                    let format = value
                        .as_str()
                        .ok_or_else(|| Error::UnsupportedDocstringFormat(format!("{:?}", value)))?;
                    config.docstring_format = format.parse()?;
                }
                "extra_sections" => {
                    config.extra_sections = serde_yaml::from_value(value)?;
                }
                _ => {}
            }
        }

        Ok(config)
    }
}

fn key_name(key: &serde_yaml::Value) -> String {
    match key.as_str() {
        Some(name) => name.to_string(),
        None => format!("{:?}", key),
    }
}

fn has_extension(path: &Path, valid: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| valid.contains(&ext))
}

/// The kind of entity a template renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemplateKind {
    Module,
    Function,
    Class,
    Method,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 4] = [
        TemplateKind::Module,
        TemplateKind::Function,
        TemplateKind::Class,
        TemplateKind::Method,
    ];

    /// File stem of the template, e.g. `function` for `function.md`.
    pub fn name(self) -> &'static str {
        match self {
            TemplateKind::Module => "module",
            TemplateKind::Function => "function",
            TemplateKind::Class => "class",
            TemplateKind::Method => "method",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    fn default_body(self) -> &'static str {
        match self {
            TemplateKind::Module => include_str!("../templates/module.md"),
            TemplateKind::Function => include_str!("../templates/function.md"),
            TemplateKind::Class => include_str!("../templates/class.md"),
            TemplateKind::Method => include_str!("../templates/method.md"),
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One template body per [`TemplateKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    templates: BTreeMap<TemplateKind, String>,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self {
            templates: TemplateKind::ALL
                .into_iter()
                .map(|kind| (kind, kind.default_body().to_string()))
                .collect(),
        }
    }
}

impl TemplateSet {
    pub fn get(&self, kind: TemplateKind) -> &str {
        self.templates.get(&kind).map(String::as_str).unwrap_or_default()
    }

    pub fn set(&mut self, kind: TemplateKind, body: impl Into<String>) {
        self.templates.insert(kind, body.into());
    }
}

/// Loads a [`TemplateSet`], optionally overridden by a directory of `.md` files.
#[derive(Debug, Clone)]
pub struct TemplateSetBuilder {
    template_dir: Option<PathBuf>,
}

impl TemplateSetBuilder {
    /// Validates the override directory, if any.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the path is not a directory and [`Error::InvalidFileFormat`] for
    /// the first entry that is not a `.md` file.
    pub fn new(template_dir: Option<&Path>) -> Result<Self> {
        if let Some(dir) = template_dir {
            if !dir.is_dir() {
                return Err(Error::NotFound(dir.to_path_buf()));
            }
            for path in sorted_entries(dir)? {
                if !path.is_file() || !has_extension(&path, &[TEMPLATE_EXTENSION]) {
                    return Err(Error::InvalidFileFormat {
                        path,
                        valid: vec![format!(".{}", TEMPLATE_EXTENSION)],
                    });
                }
            }
        }
        Ok(Self {
            template_dir: template_dir.map(Path::to_path_buf),
        })
    }

    /// Returns the default templates with every matching override file applied.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownTemplates`] lists every file whose stem names no template.
    pub fn get(&self) -> Result<TemplateSet> {
        let mut templates = TemplateSet::default();
        let Some(dir) = &self.template_dir else {
            return Ok(templates);
        };

        let mut unknown = Vec::new();
        for path in sorted_entries(dir)? {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            match TemplateKind::from_name(stem) {
                Some(kind) => {
                    debug!("Overriding {} template with {}", kind, path.display());
                    templates.set(kind, fs::read_to_string(&path)?);
                }
                None => unknown.push(
                    path.file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                ),
            }
        }

        if !unknown.is_empty() {
            return Err(Error::UnknownTemplates(unknown));
        }
        Ok(templates)
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_override() {
        let config = ConfigBuilder::new(None).unwrap().get().unwrap();
        assert_eq!(config.docstring_format, DocstringFormat::Google);
        assert_eq!(
            config.extra_sections,
            vec!["Classes", "Functions", "Decorators", "Usage"]
        );
    }

    #[test]
    fn test_override_replaces_known_keys() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "docurator.yaml",
            "docstring_format: rustdoc\nextra_sections:\n  - Usage\n",
        );

        let config = ConfigBuilder::new(Some(&path)).unwrap().get().unwrap();
        assert_eq!(config.docstring_format, DocstringFormat::Markdown);
        assert_eq!(config.extra_sections, vec!["Usage"]);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "docurator.yml", "docstring_format: markdown\n");

        let config = ConfigBuilder::new(Some(&path)).unwrap().get().unwrap();
        assert_eq!(config.docstring_format, DocstringFormat::Markdown);
        assert_eq!(config.extra_sections.len(), 4);
    }

    #[test]
    fn test_unknown_config_key_is_named() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "docurator.yaml",
            "docstring_format: google\nextra_field:\n  - Usage\n",
        );

        let err = ConfigBuilder::new(Some(&path)).unwrap().get().unwrap_err();
        assert!(err.is_configuration());
        match err {
            Error::UnknownConfigKeys(keys) => assert_eq!(keys, vec!["extra_field"]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_docstring_format() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "docurator.yaml", "docstring_format: numpy\n");

        let err = ConfigBuilder::new(Some(&path)).unwrap().get().unwrap_err();
        assert!(matches!(err, Error::UnsupportedDocstringFormat(ref f) if f == "numpy"));
    }

    #[test]
    fn test_config_path_validation() {
        let dir = TempDir::new().unwrap();
        let toml = write(&dir, "docurator.toml", "docstring_format = 'google'");

        assert!(matches!(
            ConfigBuilder::new(Some(&toml)),
            Err(Error::InvalidFileFormat { .. })
        ));
        assert!(matches!(
            ConfigBuilder::new(Some(&dir.path().join("missing.yaml"))),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_default_templates_cover_every_kind() {
        let templates = TemplateSetBuilder::new(None).unwrap().get().unwrap();
        for kind in TemplateKind::ALL {
            assert!(!templates.get(kind).is_empty(), "{} template is empty", kind);
        }
    }

    #[test]
    fn test_template_override() {
        let dir = TempDir::new().unwrap();
        write(&dir, "function.md", "fn {{ name }}");

        let templates = TemplateSetBuilder::new(Some(dir.path())).unwrap().get().unwrap();
        assert_eq!(templates.get(TemplateKind::Function), "fn {{ name }}");
        assert_eq!(
            templates.get(TemplateKind::Module),
            TemplateKind::Module.default_body()
        );
    }

    #[test]
    fn test_unknown_template_is_named() {
        let dir = TempDir::new().unwrap();
        write(&dir, "function.md", "fn {{ name }}");
        write(&dir, "bogus.md", "?");

        let err = TemplateSetBuilder::new(Some(dir.path())).unwrap().get().unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(
            err.to_string(),
            "The given custom template files: [\"bogus.md\"] are not valid filenames"
        );
    }

    #[test]
    fn test_template_extension_is_checked() {
        let dir = TempDir::new().unwrap();
        write(&dir, "function.txt", "fn {{ name }}");

        assert!(matches!(
            TemplateSetBuilder::new(Some(dir.path())),
            Err(Error::InvalidFileFormat { .. })
        ));
    }
}
