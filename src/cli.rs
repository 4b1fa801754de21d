use crate::config::{ConfigBuilder, TemplateSetBuilder};
use crate::discovery::Discovery;
use crate::marker::Marker;
use crate::registry::Registry;
use crate::renderer::Renderer;
use crate::writer::{module_path, serialize_json, serialize_yaml, write_to_file};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// docurator - Collect documentation of marked Rust items and render it through templates
#[derive(Parser, Debug)]
#[command(name = "docurator")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Rust project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// YAML file overriding the default configuration
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Directory of Markdown templates overriding the defaults
    #[arg(short = 't', long = "templates", value_name = "DIR")]
    pub template_dir: Option<PathBuf>,

    /// Operating mode: doc, document, production or prod
    #[arg(short = 'm', long = "mode", default_value = "doc")]
    pub mode: String,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "markdown")]
    pub output_format: OutputFormat,

    /// Output directory for Markdown, or output file for YAML and JSON (stdout if not specified)
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// One rendered Markdown document per module
    Markdown,
    /// YAML dump of the documentation records
    Yaml,
    /// JSON dump of the documentation records
    Json,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.exists() {
        anyhow::bail!("Project path does not exist: {}", args.project_path.display());
    }

    if !args.project_path.is_dir() {
        anyhow::bail!("Project path is not a directory: {}", args.project_path.display());
    }

    info!("Project path: {}", args.project_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    // Configuration errors are fatal before any source is touched
    let marker = Marker::new(&args.mode)?;
    let config = ConfigBuilder::new(args.config_path.as_deref())?
        .get()
        .context("Failed to load configuration")?;
    let templates = TemplateSetBuilder::new(args.template_dir.as_deref())?
        .get()
        .context("Failed to load templates")?;
    debug!("Configuration: {:?}", config);
    let renderer = Renderer::new(&config, &templates)?;

    let mut registry = Registry::new();
    let report = Discovery::new(marker).run(&args.project_path, &mut registry)?;
    for failure in &report.failures {
        debug!("Skipped: {}", failure);
    }

    info!("Reconciling documentation...");
    let docs = renderer.documents(&registry)?;

    match args.output_format {
        OutputFormat::Markdown => {
            for module in &docs {
                let content = renderer.render(module)?;
                match &args.output_path {
                    Some(dir) => write_to_file(&content, &module_path(dir, &module.record.name))?,
                    None => println!("{}", content),
                }
            }
        }
        OutputFormat::Yaml | OutputFormat::Json => {
            let content = if args.output_format == OutputFormat::Yaml {
                serialize_yaml(&docs)?
            } else {
                serialize_json(&docs)?
            };
            match &args.output_path {
                Some(path) => write_to_file(&content, path)?,
                None => println!("{}", content),
            }
        }
    }

    info!("Summary:");
    info!("  - Files scanned: {}", report.files_found);
    info!("  - Files parsed: {}", report.files_parsed);
    info!("  - Objects marked: {}", report.objects_marked);
    info!("  - Modules documented: {}", docs.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;
    use tempfile::TempDir;

    fn args(project: &TempDir) -> CliArgs {
        CliArgs::parse_from(["docurator", project.path().to_str().unwrap()])
    }

    fn create_project() -> TempDir {
        let project = TempDir::new().unwrap();
        fs::create_dir_all(project.path().join("src")).unwrap();
        fs::write(
            project.path().join("src/math.rs"),
            "//! Math.\n\n/// Doubles.\n///\n/// Args:\n///     x: Input.\n#[document_me]\npub fn double(x: i32) -> i32 { x * 2 }\n",
        )
        .unwrap();
        project
    }

    #[test]
    fn test_defaults() {
        let project = TempDir::new().unwrap();
        let args = args(&project);
        assert_eq!(args.mode, "doc");
        assert_eq!(args.output_format, OutputFormat::Markdown);
        assert!(args.config_path.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_parse_args_rejects_missing_project() {
        let args = CliArgs::parse_from(["docurator", "/nonexistent/project"]);
        assert!(parse_args_from_parsed(args).is_err());
    }

    #[test]
    fn test_run_writes_markdown_per_module() {
        let project = create_project();
        let out = TempDir::new().unwrap();
        let mut args = args(&project);
        args.output_path = Some(out.path().to_path_buf());

        run(args).unwrap();

        let content = fs::read_to_string(out.path().join("math.md")).unwrap();
        assert!(content.contains("# Module `math`"));
        assert!(content.contains("fn double(x: i32) -> i32"));
    }

    #[test]
    fn test_run_writes_json() {
        let project = create_project();
        let out = TempDir::new().unwrap();
        let file = out.path().join("docs.json");
        let mut args = args(&project);
        args.output_format = OutputFormat::Json;
        args.output_path = Some(file.clone());

        run(args).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(file).unwrap()).unwrap();
        assert_eq!(value["math"]["entities"][0]["arguments"][0]["name"], "x");
    }

    #[test]
    fn test_run_rejects_unknown_mode() {
        let project = create_project();
        let mut args = args(&project);
        args.mode = "debug".to_string();

        let err = run(args).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidMode(_))));
    }
}
