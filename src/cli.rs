use crate::docs::SourceDocProvider;
use crate::manifest::Manifest;
use crate::openapi_builder::Generator;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::ui::UiOptions;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// Generate OpenAPI documentation from a route manifest and its validation rules
#[derive(Parser, Debug)]
#[command(name = "openapi-from-rules")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Route manifest (YAML or JSON)
    #[arg(value_name = "MANIFEST")]
    pub manifest_path: PathBuf,

    /// Application configuration file (YAML or JSON)
    #[arg(short = 'c', long = "config", value_name = "CONFIG")]
    pub config_path: Option<PathBuf>,

    /// Source directory of the documented crate, used to read handler doc comments
    #[arg(short = 's', long = "source", value_name = "SOURCE_ROOT")]
    pub source_root: Option<PathBuf>,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Also write a Swagger UI page embedding the document
    #[arg(long = "ui", value_name = "FILE")]
    pub ui_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.manifest_path.is_file() {
        anyhow::bail!(
            "Manifest file does not exist: {}",
            args.manifest_path.display()
        );
    }

    if let Some(source_root) = &args.source_root {
        if !source_root.is_dir() {
            anyhow::bail!("Source root is not a directory: {}", source_root.display());
        }
    }

    info!("Manifest: {}", args.manifest_path.display());
    match &args.config_path {
        Some(config) => info!("Configuration: {}", config.display()),
        None => info!("Configuration: defaults"),
    }
    match &args.source_root {
        Some(source_root) => info!("Source root: {}", source_root.display()),
        None => info!("Source root: none, descriptions disabled"),
    }
    info!("Output format: {:?}", args.output_format);
    match &args.output_path {
        Some(output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Loading route manifest...");
    let router = Manifest::load(&args.manifest_path)
        .and_then(Manifest::into_router)
        .with_context(|| format!("Failed to load manifest: {}", args.manifest_path.display()))?;

    let mut generator = Generator::new();
    if let Some(config_path) = &args.config_path {
        generator = generator.with_config_path(config_path);
    }
    if let Some(source_root) = &args.source_root {
        generator = generator.with_docs(SourceDocProvider::new(source_root));
    }

    info!("Generating OpenAPI document...");
    let document = generator
        .generate(&router)
        .context("Failed to generate OpenAPI document")?
        .context("Configuration could not be loaded")?;

    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    if let Some(output_path) = &args.output_path {
        write_to_file(&content, output_path)?;
        info!("Successfully wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    if let Some(ui_path) = &args.ui_path {
        let page = UiOptions::new(&document.info.title, Some(&document))
            .and_then(|options| options.render())
            .context("Failed to render documentation page")?;
        write_to_file(&page, ui_path)?;
        info!("Successfully wrote documentation page to {}", ui_path.display());
    }

    info!("Summary:");
    info!("  - Paths: {}", document.paths.len());
    info!("  - Schemas: {}", document.components.schemas.len());
    info!("  - Parameters: {}", document.components.parameters.len());
    info!("  - Request bodies: {}", document.components.request_bodies.len());

    Ok(())
}
