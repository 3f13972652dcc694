use crate::generator::{
    DocumentGenerator, GeneratorConfig, DEFAULT_CONTROLLER_NAMESPACE, DEFAULT_SERVER_URL,
    DEFAULT_TITLE,
};
use crate::manifest::Manifest;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// Laravel OpenAPI Router - Generate an OpenAPI 3.0 document from Laravel routes and FormRequest rules
#[derive(Parser, Debug)]
#[command(name = "laravel-openapi-router")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the route manifest (YAML or JSON) exported from the application
    #[arg(value_name = "MANIFEST")]
    pub manifest_path: PathBuf,

    /// Application root used to locate class sources (defaults to the manifest's directory)
    #[arg(short = 'p', long = "project-root", value_name = "DIR")]
    pub project_root: Option<PathBuf>,

    /// Directory the document is written to (defaults to <project-root>/storage/app/public)
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "both")]
    pub output_format: OutputFormat,

    /// Print the document to stdout instead of writing files
    #[arg(long = "stdout")]
    pub stdout: bool,

    /// API title (falls back to the manifest's app name)
    #[arg(long = "title", env = "APP_NAME")]
    pub title: Option<String>,

    /// Server URL (falls back to the manifest's app url)
    #[arg(long = "server-url", env = "APP_URL")]
    pub server_url: Option<String>,

    /// Only routes whose controller lives under this namespace are documented
    #[arg(long = "controller-namespace", default_value = DEFAULT_CONTROLLER_NAMESPACE)]
    pub controller_namespace: String,

    /// Additional base class marking validation request types (repeatable)
    #[arg(long = "request-base", value_name = "CLASS")]
    pub request_bases: Vec<String>,

    /// Additional base class or interface marking structured response types (repeatable)
    #[arg(long = "response-base", value_name = "CLASS")]
    pub response_bases: Vec<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
    /// Both JSON and YAML
    Both,
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

    if let Some(ref root) = args.project_root {
        if !root.is_dir() {
            anyhow::bail!("Project root is not a directory: {}", root.display());
        }
    }

    info!("Manifest: {}", args.manifest_path.display());
    info!("Output format: {:?}", args.output_format);
    if args.stdout {
        info!("Output: stdout");
    }

    Ok(args)
}

impl CliArgs {
    /// Project root: `--project-root`, else the directory holding the manifest
    pub fn project_root(&self) -> PathBuf {
        if let Some(root) = &self.project_root {
            return root.clone();
        }
        match self.manifest_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Output directory: `--output-dir`, else `<project-root>/storage/app/public`
    pub fn output_dir(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => self.project_root().join("storage").join("app").join("public"),
        }
    }

    /// Resolve the run configuration: flag or environment first, then the manifest's
    /// `app` section, then built-in defaults.
    pub fn generator_config(&self, manifest: &Manifest) -> GeneratorConfig {
        let title = self
            .title
            .clone()
            .or_else(|| manifest.app.name.clone())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let server_url = self
            .server_url
            .clone()
            .or_else(|| manifest.app.url.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        GeneratorConfig {
            title,
            server_url,
            controller_namespace: self.controller_namespace.trim_start_matches('\\').to_string(),
        }
    }
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::response_inferrer::SourceKeyInferrer;
    use crate::scanner::FileScanner;
    use crate::serializer::{serialize_json, serialize_yaml, write_document};
    use crate::source::{ClassIndex, ProjectSourceReader};
    use crate::type_classifier::HierarchyClassifier;

    info!("Starting OpenAPI document generation...");

    // Step 1: Load the route manifest
    let manifest = Manifest::load(&args.manifest_path)?;
    info!(
        "Loaded {} routes, {} controllers, {} types",
        manifest.routes.len(),
        manifest.controllers.len(),
        manifest.types.len()
    );

    // Step 2: Index class sources of the project
    let project_root = args.project_root();
    info!("Scanning project directory: {}", project_root.display());
    let scan_result = FileScanner::new(project_root.clone()).scan()?;
    for warning in &scan_result.warnings {
        log::warn!("{}", warning);
    }
    let class_index = ClassIndex::build(&scan_result.php_files);
    info!(
        "Indexed {} classes from {} PHP files",
        class_index.len(),
        scan_result.php_files.len()
    );

    // Step 3: Wire the collaborators
    let mut classifier = HierarchyClassifier::new(&manifest);
    for base in &args.request_bases {
        classifier = classifier.with_validation_base(base);
    }
    for base in &args.response_bases {
        classifier = classifier.with_response_base(base);
    }
    let sources = ProjectSourceReader::new(project_root, &manifest, class_index);
    let inferrer = SourceKeyInferrer::new(&classifier, &sources);
    let generator = DocumentGenerator::new(&manifest, &manifest, &classifier, &inferrer);

    // Step 4: Generate
    let config = args.generator_config(&manifest);
    debug!("Generator config: {:?}", config);
    let generation = generator
        .generate(&config)
        .context("OpenAPI document generation failed")?;

    // Step 5: Output
    if args.stdout {
        let content = match args.output_format {
            OutputFormat::Yaml => serialize_yaml(&generation.document)?,
            OutputFormat::Json | OutputFormat::Both => serialize_json(&generation.document)?,
        };
        println!("{}", content);
    } else {
        let output_dir = args.output_dir();
        for path in write_document(&generation.document, &output_dir, args.output_format)? {
            info!("Wrote {}", path.display());
        }
    }

    let summary = &generation.summary;
    info!("Generation complete!");
    info!("Summary:");
    info!("  - Routes seen: {}", summary.routes_seen);
    info!("  - Routes documented: {}", summary.routes_documented);
    info!("  - Routes skipped: {}", summary.routes_skipped);
    info!("  - Operations: {}", summary.operations);

    Ok(())
}
