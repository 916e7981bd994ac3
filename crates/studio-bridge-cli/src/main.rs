//! studio-bridge: CLI tool to convert between Tiptap editor documents and minimark content trees

mod config;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use config::{CONFIG_FILE_NAME, Config, Marks, Naming};
use studio_bridge_batch::{
    BatchOptions, Direction, DocumentSet, convert_documents, convert_str, output_path_for,
};
use studio_bridge_core::{BridgeOptions, RendererRegistry, Schema};
use studio_tiptap::{Attributes, EditorDoc};

#[derive(Parser, Debug)]
#[command(name = "studio-bridge")]
#[command(about = "Convert between Tiptap editor documents and minimark content trees")]
#[command(version)]
#[command(after_help = "Examples:
  studio-bridge to-content page.json            # Write page.minimark.json
  studio-bridge to-editor page.minimark.json    # Write page.tiptap.json
  studio-bridge to-content docs/ -o out/ -r     # Convert a directory tree
  studio-bridge to-content docs/ -j4            # Use 4 parallel jobs
  studio-bridge init                            # Write a sample _studio-bridge.toml")]
struct Cli {
    /// Configuration file (defaults to _studio-bridge.toml next to the input)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode - only show errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert editor documents to content trees
    ToContent {
        #[command(flatten)]
        convert: ConvertArgs,

        /// JSON file whose object becomes the content tree's frontmatter
        #[arg(long)]
        frontmatter: Option<PathBuf>,
    },

    /// Convert content trees to editor documents
    ToEditor {
        #[command(flatten)]
        convert: ConvertArgs,
    },

    /// Render an editor document as an HTML preview
    Preview {
        /// Input editor document
        input: PathBuf,

        /// Output HTML file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a sample configuration file
    Init {
        /// Directory to write the configuration file into
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Print the JSON schema of the configuration file
    Schema,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Input JSON file or directory
    input: PathBuf,

    /// Output file or directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel jobs (defaults to number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Process directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// Mark handling
    #[arg(long, value_enum)]
    marks: Option<Marks>,

    /// Node type naming
    #[arg(long, value_enum)]
    naming: Option<Naming>,

    /// Move a leading frontmatter node into the content tree's frontmatter
    #[arg(long)]
    lift_frontmatter: bool,

    /// Pretty-print output JSON
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::ToContent {
            convert,
            frontmatter,
        } => {
            let config = load_config(cli.config.as_deref(), &convert.input)?;
            let mut bridge = bridge_options(&convert, &config);
            if let Some(path) = frontmatter {
                bridge.frontmatter = Some(read_frontmatter(&path)?);
            }
            run_convert(&convert, Direction::ToContent, bridge, &config, cli.quiet)
        }
        Command::ToEditor { convert } => {
            let config = load_config(cli.config.as_deref(), &convert.input)?;
            let bridge = bridge_options(&convert, &config);
            run_convert(&convert, Direction::ToEditor, bridge, &config, cli.quiet)
        }
        Command::Preview { input, output } => preview(&input, output.as_deref(), cli.quiet),
        Command::Init { dir, force } => init(&dir, force, cli.quiet),
        Command::Schema => {
            println!("{}", Config::json_schema_string()?);
            Ok(())
        }
    }
}

/// Uses `RUST_LOG` if set, otherwise defaults based on verbosity flags
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Explicit `--config`, else `_studio-bridge.toml` next to the input
fn load_config(explicit: Option<&Path>, input: &Path) -> Result<Config> {
    if let Some(path) = explicit {
        return Config::load(path);
    }

    let dir = if input.is_dir() {
        input
    } else {
        input.parent().unwrap_or(Path::new("."))
    };
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };

    let config = Config::load_from_dir(dir)?;
    if config.is_some() {
        tracing::debug!(path = %dir.join(CONFIG_FILE_NAME).display(), "loaded config");
    }
    Ok(config.unwrap_or_default())
}

/// Command line flags win over config values
fn bridge_options(args: &ConvertArgs, config: &Config) -> BridgeOptions {
    BridgeOptions {
        frontmatter: None,
        marks: args
            .marks
            .or(config.convert.marks)
            .map(Into::into)
            .unwrap_or_default(),
        naming: args
            .naming
            .or(config.convert.naming)
            .map(Into::into)
            .unwrap_or_default(),
        lift_frontmatter: args.lift_frontmatter
            || config.convert.lift_frontmatter.unwrap_or(false),
    }
}

fn read_frontmatter(path: &Path) -> Result<Attributes> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read frontmatter: {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse frontmatter: {}", path.display()))?;

    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Frontmatter must be a JSON object: {}", path.display()),
    }
}

fn run_convert(
    args: &ConvertArgs,
    direction: Direction,
    bridge: BridgeOptions,
    config: &Config,
    quiet: bool,
) -> Result<()> {
    let pretty = args.pretty || config.output.pretty.unwrap_or(false);
    let extension = match direction {
        Direction::ToContent => config.output.content_extension.clone(),
        Direction::ToEditor => config.output.editor_extension.clone(),
    }
    .unwrap_or_else(|| direction.output_extension().to_string());

    if args.input.is_file() {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| output_path_for(&args.input, &extension));
        convert_file(&args.input, &output, direction, &bridge, pretty)?;
        if !quiet {
            println!("{}", output.display());
        }
        Ok(())
    } else if args.input.is_dir() {
        convert_directory(args, direction, bridge, extension, pretty, quiet)
    } else {
        anyhow::bail!("Input path does not exist: {}", args.input.display());
    }
}

fn convert_file(
    input: &Path,
    output: &Path,
    direction: Direction,
    bridge: &BridgeOptions,
    pretty: bool,
) -> Result<()> {
    tracing::debug!(input = %input.display(), output = %output.display(), "converting");

    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read: {}", input.display()))?;
    let converted = convert_str(&content, direction, bridge, pretty)
        .with_context(|| format!("Failed to convert: {}", input.display()))?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(output, converted)
        .with_context(|| format!("Failed to write: {}", output.display()))?;

    Ok(())
}

fn convert_directory(
    args: &ConvertArgs,
    direction: Direction,
    bridge: BridgeOptions,
    extension: String,
    pretty: bool,
    quiet: bool,
) -> Result<()> {
    let set = DocumentSet::from_directory(&args.input, args.recursive)
        .with_context(|| format!("Failed to read directory: {}", args.input.display()))?;

    if set.files.is_empty() {
        tracing::warn!("No .json files found in {}", args.input.display());
        return Ok(());
    }
    tracing::debug!("Found {} .json files", set.files.len());

    let options = BatchOptions {
        direction,
        output_dir: args.output.clone().unwrap_or_else(|| args.input.clone()),
        output_extension: Some(extension),
        bridge,
        pretty,
        parallel_jobs: args.jobs,
    };

    let result = convert_documents(&set, &options)?;

    if !quiet {
        for path in &result.output_files {
            println!("{}", path.display());
        }
    }
    tracing::info!(
        "Converted {} files, {} failed",
        result.success_count,
        result.failed_files.len()
    );

    if !result.failed_files.is_empty() {
        anyhow::bail!("{} files failed to convert", result.failed_files.len());
    }

    Ok(())
}

fn preview(input: &Path, output: Option<&Path>, quiet: bool) -> Result<()> {
    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read: {}", input.display()))?;
    let doc = EditorDoc::from_json_str(&content)
        .with_context(|| format!("Failed to parse editor document: {}", input.display()))?;

    let schema = Schema::studio().context("Failed to build node schema")?;
    let html = RendererRegistry::from_schema(&schema).render_document(&doc);

    match output {
        Some(path) => {
            fs::write(path, &html)
                .with_context(|| format!("Failed to write: {}", path.display()))?;
            if !quiet {
                println!("{}", path.display());
            }
        }
        None => println!("{}", html),
    }

    Ok(())
}

fn init(dir: &Path, force: bool, quiet: bool) -> Result<()> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    fs::write(&path, Config::sample().to_toml_with_schema()?)
        .with_context(|| format!("Failed to write: {}", path.display()))?;

    if !quiet {
        println!("{}", path.display());
    }
    Ok(())
}
