#![allow(clippy::print_stdout, clippy::print_stderr)]
use std::{
    borrow::Cow,
    fmt, fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, ValueEnum};
use jsonschema::{CompileError, Evaluation, Registry, Schema};
use percent_encoding::percent_decode_str;
use referencing::{Retrieve, Url};
use tracing_subscriber::EnvFilter;

/// Evaluate JSON instances against a JSON Schema 2020-12 document.
#[derive(Parser, Debug)]
#[command(name = "jsonschema-cli", version, about, long_about = None)]
struct Cli {
    /// Schema to evaluate instances against.
    schema: PathBuf,

    /// Instance to evaluate. May be repeated.
    #[arg(short = 'i', long = "instance")]
    instances: Vec<PathBuf>,

    /// Additional schema compiled before the main one so references to it resolve.
    /// May be repeated.
    #[arg(short = 'r', long = "resource")]
    resources: Vec<PathBuf>,

    /// Print each result as a JSON line in the given output format.
    #[arg(long, value_enum)]
    output: Option<OutputFormat>,

    /// Treat `format` as an assertion instead of an annotation.
    #[arg(long)]
    assert_format: bool,

    /// Base URI of the main schema. Defaults to its `file://` URI.
    #[arg(long)]
    base_uri: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Flag,
    List,
    Hierarchical,
}

impl OutputFormat {
    fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Flag => "flag",
            OutputFormat::List => "list",
            OutputFormat::Hierarchical => "hierarchical",
        }
    }
}

#[derive(Debug)]
enum CliError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    Compile(CompileError),
    Output(serde_json::Error),
    InvalidPath(PathBuf),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io { path, source } => {
                f.write_fmt(format_args!("Failed to read '{}': {source}", path.display()))
            }
            CliError::Json { path, source } => {
                f.write_fmt(format_args!("'{}' is not valid JSON: {source}", path.display()))
            }
            CliError::Compile(error) => error.fmt(f),
            CliError::Output(error) => f.write_fmt(format_args!("Failed to serialize output: {error}")),
            CliError::InvalidPath(path) => f.write_fmt(format_args!(
                "'{}' can not be expressed as a file URI",
                path.display()
            )),
        }
    }
}

impl std::error::Error for CliError {}

impl From<CompileError> for CliError {
    fn from(error: CompileError) -> Self {
        CliError::Compile(error)
    }
}

/// Loads `file://` references from the local filesystem.
struct FileLoader;

impl Retrieve for FileLoader {
    fn retrieve(&self, uri: &Url) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        let path = percent_decode_str(uri.path()).decode_utf8()?;
        tracing::debug!(uri = %uri, path = %path, "Loading referenced document");
        Ok(fs::read(Path::new(path.as_ref()))?)
    }
}

fn read_json(path: &Path) -> Result<serde_json::Value, CliError> {
    let bytes = fs::read(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn file_uri(path: &Path) -> Result<String, CliError> {
    let absolute: Cow<'_, Path> = if path.is_absolute() {
        Cow::Borrowed(path)
    } else {
        let cwd = std::env::current_dir().map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Cow::Owned(cwd.join(path))
    };
    Url::from_file_path(absolute.as_ref())
        .map(String::from)
        .map_err(|()| CliError::InvalidPath(path.to_path_buf()))
}

fn build_registry(cli: &Cli) -> Result<Registry, CliError> {
    let registry = jsonschema::options()
        .assert_formats(cli.assert_format)
        .with_loader("file", FileLoader)
        .build()?;
    if !cli.resources.is_empty() {
        let documents = cli
            .resources
            .iter()
            .map(|path| Ok((file_uri(path)?, read_json(path)?)))
            .collect::<Result<Vec<_>, CliError>>()?;
        tracing::debug!(count = documents.len(), "Compiling additional schemas");
        registry.compile_batch(documents)?;
    }
    Ok(registry)
}

fn compile(cli: &Cli, registry: &Registry) -> Result<Schema, CliError> {
    let document = read_json(&cli.schema)?;
    let base_uri = match &cli.base_uri {
        Some(base_uri) => base_uri.clone(),
        None => file_uri(&cli.schema)?,
    };
    let schema = registry.compile(document, Some(&base_uri))?;
    for reference in registry.unresolved_references(&schema) {
        tracing::warn!(reference = %reference, "Reference can not be resolved");
    }
    Ok(schema)
}

fn report(
    cli: &Cli,
    instance: &Path,
    evaluation: &Evaluation,
) -> Result<(), CliError> {
    match cli.output {
        Some(format) => {
            let payload = match format {
                OutputFormat::Flag => serde_json::to_value(evaluation.flag()),
                OutputFormat::List => serde_json::to_value(evaluation.list()),
                OutputFormat::Hierarchical => serde_json::to_value(evaluation.hierarchical()),
            }
            .map_err(CliError::Output)?;
            let line = serde_json::json!({
                "output": format.as_str(),
                "schema": cli.schema.display().to_string(),
                "instance": instance.display().to_string(),
                "payload": payload,
            });
            println!("{line}");
        }
        None if evaluation.is_valid() => println!("{} - VALID", instance.display()),
        None => {
            println!("{} - INVALID. Errors:", instance.display());
            for (idx, entry) in evaluation.iter_errors().enumerate() {
                let location = entry.node.instance_location();
                let location = if location.as_str().is_empty() {
                    "/"
                } else {
                    location.as_str()
                };
                println!("{}. {location}: {}", idx + 1, entry.error.message());
            }
        }
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<bool, CliError> {
    let registry = build_registry(cli)?;
    let schema = compile(cli, &registry)?;
    let mut all_valid = true;
    for path in &cli.instances {
        let instance = read_json(path)?;
        let evaluation = schema.evaluate(&instance);
        tracing::debug!(
            instance = %path.display(),
            valid = evaluation.is_valid(),
            "Evaluated instance"
        );
        all_valid &= evaluation.is_valid();
        report(cli, path, &evaluation)?;
    }
    Ok(all_valid)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::from(2)
        }
    }
}
