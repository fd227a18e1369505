use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};

use binpb_core::{
    Backend, CompileOptions, DecodeOutcome, FileOutcome, OutputFormat, SchemaError, decode_payload,
    load_schemas, render,
};

#[derive(Parser, Debug)]
#[command(name = "binpb")]
#[command(version)]
#[command(
    about = "Decode binary protobuf payloads against .proto schema definitions.",
    long_about = None,
    after_help = "Examples:\n  binpb protos/ payload.binpb\n  binpb protos/ payload.binpb -m shop.v1.Order -f json\n  binpb protos/ payload.binpb --list-messages"
)]
struct Cli {
    /// Directory containing .proto files (searched recursively)
    schema_dir: PathBuf,

    /// Binary protobuf payload to decode
    binpb_file: PathBuf,

    /// Fully-qualified message type to decode against
    #[arg(short = 'm', long)]
    message_type: Option<String>,

    /// Output format for decoded data
    #[arg(short = 'f', long, value_enum, default_value_t = FormatArg::Text)]
    output_format: FormatArg,

    /// Write decoded output to a file instead of stdout
    #[arg(short = 'o', long)]
    output_file: Option<PathBuf>,

    /// List known message types and exit
    #[arg(short = 'l', long)]
    list_messages: bool,

    /// Keep the compiled descriptor artifacts after the run
    #[arg(long)]
    keep_compiled: bool,

    /// Compile schemas with an external protoc instead of the embedded parser
    #[arg(long)]
    protoc: bool,

    /// Suppress progress output
    #[arg(long)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    validate_paths(&cli)?;

    let options = CompileOptions {
        backend: if cli.protoc {
            Backend::Protoc
        } else {
            Backend::Pure
        },
        keep_artifacts: cli.keep_compiled,
    };

    let (registry, compiled) =
        load_schemas(&cli.schema_dir, options).map_err(schema_error_to_cli)?;

    if !cli.quiet {
        eprintln!(
            "Found {} proto files under {}",
            compiled.file_count(),
            cli.schema_dir.display()
        );
        for outcome in compiled.outcomes() {
            match outcome {
                FileOutcome::Parsed { path, .. } => {
                    eprintln!("  ok: {}", display_relative(path, &cli.schema_dir));
                }
                FileOutcome::Failed { path, message } => {
                    eprintln!(
                        "  failed: {}: {}",
                        display_relative(path, &cli.schema_dir),
                        message
                    );
                }
            }
        }
        if compiled.artifacts_kept() {
            eprintln!(
                "Compiled descriptors kept at {}",
                compiled.artifact_dir().display()
            );
        }
    }

    if cli.list_messages {
        for name in registry.list_names() {
            println!("{name}");
        }
        return Ok(());
    }

    let payload = fs::read(&cli.binpb_file)
        .with_context(|| format!("Failed to read input file: {}", cli.binpb_file.display()))?;
    if !cli.quiet {
        eprintln!(
            "Read {} bytes from {}",
            payload.len(),
            cli.binpb_file.display()
        );
    }

    let outcome = decode_payload(&payload, cli.message_type.as_deref(), &registry)
        .map_err(|err| CliError::new(err.to_string(), Some("check that the payload was serialized as the requested type".to_string())))?;

    match outcome {
        DecodeOutcome::Matched { type_name, message } => {
            if cli.message_type.is_none() && !cli.quiet {
                eprintln!("Decoded as message type: {type_name}");
            }
            let rendered = render(&message, cli.output_format.into());
            if let Some(notice) = rendered.fallback_notice {
                eprintln!("warning: {notice}");
            }
            write_output(&cli, &rendered.body)
        }
        DecodeOutcome::NamedTypeNotFound { requested, known } => {
            let hint = if known.is_empty() {
                "no message types were registered; check the schema directory".to_string()
            } else {
                format!("known types: {}", known.join(", "))
            };
            Err(CliError::new(
                format!("message type '{requested}' not found"),
                Some(hint),
            ))
        }
        DecodeOutcome::NoMatch { tried } => Err(CliError::new(
            "payload did not match any known message type",
            Some(format!("tried: {}", tried.join(", "))),
        )),
        DecodeOutcome::HeuristicFallback { preview } => {
            if !cli.quiet {
                eprintln!("No message types available; emitting hex preview");
            }
            write_output(&cli, &format!("{preview}\n"))
        }
    }
}

fn validate_paths(cli: &Cli) -> Result<(), CliError> {
    if !cli.schema_dir.is_dir() {
        return Err(CliError::new(
            format!("schema directory not found: {}", cli.schema_dir.display()),
            Some("pass a directory containing .proto files".to_string()),
        ));
    }
    if !cli.binpb_file.is_file() {
        return Err(CliError::new(
            format!("input file not found: {}", cli.binpb_file.display()),
            Some("pass a binary protobuf payload file".to_string()),
        ));
    }
    Ok(())
}

fn schema_error_to_cli(err: SchemaError) -> CliError {
    let hint = match &err {
        SchemaError::CompilerUnavailable => {
            Some("install the protobuf compiler or drop --protoc".to_string())
        }
        SchemaError::NoSchemaFilesFound { .. } => {
            Some("the directory is searched recursively for *.proto".to_string())
        }
        _ => None,
    };
    CliError::new(err.to_string(), hint)
}

fn write_output(cli: &Cli, body: &str) -> Result<(), CliError> {
    match cli.output_file.as_ref() {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(path, body)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            if !cli.quiet {
                eprintln!("OK: output written -> {}", path.display());
            }
        }
        None => print!("{body}"),
    }
    Ok(())
}

fn display_relative(path: &std::path::Path, root: &std::path::Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}
