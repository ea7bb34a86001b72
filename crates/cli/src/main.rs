use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use std::env;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use triage_knowledge::Registry;
use triage_protocol::{
    serialize_json, serialize_json_pretty, AnalyzeOutput, ErrorEnvelope, IssueContext,
};

#[derive(Parser)]
#[command(name = "issue-triage")]
#[command(about = "Knowledge-base concept detection for issue triage", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Registry override file, JSON or TOML (defaults to the builtin registry)
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect concepts in an issue and emit the enrichment JSON
    Analyze(AnalyzeArgs),

    /// Load and validate the registry (CI gate for registry edits)
    Validate(ValidateArgs),

    /// List the concepts the registry defines
    Concepts(ConceptsArgs),
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Issue title (falls back to ISSUE_TITLE, then to "")
    #[arg(long)]
    title: Option<String>,

    /// Issue body (falls back to ISSUE_BODY, then to "")
    #[arg(long)]
    body: Option<String>,
}

#[derive(Args)]
struct ValidateArgs {
    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ConceptsArgs {
    /// Output JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean whenever it carries JSON for the calling automation.
    let json_output = match &cli.command {
        Commands::Analyze(_) => true,
        Commands::Validate(args) => args.json,
        Commands::Concepts(args) => args.json,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Analyze(args) => run_analyze(args, cli.registry.as_deref(), cli.pretty),
        Commands::Validate(args) => run_validate(args, cli.registry.as_deref()),
        Commands::Concepts(args) => run_concepts(args, cli.registry.as_deref()),
    }
}

/// Registry loading is the fail-fast boundary: a schema defect blocks this
/// run with a descriptive error before any JSON is written.
fn load_registry(path: Option<&Path>) -> Result<Registry> {
    match path {
        Some(path) => Registry::load(path)
            .with_context(|| format!("Failed to load registry from {}", path.display())),
        None => Registry::builtin().context("Builtin registry is invalid"),
    }
}

fn resolve_input(arg: Option<String>, var: &str) -> String {
    arg.or_else(|| env::var(var).ok()).unwrap_or_default()
}

/// Emitted if even serializing the output fails; the caller still gets one
/// well-formed JSON document on stdout.
const SERIALIZE_FALLBACK: &str = r#"{"detectedConcepts":[],"relevantFiles":[],"documentationLinks":[],"suggestedLabels":[],"comment":"","error":{"code":"serialize","message":"failed to serialize analysis output"}}"#;

/// Run the pipeline behind the fail-soft boundary: a panic degrades to an
/// empty context carrying an error envelope instead of aborting the calling
/// automation's run.
fn fail_soft(pipeline: impl FnOnce() -> IssueContext) -> AnalyzeOutput {
    match panic::catch_unwind(AssertUnwindSafe(pipeline)) {
        Ok(context) => AnalyzeOutput::from_context(context),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log::error!("analysis pipeline panicked: {message}");
            AnalyzeOutput::degraded(ErrorEnvelope {
                code: "internal".to_string(),
                message,
                details: None,
                hint: Some("falling back to pattern-based labeling".to_string()),
            })
        }
    }
}

fn render_output(output: &AnalyzeOutput, pretty: bool) -> String {
    let raw = if pretty {
        serialize_json_pretty(output)
    } else {
        serialize_json(output)
    };
    raw.unwrap_or_else(|err| {
        log::error!("failed to serialize analysis output: {err:#}");
        SERIALIZE_FALLBACK.to_string()
    })
}

/// Everything after the registry load is the fail-soft boundary: the caller
/// must always receive one well-formed JSON document.
fn run_analyze(args: AnalyzeArgs, registry_path: Option<&Path>, pretty: bool) -> Result<()> {
    let registry = load_registry(registry_path)?;

    let title = resolve_input(args.title, "ISSUE_TITLE");
    let body = resolve_input(args.body, "ISSUE_BODY");

    let output = fail_soft(|| triage_engine::analyze(&registry, &title, &body));
    println!("{}", render_output(&output, pretty));
    Ok(())
}

fn run_validate(args: ValidateArgs, registry_path: Option<&Path>) -> Result<()> {
    match load_registry(registry_path) {
        Ok(registry) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({"status": "ok", "concepts": registry.len()})
                );
            } else {
                eprintln!("registry ok: {} concepts", registry.len());
            }
            Ok(())
        }
        Err(err) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({"status": "error", "message": format!("{err:#}")})
                );
            } else {
                eprintln!("Error: {err:#}");
            }
            std::process::exit(1);
        }
    }
}

fn run_concepts(args: ConceptsArgs, registry_path: Option<&Path>) -> Result<()> {
    let registry = load_registry(registry_path)?;

    if args.json {
        let concepts: Vec<_> = registry.iter().collect();
        println!("{}", serde_json::to_string_pretty(&concepts)?);
    } else {
        for concept in registry.iter() {
            println!(
                "{} ({} keywords) labels: {}",
                concept.id,
                concept.keywords.len(),
                concept.suggested_labels.join(", ")
            );
        }
    }
    Ok(())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
